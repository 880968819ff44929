//! Error types for result export.

use std::path::{Path, PathBuf};

use thiserror::Error;

use sheetdiff_model::TableError;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build result table for sheet {sheet}")]
    ResultTable {
        sheet: String,
        #[source]
        source: TableError,
    },

    #[error("failed to serialize run summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutputError {
    /// Attaches `path` to a bare I/O failure.
    pub(crate) fn at(path: &Path, err: OutputError) -> Self {
        match err {
            Self::Io(source) => Self::Write {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
