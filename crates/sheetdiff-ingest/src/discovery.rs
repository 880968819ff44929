//! Input discovery: which reader handles a path.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extensions read through calamine.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// How an input path is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Directory whose CSV files are the sheets.
    CsvDirectory,
    /// Single CSV file holding one sheet.
    Csv,
    /// Excel or OpenDocument workbook.
    Spreadsheet,
}

/// Classifies `path` by type and extension (case-insensitive).
pub fn source_kind(path: &Path) -> Result<SourceKind> {
    if !path.exists() {
        return Err(IngestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Ok(SourceKind::CsvDirectory);
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        Ok(SourceKind::Csv)
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        Ok(SourceKind::Spreadsheet)
    } else {
        Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

/// CSV files directly inside `dir`, ordered by file name.
///
/// Subdirectories are not searched.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_error = |source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = std::fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.path()).map_err(read_error))
        .filter(|path| match path {
            Ok(path) => path.is_file() && has_extension(path, "csv"),
            Err(_) => true,
        })
        .collect::<Result<Vec<_>>>()?;
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
