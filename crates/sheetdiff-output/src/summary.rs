//! Machine-readable run summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use sheetdiff_core::WorkbookDiff;
use sheetdiff_model::{AlignmentMode, Diagnostic, SheetDiff, VerdictCounts};

use crate::common::ensure_parent_dir;
use crate::delimited::WrittenFile;
use crate::error::{OutputError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub mode: AlignmentMode,
    pub old_rows: usize,
    pub new_rows: usize,
    pub counts: VerdictCounts,
    pub result_rows: usize,
    /// Absent when the sheet had no differences or nothing was written.
    pub output: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SheetSummary {
    pub fn from_diff(diff: &SheetDiff, output: Option<&Path>) -> Self {
        Self {
            sheet: diff.sheet.clone(),
            mode: diff.mode,
            old_rows: diff.old_row_count,
            new_rows: diff.new_row_count,
            counts: diff.counts,
            result_rows: diff.row_count(),
            output: output.map(Path::to_path_buf),
            diagnostics: diff.diagnostics.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub cancelled: bool,
    pub totals: VerdictCounts,
    pub sheets: Vec<SheetSummary>,
    pub failures: Vec<SheetFailure>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    /// Summarizes a workbook run, linking each sheet to its written file.
    pub fn from_run(run: &WorkbookDiff, written: &[WrittenFile]) -> Self {
        let sheets = run
            .diffs()
            .map(|diff| {
                let output = written
                    .iter()
                    .find(|file| file.sheet == diff.sheet)
                    .map(|file| file.path.as_path());
                SheetSummary::from_diff(diff, output)
            })
            .collect();
        let failures = run
            .failures()
            .map(|(sheet, err)| SheetFailure {
                sheet: sheet.to_string(),
                error: err.to_string(),
            })
            .collect();
        Self {
            generated_at: Utc::now(),
            cancelled: run.cancelled,
            totals: run.total_counts(),
            sheets,
            failures,
            diagnostics: run.diagnostics.clone(),
        }
    }

    /// Summarizes a single key-matched comparison.
    pub fn from_diff(diff: &SheetDiff, output: Option<&Path>) -> Self {
        Self {
            generated_at: Utc::now(),
            cancelled: false,
            totals: diff.counts,
            sheets: vec![SheetSummary::from_diff(diff, output)],
            failures: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Writes `summary` as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), sheets = summary.sheets.len(), "Wrote run summary");
    Ok(())
}
