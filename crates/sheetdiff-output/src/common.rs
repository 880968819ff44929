//! Shared helpers for writing result files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, Result};

/// UTF-8 byte-order mark written at the start of every CSV file.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Default file name for key-matched output.
pub const DEFAULT_NEW_ROWS_FILE: &str = "filtered_new_rows.csv";

/// Characters replaced in file names.
const INVALID_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Ensure the parent directory of a file exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Ensure an output directory exists and return its path.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.to_path_buf())
}

/// Replaces path separators, reserved and control characters with `_`.
pub fn sanitize_file_component(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_control() || INVALID_FILE_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|ch| ch == '.') {
        "sheet".to_string()
    } else {
        sanitized
    }
}

/// File name for a sheet's sort-aligned result: `result_{sheet}.csv`.
pub fn result_file_name(sheet: &str) -> String {
    format!("result_{}.csv", sanitize_file_component(sheet))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_names_are_deterministic() {
        assert_eq!(result_file_name("Orders"), "result_Orders.csv");
        assert_eq!(result_file_name("Q1/Q2: totals"), "result_Q1_Q2_ totals.csv");
        assert_eq!(result_file_name(".."), "result_sheet.csv");
    }

    #[test]
    fn creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a/b/out.csv");
        ensure_parent_dir(&path).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
