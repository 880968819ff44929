//! Path-level entry points.

use std::path::Path;

use sheetdiff_model::{Table, Workbook};

use crate::csv_sheet::{read_csv_table, sheet_name_from_path};
use crate::discovery::{SourceKind, list_csv_files, source_kind};
use crate::error::{IngestError, Result};
use crate::spreadsheet::{read_spreadsheet, spreadsheet_sheet_names};

/// Loads every sheet of a CSV file, a directory of CSV files, or a workbook.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let kind = source_kind(path)?;
    tracing::info!(path = %path.display(), kind = ?kind, "Loading input");
    match kind {
        SourceKind::Csv => single_sheet(path, read_csv_table(path)?),
        SourceKind::CsvDirectory => {
            let files = list_csv_files(path)?;
            if files.is_empty() {
                return Err(IngestError::NoCsvFiles {
                    path: path.to_path_buf(),
                });
            }
            let mut workbook = Workbook::new();
            for file in files {
                let table = read_csv_table(&file)?;
                let name = sheet_name_from_path(&file);
                workbook
                    .add_sheet(name.clone(), table)
                    .map_err(|source| IngestError::Table {
                        path: file.clone(),
                        sheet: name,
                        source,
                    })?;
            }
            Ok(workbook)
        }
        SourceKind::Spreadsheet => read_spreadsheet(path),
    }
}

/// Sheet names of an input, without loading cell data where possible.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    match source_kind(path)? {
        SourceKind::Csv => Ok(vec![sheet_name_from_path(path)]),
        SourceKind::CsvDirectory => Ok(list_csv_files(path)?
            .iter()
            .map(|file| sheet_name_from_path(file))
            .collect()),
        SourceKind::Spreadsheet => spreadsheet_sheet_names(path),
    }
}

/// Loads a single named sheet.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook = load_workbook(path)?;
    workbook.take_sheet(sheet).ok_or_else(|| IngestError::SheetNotFound {
        path: path.to_path_buf(),
        sheet: sheet.to_string(),
    })
}

fn single_sheet(path: &Path, table: Table) -> Result<Workbook> {
    Ok(Workbook::new().with_sheet(sheet_name_from_path(path), table))
}
