//! CSV sheets: header row via the `csv` crate, typed data via Polars.

use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};

use sheetdiff_model::{CellValue, Column, ColumnType, Table};

use crate::error::{IngestError, Result};
use crate::header::unique_headers;
use crate::polars_utils::{any_to_cell, dtype_to_column_type};

/// Location of the header row and whether any data follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    pub headers: Vec<String>,
    /// Physical lines up to and including the header row.
    pub header_lines: usize,
    pub has_data: bool,
}

/// Reads one CSV file as a table.
///
/// The first non-empty record is the header. Column types come from Polars
/// inference over every row with date parsing enabled; if the typed read
/// still fails, the file is re-read as text and types are inferred from the
/// cells. Rows whose cells are all empty are skipped.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let Some(layout) = read_csv_layout(path)? else {
        return Ok(Table::default());
    };
    if !layout.has_data {
        let columns = layout.headers.iter().map(Column::text).collect();
        return Table::new(columns).map_err(|source| table_error(path, source));
    }

    let (df, typed) = match read_frame(path, &layout, None) {
        Ok(df) => (df, true),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Typed CSV read failed; reading all columns as text"
            );
            (read_frame(path, &layout, Some(0))?, false)
        }
    };

    if df.width() > layout.headers.len() {
        tracing::warn!(
            path = %path.display(),
            headers = layout.headers.len(),
            columns = df.width(),
            "CSV rows are wider than the header; extra cells ignored"
        );
    }
    let mut table =
        dataframe_to_table(&df, layout.headers).map_err(|source| table_error(path, source))?;
    if !typed {
        table.infer_column_types();
    }
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "Loaded CSV"
    );
    Ok(table)
}

/// Reads the data lines below the header. `infer_rows` of `None` scans every
/// row; `Some(0)` reads every column as text.
fn read_frame(path: &Path, layout: &CsvLayout, infer_rows: Option<usize>) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(layout.header_lines)
        .with_infer_schema_length(infer_rows)
        .map_parse_options(|options| {
            options
                .with_try_parse_dates(infer_rows != Some(0))
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Finds the header row. Returns `None` for a file without any records.
pub fn read_csv_layout(path: &Path) -> Result<Option<CsvLayout>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;

    let mut header: Option<(Vec<String>, usize)> = None;
    let mut has_data = false;
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        if record.iter().all(|value| value.trim().trim_matches('\u{feff}').is_empty()) {
            continue;
        }
        if header.is_none() {
            let line = record.position().map_or(1, |position| position.line() as usize);
            let raw: Vec<&str> = record.iter().collect();
            header = Some((unique_headers(&raw), line));
        } else {
            has_data = true;
            break;
        }
    }

    Ok(header.map(|(headers, header_lines)| CsvLayout {
        headers,
        header_lines,
        has_data,
    }))
}

/// Converts a header-less DataFrame into a table named by `headers`.
pub fn dataframe_to_table(
    df: &DataFrame,
    headers: Vec<String>,
) -> std::result::Result<Table, sheetdiff_model::TableError> {
    let frame_columns = df.get_columns();
    let series: Vec<_> = frame_columns
        .iter()
        .take(headers.len())
        .map(|column| column.as_materialized_series())
        .collect();
    let columns: Vec<Column> = headers
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let column_type = frame_columns
                .get(index)
                .map_or(ColumnType::Empty, |column| dtype_to_column_type(column.dtype()));
            Column::new(name, column_type)
        })
        .collect();

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row: Vec<CellValue> = (0..columns.len())
            .map(|col| {
                series.get(col).map_or(CellValue::Empty, |s| {
                    any_to_cell(s.get(idx).unwrap_or(AnyValue::Null))
                })
            })
            .collect();
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(row);
    }
    Table::from_columns(columns, rows)
}

fn csv_error(path: &Path, err: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn table_error(path: &Path, source: sheetdiff_model::TableError) -> IngestError {
    IngestError::Table {
        path: path.to_path_buf(),
        sheet: sheet_name_from_path(path),
        source,
    }
}

/// Sheet name for a CSV file: its file stem.
pub fn sheet_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
