//! Excel and OpenDocument workbooks via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use sheetdiff_model::{CellValue, Table, TableError, Workbook};

use crate::error::{IngestError, Result};
use crate::header::unique_headers;

/// Lists worksheet names without reading cell data.
pub fn spreadsheet_sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path).map_err(|source| spreadsheet_error(path, source))?;
    Ok(workbook.sheet_names())
}

/// Reads every worksheet, in workbook order.
pub fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path).map_err(|source| spreadsheet_error(path, source))?;
    let mut loaded = Workbook::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| spreadsheet_error(path, source))?;
        let records = range
            .rows()
            .map(|row| row.iter().map(data_to_cell).collect())
            .collect();
        let table = table_from_records(records).map_err(|source| IngestError::Table {
            path: path.to_path_buf(),
            sheet: name.clone(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            sheet = %name,
            rows = table.row_count(),
            columns = table.columns().len(),
            "Loaded worksheet"
        );
        loaded.add_sheet(name.clone(), table).map_err(|source| IngestError::Table {
            path: path.to_path_buf(),
            sheet: name,
            source,
        })?;
    }
    Ok(loaded)
}

/// Builds a table from raw records; the first non-empty record is the header.
///
/// Fully empty records are skipped and short records are padded.
pub fn table_from_records(records: Vec<Vec<CellValue>>) -> std::result::Result<Table, TableError> {
    let mut records = records
        .into_iter()
        .filter(|record| !record.iter().all(CellValue::is_empty));
    let Some(header) = records.next() else {
        return Ok(Table::default());
    };
    let data: Vec<Vec<CellValue>> = records.collect();
    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or_default();

    let mut raw_headers: Vec<String> = header.iter().map(CellValue::to_canonical_string).collect();
    raw_headers.resize(width, String::new());
    let rows = data
        .into_iter()
        .map(|mut row| {
            row.resize(width, CellValue::Empty);
            row
        })
        .collect();
    Table::from_rows(unique_headers(&raw_headers), rows)
}

/// Converts a calamine cell. Datetimes at midnight become plain dates; text
/// is kept as stored, whitespace included.
pub fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => (*v).into(),
        Data::String(v) => CellValue::text(v.as_str()),
        Data::DateTime(v) => match v.as_datetime() {
            Some(datetime) => temporal_cell(datetime),
            None => v.as_f64().into(),
        },
        Data::DateTimeIso(v) => parse_iso(v).unwrap_or_else(|| CellValue::text(v.as_str())),
        Data::DurationIso(v) => CellValue::text(v.as_str()),
        Data::Error(e) => CellValue::text(e.to_string()),
    }
}

fn temporal_cell(datetime: NaiveDateTime) -> CellValue {
    if datetime.time() == NaiveTime::MIN {
        CellValue::Date(datetime.date())
    } else {
        CellValue::DateTime(datetime)
    }
}

fn parse_iso(text: &str) -> Option<CellValue> {
    let text = text.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(temporal_cell(datetime));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(CellValue::Date)
}

fn spreadsheet_error(path: &Path, source: calamine::Error) -> IngestError {
    IngestError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn converts_cells() {
        assert_eq!(data_to_cell(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(data_to_cell(&Data::String("a".into())), CellValue::text("a"));
        assert_eq!(data_to_cell(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            data_to_cell(&Data::Error(CellErrorType::Div0)),
            CellValue::text("#DIV/0!")
        );
    }

    #[test]
    fn text_cells_keep_whitespace() {
        assert_eq!(data_to_cell(&Data::String("A  ".into())), CellValue::text("A  "));
        assert_ne!(
            data_to_cell(&Data::String("A  ".into())),
            data_to_cell(&Data::String("A".into()))
        );
    }

    #[test]
    fn iso_datetimes_parse() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2024-03-01T00:00:00".into())),
            CellValue::Date(date)
        );
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2024-03-01T08:15:00".into())),
            CellValue::DateTime(date.and_hms_opt(8, 15, 0).unwrap())
        );
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2024-03-01".into())),
            CellValue::Date(date)
        );
    }

    #[test]
    fn header_is_first_non_empty_record() {
        let records = vec![
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![" id ".into(), CellValue::Empty, "id".into()],
            vec![1i64.into(), "x".into()],
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![2i64.into(), "y".into(), "z".into()],
        ];
        let table = table_from_records(records).unwrap();
        assert_eq!(table.column_names(), vec!["id", "Unnamed: 1", "id.1"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0].get("id.1"), &CellValue::Empty);
    }

    #[test]
    fn numeric_headers_use_canonical_form() {
        let records = vec![vec![2024i64.into(), CellValue::Number(1.5)]];
        let table = table_from_records(records).unwrap();
        assert_eq!(table.column_names(), vec!["2024", "1.5"]);
        assert!(table.is_empty());
    }
}
