//! Loading CSV and spreadsheet inputs end to end.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sheetdiff_ingest::{
    IngestError, load_sheet, load_workbook, read_csv_table, read_spreadsheet, sheet_names,
};
use sheetdiff_model::{CellValue, ColumnType};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write file");
}

#[test]
fn reads_typed_csv_columns() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "orders.csv",
        "\u{feff}Order Id,  Amount ,Shipped,Note\n1,1.50,2024-01-01,  first \n2,3,2024-01-02,\n",
    );
    let table = read_csv_table(&dir.path().join("orders.csv")).unwrap();

    assert_eq!(table.column_names(), vec!["Order Id", "Amount", "Shipped", "Note"]);
    assert_eq!(
        table.column("Order Id").map(|c| c.column_type),
        Some(ColumnType::Number)
    );
    assert!(
        table
            .column("Shipped")
            .is_some_and(|c| c.column_type.is_temporal())
    );
    let first = &table.rows()[0];
    assert_eq!(first.get("Amount").to_string(), "1.5");
    assert_eq!(first.get("Shipped").to_string(), "2024-01-01");
    assert_eq!(first.get("Note"), &CellValue::text("  first "));
    assert_eq!(table.rows()[1].get("Note"), &CellValue::Empty);
}

#[test]
fn skips_fully_empty_rows() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "s.csv", "id,name\n1,a\n,\n2,b\n");
    let table = read_csv_table(&dir.path().join("s.csv")).unwrap();
    assert_eq!(table.row_count(), 2);
}

#[test]
fn directory_sheets_are_named_by_file_stem() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Stock.csv", "id\n1\n");
    write(dir.path(), "Orders.csv", "id\n1\n2\n");
    write(dir.path(), "readme.md", "ignored");

    let workbook = load_workbook(dir.path()).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Orders", "Stock"]);
    assert_eq!(sheet_names(dir.path()).unwrap(), vec!["Orders", "Stock"]);
    assert_eq!(workbook.sheet("Orders").map(|t| t.row_count()), Some(2));
}

#[test]
fn single_csv_is_one_sheet() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "day1.csv", "id\n1\n");
    let path = dir.path().join("day1.csv");
    assert_eq!(sheet_names(&path).unwrap(), vec!["day1"]);
    assert_eq!(load_sheet(&path, "day1").unwrap().row_count(), 1);
    assert!(matches!(
        load_sheet(&path, "other"),
        Err(IngestError::SheetNotFound { .. })
    ));
}

#[test]
fn empty_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_workbook(dir.path()),
        Err(IngestError::NoCsvFiles { .. })
    ));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "data.json", "{}");
    assert!(matches!(
        load_workbook(&dir.path().join("data.json")),
        Err(IngestError::UnsupportedFormat { .. })
    ));
}

// =========================================================================
// Spreadsheets
// =========================================================================

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn spreadsheet_sheets_keep_workbook_order() {
    let path = fixture("two_sheets.xlsx");
    assert_eq!(sheet_names(&path).unwrap(), vec!["Orders", "Archive"]);

    let workbook = load_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Orders", "Archive"]);
}

#[test]
fn spreadsheet_headers_are_cleaned_and_deduplicated() {
    let workbook = read_spreadsheet(&fixture("two_sheets.xlsx")).unwrap();
    let orders = workbook.sheet("Orders").unwrap();
    assert_eq!(
        orders.column_names(),
        vec!["id", "Name", "Unnamed: 2", "id.1", "shipped"]
    );
    // the blank fourth row is dropped
    assert_eq!(orders.row_count(), 3);
    assert_eq!(
        orders.column("id").map(|c| c.column_type),
        Some(ColumnType::Number)
    );

    let ids: Vec<String> = orders.rows().iter().map(|r| r.get("id").to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(orders.rows()[0].get("Name"), &CellValue::text("Apple  "));
    assert_eq!(orders.rows()[1].get("Unnamed: 2"), &CellValue::text("x"));
    assert_eq!(orders.rows()[2].get("id.1").to_string(), "30");
}

#[test]
fn spreadsheet_datetimes_split_on_midnight() {
    let orders = load_sheet(&fixture("two_sheets.xlsx"), "Orders").unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    assert_eq!(orders.rows()[0].get("shipped"), &CellValue::Date(day));
    assert_eq!(
        orders.rows()[1].get("shipped"),
        &CellValue::DateTime(day.and_hms_opt(12, 0, 0).unwrap())
    );
    assert_eq!(
        orders.rows()[2].get("shipped"),
        &CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    );
}

#[test]
fn spreadsheet_sheets_are_separate_tables() {
    let path = fixture("two_sheets.xlsx");
    let archive = load_sheet(&path, "Archive").unwrap();
    assert_eq!(archive.column_names(), vec!["code", "qty"]);
    assert_eq!(archive.row_count(), 2);
    assert_eq!(archive.rows()[1].get("code"), &CellValue::text("B"));
    assert!(!archive.has_column("id"));

    assert!(matches!(
        load_sheet(&path, "Missing"),
        Err(IngestError::SheetNotFound { .. })
    ));
}
