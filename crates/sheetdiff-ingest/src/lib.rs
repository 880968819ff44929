//! Loading CSV files and spreadsheets into workbooks of tables.

pub mod csv_sheet;
pub mod discovery;
pub mod error;
pub mod header;
pub mod polars_utils;
pub mod spreadsheet;
pub mod workbook;

pub use csv_sheet::{CsvLayout, read_csv_layout, read_csv_table};
pub use discovery::{SPREADSHEET_EXTENSIONS, SourceKind, list_csv_files, source_kind};
pub use error::{IngestError, Result};
pub use header::{normalize_header, unique_headers};
pub use polars_utils::{any_to_cell, dtype_to_column_type};
pub use spreadsheet::{data_to_cell, read_spreadsheet, spreadsheet_sheet_names, table_from_records};
pub use workbook::{load_sheet, load_workbook, sheet_names};
