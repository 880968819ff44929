//! Result export for sheet comparisons.
//!
//! - **CSV**: one `result_{sheet}.csv` per sheet with differences, UTF-8 with BOM
//! - **JSON**: a run summary with counts, output paths and diagnostics

mod common;
mod delimited;
pub mod error;
mod summary;

pub use common::{
    DEFAULT_NEW_ROWS_FILE, UTF8_BOM, ensure_output_dir, ensure_parent_dir, result_file_name,
    sanitize_file_component,
};
pub use delimited::{WrittenFile, write_csv, write_csv_file, write_diff_csv, write_sheet_results};
pub use error::{OutputError, Result};
pub use summary::{RunSummary, SheetFailure, SheetSummary, write_summary_json};
