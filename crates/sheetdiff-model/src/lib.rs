//! Data model for comparing two versions of tabular data.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod table;
pub mod value;
pub mod verdict;

pub use config::{AlignmentMode, ComparisonConfig, ComparisonPlan, DateMode, ValueFilter};
pub use diagnostics::{Diagnostic, DiagnosticLevel};
pub use error::{Result, TableError};
pub use table::{Column, ColumnType, Row, Sheet, SheetPair, Table, Workbook};
pub use value::{CellValue, DATE_FORMAT, DATE_TIME_FORMAT, format_numeric};
pub use verdict::{
    NEW_SUFFIX, OLD_SUFFIX, ResultRow, STATUS_COLUMN, SheetDiff, Verdict, VerdictCounts,
    new_side_column, old_side_column,
};
