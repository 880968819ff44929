use thiserror::Error;

/// Structural problems with an input table or workbook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column {index} has an empty name")]
    EmptyColumnName { index: usize },
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
    #[error("row {row} has {actual} cells but the table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("row references unknown column: {column}")]
    UnknownColumn { column: String },
    #[error("duplicate sheet name: {name}")]
    DuplicateSheet { name: String },
}

pub type Result<T> = std::result::Result<T, TableError>;
