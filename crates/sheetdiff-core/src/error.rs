//! Error types for the diff engine.

use std::fmt;

use thiserror::Error;

/// Which version of the data a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => f.write_str("old"),
            Self::New => f.write_str("new"),
        }
    }
}

/// A failure confined to one sheet; other sheets still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("no key column configured for sheet '{sheet}'")]
    KeyColumnNotConfigured { sheet: String },

    #[error("key column '{column}' not found in {side} sheet '{sheet}'")]
    MissingKeyColumn {
        sheet: String,
        column: String,
        side: Side,
    },

    #[error(
        "column '{column}' of {side} sheet '{sheet}' has {count} duplicated key values (e.g. {examples})"
    )]
    DuplicateKeys {
        sheet: String,
        column: String,
        side: Side,
        count: usize,
        examples: String,
    },

    #[error("filter column '{column}' not found in sheet '{sheet}'")]
    FilterColumnMissing { sheet: String, column: String },
}

/// A structural failure that aborts the whole run before any sheet is compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("the two inputs share no sheet names")]
    NoCommonSheets,

    #[error("sheet '{sheet}' is not present in both inputs")]
    SheetNotCommon { sheet: String },

    #[error("no sheets selected for comparison")]
    EmptySelection,

    /// A key problem that makes the requested comparison meaningless.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}
