//! Row verdicts and per-sheet results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AlignmentMode;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::table::{Column, Table};
use crate::value::CellValue;

/// Result column holding the verdict label in sort-aligned output.
pub const STATUS_COLUMN: &str = "Status";
/// Suffix for values taken from the old table.
pub const OLD_SUFFIX: &str = "_Day1";
/// Suffix for values taken from the new table.
pub const NEW_SUFFIX: &str = "_Day2";

pub fn old_side_column(column: &str) -> String {
    format!("{column}{OLD_SUFFIX}")
}

pub fn new_side_column(column: &str) -> String {
    format!("{column}{NEW_SUFFIX}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Added,
    Changed,
    Unchanged,
    Removed,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Unchanged => "Unchanged",
            Self::Removed => "Removed",
        }
    }

    /// Whether rows with this verdict appear in sort-aligned output.
    pub fn is_reported(self) -> bool {
        matches!(self, Self::Added | Self::Changed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub verdict: Verdict,
    pub cells: BTreeMap<String, CellValue>,
}

impl ResultRow {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub added: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub removed: usize,
    /// Added rows dropped by a value filter.
    pub filtered_out: usize,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Added => self.added += 1,
            Verdict::Changed => self.changed += 1,
            Verdict::Unchanged => self.unchanged += 1,
            Verdict::Removed => self.removed += 1,
        }
    }

    pub fn get(&self, verdict: Verdict) -> usize {
        match verdict {
            Verdict::Added => self.added,
            Verdict::Changed => self.changed,
            Verdict::Unchanged => self.unchanged,
            Verdict::Removed => self.removed,
        }
    }
}

/// Comparison result for one sheet.
///
/// An empty `rows` list means no differences were found; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDiff {
    pub sheet: String,
    pub mode: AlignmentMode,
    /// Ordered result header.
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub counts: VerdictCounts,
    pub old_row_count: usize,
    pub new_row_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl SheetDiff {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Renders the result rows as a text table in header order.
    pub fn to_table(&self) -> Result<Table> {
        let columns: Vec<Column> = self.columns.iter().map(Column::text).collect();
        let rows: Vec<Vec<CellValue>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| row.cells.get(column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Table::from_columns(columns, rows)
    }
}
