//! Per-sheet comparison configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// How rows of the two tables are paired up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentMode {
    /// Sort both tables by the key column and compare row `i` with row `i`.
    #[default]
    SortAligned,
    /// Emit new rows whose key is absent from the old table.
    KeyMatched,
}

impl AlignmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SortAligned => "sort-aligned",
            Self::KeyMatched => "key-matched",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality policy for date-like columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateMode {
    /// Compare the string forms, time of day included.
    Exact,
    /// Compare only the calendar date when both sides parse as dates.
    #[default]
    DateOnly,
}

/// Keep only result rows whose `column` value is one of `accepted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFilter {
    pub column: String,
    pub accepted: BTreeSet<String>,
}

impl ValueFilter {
    pub fn new<I, S>(column: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.accepted.contains(value)
    }
}

/// Settings for comparing one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub mode: AlignmentMode,
    /// Required in both modes: sort key or identifier column.
    pub key_column: Option<String>,
    /// Columns ignored when deciding whether a row changed.
    pub excluded_columns: BTreeSet<String>,
    pub date_mode: DateMode,
    /// Columns treated as date-like regardless of their type.
    pub date_columns: BTreeSet<String>,
    /// Only honoured in key-matched mode.
    pub value_filter: Option<ValueFilter>,
    /// Columns removed from every result row before output.
    pub output_excluded_columns: BTreeSet<String>,
    /// Abort the sheet instead of warning when sort keys repeat.
    pub require_unique_key: bool,
}

impl ComparisonConfig {
    pub fn sort_aligned(key_column: impl Into<String>) -> Self {
        Self {
            mode: AlignmentMode::SortAligned,
            key_column: Some(key_column.into()),
            ..Self::default()
        }
    }

    pub fn key_matched(key_column: impl Into<String>) -> Self {
        Self {
            mode: AlignmentMode::KeyMatched,
            key_column: Some(key_column.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: AlignmentMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = Some(key_column.into());
        self
    }

    #[must_use]
    pub fn with_excluded<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_date_mode(mut self, date_mode: DateMode) -> Self {
        self.date_mode = date_mode;
        self
    }

    #[must_use]
    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_value_filter(mut self, filter: ValueFilter) -> Self {
        self.value_filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_output_excluded<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_excluded_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_require_unique_key(mut self, enable: bool) -> Self {
        self.require_unique_key = enable;
        self
    }
}

/// Configuration for a whole run, built once before any sheet is compared.
///
/// Sheets without an explicit entry use `defaults`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPlan {
    pub defaults: ComparisonConfig,
    pub sheets: BTreeMap<String, ComparisonConfig>,
    /// Sheets to compare, in order. `None` compares every common sheet.
    pub selection: Option<Vec<String>>,
}

impl ComparisonPlan {
    pub fn new(defaults: ComparisonConfig) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: impl Into<String>, config: ComparisonConfig) -> Self {
        self.sheets.insert(sheet.into(), config);
        self
    }

    #[must_use]
    pub fn with_selection<I, S>(mut self, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(sheets.into_iter().map(Into::into).collect());
        self
    }

    pub fn config_for(&self, sheet: &str) -> &ComparisonConfig {
        self.sheets.get(sheet).unwrap_or(&self.defaults)
    }
}
