//! Row alignment strategies.
//!
//! - **Sort-aligned**: both tables are stably sorted by the key column and
//!   paired by position. A failed sort keeps both tables in their original
//!   order; the caller is told so through [`SortAlignment::sort_failure`].
//! - **Key-matched**: new rows whose key is absent from the old table's key
//!   set are reported as added. Duplicate old keys collapse into one entry;
//!   duplicate new keys are each tested.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use thiserror::Error;

use sheetdiff_model::{CellValue, Row, Table};

use crate::error::Side;
use crate::normalize::key_string;

/// A pairing of at most one old row with at most one new row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowPair<'a> {
    Both { old: &'a Row, new: &'a Row },
    OldOnly(&'a Row),
    NewOnly(&'a Row),
}

impl<'a> RowPair<'a> {
    pub fn old(&self) -> Option<&'a Row> {
        match self {
            Self::Both { old, .. } | Self::OldOnly(old) => Some(old),
            Self::NewOnly(_) => None,
        }
    }

    pub fn new_row(&self) -> Option<&'a Row> {
        match self {
            Self::Both { new, .. } | Self::NewOnly(new) => Some(new),
            Self::OldOnly(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortFailure {
    #[error("key column '{column}' is missing from the {side} table")]
    MissingKey { side: Side, column: String },
    #[error("key column '{column}' of the {side} table mixes {kinds} values")]
    IncomparableKeys {
        side: Side,
        column: String,
        kinds: String,
    },
}

/// Positional pairs after sorting both sides.
#[derive(Debug, Clone)]
pub struct SortAlignment<'a> {
    /// One entry per index in `0..max(old, new)`.
    pub pairs: Vec<RowPair<'a>>,
    /// Set when sorting failed and the original order was used.
    pub sort_failure: Option<SortFailure>,
    /// Key values occurring more than once, per side.
    pub duplicate_keys: Vec<(Side, Vec<String>)>,
}

impl SortAlignment<'_> {
    pub fn is_sorted(&self) -> bool {
        self.sort_failure.is_none()
    }
}

/// Sorts both tables by `key` and pairs their rows by position.
pub fn align_sorted<'a>(old: &'a Table, new: &'a Table, key: &str) -> SortAlignment<'a> {
    let sorted = sort_rows(old, key, Side::Old).and_then(|old_rows| {
        sort_rows(new, key, Side::New).map(|new_rows| (old_rows, new_rows))
    });
    let (old_rows, new_rows, sort_failure) = match sorted {
        Ok((old_rows, new_rows)) => (old_rows, new_rows, None),
        Err(failure) => (
            old.rows().iter().collect(),
            new.rows().iter().collect(),
            Some(failure),
        ),
    };

    let mut duplicate_keys = Vec::new();
    for (side, table) in [(Side::Old, old), (Side::New, new)] {
        if table.has_column(key) {
            let duplicates = duplicate_keys_in(table.rows(), key);
            if !duplicates.is_empty() {
                duplicate_keys.push((side, duplicates));
            }
        }
    }

    SortAlignment {
        pairs: pair_by_position(&old_rows, &new_rows),
        sort_failure,
        duplicate_keys,
    }
}

/// Pairs row `i` of `old` with row `i` of `new`.
pub fn pair_by_position<'a>(old: &[&'a Row], new: &[&'a Row]) -> Vec<RowPair<'a>> {
    let len = old.len().max(new.len());
    (0..len)
        .map(|index| match (old.get(index), new.get(index)) {
            (Some(old), Some(new)) => RowPair::Both { old, new },
            (Some(old), None) => RowPair::OldOnly(old),
            (None, Some(new)) => RowPair::NewOnly(new),
            (None, None) => unreachable!("index is below the longer side's length"),
        })
        .collect()
}

/// Stable ascending sort by `key`; empty keys go last.
pub fn sort_rows<'a>(table: &'a Table, key: &str, side: Side) -> Result<Vec<&'a Row>, SortFailure> {
    if !table.has_column(key) {
        return Err(SortFailure::MissingKey {
            side,
            column: key.to_string(),
        });
    }
    let keyed: Vec<(SortKey<'_>, &Row)> = table
        .rows()
        .iter()
        .map(|row| (SortKey::from_cell(row.get(key)), row))
        .collect();
    let kinds: BTreeSet<&'static str> = keyed
        .iter()
        .filter_map(|(sort_key, _)| sort_key.kind())
        .collect();
    if kinds.len() > 1 {
        return Err(SortFailure::IncomparableKeys {
            side,
            column: key.to_string(),
            kinds: kinds.into_iter().collect::<Vec<_>>().join(" and "),
        });
    }
    let mut keyed = keyed;
    keyed.sort_by(|(left, _), (right, _)| left.compare(right));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Key values that occur on more than one row, in first-seen order.
pub fn duplicate_keys_in(rows: &[Row], key: &str) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut order = Vec::new();
    for row in rows {
        let value = key_string(row.get(key));
        let count = counts.entry(value.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(value);
        }
    }
    order
}

#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Empty,
    Number(f64),
    Text(&'a str),
    Bool(bool),
    Temporal(NaiveDateTime),
}

impl<'a> SortKey<'a> {
    fn from_cell(value: &'a CellValue) -> Self {
        match value {
            CellValue::Empty => Self::Empty,
            CellValue::Text(text) if text.is_empty() => Self::Empty,
            CellValue::Text(text) => Self::Text(text),
            CellValue::Number(number) => Self::Number(*number),
            CellValue::Bool(flag) => Self::Bool(*flag),
            CellValue::Date(date) => Self::Temporal(date.and_time(chrono::NaiveTime::MIN)),
            CellValue::DateTime(datetime) => Self::Temporal(*datetime),
        }
    }

    fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Number(_) => Some("number"),
            Self::Text(_) => Some("text"),
            Self::Bool(_) => Some("boolean"),
            Self::Temporal(_) => Some("date"),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Empty, _) => Ordering::Greater,
            (_, Self::Empty) => Ordering::Less,
            (Self::Number(left), Self::Number(right)) => left.total_cmp(right),
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Bool(left), Self::Bool(right)) => left.cmp(right),
            (Self::Temporal(left), Self::Temporal(right)) => left.cmp(right),
            // Mixed kinds are rejected before sorting.
            _ => Ordering::Equal,
        }
    }
}

/// New rows whose key is absent from the old table.
#[derive(Debug, Clone)]
pub struct KeyMatch<'a> {
    /// Added rows in the new table's original order.
    pub added: Vec<&'a Row>,
    /// New rows whose key exists in the old table.
    pub matched: usize,
    /// Distinct keys in the old table.
    pub old_key_count: usize,
}

/// Matches new rows against the set of old keys.
pub fn match_keys<'a>(old: &Table, new: &'a Table, key: &str) -> KeyMatch<'a> {
    let old_keys: BTreeSet<String> = old
        .rows()
        .iter()
        .map(|row| key_string(row.get(key)))
        .collect();
    let mut added = Vec::new();
    let mut matched = 0usize;
    for row in new.rows() {
        if old_keys.contains(&key_string(row.get(key))) {
            matched += 1;
        } else {
            added.push(row);
        }
    }
    KeyMatch {
        added,
        matched,
        old_key_count: old_keys.len(),
    }
}
