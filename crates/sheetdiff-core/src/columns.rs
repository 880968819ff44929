//! Column selection: which columns are compared and which are date-like.

use std::collections::BTreeSet;

use sheetdiff_model::{CellValue, ColumnType, Table};

use crate::normalize::parse_date_text;

/// Returns `table_columns` minus `excluded`, preserving order.
pub fn comparable_columns(table_columns: &[String], excluded: &BTreeSet<String>) -> Vec<String> {
    table_columns
        .iter()
        .filter(|column| !excluded.contains(*column))
        .cloned()
        .collect()
}

/// Columns whose declared or inferred type is temporal.
///
/// Returns an empty set when date normalization is disabled. The set is
/// advisory: values are still parsed one by one during comparison.
pub fn date_like_columns(table: &Table, enabled: bool) -> BTreeSet<String> {
    if !enabled {
        return BTreeSet::new();
    }
    table
        .columns()
        .iter()
        .filter(|column| match column.column_type {
            ColumnType::Date | ColumnType::DateTime => true,
            ColumnType::Text | ColumnType::Mixed => text_column_is_date_like(table, &column.name),
            _ => false,
        })
        .map(|column| column.name.clone())
        .collect()
}

/// A text column is date-like when it has values and every one parses as a date.
fn text_column_is_date_like(table: &Table, column: &str) -> bool {
    let mut seen = false;
    for value in table.column_values(column) {
        match value {
            CellValue::Empty => {}
            CellValue::Date(_) | CellValue::DateTime(_) => seen = true,
            CellValue::Text(text) if text.trim().is_empty() => {}
            CellValue::Text(text) => {
                if parse_date_text(text).is_none() {
                    return false;
                }
                seen = true;
            }
            _ => return false,
        }
    }
    seen
}

/// Every column of `old` in order, followed by the columns only `new` has.
pub fn union_columns(old: &Table, new: &Table) -> Vec<String> {
    let mut columns = old.column_names();
    let known: BTreeSet<String> = columns.iter().cloned().collect();
    columns.extend(
        new.columns()
            .iter()
            .filter(|column| !known.contains(&column.name))
            .map(|column| column.name.clone()),
    );
    columns
}
