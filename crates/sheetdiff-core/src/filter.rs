//! Value filtering of key-matched results.

use std::collections::BTreeSet;

use sheetdiff_model::{Row, Table, ValueFilter};

use crate::error::SheetError;
use crate::normalize::key_string;

/// Cap on distinct values offered as filter candidates.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 100;

/// Distinct values a filter could accept for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCandidates {
    pub column: String,
    /// Sorted, at most `limit` entries.
    pub values: Vec<String>,
    /// Distinct non-empty values before truncation.
    pub total: usize,
    pub truncated: bool,
}

/// Collects the sorted distinct non-empty string forms of `column`.
pub fn filter_candidates(
    table: &Table,
    sheet: &str,
    column: &str,
    limit: usize,
) -> Result<FilterCandidates, SheetError> {
    if !table.has_column(column) {
        return Err(SheetError::FilterColumnMissing {
            sheet: sheet.to_string(),
            column: column.to_string(),
        });
    }
    let distinct: BTreeSet<String> = table
        .column_values(column)
        .map(key_string)
        .filter(|value| !value.is_empty())
        .collect();
    let total = distinct.len();
    Ok(FilterCandidates {
        column: column.to_string(),
        values: distinct.into_iter().take(limit).collect(),
        total,
        truncated: total > limit,
    })
}

/// Splits `rows` into those the filter accepts and the number it dropped.
///
/// An empty accepted set keeps nothing.
pub fn apply_value_filter<'a>(rows: Vec<&'a Row>, filter: &ValueFilter) -> (Vec<&'a Row>, usize) {
    let before = rows.len();
    let kept: Vec<&Row> = rows
        .into_iter()
        .filter(|row| filter.accepts(&key_string(row.get(&filter.column))))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdiff_model::CellValue;

    fn regions() -> Table {
        Table::from_rows(
            vec!["id".into(), "region".into()],
            vec![
                vec![1i64.into(), "north".into()],
                vec![2i64.into(), "south".into()],
                vec![3i64.into(), CellValue::Empty],
                vec![4i64.into(), "north".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn candidates_are_sorted_distinct_and_non_empty() {
        let candidates = filter_candidates(&regions(), "S", "region", 10).unwrap();
        assert_eq!(candidates.values, vec!["north", "south"]);
        assert_eq!(candidates.total, 2);
        assert!(!candidates.truncated);
    }

    #[test]
    fn candidates_truncate_at_limit() {
        let candidates = filter_candidates(&regions(), "S", "id", 3).unwrap();
        assert_eq!(candidates.values, vec!["1", "2", "3"]);
        assert_eq!(candidates.total, 4);
        assert!(candidates.truncated);
    }

    #[test]
    fn missing_candidate_column_is_a_sheet_error() {
        let err = filter_candidates(&regions(), "S", "nope", 10).unwrap_err();
        assert!(matches!(err, SheetError::FilterColumnMissing { .. }));
    }

    #[test]
    fn filter_keeps_accepted_rows_in_order() {
        let table = regions();
        let rows: Vec<&Row> = table.rows().iter().collect();
        let (kept, dropped) = apply_value_filter(rows.clone(), &ValueFilter::new("region", ["north"]));
        let ids: Vec<String> = kept.iter().map(|row| row.get("id").to_string()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(dropped, 2);

        let (none, dropped) =
            apply_value_filter(rows, &ValueFilter::new("region", Vec::<String>::new()));
        assert!(none.is_empty());
        assert_eq!(dropped, 4);
    }
}
