//! Row classification for sort-aligned comparison.

use std::collections::{BTreeMap, BTreeSet};

use sheetdiff_model::{
    CellValue, DateMode, ResultRow, Row, STATUS_COLUMN, Verdict, new_side_column,
    old_side_column,
};

use crate::align::RowPair;
use crate::normalize::{ComparisonPath, compare_values};

/// Column sets shared by every row of one sheet.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    /// Every column of either table, in result order.
    pub union_columns: &'a [String],
    /// Columns that decide the verdict.
    pub comparable: &'a [String],
    pub date_columns: &'a BTreeSet<String>,
    pub date_mode: DateMode,
}

impl ClassifyContext<'_> {
    fn compares_as_date(&self, column: &str) -> bool {
        self.date_mode == DateMode::DateOnly && self.date_columns.contains(column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// `None` for removed rows, which are never emitted.
    pub row: Option<ResultRow>,
    /// Comparable columns whose values differ.
    pub changed_columns: Vec<String>,
    /// Date-like columns that fell back to string comparison.
    pub date_fallbacks: Vec<String>,
}

/// Classifies one aligned pair and builds its side-by-side result row.
pub fn classify(pair: RowPair<'_>, ctx: &ClassifyContext<'_>) -> Classification {
    match pair {
        RowPair::OldOnly(_) => Classification {
            verdict: Verdict::Removed,
            row: None,
            changed_columns: Vec::new(),
            date_fallbacks: Vec::new(),
        },
        RowPair::NewOnly(new) => Classification {
            verdict: Verdict::Added,
            row: Some(side_by_side(Verdict::Added, None, new, ctx.union_columns)),
            changed_columns: Vec::new(),
            date_fallbacks: Vec::new(),
        },
        RowPair::Both { old, new } => {
            let mut changed_columns = Vec::new();
            let mut date_fallbacks = Vec::new();
            for column in ctx.comparable {
                let (old_value, new_value) = (old.get(column), new.get(column));
                let comparison =
                    compare_values(old_value, new_value, ctx.compares_as_date(column));
                if comparison.path == ComparisonPath::TextFallback
                    && !(old_value.is_empty() && new_value.is_empty())
                {
                    date_fallbacks.push(column.clone());
                }
                if !comparison.equal {
                    changed_columns.push(column.clone());
                }
            }
            let verdict = if changed_columns.is_empty() {
                Verdict::Unchanged
            } else {
                Verdict::Changed
            };
            Classification {
                verdict,
                row: Some(side_by_side(verdict, Some(old), new, ctx.union_columns)),
                changed_columns,
                date_fallbacks,
            }
        }
    }
}

fn side_by_side(verdict: Verdict, old: Option<&Row>, new: &Row, columns: &[String]) -> ResultRow {
    let mut cells = BTreeMap::new();
    cells.insert(STATUS_COLUMN.to_string(), CellValue::text(verdict.as_str()));
    for column in columns {
        let old_value = old.map(|row| row.get(column).clone()).unwrap_or_default();
        cells.insert(old_side_column(column), old_value);
        cells.insert(new_side_column(column), new.get(column).clone());
    }
    ResultRow { verdict, cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        union: Vec<String>,
        comparable: Vec<String>,
        dates: BTreeSet<String>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                union: vec!["id".into(), "name".into(), "updated".into()],
                comparable: vec!["id".into(), "name".into()],
                dates: BTreeSet::new(),
            }
        }

        fn ctx(&self) -> ClassifyContext<'_> {
            ClassifyContext {
                union_columns: &self.union,
                comparable: &self.comparable,
                date_columns: &self.dates,
                date_mode: DateMode::DateOnly,
            }
        }
    }

    #[test]
    fn new_only_rows_are_added_with_empty_old_side() {
        let fixture = Fixture::new();
        let new = Row::new().with("id", 2i64).with("name", "B");
        let result = classify(RowPair::NewOnly(&new), &fixture.ctx());
        assert_eq!(result.verdict, Verdict::Added);
        let row = result.row.unwrap();
        assert_eq!(row.get("Status"), Some(&CellValue::text("Added")));
        assert_eq!(row.get("id_Day1"), Some(&CellValue::Empty));
        assert_eq!(row.get("id_Day2").map(ToString::to_string), Some("2".to_string()));
        assert_eq!(row.get("updated_Day2"), Some(&CellValue::Empty));
    }

    #[test]
    fn old_only_rows_are_removed_and_not_emitted() {
        let fixture = Fixture::new();
        let old = Row::new().with("id", 1i64);
        let result = classify(RowPair::OldOnly(&old), &fixture.ctx());
        assert_eq!(result.verdict, Verdict::Removed);
        assert!(result.row.is_none());
    }

    #[test]
    fn non_comparable_columns_are_recorded_but_ignored() {
        let fixture = Fixture::new();
        let old = Row::new().with("id", 1i64).with("name", "A").with("updated", "x");
        let new = Row::new().with("id", "1").with("name", "A").with("updated", "y");
        let result = classify(RowPair::Both { old: &old, new: &new }, &fixture.ctx());
        assert_eq!(result.verdict, Verdict::Unchanged);
        let row = result.row.unwrap();
        assert_eq!(row.get("updated_Day1"), Some(&CellValue::text("x")));
        assert_eq!(row.get("updated_Day2"), Some(&CellValue::text("y")));
    }

    #[test]
    fn reports_changed_columns() {
        let fixture = Fixture::new();
        let old = Row::new().with("id", 1i64).with("name", "A");
        let new = Row::new().with("id", 1i64).with("name", "B");
        let result = classify(RowPair::Both { old: &old, new: &new }, &fixture.ctx());
        assert_eq!(result.verdict, Verdict::Changed);
        assert_eq!(result.changed_columns, vec!["name".to_string()]);
    }

    #[test]
    fn date_columns_respect_mode_and_record_fallbacks() {
        let mut fixture = Fixture::new();
        fixture.comparable = vec!["updated".into()];
        fixture.dates.insert("updated".into());
        let old = Row::new().with("updated", "2024-01-01 10:00");
        let new = Row::new().with("updated", "2024-01-01 18:00");
        let pair = RowPair::Both { old: &old, new: &new };

        assert_eq!(classify(pair, &fixture.ctx()).verdict, Verdict::Unchanged);

        let mut exact = fixture.ctx();
        exact.date_mode = DateMode::Exact;
        assert_eq!(classify(pair, &exact).verdict, Verdict::Changed);

        let odd = Row::new().with("updated", "pending");
        let result = classify(RowPair::Both { old: &odd, new: &odd }, &fixture.ctx());
        assert_eq!(result.verdict, Verdict::Unchanged);
        assert_eq!(result.date_fallbacks, vec!["updated".to_string()]);
    }
}
