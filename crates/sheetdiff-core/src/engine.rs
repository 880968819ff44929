//! Per-sheet and whole-workbook diff orchestration.
//!
//! A sheet runs align → classify → collect → (optional) value filter → output
//! column drop. Sheets are processed one after another; a failure in one
//! sheet is recorded on its [`SheetOutcome`], reported as a fatal run
//! diagnostic, and the run moves on. Only
//! structural problems found before the first sheet starts abort the run.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, info_span, warn};

use sheetdiff_model::{
    AlignmentMode, ComparisonConfig, ComparisonPlan, DateMode, Diagnostic, NEW_SUFFIX,
    OLD_SUFFIX, ResultRow, STATUS_COLUMN, SheetDiff, SheetPair, Table, Verdict, VerdictCounts,
    Workbook, new_side_column, old_side_column,
};

use crate::align::{SortAlignment, align_sorted, match_keys};
use crate::classify::{ClassifyContext, classify};
use crate::columns::{comparable_columns, date_like_columns, union_columns};
use crate::error::{DiffError, SheetError, Side};
use crate::filter::apply_value_filter;

/// Number of duplicated key values quoted in messages.
const DUPLICATE_EXAMPLES: usize = 3;

/// Shared flag polled between sheets.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives a notification around every sheet of a run.
pub trait ProgressObserver {
    fn sheet_started(&self, _index: usize, _total: usize, _sheet: &str) {}

    fn sheet_finished(&self, index: usize, total: usize, outcome: &SheetOutcome);
}

#[derive(Default)]
pub struct RunOptions<'a> {
    pub observer: Option<&'a dyn ProgressObserver>,
    pub cancel: Option<CancelFlag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetOutcome {
    pub sheet: String,
    pub result: Result<SheetDiff, SheetError>,
}

impl SheetOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Results of a whole run, in comparison order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookDiff {
    pub sheets: Vec<SheetOutcome>,
    /// Run-level messages; per-sheet messages live on each [`SheetDiff`].
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the run stopped early; `sheets` holds what completed.
    pub cancelled: bool,
}

impl WorkbookDiff {
    pub fn diffs(&self) -> impl Iterator<Item = &SheetDiff> {
        self.sheets.iter().filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SheetError)> {
        self.sheets.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.sheet.as_str(), err)),
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn total_counts(&self) -> VerdictCounts {
        self.diffs().fold(VerdictCounts::default(), |mut total, diff| {
            total.added += diff.counts.added;
            total.changed += diff.counts.changed;
            total.unchanged += diff.counts.unchanged;
            total.removed += diff.counts.removed;
            total.filtered_out += diff.counts.filtered_out;
            total
        })
    }
}

/// Compares every selected sheet present in both workbooks.
pub fn compare_workbooks(
    old: &Workbook,
    new: &Workbook,
    plan: &ComparisonPlan,
) -> Result<WorkbookDiff, DiffError> {
    compare_workbooks_with(old, new, plan, &RunOptions::default())
}

/// [`compare_workbooks`] with progress reporting and cancellation.
pub fn compare_workbooks_with(
    old: &Workbook,
    new: &Workbook,
    plan: &ComparisonPlan,
    options: &RunOptions<'_>,
) -> Result<WorkbookDiff, DiffError> {
    let selected = select_sheets(old, new, plan)?;
    for sheet in &selected {
        let config = plan.config_for(sheet);
        if config.mode == AlignmentMode::KeyMatched {
            let (Some(old_table), Some(new_table)) = (old.sheet(sheet), new.sheet(sheet)) else {
                return Err(DiffError::SheetNotCommon {
                    sheet: sheet.clone(),
                });
            };
            check_identifier(sheet, config, old_table, new_table)?;
        }
    }

    let total = selected.len();
    let mut diagnostics = vec![Diagnostic::info(
        None,
        format!("comparing {total} sheet(s)"),
    )];
    info!(sheets = total, "Starting comparison");

    let mut sheets = Vec::with_capacity(total);
    let mut cancelled = false;
    for (index, sheet) in selected.iter().enumerate() {
        if options.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            cancelled = true;
            let message = format!("run cancelled after {index} of {total} sheet(s)");
            warn!(completed = index, total, "Comparison cancelled");
            diagnostics.push(Diagnostic::warning(None, message));
            break;
        }
        if let Some(observer) = options.observer {
            observer.sheet_started(index, total, sheet);
        }
        let outcome = match (old.sheet(sheet), new.sheet(sheet)) {
            (Some(old_table), Some(new_table)) => SheetOutcome {
                sheet: sheet.clone(),
                result: diff_sheet(
                    SheetPair::new(sheet, old_table, new_table),
                    plan.config_for(sheet),
                ),
            },
            _ => {
                return Err(DiffError::SheetNotCommon {
                    sheet: sheet.clone(),
                });
            }
        };
        if let Err(err) = &outcome.result {
            warn!(sheet = %sheet, error = %err, "Sheet comparison failed");
            diagnostics.push(Diagnostic::fatal(Some(sheet), err.to_string()));
        }
        if let Some(observer) = options.observer {
            observer.sheet_finished(index, total, &outcome);
        }
        sheets.push(outcome);
    }

    Ok(WorkbookDiff {
        sheets,
        diagnostics,
        cancelled,
    })
}

fn select_sheets(
    old: &Workbook,
    new: &Workbook,
    plan: &ComparisonPlan,
) -> Result<Vec<String>, DiffError> {
    let common = old.common_sheet_names(new);
    if common.is_empty() {
        return Err(DiffError::NoCommonSheets);
    }
    match &plan.selection {
        None => Ok(common),
        Some(selection) if selection.is_empty() => Err(DiffError::EmptySelection),
        Some(selection) => {
            let mut seen = BTreeSet::new();
            let mut selected = Vec::with_capacity(selection.len());
            for sheet in selection {
                if !common.contains(sheet) {
                    return Err(DiffError::SheetNotCommon {
                        sheet: sheet.clone(),
                    });
                }
                if seen.insert(sheet.as_str()) {
                    selected.push(sheet.clone());
                }
            }
            Ok(selected)
        }
    }
}

/// The identifier column must be configured and present on both sides.
fn check_identifier(
    sheet: &str,
    config: &ComparisonConfig,
    old: &Table,
    new: &Table,
) -> Result<String, SheetError> {
    let Some(key) = config.key_column.as_deref() else {
        return Err(SheetError::KeyColumnNotConfigured {
            sheet: sheet.to_string(),
        });
    };
    for (side, table) in [(Side::Old, old), (Side::New, new)] {
        if !table.has_column(key) {
            return Err(SheetError::MissingKeyColumn {
                sheet: sheet.to_string(),
                column: key.to_string(),
                side,
            });
        }
    }
    Ok(key.to_string())
}

/// Compares one old/new table pair under `config`.
pub fn diff_sheet(pair: SheetPair<'_>, config: &ComparisonConfig) -> Result<SheetDiff, SheetError> {
    let span = info_span!("sheet", sheet = %pair.name, mode = %config.mode);
    let _guard = span.enter();
    let mut log = SheetLog::new(pair.name);
    log.info(format!(
        "old table has {} row(s), new table has {} row(s)",
        pair.old.row_count(),
        pair.new.row_count()
    ));

    let (columns, rows, counts) = match config.mode {
        AlignmentMode::SortAligned => sort_aligned(pair, config, &mut log)?,
        AlignmentMode::KeyMatched => key_matched(pair, config, &mut log)?,
    };
    let (columns, rows) = drop_output_columns(columns, rows, &config.output_excluded_columns);
    log.info(format!("{} row(s) reported", rows.len()));
    info!(
        added = counts.added,
        changed = counts.changed,
        unchanged = counts.unchanged,
        removed = counts.removed,
        "Sheet compared"
    );

    Ok(SheetDiff {
        sheet: pair.name.to_string(),
        mode: config.mode,
        columns,
        rows,
        counts,
        old_row_count: pair.old.row_count(),
        new_row_count: pair.new.row_count(),
        diagnostics: log.into_diagnostics(),
    })
}

type Assembled = (Vec<String>, Vec<ResultRow>, VerdictCounts);

fn sort_aligned(
    pair: SheetPair<'_>,
    config: &ComparisonConfig,
    log: &mut SheetLog,
) -> Result<Assembled, SheetError> {
    let Some(key) = config.key_column.as_deref() else {
        return Err(SheetError::KeyColumnNotConfigured {
            sheet: pair.name.to_string(),
        });
    };
    if let Some(filter) = &config.value_filter {
        log.warning(format!(
            "value filter on '{}' only applies to key-matched comparison; ignored",
            filter.column
        ));
    }

    let alignment = align_sorted(pair.old, pair.new, key);
    report_alignment(pair.name, key, &alignment, config.require_unique_key, log)?;

    let union = union_columns(pair.old, pair.new);
    let comparable = comparable_columns(&pair.old.column_names(), &config.excluded_columns);
    let date_columns = date_columns(pair, config);
    let ctx = ClassifyContext {
        union_columns: &union,
        comparable: &comparable,
        date_columns: &date_columns,
        date_mode: config.date_mode,
    };

    let mut counts = VerdictCounts::default();
    let mut rows = Vec::new();
    let mut fallbacks = BTreeSet::new();
    for aligned in alignment.pairs {
        let classification = classify(aligned, &ctx);
        counts.record(classification.verdict);
        fallbacks.extend(classification.date_fallbacks);
        if classification.verdict.is_reported()
            && let Some(row) = classification.row
        {
            rows.push(row);
        }
    }
    if !fallbacks.is_empty() {
        debug!(columns = ?fallbacks, "Date comparison fell back to text");
    }

    let mut columns = Vec::with_capacity(union.len() * 2 + 1);
    columns.push(STATUS_COLUMN.to_string());
    for column in &union {
        columns.push(old_side_column(column));
        columns.push(new_side_column(column));
    }
    Ok((columns, rows, counts))
}

fn report_alignment(
    sheet: &str,
    key: &str,
    alignment: &SortAlignment<'_>,
    require_unique_key: bool,
    log: &mut SheetLog,
) -> Result<(), SheetError> {
    if let Some(failure) = &alignment.sort_failure {
        log.warning(format!(
            "could not sort by '{key}' ({failure}); rows compared in original order"
        ));
    }
    for (side, duplicates) in &alignment.duplicate_keys {
        let examples = duplicates
            .iter()
            .take(DUPLICATE_EXAMPLES)
            .map(|value| format!("'{value}'"))
            .collect::<Vec<_>>()
            .join(", ");
        if require_unique_key {
            return Err(SheetError::DuplicateKeys {
                sheet: sheet.to_string(),
                column: key.to_string(),
                side: *side,
                count: duplicates.len(),
                examples,
            });
        }
        log.warning(format!(
            "{} duplicated value(s) in key column '{key}' of the {side} table (e.g. {examples}); rows may be misaligned",
            duplicates.len()
        ));
    }
    Ok(())
}

fn date_columns(pair: SheetPair<'_>, config: &ComparisonConfig) -> BTreeSet<String> {
    let enabled = config.date_mode == DateMode::DateOnly;
    let mut columns = date_like_columns(pair.old, enabled);
    columns.extend(date_like_columns(pair.new, enabled));
    if enabled {
        columns.extend(config.date_columns.iter().cloned());
    }
    columns
}

fn key_matched(
    pair: SheetPair<'_>,
    config: &ComparisonConfig,
    log: &mut SheetLog,
) -> Result<Assembled, SheetError> {
    let key = check_identifier(pair.name, config, pair.old, pair.new)?;
    let matched = match_keys(pair.old, pair.new, &key);
    log.info(format!(
        "{} new row(s) whose '{key}' is absent from old sheet '{}'",
        matched.added.len(),
        pair.old_name
    ));

    let mut counts = VerdictCounts {
        added: matched.added.len(),
        ..VerdictCounts::default()
    };
    let mut added = matched.added;
    if let Some(filter) = &config.value_filter {
        if !pair.new.has_column(&filter.column) {
            return Err(SheetError::FilterColumnMissing {
                sheet: pair.name.to_string(),
                column: filter.column.clone(),
            });
        }
        if filter.accepted.is_empty() {
            log.warning(format!(
                "no values selected for filter column '{}'; result is empty",
                filter.column
            ));
        }
        let total = added.len();
        let (kept, dropped) = apply_value_filter(added, filter);
        counts.filtered_out = dropped;
        log.info(format!(
            "{} of {total} added row(s) kept by filter on '{}'",
            kept.len(),
            filter.column
        ));
        added = kept;
    }

    let columns = pair.new.column_names();
    let rows = added
        .into_iter()
        .map(|row| ResultRow {
            verdict: Verdict::Added,
            cells: columns
                .iter()
                .map(|column| (column.clone(), row.get(column).clone()))
                .collect(),
        })
        .collect();
    Ok((columns, rows, counts))
}

/// Removes excluded columns, matched by full header or by base column name.
fn drop_output_columns(
    columns: Vec<String>,
    mut rows: Vec<ResultRow>,
    excluded: &BTreeSet<String>,
) -> (Vec<String>, Vec<ResultRow>) {
    if excluded.is_empty() {
        return (columns, rows);
    }
    let (dropped, kept): (Vec<String>, Vec<String>) = columns.into_iter().partition(|header| {
        let base = header
            .strip_suffix(OLD_SUFFIX)
            .or_else(|| header.strip_suffix(NEW_SUFFIX))
            .unwrap_or(header);
        excluded.contains(header) || excluded.contains(base)
    });
    for row in &mut rows {
        for header in &dropped {
            row.cells.remove(header);
        }
    }
    (kept, rows)
}

/// Collects one sheet's diagnostics and mirrors them to the log.
struct SheetLog {
    sheet: String,
    diagnostics: Vec<Diagnostic>,
}

impl SheetLog {
    fn new(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            diagnostics: Vec::new(),
        }
    }

    fn info(&mut self, message: String) {
        info!("{message}");
        self.diagnostics
            .push(Diagnostic::info(Some(&self.sheet), message));
    }

    fn warning(&mut self, message: String) {
        warn!("{message}");
        self.diagnostics
            .push(Diagnostic::warning(Some(&self.sheet), message));
    }

    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
