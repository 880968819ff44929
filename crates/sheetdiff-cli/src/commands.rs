use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Color, Table};
use tracing::{info, info_span, warn};

use sheetdiff_core::{FilterCandidates, RunOptions, compare_workbooks_with, diff_sheet, filter_candidates};
use sheetdiff_ingest::{load_sheet, load_workbook, sheet_names};
use sheetdiff_model::{
    ComparisonConfig, ComparisonPlan, DateMode, SheetDiff, SheetPair, ValueFilter,
};
use sheetdiff_output::{RunSummary, write_diff_csv, write_sheet_results, write_summary_json};

use crate::cli::{CompareArgs, NewRowsArgs, SheetsArgs, ValuesArgs};
use crate::config::PlanFile;
use crate::progress::SheetProgress;
use crate::summary::{apply_table_style, dim_cell, header_cell};

/// Sheet names of both inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetListing {
    pub old: Vec<String>,
    pub new: Vec<String>,
}

impl SheetListing {
    /// Sheets present in both inputs, sorted.
    pub fn common(&self) -> Vec<String> {
        let mut common: Vec<String> = self
            .old
            .iter()
            .filter(|name| self.new.contains(name))
            .cloned()
            .collect();
        common.sort();
        common
    }
}

pub fn list_sheets(old: &Path, new: &Path) -> Result<SheetListing> {
    Ok(SheetListing {
        old: sheet_names(old).with_context(|| format!("list sheets of {}", old.display()))?,
        new: sheet_names(new).with_context(|| format!("list sheets of {}", new.display()))?,
    })
}

pub fn run_sheets(args: &SheetsArgs) -> Result<()> {
    let listing = list_sheets(&args.inputs.old, &args.inputs.new)?;
    let mut names = listing.old.clone();
    for name in &listing.new {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Sheet"), header_cell("Old"), header_cell("New")]);
    apply_table_style(&mut table);
    for name in &names {
        table.add_row(vec![
            Cell::new(name),
            presence_cell(listing.old.contains(name)),
            presence_cell(listing.new.contains(name)),
        ]);
    }
    println!("{table}");
    let common = listing.common();
    if common.is_empty() {
        println!("No common sheets.");
    } else {
        println!("Common sheets: {}", common.join(", "));
    }
    Ok(())
}

fn presence_cell(present: bool) -> Cell {
    if present {
        Cell::new("✓").fg(Color::Green)
    } else {
        dim_cell("-")
    }
}

/// Builds the run plan from flags and the optional TOML file.
pub fn build_plan(args: &CompareArgs) -> Result<ComparisonPlan> {
    let defaults = ComparisonConfig {
        key_column: args.key.clone(),
        date_mode: if args.exact_dates {
            DateMode::Exact
        } else {
            DateMode::DateOnly
        },
        require_unique_key: args.require_unique_key,
        ..ComparisonConfig::default()
    }
    .with_excluded(args.exclude.iter().cloned())
    .with_date_columns(args.date_columns.iter().cloned())
    .with_output_excluded(args.drop.iter().cloned());

    if let Some(path) = &args.config {
        let file = PlanFile::load(path)?;
        return Ok(file.into_plan(defaults, &args.sheets));
    }
    let plan = ComparisonPlan::new(defaults);
    if args.sheets.is_empty() {
        Ok(plan)
    } else {
        Ok(plan.with_selection(args.sheets.iter().cloned()))
    }
}

pub fn run_compare(args: &CompareArgs) -> Result<RunSummary> {
    let span = info_span!("compare", old = %args.inputs.old.display(), new = %args.inputs.new.display());
    let _guard = span.enter();

    let plan = build_plan(args)?;
    let old = load_workbook(&args.inputs.old)
        .with_context(|| format!("load {}", args.inputs.old.display()))?;
    let new = load_workbook(&args.inputs.new)
        .with_context(|| format!("load {}", args.inputs.new.display()))?;

    let progress = if io::stderr().is_terminal() {
        SheetProgress::new()
    } else {
        SheetProgress::hidden()
    };
    let options = RunOptions {
        observer: Some(&progress),
        cancel: None,
    };
    let run = compare_workbooks_with(&old, &new, &plan, &options);
    progress.finish();
    let run = run.context("compare workbooks")?;

    if args.dry_run {
        info!("Dry run, no files written");
        return Ok(RunSummary::from_run(&run, &[]));
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let written = write_sheet_results(&output_dir, run.diffs())
        .with_context(|| format!("write results to {}", output_dir.display()))?;
    let summary = RunSummary::from_run(&run, &written);
    if let Some(path) = &args.summary_json {
        write_summary_json(path, &summary)
            .with_context(|| format!("write summary {}", path.display()))?;
    }
    Ok(summary)
}

fn first_sheet(path: &Path) -> Result<String> {
    sheet_names(path)
        .with_context(|| format!("list sheets of {}", path.display()))?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("{} contains no sheets", path.display()))
}

/// Key-matched comparison of one sheet pair, without writing anything.
pub fn new_rows_diff(args: &NewRowsArgs) -> Result<SheetDiff> {
    let old_sheet = match &args.old_sheet {
        Some(name) => name.clone(),
        None => first_sheet(&args.inputs.old)?,
    };
    let new_sheet = match &args.new_sheet {
        Some(name) => name.clone(),
        None => first_sheet(&args.inputs.new)?,
    };
    let old = load_sheet(&args.inputs.old, &old_sheet)
        .with_context(|| format!("load sheet {old_sheet} of {}", args.inputs.old.display()))?;
    let new = load_sheet(&args.inputs.new, &new_sheet)
        .with_context(|| format!("load sheet {new_sheet} of {}", args.inputs.new.display()))?;

    let mut config = ComparisonConfig::key_matched(args.key.clone())
        .with_output_excluded(args.drop.iter().cloned());
    if let Some(column) = &args.filter_column {
        config = config.with_value_filter(ValueFilter::new(
            column.clone(),
            args.filter_values.iter().cloned(),
        ));
    }
    diff_sheet(SheetPair::renamed(&old_sheet, &new_sheet, &old, &new), &config)
        .with_context(|| format!("compare {old_sheet} with {new_sheet}"))
}

pub fn run_new_rows(args: &NewRowsArgs) -> Result<RunSummary> {
    let diff = new_rows_diff(args)?;
    if args.dry_run {
        info!("Dry run, no files written");
        return Ok(RunSummary::from_diff(&diff, None));
    }
    if diff.is_empty() {
        info!(sheet = %diff.sheet, "No new rows, nothing written");
        return Ok(RunSummary::from_diff(&diff, None));
    }
    write_diff_csv(&args.output, &diff)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(path = %args.output.display(), rows = diff.row_count(), "Wrote new rows");
    Ok(RunSummary::from_diff(&diff, Some(&args.output)))
}

pub fn values(args: &ValuesArgs) -> Result<FilterCandidates> {
    let table = load_sheet(&args.file, &args.sheet)
        .with_context(|| format!("load sheet {} of {}", args.sheet, args.file.display()))?;
    let candidates = filter_candidates(&table, &args.sheet, &args.column, args.limit)?;
    if candidates.truncated {
        warn!(
            column = %candidates.column,
            shown = candidates.values.len(),
            total = candidates.total,
            "Value list truncated"
        );
    }
    Ok(candidates)
}

pub fn run_values(args: &ValuesArgs) -> Result<()> {
    let candidates = values(args)?;
    for value in &candidates.values {
        println!("{value}");
    }
    if candidates.truncated {
        eprintln!(
            "showing {} of {} distinct values; raise --limit to see more",
            candidates.values.len(),
            candidates.total
        );
    }
    Ok(())
}
