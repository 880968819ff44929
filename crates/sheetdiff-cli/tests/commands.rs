//! Command handlers run against CSV fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use sheetdiff_cli::cli::{Cli, Command, CompareArgs, InputArgs, NewRowsArgs, ValuesArgs};
use sheetdiff_cli::commands::{build_plan, list_sheets, new_rows_diff, run_compare, run_new_rows, values};
use sheetdiff_cli::summary::summary_lines;
use sheetdiff_model::{AlignmentMode, DateMode};
use sheetdiff_output::UTF8_BOM;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn compare_args(old: PathBuf, new: PathBuf, output_dir: PathBuf) -> CompareArgs {
    CompareArgs {
        inputs: InputArgs { old, new },
        sheets: Vec::new(),
        key: Some("id".to_string()),
        exclude: Vec::new(),
        exact_dates: false,
        date_columns: Vec::new(),
        drop: Vec::new(),
        require_unique_key: false,
        config: None,
        output_dir: Some(output_dir),
        summary_json: None,
        dry_run: false,
    }
}

fn new_rows_args(old: PathBuf, new: PathBuf, output: PathBuf) -> NewRowsArgs {
    NewRowsArgs {
        inputs: InputArgs { old, new },
        old_sheet: None,
        new_sheet: None,
        key: "id".to_string(),
        filter_column: None,
        filter_values: Vec::new(),
        drop: Vec::new(),
        output,
        dry_run: false,
    }
}

fn directories(dir: &Path) -> (PathBuf, PathBuf) {
    let old = dir.join("old");
    let new = dir.join("new");
    write(&old.join("Orders.csv"), "id,qty,note\n1,5,a\n2,7,b\n");
    write(&new.join("Orders.csv"), "id,qty,note\n3,1,c\n1,5,a\n2,8,b\n");
    write(&old.join("Stock.csv"), "id\n1\n");
    write(&new.join("Stock.csv"), "id\n1\n");
    write(&new.join("Extra.csv"), "id\n1\n");
    (old, new)
}

// =========================================================================
// Argument parsing
// =========================================================================

#[test]
fn parses_compare_flags() {
    let cli = Cli::try_parse_from([
        "sheetdiff", "compare", "a.xlsx", "b.xlsx", "--key", "id", "--exclude", "x", "--exclude",
        "y", "--sheet", "Orders", "--exact-dates", "--dry-run",
    ])
    .unwrap();
    let Command::Compare(args) = cli.command else {
        panic!("expected compare");
    };
    assert_eq!(args.exclude, vec!["x", "y"]);
    assert_eq!(args.sheets, vec!["Orders"]);
    assert!(args.exact_dates);

    let plan = build_plan(&args).unwrap();
    let config = plan.config_for("Orders");
    assert_eq!(config.mode, AlignmentMode::SortAligned);
    assert_eq!(config.date_mode, DateMode::Exact);
    assert_eq!(plan.selection, Some(vec!["Orders".to_string()]));
}

#[test]
fn new_rows_requires_key_and_defaults_output() {
    assert!(Cli::try_parse_from(["sheetdiff", "new-rows", "a.csv", "b.csv"]).is_err());
    let cli = Cli::try_parse_from(["sheetdiff", "new-rows", "a.csv", "b.csv", "--key", "id"]).unwrap();
    let Command::NewRows(args) = cli.command else {
        panic!("expected new-rows");
    };
    assert_eq!(args.output, PathBuf::from("filtered_new_rows.csv"));
}

#[test]
fn filter_values_need_a_filter_column() {
    assert!(
        Cli::try_parse_from([
            "sheetdiff", "new-rows", "a.csv", "b.csv", "--key", "id", "--filter-value", "EU",
        ])
        .is_err()
    );
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn lists_common_sheets() {
    let dir = TempDir::new().unwrap();
    let (old, new) = directories(dir.path());
    let listing = list_sheets(&old, &new).unwrap();
    assert_eq!(listing.new, vec!["Extra", "Orders", "Stock"]);
    assert_eq!(listing.common(), vec!["Orders", "Stock"]);
}

#[test]
fn compare_writes_results_for_changed_sheets() {
    let dir = TempDir::new().unwrap();
    let (old, new) = directories(dir.path());
    let out = dir.path().join("out");
    let mut args = compare_args(old, new, out.clone());
    args.summary_json = Some(out.join("summary.json"));

    let summary = run_compare(&args).unwrap();

    insta::assert_snapshot!(summary_lines(&summary, false).join("\n"), @r"
    Sheet | Mode | Old rows | New rows | Added | Changed | Filtered | Output
    Orders | sort-aligned | 2 | 3 | 1 | 1 | 0 | result_Orders.csv
    Stock | sort-aligned | 1 | 1 | 0 | 0 | 0 | no differences
    ");
    assert!(!summary.has_failures());
    assert!(out.join("summary.json").is_file());
    assert!(!out.join("result_Stock.csv").exists());

    let bytes = fs::read(out.join("result_Orders.csv")).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    insta::assert_snapshot!(text, @r"
    Status,id_Day1,id_Day2,qty_Day1,qty_Day2,note_Day1,note_Day2
    Changed,2,2,7,8,b,b
    Added,,3,,1,,c
    ");
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (old, new) = directories(dir.path());
    let out = dir.path().join("out");
    let mut args = compare_args(old, new, out.clone());
    args.dry_run = true;

    let summary = run_compare(&args).unwrap();
    assert_eq!(summary.totals.added, 1);
    assert!(!out.exists());
    assert!(summary_lines(&summary, true)[1].ends_with("dry run"));
}

#[test]
fn sheet_without_key_fails_alone() {
    let dir = TempDir::new().unwrap();
    let (old, new) = directories(dir.path());
    let config = dir.path().join("plan.toml");
    write(&config, "[sheet.Stock]\nkey = \"missing\"\n");
    let mut args = compare_args(old, new, dir.path().join("out"));
    args.key = None;
    args.config = Some(config);

    let summary = run_compare(&args).unwrap();
    assert_eq!(summary.sheets.len(), 1);
    assert_eq!(summary.sheets[0].sheet, "Stock");
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].sheet, "Orders");
}

#[test]
fn unknown_sheet_selection_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (old, new) = directories(dir.path());
    let mut args = compare_args(old, new, dir.path().join("out"));
    args.sheets = vec!["Extra".to_string()];
    assert!(run_compare(&args).is_err());
}

#[test]
fn new_rows_filters_and_writes_default_layout() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("day1.csv");
    let new = dir.path().join("day2.csv");
    write(&old, "id,region\n1,EU\n");
    write(&new, "id,region\n1,EU\n2,US\n3,EU\n4,APAC\n");
    let output = dir.path().join("filtered_new_rows.csv");
    let mut args = new_rows_args(old, new, output.clone());
    args.filter_column = Some("region".to_string());
    args.filter_values = vec!["EU".to_string(), "US".to_string()];

    let summary = run_new_rows(&args).unwrap();
    assert_eq!(summary.sheets[0].counts.added, 3);
    assert_eq!(summary.sheets[0].counts.filtered_out, 1);
    assert_eq!(summary.sheets[0].output.as_deref(), Some(output.as_path()));

    let bytes = fs::read(&output).unwrap();
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    insta::assert_snapshot!(text, @r"
    id,region
    2,US
    3,EU
    ");
}

#[test]
fn new_rows_with_missing_key_is_an_error() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("day1.csv");
    let new = dir.path().join("day2.csv");
    write(&old, "code\n1\n");
    write(&new, "id\n1\n");
    let args = new_rows_args(old, new, dir.path().join("out.csv"));
    let err = new_rows_diff(&args).unwrap_err();
    assert!(format!("{err:#}").contains("key column 'id' not found"));
}

#[test]
fn values_lists_sorted_candidates() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("day2.csv");
    write(&file, "id,region\n1,US\n2,EU\n3,US\n4,\n");
    let args = ValuesArgs {
        file,
        sheet: "day2".to_string(),
        column: "region".to_string(),
        limit: 1,
    };
    let candidates = values(&args).unwrap();
    assert_eq!(candidates.values, vec!["EU"]);
    assert_eq!(candidates.total, 2);
    assert!(candidates.truncated);
}
