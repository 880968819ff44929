//! CLI argument definitions for sheetdiff.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use sheetdiff_core::DEFAULT_CANDIDATE_LIMIT;
use sheetdiff_output::DEFAULT_NEW_ROWS_FILE;

#[derive(Parser)]
#[command(
    name = "sheetdiff",
    version,
    about = "Compare two versions of a workbook sheet by sheet",
    long_about = "Compare two versions (old and new) of a workbook.\n\n\
                  Inputs may be spreadsheets (.xlsx, .xlsm, .xlsb, .xls, .ods), single CSV files\n\
                  or directories of CSV files. Results are written as CSV files with one\n\
                  row per added or changed record."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the sheets of both inputs and the sheets they share.
    Sheets(SheetsArgs),

    /// Compare every common sheet, pairing rows by sorted key.
    Compare(CompareArgs),

    /// List rows of the new sheet whose key is absent from the old sheet.
    NewRows(NewRowsArgs),

    /// Print the distinct values of a column, as offered to --filter-value.
    Values(ValuesArgs),
}

/// The two inputs every comparison reads.
#[derive(Args)]
pub struct InputArgs {
    /// Old version: spreadsheet, CSV file or directory of CSV files.
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// New version: spreadsheet, CSV file or directory of CSV files.
    #[arg(value_name = "NEW")]
    pub new: PathBuf,
}

#[derive(Args)]
pub struct SheetsArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Sheet to compare (repeatable; default: every common sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheets: Vec<String>,

    /// Column rows are sorted and paired by.
    #[arg(long = "key", value_name = "COL")]
    pub key: Option<String>,

    /// Column ignored when deciding whether a row changed (repeatable).
    #[arg(long = "exclude", value_name = "COL")]
    pub exclude: Vec<String>,

    /// Compare date columns including the time of day.
    #[arg(long = "exact-dates")]
    pub exact_dates: bool,

    /// Treat a column as a date column (repeatable).
    #[arg(long = "date-column", value_name = "COL")]
    pub date_columns: Vec<String>,

    /// Remove a column from the result files (repeatable).
    #[arg(long = "drop", value_name = "COL")]
    pub drop: Vec<String>,

    /// Fail a sheet whose key column holds duplicated values.
    #[arg(long = "require-unique-key")]
    pub require_unique_key: bool,

    /// TOML file with per-sheet settings.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for result files (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write a JSON run summary.
    #[arg(long = "summary-json", value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Compare and report without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct NewRowsArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Sheet of the old input (default: its first sheet).
    #[arg(long = "old-sheet", value_name = "NAME")]
    pub old_sheet: Option<String>,

    /// Sheet of the new input (default: its first sheet).
    #[arg(long = "new-sheet", value_name = "NAME")]
    pub new_sheet: Option<String>,

    /// Identifier column looked up in the old sheet.
    #[arg(long = "key", value_name = "COL")]
    pub key: String,

    /// Keep only new rows whose value in this column is selected.
    #[arg(long = "filter-column", value_name = "COL")]
    pub filter_column: Option<String>,

    /// Accepted value for --filter-column (repeatable).
    #[arg(long = "filter-value", value_name = "VALUE", requires = "filter_column")]
    pub filter_values: Vec<String>,

    /// Remove a column from the result file (repeatable).
    #[arg(long = "drop", value_name = "COL")]
    pub drop: Vec<String>,

    /// Result file.
    #[arg(long = "output", value_name = "FILE", default_value = DEFAULT_NEW_ROWS_FILE)]
    pub output: PathBuf,

    /// Compare and report without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ValuesArgs {
    /// Spreadsheet, CSV file or directory of CSV files.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: String,

    #[arg(long = "column", value_name = "COL")]
    pub column: String,

    /// Maximum number of values printed.
    #[arg(long = "limit", value_name = "N", default_value_t = DEFAULT_CANDIDATE_LIMIT)]
    pub limit: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
