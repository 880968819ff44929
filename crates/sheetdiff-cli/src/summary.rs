//! Console rendering of run results.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sheetdiff_model::{DiagnosticLevel, VerdictCounts};
use sheetdiff_output::{RunSummary, SheetSummary};

const HEADERS: [&str; 8] = [
    "Sheet", "Mode", "Old rows", "New rows", "Added", "Changed", "Filtered", "Output",
];

/// Prints the per-sheet table, then warnings and failures.
pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!("{}", summary_table(summary, dry_run));
    print_diagnostics(summary);
    if summary.cancelled {
        eprintln!("Run cancelled before every sheet was compared.");
    }
}

pub fn summary_table(summary: &RunSummary, dry_run: bool) -> Table {
    let mut table = Table::new();
    table.set_header(HEADERS.into_iter().map(header_cell));
    apply_summary_table_style(&mut table);
    for index in 2..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for sheet in &summary.sheets {
        table.add_row(vec![
            Cell::new(&sheet.sheet)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(sheet.mode),
            Cell::new(sheet.old_rows),
            Cell::new(sheet.new_rows),
            count_cell(sheet.counts.added, Color::Green),
            count_cell(sheet.counts.changed, Color::Yellow),
            count_cell(sheet.counts.filtered_out, Color::DarkGrey),
            output_cell(sheet, dry_run),
        ]);
    }
    for failure in &summary.failures {
        table.add_row(vec![
            Cell::new(&failure.sheet)
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            Cell::new("failed").fg(Color::Red),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    if summary.sheets.len() + summary.failures.len() > 1 {
        table.add_row(total_row(&summary.totals));
    }
    table
}

/// Plain-text rows of the summary table, one line per sheet.
pub fn summary_lines(summary: &RunSummary, dry_run: bool) -> Vec<String> {
    let mut lines = vec![HEADERS.join(" | ")];
    for sheet in &summary.sheets {
        lines.push(
            [
                sheet.sheet.clone(),
                sheet.mode.to_string(),
                sheet.old_rows.to_string(),
                sheet.new_rows.to_string(),
                sheet.counts.added.to_string(),
                sheet.counts.changed.to_string(),
                sheet.counts.filtered_out.to_string(),
                output_label(sheet, dry_run),
            ]
            .join(" | "),
        );
    }
    for failure in &summary.failures {
        lines.push(format!("{} | failed: {}", failure.sheet, failure.error));
    }
    lines
}

fn print_diagnostics(summary: &RunSummary) {
    let warnings: Vec<String> = summary
        .diagnostics
        .iter()
        .chain(summary.sheets.iter().flat_map(|sheet| sheet.diagnostics.iter()))
        .filter(|diagnostic| diagnostic.level == DiagnosticLevel::Warning)
        .map(ToString::to_string)
        .collect();
    if !warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &warnings {
            eprintln!("- {warning}");
        }
    }
    if !summary.failures.is_empty() {
        eprintln!("Errors:");
        for failure in &summary.failures {
            eprintln!("- {}: {}", failure.sheet, failure.error);
        }
    }
}

fn output_label(sheet: &SheetSummary, dry_run: bool) -> String {
    match &sheet.output {
        Some(path) => file_label(path),
        None if sheet.result_rows == 0 => "no differences".to_string(),
        None if dry_run => "dry run".to_string(),
        None => "-".to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn output_cell(sheet: &SheetSummary, dry_run: bool) -> Cell {
    let label = output_label(sheet, dry_run);
    if sheet.output.is_some() {
        Cell::new(label).fg(Color::Green)
    } else {
        dim_cell(label)
    }
}

fn total_row(totals: &VerdictCounts) -> Vec<Cell> {
    vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(totals.added).add_attribute(Attribute::Bold),
        Cell::new(totals.changed).add_attribute(Attribute::Bold),
        Cell::new(totals.filtered_out).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

/// Condensed style for listings such as `sheets` and `values`.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
