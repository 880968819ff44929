//! Comma-separated output, UTF-8 with byte-order mark.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use sheetdiff_model::{SheetDiff, Table};

use crate::common::{UTF8_BOM, ensure_output_dir, ensure_parent_dir, result_file_name};
use crate::error::{OutputError, Result};

/// Writes `table` as CSV: BOM, header row, cells in canonical string form.
pub fn write_csv<W: Write>(table: &Table, mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    let headers = table.column_names();
    csv_writer.write_record(&headers)?;
    for row in table.rows() {
        csv_writer.write_record(
            headers
                .iter()
                .map(|column| row.get(column).to_canonical_string()),
        )?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `table` to `path`, creating parent directories.
pub fn write_csv_file(path: &Path, table: &Table) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(table, BufWriter::new(file)).map_err(|err| OutputError::at(path, err))
}

/// Writes one sheet's result rows in header order.
pub fn write_diff_csv(path: &Path, diff: &SheetDiff) -> Result<()> {
    let table = diff.to_table().map_err(|source| OutputError::ResultTable {
        sheet: diff.sheet.clone(),
        source,
    })?;
    write_csv_file(path, &table)
}

/// A result file produced for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub sheet: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes `result_{sheet}.csv` for every sheet with at least one result row.
///
/// Sheets without differences are logged and skipped. When two sheet names
/// sanitize to the same file name, later sheets get `_2`, `_3`, ... before
/// the extension.
pub fn write_sheet_results<'a, I>(dir: &Path, diffs: I) -> Result<Vec<WrittenFile>>
where
    I: IntoIterator<Item = &'a SheetDiff>,
{
    let dir = ensure_output_dir(dir)?;
    let mut written = Vec::new();
    let mut used = BTreeSet::new();
    for diff in diffs {
        if diff.is_empty() {
            tracing::info!(sheet = %diff.sheet, "No differences, nothing written");
            continue;
        }
        let file_name = unique_file_name(&mut used, result_file_name(&diff.sheet));
        let path = dir.join(file_name);
        write_diff_csv(&path, diff)?;
        tracing::info!(
            sheet = %diff.sheet,
            path = %path.display(),
            rows = diff.row_count(),
            "Wrote result file"
        );
        written.push(WrittenFile {
            sheet: diff.sheet.clone(),
            path,
            rows: diff.row_count(),
        });
    }
    Ok(written)
}

/// Claims `name` in `used`, suffixing the stem with a counter on a clash.
fn unique_file_name(used: &mut BTreeSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, extension) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));
    let mut counter = 2;
    loop {
        let candidate = if extension.is_empty() {
            format!("{stem}_{counter}")
        } else {
            format!("{stem}_{counter}.{extension}")
        };
        if used.insert(candidate.clone()) {
            tracing::warn!(
                file = %name,
                renamed = %candidate,
                "Result file name already taken by another sheet"
            );
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdiff_model::CellValue;

    #[test]
    fn writes_bom_and_quotes() {
        let table = Table::from_rows(
            vec!["id".into(), "note".into()],
            vec![
                vec![CellValue::Number(1.0), CellValue::text("plain")],
                vec![CellValue::Number(2.5), CellValue::text("a, \"b\"")],
            ],
        )
        .unwrap();
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        insta::assert_snapshot!(text, @r#"
        id,note
        1,plain
        2.5,"a, ""b"""
        "#);
    }

    #[test]
    fn clashing_file_names_get_a_counter() {
        let mut used = BTreeSet::new();
        assert_eq!(
            unique_file_name(&mut used, "result_a_b.csv".into()),
            "result_a_b.csv"
        );
        assert_eq!(
            unique_file_name(&mut used, "result_a_b.csv".into()),
            "result_a_b_2.csv"
        );
        assert_eq!(
            unique_file_name(&mut used, "result_a_b.csv".into()),
            "result_a_b_3.csv"
        );
        assert_eq!(unique_file_name(&mut used, "summary".into()), "summary");
        assert_eq!(unique_file_name(&mut used, "summary".into()), "summary_2");
    }

    #[test]
    fn missing_cells_are_blank() {
        let mut table = Table::from_rows(vec!["a".into(), "b".into()], Vec::new()).unwrap();
        table
            .push_row(sheetdiff_model::Row::new().with("a", "x"))
            .unwrap();
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        assert_eq!(&buffer[UTF8_BOM.len()..], b"a,b\nx,\n");
    }
}
