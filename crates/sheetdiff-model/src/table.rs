//! Tables, rows and workbooks.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::value::CellValue;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Declared or inferred type of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Bool,
    Date,
    DateTime,
    /// More than one non-empty value kind.
    Mixed,
    /// No non-empty values at all.
    #[default]
    Empty,
}

impl ColumnType {
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Infers a column type from its values. Empty cells are ignored.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut current = Self::Empty;
        for value in values {
            let kind = match value {
                CellValue::Empty => continue,
                CellValue::Text(text) if text.is_empty() => continue,
                CellValue::Text(_) => Self::Text,
                CellValue::Number(_) => Self::Number,
                CellValue::Bool(_) => Self::Bool,
                CellValue::Date(_) => Self::Date,
                CellValue::DateTime(_) => Self::DateTime,
            };
            current = match (current, kind) {
                (Self::Empty, kind) => kind,
                (left, right) if left == right => left,
                (Self::Date, Self::DateTime) | (Self::DateTime, Self::Date) => Self::DateTime,
                _ => return Self::Mixed,
            };
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// One record: a mapping from column name to value.
///
/// Cells for columns the row does not carry read as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn has(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value.into());
        self
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A rectangular table: ordered named columns and ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table, validating that column names are unique and non-empty.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for (index, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(TableError::EmptyColumnName { index });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Builds a table from positional rows and infers column types from the values.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let columns = headers
            .into_iter()
            .map(|name| Column::new(name, ColumnType::Empty))
            .collect();
        let mut table = Self::from_columns(columns, rows)?;
        table.infer_column_types();
        Ok(table)
    }

    /// Builds a table from positional rows keeping the declared column types.
    pub fn from_columns(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for (index, values) in rows.into_iter().enumerate() {
            if values.len() != table.columns.len() {
                return Err(TableError::RowWidth {
                    row: index,
                    expected: table.columns.len(),
                    actual: values.len(),
                });
            }
            let cells = table
                .columns
                .iter()
                .map(|column| column.name.clone())
                .zip(values)
                .collect();
            table.rows.push(Row { cells });
        }
        Ok(table)
    }

    /// Appends a row; every cell key must name a column of this table.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if let Some(unknown) = row.cells.keys().find(|key| self.column(key).is_none()) {
            return Err(TableError::UnknownColumn {
                column: unknown.clone(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Re-derives every column type from the current values.
    pub fn infer_column_types(&mut self) {
        for index in 0..self.columns.len() {
            let name = self.columns[index].name.clone();
            let inferred = ColumnType::infer(self.rows.iter().map(|row| row.get(&name)));
            self.columns[index].column_type = inferred;
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the values of one column in row order.
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }
}

/// A named table within a workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// An ordered collection of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, table: Table) -> Result<()> {
        let name = name.into();
        if self.sheet(&name).is_some() {
            return Err(TableError::DuplicateSheet { name });
        }
        self.sheets.push(Sheet { name, table });
        Ok(())
    }

    #[must_use]
    pub fn with_sheet(mut self, name: impl Into<String>, table: Table) -> Self {
        let name = name.into();
        if let Some(existing) = self.sheets.iter_mut().find(|sheet| sheet.name == name) {
            existing.table = table;
        } else {
            self.sheets.push(Sheet { name, table });
        }
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| &sheet.table)
    }

    /// Removes a sheet and returns its table.
    pub fn take_sheet(&mut self, name: &str) -> Option<Table> {
        let index = self.sheets.iter().position(|sheet| sheet.name == name)?;
        Some(self.sheets.remove(index).table)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn first_sheet_name(&self) -> Option<&str> {
        self.sheets.first().map(|sheet| sheet.name.as_str())
    }

    /// Sheet names present in both workbooks, sorted.
    pub fn common_sheet_names(&self, other: &Workbook) -> Vec<String> {
        let ours: BTreeSet<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();
        let theirs: BTreeSet<&str> = other.sheets.iter().map(|s| s.name.as_str()).collect();
        ours.intersection(&theirs)
            .map(|name| (*name).to_string())
            .collect()
    }
}

/// An old/new pair of tables compared as one unit.
///
/// `name` labels the result; `old_name` differs from it only when two
/// differently named sheets are matched against each other.
#[derive(Debug, Clone, Copy)]
pub struct SheetPair<'a> {
    pub name: &'a str,
    pub old_name: &'a str,
    pub old: &'a Table,
    pub new: &'a Table,
}

impl<'a> SheetPair<'a> {
    pub fn new(name: &'a str, old: &'a Table, new: &'a Table) -> Self {
        Self {
            name,
            old_name: name,
            old,
            new,
        }
    }

    pub fn renamed(old_name: &'a str, new_name: &'a str, old: &'a Table, new: &'a Table) -> Self {
        Self {
            name: new_name,
            old_name,
            old,
            new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Table::new(vec![Column::text("id"), Column::text("id")]).unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateColumn {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::from_rows(
            headers(&["a", "b"]),
            vec![vec![CellValue::from(1i64)]],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::RowWidth { row: 0, expected: 2, actual: 1 }));
    }

    #[test]
    fn infers_column_types() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let table = Table::from_rows(
            headers(&["id", "name", "when", "mixed", "blank"]),
            vec![
                vec![1i64.into(), "a".into(), date.into(), 1i64.into(), CellValue::Empty],
                vec![
                    2i64.into(),
                    CellValue::Empty,
                    date.and_hms_opt(1, 0, 0).unwrap().into(),
                    "x".into(),
                    CellValue::Empty,
                ],
            ],
        )
        .unwrap();
        let types: Vec<ColumnType> = table.columns().iter().map(|c| c.column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Number,
                ColumnType::Text,
                ColumnType::DateTime,
                ColumnType::Mixed,
                ColumnType::Empty
            ]
        );
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let mut table = Table::new(vec![Column::text("a"), Column::text("b")]).unwrap();
        table.push_row(Row::new().with("a", "x")).unwrap();
        assert_eq!(table.rows()[0].get("b"), &CellValue::Empty);
        let err = table.push_row(Row::new().with("c", "y")).unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn { .. }));
    }

    #[test]
    fn common_sheets_are_sorted() {
        let table = Table::default();
        let old = Workbook::new()
            .with_sheet("b", table.clone())
            .with_sheet("a", table.clone())
            .with_sheet("only_old", table.clone());
        let new = Workbook::new()
            .with_sheet("a", table.clone())
            .with_sheet("b", table.clone());
        assert_eq!(old.common_sheet_names(&new), vec!["a", "b"]);
    }
}
