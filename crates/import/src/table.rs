use chrono::NaiveDateTime;
use std::fmt;

use crate::error::ImportError;

/// A single value as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }
}

/// Named columns of equal length, in source order.
///
/// Lookups by name resolve to the first column carrying that name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<Column>,
    rows: usize,
}

impl RawTable {
    pub fn new(columns: Vec<Column>) -> Result<Self, ImportError> {
        let rows = columns.first().map_or(0, |c| c.cells.len());
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != rows) {
            return Err(ImportError::MalformedTable(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.cells.len(),
                rows
            )));
        }
        Ok(RawTable { columns, rows })
    }

    /// A table with `rows` rows and no columns yet.
    pub fn with_rows(rows: usize) -> Self {
        RawTable {
            columns: Vec::new(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Renames every column through `f`; `None` keeps the current name.
    pub fn rename_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        for column in &mut self.columns {
            if let Some(name) = f(&column.name) {
                column.name = name;
            }
        }
    }

    /// Replaces the first column named `name`, or appends a new one.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows, "column '{name}' length mismatch");
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.cells = cells,
            None => self.columns.push(Column::new(name, cells)),
        }
    }

    /// Sets every row of `name` to the same value.
    pub fn fill_column(&mut self, name: &str, value: Cell) {
        let cells = vec![value; self.rows];
        self.set_column(name, cells);
    }

    /// Removes every column named `name`, returning how many were dropped.
    pub fn remove_columns(&mut self, name: &str) -> usize {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        before - self.columns.len()
    }
}
