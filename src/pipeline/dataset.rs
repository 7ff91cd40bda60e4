//! In-memory tabular dataset passed between pipeline steps
//!
//! A `Dataset` is an ordered list of named columns with a uniform row count.
//! Cells are loosely typed: a column may mix numbers and text, the way a raw
//! CSV import usually does, and every operation copes with that.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single value in a column
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a numeric cell, mapping NaN and infinities to null
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Null
        }
    }

    /// Convert a JSON literal (from a step's parameters) into a cell.
    ///
    /// Arrays and objects have no cell representation and become their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::from_f64),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Render the cell as a JSON value for record output
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Number(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Cell::Int(i) => Value::from(*i),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::DateTime(_) => Value::String(self.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Identity key used wherever two cells must be compared for "same value".
    ///
    /// Null gets `None`, so it never collides with an empty string.
    pub fn key(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            // -0.0 renders like 0 so both share one identity key
            Cell::Number(n) => write!(f, "{}", if *n == 0.0 { 0.0 } else { *n }),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }
}

/// Structural problems that make a set of columns unusable as a dataset
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Ordered collection of uniquely named, equally long columns.
///
/// The row count is stored separately so it survives removal of every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    /// Build a dataset, validating unique names and a uniform row count
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let height = columns.first().map_or(0, Column::len);
        if !columns.is_empty() {
            let expected = height;
            for (idx, column) in columns.iter().enumerate() {
                if column.len() != expected {
                    return Err(DatasetError::RaggedColumn {
                        column: column.name.clone(),
                        expected,
                        actual: column.len(),
                    });
                }
                if columns[..idx].iter().any(|c| c.name == column.name) {
                    return Err(DatasetError::DuplicateColumn(column.name.clone()));
                }
            }
        }
        Ok(Self { columns, height })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Cells of row `idx`, in column order
    pub fn row(&self, idx: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[idx]).collect()
    }

    /// Insert a column, replacing any existing column with the same name in place.
    ///
    /// Callers must supply `height()` cells. A dataset without columns adopts
    /// the new column's length.
    pub(crate) fn set_column(&mut self, column: Column) {
        debug_assert!(self.columns.is_empty() || column.len() == self.height);
        if self.columns.is_empty() {
            self.height = column.len();
        }
        match self.position(&column.name) {
            Some(idx) => self.columns[idx] = column,
            None => self.columns.push(column),
        }
    }

    /// Remove and return a column by name
    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.position(name)?;
        Some(self.columns.remove(idx))
    }

    /// Rename `from` to `to` in place. A different column already named `to` is dropped.
    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.has_column(from) {
            return;
        }
        self.remove_column(to);
        if let Some(column) = self.column_mut(from) {
            column.name = to.to_string();
        }
    }

    /// Keep only the rows whose flag is true
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| flags.next().copied().unwrap_or(false));
        }
        self.height = keep.iter().take(self.height).filter(|&&k| k).count();
    }

    /// Copy of the first `n` rows
    pub fn head(&self, n: usize) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.cells.iter().take(n).cloned().collect()))
            .collect();
        Dataset {
            columns,
            height: self.height.min(n),
        }
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        (0..self.height())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.cells[row].to_json()))
                    .collect()
            })
            .collect()
    }
}
