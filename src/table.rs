//! In-memory tables.
//!
//! A [`Table`] is an immutable value: ordered, uniquely named columns of
//! equal length. Every operation returns a new table; column storage is
//! shared through [`Arc`] so selecting, dropping, or renaming columns never
//! copies cell data.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Cell storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    /// Numeric column without missing cells.
    pub fn numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Numeric(values.into_iter().map(Some).collect())
    }

    /// Text column without missing cells.
    pub fn text<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Column::Text(values.into_iter().map(|s| Some(s.into())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn get(&self, row: usize) -> Value {
        match self {
            Column::Numeric(v) => match v.get(row) {
                Some(Some(n)) => Value::Number(*n),
                _ => Value::Missing,
            },
            Column::Text(v) => match v.get(row) {
                Some(Some(s)) => Value::Text(s.clone()),
                _ => Value::Missing,
            },
        }
    }

    /// Numeric cells, or `None` for a text column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Arc<Column>>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, TableError> {
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(columns.len());
        let mut cells = Vec::with_capacity(columns.len());

        for (name, column) in columns {
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn(name));
            }
            if column.len() != rows {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected: rows,
                    found: column.len(),
                });
            }
            names.push(name);
            cells.push(Arc::new(column));
        }

        Ok(Table {
            names,
            columns: cells,
            rows,
        })
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| self.columns[i].as_ref())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// `[rows, columns]`
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.names.len()]
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.columns)
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Existing columns among `names`, in the requested order. Unknown names
    /// are skipped; a repeated name is kept once.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let mut seen = HashSet::new();
        let mut out_names = vec![];
        let mut out_columns = vec![];

        for name in names {
            let name = name.as_ref();
            if let Some(i) = self.index_of(name) {
                if seen.insert(i) {
                    out_names.push(self.names[i].clone());
                    out_columns.push(Arc::clone(&self.columns[i]));
                }
            }
        }

        Table {
            names: out_names,
            columns: out_columns,
            rows: self.rows,
        }
    }

    /// Every column except those in `names`.
    pub fn without(&self, names: &BTreeSet<String>) -> Table {
        let (names, columns) = self
            .names
            .iter()
            .zip(&self.columns)
            .filter(|(n, _)| !names.contains(*n))
            .map(|(n, c)| (n.clone(), Arc::clone(c)))
            .unzip();

        Table {
            names,
            columns,
            rows: self.rows,
        }
    }

    /// Renames `old` to `new`. Returns `None` when `old` does not exist or
    /// `new` is already taken by another column.
    pub fn renamed(&self, old: &str, new: &str) -> Option<Table> {
        let i = self.index_of(old)?;
        if self.index_of(new).is_some_and(|j| j != i) {
            return None;
        }
        let mut table = self.clone();
        table.names[i] = new.to_string();
        Some(table)
    }

    /// Rows at the given indices, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| Arc::new(c.take(rows))).collect(),
            rows: rows.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        if n >= self.rows {
            return self.clone();
        }
        let rows: Vec<usize> = (0..n).collect();
        self.take_rows(&rows)
    }

    pub fn cell(&self, row: usize, column: &str) -> Value {
        self.column(column).map_or(Value::Missing, |c| c.get(row))
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..self.rows)
            .map(|row| {
                self.names
                    .iter()
                    .zip(&self.columns)
                    .map(|(name, column)| (name.clone(), column.get(row).to_json()))
                    .collect()
            })
            .collect()
    }
}
