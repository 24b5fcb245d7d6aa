//! Dataset sources.
//!
//! [`DatasetLoader`] resolves a [`SourceRef`] to a [`Table`]. [`FileLoader`]
//! reads CSV files and, with the `excel` feature, spreadsheets;
//! [`MemoryLoader`] serves tables registered up front.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::plan::SourceRef;
use crate::table::{Column, Table, TableError};

/// Cell text treated as missing in addition to the empty string.
const MISSING_MARKERS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "."];

#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type '{0}'")]
    UnsupportedExtension(String),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("malformed spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("sheet '{0}' not found")]
    MissingSheet(String),

    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("no dataset registered under this name")]
    NotFound,
}

/// A dataset that could not be read.
#[derive(Debug, Error)]
#[error("failed to load '{path}': {cause}")]
pub struct LoadError {
    pub path: String,
    #[source]
    pub cause: LoadCause,
}

impl LoadError {
    pub fn new(path: impl Into<String>, cause: impl Into<LoadCause>) -> Self {
        LoadError {
            path: path.into(),
            cause: cause.into(),
        }
    }
}

pub trait DatasetLoader {
    fn load(&self, source: &SourceRef) -> Result<Table, LoadError>;
}

/// Reads datasets from disk, dispatching on the file extension.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir` instead of the working directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        FileLoader {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl DatasetLoader for FileLoader {
    fn load(&self, source: &SourceRef) -> Result<Table, LoadError> {
        let resolved = self.resolve(&source.path);
        let extension = resolved
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        tracing::debug!(path = %resolved.display(), %extension, "loading dataset");

        let result = match extension.as_str() {
            "csv" => read_csv(&resolved),
            #[cfg(feature = "excel")]
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => {
                read_spreadsheet(&resolved, source.sheet.as_deref())
            }
            other => Err(LoadCause::UnsupportedExtension(format!(".{}", other))),
        };

        result.map_err(|cause| LoadError::new(&source.path, cause))
    }
}

fn read_csv(path: &Path) -> Result<Table, LoadCause> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(table_from_text(headers, rows)?)
}

#[cfg(feature = "excel")]
fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<Table, LoadCause> {
    use calamine::{Data, Reader, open_workbook_auto};

    let mut workbook = open_workbook_auto(path)?;
    let sheet = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(LoadCause::MissingSheet(name.to_string()));
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoadCause::EmptyWorkbook)?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                Data::String(s) => s.clone(),
                Data::Float(f) => f.to_string(),
                Data::Int(i) => i.to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<String>>()
    });

    let headers = rows.next().unwrap_or_default();
    Ok(table_from_text(headers, rows.collect())?)
}

/// Builds a table from header names and text rows, inferring column types.
///
/// Short rows are padded with missing cells; unnamed headers become
/// `column_N`.
pub fn table_from_text(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table, TableError> {
    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(i, header)| {
            let name = if header.is_empty() {
                format!("column_{}", i + 1)
            } else {
                header
            };
            let cells = rows.iter().map(|row| {
                row.get(i)
                    .map(|cell| cell.trim())
                    .filter(|cell| !cell.is_empty() && !MISSING_MARKERS.contains(cell))
            });
            (name, infer_column(cells))
        })
        .collect();

    Table::new(columns)
}

/// A column is numeric when every present cell parses as a number.
fn infer_column<'a>(cells: impl Iterator<Item = Option<&'a str>> + Clone) -> Column {
    let numeric: Option<Vec<Option<f64>>> = cells
        .clone()
        .map(|cell| match cell {
            None => Some(None),
            Some(text) => text.parse::<f64>().ok().map(Some),
        })
        .collect();

    match numeric {
        Some(values) => Column::Numeric(values),
        None => Column::Text(cells.map(|cell| cell.map(str::to_string)).collect()),
    }
}

/// Serves tables registered by name; the path of a [`SourceRef`] is the key.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    tables: HashMap<String, Table>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, path: impl Into<String>, table: Table) -> Self {
        self.tables.insert(path.into(), table);
        self
    }
}

impl DatasetLoader for MemoryLoader {
    fn load(&self, source: &SourceRef) -> Result<Table, LoadError> {
        self.tables
            .get(&source.path)
            .cloned()
            .ok_or_else(|| LoadError::new(&source.path, LoadCause::NotFound))
    }
}
