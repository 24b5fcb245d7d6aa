//! Step results and their serialization.
//!
//! Every step produces one [`StepResult`]. Results serialize as flat JSON
//! objects whose keys depend on the kind of step:
//!
//! - **DATA step / PROC PRINT** - `message`, `columns`, `shape`, and either
//!   `preview` (row objects) or `html`
//! - **PROC MEANS** - `message` and `statistics` or `html`
//! - **PROC FREQ** - `message` and `frequencies` (one-way) or `crosstab`
//!   (two-way), or `html`
//! - **PROC REG** - `message`, `summary` or `html`, and optionally
//!   `chart_png_base64`
//! - **errors** - `message` and `error`
//!
//! A run with exactly one step serializes as that step's result; otherwise
//! as `{"steps": n, "results": [...]}`.
//!
//! # Examples
//!
//! ```
//! use datastep_lang::output::{Response, StepResult};
//!
//! let response = Response::from_results(vec![StepResult::error(
//!     "PROC FREQ failed",
//!     "Only 1 or 2 columns supported in TABLES",
//! )]);
//! let json = serde_json::to_value(&response).unwrap();
//! assert_eq!(json["error"], "Only 1 or 2 columns supported in TABLES");
//! ```

use std::collections::BTreeMap;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::Serialize;

use crate::{
    table::Table,
    value::{MISSING_LABEL, Value},
};

pub type Record = serde_json::Map<String, serde_json::Value>;

/// Outer value -> inner value -> count.
pub type Counts = BTreeMap<String, BTreeMap<String, usize>>;

/// Result of a DATA step or `PROC PRINT`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableOutput {
    pub message: String,
    pub columns: Vec<String>,
    pub shape: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl TableOutput {
    /// `shape` describes the full table; `shown` holds the rows to display.
    pub fn new(message: String, shape: [usize; 2], shown: &Table, html: bool) -> Self {
        let (preview, html) = if html {
            (None, Some(table_html(shown)))
        } else {
            (Some(shown.records()), None)
        };

        TableOutput {
            message,
            columns: shown.column_names().to_vec(),
            shape,
            preview,
            html,
        }
    }
}

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub n: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeansOutput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<BTreeMap<String, ColumnStats>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreqOutput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequencies: Option<Counts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crosstab: Option<Counts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegSummary {
    pub coefficients: BTreeMap<String, f64>,
    pub pvalues: BTreeMap<String, Option<f64>>,
    pub rsquared: Option<f64>,
    pub nobs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegOutput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RegSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_png_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
}

/// A step failure that does not stop the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorOutput {
    pub message: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepResult {
    Data(TableOutput),
    Print(TableOutput),
    Means(MeansOutput),
    Freq(FreqOutput),
    Reg(RegOutput),
    Error(ErrorOutput),
}

impl StepResult {
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        StepResult::Error(ErrorOutput {
            message: message.into(),
            error: error.into(),
        })
    }

    pub fn message(&self) -> &str {
        match self {
            StepResult::Data(o) | StepResult::Print(o) => &o.message,
            StepResult::Means(o) => &o.message,
            StepResult::Freq(o) => &o.message,
            StepResult::Reg(o) => &o.message,
            StepResult::Error(o) => &o.message,
        }
    }

    /// The error text of a soft failure.
    pub fn error_text(&self) -> Option<&str> {
        match self {
            StepResult::Error(o) => Some(&o.error),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StepResult::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Single(StepResult),
    Steps {
        steps: usize,
        results: Vec<StepResult>,
    },
}

impl Response {
    /// One result is returned as is; anything else is wrapped with a count.
    pub fn from_results(mut results: Vec<StepResult>) -> Self {
        if results.len() == 1 {
            if let Some(result) = results.pop() {
                return Response::Single(result);
            }
        }
        Response::Steps {
            steps: results.len(),
            results,
        }
    }

    pub fn results(&self) -> Vec<&StepResult> {
        match self {
            Response::Single(result) => vec![result],
            Response::Steps { results, .. } => results.iter().collect(),
        }
    }
}

// ============================================================================
// HTML rendering
// ============================================================================

/// A plain HTML table with a header row.
#[derive(Debug, Clone, Default)]
pub struct HtmlTable {
    caption: Option<String>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        HtmlTable {
            caption: None,
            header: header.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<table border=\"1\" class=\"dataframe\">\n");
        if let Some(caption) = &self.caption {
            out.push_str(&format!("  <caption>{}</caption>\n", escape_html(caption)));
        }

        out.push_str("  <thead>\n    <tr>");
        for cell in &self.header {
            out.push_str(&format!("<th>{}</th>", escape_html(cell)));
        }
        out.push_str("</tr>\n  </thead>\n  <tbody>\n");

        for row in &self.rows {
            out.push_str("    <tr>");
            for cell in row {
                out.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            out.push_str("</tr>\n");
        }

        out.push_str("  </tbody>\n</table>");
        out
    }
}

/// Rows of a table, numbered from 1 in an `Obs` column.
pub fn table_html(table: &Table) -> String {
    let mut html = HtmlTable::new(
        std::iter::once("Obs".to_string()).chain(table.column_names().iter().cloned()),
    );

    for row in 0..table.n_rows() {
        let mut cells = vec![(row + 1).to_string()];
        cells.extend(
            table
                .column_names()
                .iter()
                .map(|name| display_cell(&table.cell(row, name))),
        );
        html.push_row(cells);
    }

    html.render()
}

fn display_cell(value: &Value) -> String {
    match value {
        Value::Number(n) => format_float(*n),
        other => other.label(),
    }
}

/// Rounds to four decimal places for display; whole numbers print bare.
pub fn format_float(n: f64) -> String {
    match Decimal::from_f64(n) {
        Some(d) => d.round_dp(4).normalize().to_string(),
        None => n.to_string(),
    }
}

pub fn format_optional(n: Option<f64>) -> String {
    n.map_or_else(|| MISSING_LABEL.to_string(), format_float)
}

pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
