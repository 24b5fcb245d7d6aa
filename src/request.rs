//! Request shape accepted from a transport layer, and the per-run options
//! derived from it.

use serde::{Deserialize, Serialize};

/// Rows shown by `PROC PRINT` when neither the request nor `OBS` says otherwise.
pub const DEFAULT_LIMIT: usize = 50;

/// Rows shown in the preview of a DATA step result.
pub const DATA_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

/// Options that apply to every step of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub output_format: OutputFormat,
    /// Default row limit for `PROC PRINT`
    pub limit: usize,
    /// Draw a chart for every `PROC REG`, as if `PLOTS` were given
    pub plot: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            output_format: OutputFormat::Json,
            limit: DEFAULT_LIMIT,
            plot: false,
        }
    }
}

impl RunOptions {
    pub fn html() -> Self {
        RunOptions {
            output_format: OutputFormat::Html,
            ..Self::default()
        }
    }

    pub fn is_html(&self) -> bool {
        self.output_format == OutputFormat::Html
    }
}

/// A script together with its output preferences.
///
/// # Examples
///
/// ```
/// use datastep_lang::{OutputFormat, Request};
///
/// let request: Request = serde_json::from_str(r#"{"code": "PROC MEANS; RUN;"}"#).unwrap();
/// assert_eq!(request.output_format, OutputFormat::Json);
/// assert_eq!(request.limit, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub code: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub plot: bool,
    /// Dataset to fall back on when a PROC step runs before any DATA step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Request {
    pub fn new(code: impl Into<String>) -> Self {
        Request {
            code: code.into(),
            output_format: OutputFormat::default(),
            limit: DEFAULT_LIMIT,
            plot: false,
            source: None,
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            output_format: self.output_format,
            limit: self.limit,
            plot: self.plot,
        }
    }
}
