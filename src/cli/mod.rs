//! CLI support for datastep-lang
//!
//! Provides programmatic access to the `datastep` subcommands so other
//! tools can embed them without spawning the binary.

mod check;
mod docs;
mod run;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use run::{RunCommand, execute_request, execute_run};

use std::io;

use thiserror::Error;

use crate::FatalError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Fatal(#[from] FatalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No script provided. Pass a file or pipe the script to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'datastep docs' to see available categories.")]
    UnknownCategory(String),
}

impl From<crate::SyntaxError> for CliError {
    fn from(e: crate::SyntaxError) -> Self {
        CliError::Fatal(e.into())
    }
}

impl From<crate::PlanError> for CliError {
    fn from(e: crate::PlanError) -> Self {
        CliError::Fatal(e.into())
    }
}
