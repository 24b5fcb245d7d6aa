//! Execute scripts and JSON requests

use std::path::PathBuf;

use super::CliError;
use crate::{
    FileLoader, Grammar, PngChartRenderer, Request, RunOptions, evaluator::run_script,
    output::Response,
};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunCommand {
    /// Script text
    pub code: String,
    pub options: RunOptions,
    /// Directory that relative `SET` paths resolve against
    pub base_dir: Option<PathBuf>,
    /// Dataset reloaded when a PROC step runs before any DATA step
    pub source: Option<String>,
}

impl RunCommand {
    fn request(&self) -> Request {
        Request {
            code: self.code.clone(),
            output_format: self.options.output_format,
            limit: self.options.limit,
            plot: self.options.plot,
            source: self.source.clone(),
        }
    }
}

fn loader(base_dir: Option<&PathBuf>) -> FileLoader {
    match base_dir {
        Some(dir) => FileLoader::with_base_dir(dir),
        None => FileLoader::new(),
    }
}

/// Run a script read from a file or stdin
pub fn execute_run(grammar: &Grammar, command: &RunCommand) -> Result<Response, CliError> {
    if command.code.trim().is_empty() {
        return Err(CliError::NoInput);
    }
    let loader = loader(command.base_dir.as_ref());
    Ok(run_script(
        grammar,
        &command.request(),
        &loader,
        &PngChartRenderer::default(),
    )?)
}

/// Run a JSON request such as `{"code": "...", "output_format": "html"}`
pub fn execute_request(
    grammar: &Grammar,
    json: &str,
    base_dir: Option<&PathBuf>,
) -> Result<Response, CliError> {
    let request: Request = serde_json::from_str(json)?;
    let loader = loader(base_dir);
    Ok(run_script(
        grammar,
        &request,
        &loader,
        &PngChartRenderer::default(),
    )?)
}
