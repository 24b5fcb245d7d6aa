use std::collections::HashMap;

use thiserror::Error;

use crate::{
    chart::ChartRenderer,
    lexer::SyntaxError,
    loader::{DatasetLoader, LoadError},
    output::{Response, StepResult, TableOutput},
    parser::Grammar,
    plan::{DataStep, PlanBuilder, PlanError, ProcStep, SourceRef, Step},
    procs,
    request::{DATA_PREVIEW_ROWS, Request, RunOptions},
    table::Table,
    transform::apply_clauses,
};

/// Errors that stop a run. Everything else is reported per step.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// A PROC step ran with no dataset to read
    #[error("no dataset available for {step}; run a DATA step first")]
    NoDataset { step: String },

    /// `DATA=` named a dataset no DATA step has created
    #[error("dataset '{0}' is not defined")]
    UnknownDataset(String),
}

/// Datasets visible to the steps of one script run.
///
/// Only DATA steps write to it; PROC steps read from it.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    current: Option<Table>,
    named: HashMap<String, Table>,
    last_source: Option<SourceRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source to reload when a PROC step runs before any DATA step.
    pub fn with_last_source(mut self, source: SourceRef) -> Self {
        self.last_source = Some(source);
        self
    }

    /// The dataset produced by the most recent DATA step
    pub fn current(&self) -> Option<&Table> {
        self.current.as_ref()
    }

    pub fn dataset(&self, name: &str) -> Option<&Table> {
        self.named.get(name)
    }

    pub fn dataset_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn last_source(&self) -> Option<&SourceRef> {
        self.last_source.as_ref()
    }

    fn store(&mut self, name: &str, table: Table) {
        self.named.insert(name.to_string(), table.clone());
        self.current = Some(table);
    }
}

/// Runs planned steps in order against one [`Environment`].
pub struct Interpreter<'a> {
    loader: &'a dyn DatasetLoader,
    renderer: &'a dyn ChartRenderer,
    options: RunOptions,
    env: Environment,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        loader: &'a dyn DatasetLoader,
        renderer: &'a dyn ChartRenderer,
        options: RunOptions,
    ) -> Self {
        Self::with_environment(loader, renderer, options, Environment::new())
    }

    pub fn with_environment(
        loader: &'a dyn DatasetLoader,
        renderer: &'a dyn ChartRenderer,
        options: RunOptions,
        env: Environment,
    ) -> Self {
        Interpreter {
            loader,
            renderer,
            options,
            env,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Executes every step; the first hard error aborts the rest.
    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<StepResult>, FatalError> {
        let mut results = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            tracing::info!(step = index + 1, kind = %step.describe(), "executing step");
            let result = self.execute_step(step)?;
            if let Some(error) = result.error_text() {
                tracing::warn!(step = index + 1, %error, "step failed");
            }
            results.push(result);
        }
        Ok(results)
    }

    pub fn execute_step(&mut self, step: &Step) -> Result<StepResult, FatalError> {
        match step {
            Step::Data(data) => self.execute_data(data),
            Step::Proc(proc) => self.execute_proc(proc),
        }
    }

    fn execute_data(&mut self, step: &DataStep) -> Result<StepResult, FatalError> {
        let input = self.read_source(&step.source)?;
        let output = apply_clauses(&input, &step.clauses);

        tracing::debug!(
            dataset = %step.name,
            rows_in = input.n_rows(),
            rows_out = output.n_rows(),
            cols_out = output.n_cols(),
            "DATA step complete"
        );

        let result = TableOutput::new(
            format!("DATA step '{}' executed", step.name),
            output.shape(),
            &output.head(DATA_PREVIEW_ROWS),
            self.options.is_html(),
        );
        self.env.store(&step.name, output);

        Ok(StepResult::Data(result))
    }

    /// `SET name` reads a dataset created earlier in the run when one has
    /// that name; anything else goes to the loader.
    fn read_source(&mut self, source: &SourceRef) -> Result<Table, FatalError> {
        if source.is_bare_name() {
            if let Some(table) = self.env.named.get(&source.path) {
                tracing::debug!(dataset = %source.path, "SET reads an existing dataset");
                return Ok(table.clone());
            }
        }

        let table = self.loader.load(source)?;
        self.env.last_source = Some(source.clone());
        Ok(table)
    }

    fn execute_proc(&mut self, step: &ProcStep) -> Result<StepResult, FatalError> {
        let input = self.proc_input(step)?;
        Ok(procs::dispatch(step, &input, &self.options, self.renderer))
    }

    /// `DATA=` first, then the current dataset, then a reload of the last
    /// source. A reloaded table is not stored; only DATA steps write to the
    /// environment.
    fn proc_input(&mut self, step: &ProcStep) -> Result<Table, FatalError> {
        if let Some(name) = &step.data {
            return self
                .env
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| FatalError::UnknownDataset(name.clone()));
        }

        if let Some(current) = &self.env.current {
            return Ok(current.clone());
        }

        match self.env.last_source.clone() {
            Some(source) => {
                tracing::warn!(path = %source.path, "no current dataset, reloading last source");
                Ok(self.loader.load(&source)?)
            }
            None => Err(FatalError::NoDataset {
                step: format!("PROC {}", step.kind()),
            }),
        }
    }
}

/// Parses, plans and runs one request.
///
/// # Examples
///
/// ```
/// use datastep_lang::{Grammar, Request, run_script};
/// use datastep_lang::chart::PngChartRenderer;
/// use datastep_lang::loader::MemoryLoader;
/// use datastep_lang::table::{Column, Table};
///
/// let people = Table::new(vec![
///     ("name".into(), Column::text(["Alice", "Bob"])),
///     ("age".into(), Column::numeric([25.0, 35.0])),
/// ]).unwrap();
/// let loader = MemoryLoader::new().with_table("people.csv", people);
///
/// let request = Request::new("DATA adults; SET people.csv; WHERE age > 30; RUN;");
/// let response = run_script(&Grammar::new(), &request, &loader, &PngChartRenderer::default()).unwrap();
///
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["shape"], serde_json::json!([1, 2]));
/// ```
pub fn run_script(
    grammar: &Grammar,
    request: &Request,
    loader: &dyn DatasetLoader,
    renderer: &dyn ChartRenderer,
) -> Result<Response, FatalError> {
    let script = grammar.parse(&request.code)?;
    let steps = PlanBuilder::new().build(&script)?;
    tracing::debug!(steps = steps.len(), "plan built");

    let mut env = Environment::new();
    if let Some(source) = &request.source {
        env = env.with_last_source(SourceRef::new(source.as_str()));
    }

    let mut interpreter = Interpreter::with_environment(loader, renderer, request.options(), env);
    let results = interpreter.run(&steps)?;
    Ok(Response::from_results(results))
}
