use crate::{
    output::{StepResult, TableOutput},
    plan::PrintParams,
    request::RunOptions,
    table::Table,
};

/// Lists rows of the table.
///
/// `VAR` selects the existing listed columns in order; without it every
/// column is shown. Rows are capped by `OBS`, else by the run's limit. The
/// reported shape is that of the selection before the row cap.
pub fn run(table: &Table, params: &PrintParams, options: &RunOptions) -> StepResult {
    let selected = match &params.var {
        Some(columns) => table.select(columns),
        None => table.clone(),
    };
    let limit = params.obs.unwrap_or(options.limit);
    let shown = selected.head(limit);

    StepResult::Print(TableOutput::new(
        format!("PROC PRINT: showing {} of {} rows", shown.n_rows(), selected.n_rows()),
        selected.shape(),
        &shown,
        options.is_html(),
    ))
}
