//! PROC step routines.
//!
//! Each routine takes the input table and its parameters and returns a
//! [`StepResult`]. Validation failures, such as a column the table does not
//! have, come back as [`StepResult::Error`] and never abort the run.

pub mod freq;
pub mod means;
pub mod ols;
pub mod print;
pub mod reg;

use crate::{
    chart::ChartRenderer,
    output::StepResult,
    plan::{ProcStep, Procedure},
    request::RunOptions,
    table::Table,
};

pub fn dispatch(
    step: &ProcStep,
    table: &Table,
    options: &RunOptions,
    renderer: &dyn ChartRenderer,
) -> StepResult {
    match &step.procedure {
        Procedure::Print(params) => print::run(table, params, options),
        Procedure::Means(params) => means::run(table, params, options),
        Procedure::Freq(params) => freq::run(table, params, options),
        Procedure::Reg(params) => reg::run(table, params, options, renderer),
    }
}
