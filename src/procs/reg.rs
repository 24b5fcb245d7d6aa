use std::collections::BTreeMap;

use base64::Engine;

use crate::{
    chart::{ChartRenderer, ScatterChart},
    output::{HtmlTable, RegOutput, RegSummary, StepResult, format_optional},
    plan::{PlotRequest, RegParams},
    request::RunOptions,
    table::Table,
};

use super::ols::{self, OlsFit};

/// Linear regression of `dependent` on the numeric `independent` columns.
///
/// Independent columns that are not numeric are left out of the model, so
/// a model with none left fits the intercept alone. Rows with a missing
/// value in any used column are dropped.
pub fn run(
    table: &Table,
    params: &RegParams,
    options: &RunOptions,
    renderer: &dyn ChartRenderer,
) -> StepResult {
    let Some(dependent) = table.column(&params.dependent) else {
        return StepResult::error(
            "PROC REG failed",
            format!("Dependent variable '{}' not found", params.dependent),
        );
    };
    if let Some(name) = params.independent.iter().find(|n| !table.has_column(n)) {
        return StepResult::error(
            "PROC REG failed",
            format!("Independent variable '{}' not found", name),
        );
    }
    let Some(y) = dependent.as_numeric() else {
        return StepResult::error(
            "PROC REG failed",
            format!("Dependent variable '{}' is not numeric", params.dependent),
        );
    };

    let mut predictors: Vec<(&str, &[Option<f64>])> = vec![];
    for name in &params.independent {
        let cells = table.column(name).and_then(|c| c.as_numeric());
        match cells {
            Some(cells) if !predictors.iter().any(|(n, _)| *n == name.as_str()) => {
                predictors.push((name.as_str(), cells));
            }
            Some(_) => {}
            None => tracing::debug!(column = %name, "non-numeric predictor left out of the model"),
        }
    }

    let (y_values, columns) = complete_cases(y, &predictors);
    let fit = match ols::fit(&y_values, &columns) {
        Ok(fit) => fit,
        Err(e) => return StepResult::error("PROC REG failed", e.to_string()),
    };

    let model = format!("{} = {}", params.dependent, fit.terms[1..].join(" "))
        .trim_end()
        .to_string();
    tracing::debug!(%model, nobs = fit.nobs, "fitted regression");

    let (chart_png_base64, chart_error) = match chart_request(params, options) {
        Some(request) => draw(table, params, &predictors, &request, renderer),
        None => (None, None),
    };

    let message = format!("PROC REG: {}", model);
    if options.is_html() {
        return StepResult::Reg(RegOutput {
            message,
            summary: None,
            html: Some(summary_html(&model, &fit)),
            chart_png_base64,
            chart_error,
        });
    }

    StepResult::Reg(RegOutput {
        message,
        summary: Some(summary(&fit)),
        html: None,
        chart_png_base64,
        chart_error,
    })
}

/// Rows where the dependent and every predictor are present.
fn complete_cases(
    y: &[Option<f64>],
    predictors: &[(&str, &[Option<f64>])],
) -> (Vec<f64>, Vec<(String, Vec<f64>)>) {
    let rows: Vec<usize> = (0..y.len())
        .filter(|&row| y[row].is_some() && predictors.iter().all(|(_, c)| c[row].is_some()))
        .collect();

    let y_values = rows.iter().filter_map(|&row| y[row]).collect();
    let columns = predictors
        .iter()
        .map(|(name, cells)| {
            let values = rows.iter().filter_map(|&row| cells[row]).collect();
            (name.to_string(), values)
        })
        .collect();

    (y_values, columns)
}

fn summary(fit: &OlsFit) -> RegSummary {
    RegSummary {
        coefficients: fit
            .terms
            .iter()
            .cloned()
            .zip(fit.coefficients.iter().copied())
            .collect::<BTreeMap<_, _>>(),
        pvalues: fit
            .terms
            .iter()
            .cloned()
            .zip(fit.p_values.iter().copied())
            .collect::<BTreeMap<_, _>>(),
        rsquared: fit.rsquared,
        nobs: fit.nobs,
    }
}

fn summary_html(model: &str, fit: &OlsFit) -> String {
    let mut estimates = HtmlTable::new(["Variable", "Estimate", "Std Error", "t Value", "Pr > |t|"])
        .with_caption(format!("Parameter Estimates: {}", model));
    for (j, term) in fit.terms.iter().enumerate() {
        estimates.push_row(vec![
            term.clone(),
            format_optional(Some(fit.coefficients[j])),
            format_optional(fit.std_errors[j]),
            format_optional(fit.t_values[j]),
            format_optional(fit.p_values[j]),
        ]);
    }

    let mut fit_stats = HtmlTable::new(["Statistic", "Value"]).with_caption("Fit Statistics");
    fit_stats.push_row(vec!["R-Square".into(), format_optional(fit.rsquared)]);
    fit_stats.push_row(vec!["Observations".into(), fit.nobs.to_string()]);

    format!("{}\n{}", estimates.render(), fit_stats.render())
}

/// An explicit `PLOT` wins; otherwise `PLOTS` or the run option ask for the
/// default chart.
fn chart_request(params: &RegParams, options: &RunOptions) -> Option<PlotRequest> {
    params
        .plot
        .clone()
        .or_else(|| options.plot.then_some(PlotRequest::Auto))
}

/// Base64 PNG, or a note explaining why no chart was drawn.
fn draw(
    table: &Table,
    params: &RegParams,
    predictors: &[(&str, &[Option<f64>])],
    request: &PlotRequest,
    renderer: &dyn ChartRenderer,
) -> (Option<String>, Option<String>) {
    let (x_name, y_name) = match request {
        PlotRequest::Columns { x, y } => (x.as_str(), y.as_str()),
        PlotRequest::Auto => match predictors.first() {
            Some((x, _)) => (*x, params.dependent.as_str()),
            None => return (None, None),
        },
    };

    let numeric = |name: &str| table.column(name).and_then(|c| c.as_numeric());
    let (Some(xs), Some(ys)) = (numeric(x_name), numeric(y_name)) else {
        let bad = if numeric(x_name).is_none() { x_name } else { y_name };
        return (
            None,
            Some(format!("Cannot plot '{}': column not found or not numeric", bad)),
        );
    };

    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    let (x_values, y_values): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();

    let line = match ols::fit(&y_values, &[(x_name.to_string(), x_values)]) {
        Ok(fit) => fit,
        Err(e) => return (None, Some(format!("Cannot plot {} by {}: {}", y_name, x_name, e))),
    };

    let chart = ScatterChart {
        x_label: x_name.to_string(),
        y_label: y_name.to_string(),
        points,
        intercept: line.coefficients[0],
        slope: line.coefficients[1],
    };

    match renderer.render(&chart) {
        Ok(bytes) => (
            Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            None,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "chart rendering failed");
            (None, Some(e.to_string()))
        }
    }
}
