use std::collections::BTreeMap;

use crate::{
    output::{ColumnStats, HtmlTable, MeansOutput, StepResult, format_optional},
    plan::MeansParams,
    request::RunOptions,
    table::Table,
};

/// Summary statistics of numeric columns.
///
/// Without `VAR` every numeric column is summarized; with it, the listed
/// columns that exist and are numeric. Missing cells are skipped.
pub fn run(table: &Table, params: &MeansParams, options: &RunOptions) -> StepResult {
    let numeric = table.numeric_columns();
    let columns: Vec<&str> = match &params.var {
        Some(var) => var
            .iter()
            .map(String::as_str)
            .filter(|name| numeric.contains(name))
            .collect(),
        None => numeric,
    };

    let stats: Vec<(&str, ColumnStats)> = columns
        .into_iter()
        .filter_map(|name| {
            let cells = table.column(name)?.as_numeric()?;
            Some((name, column_stats(cells)))
        })
        .collect();

    let message = format!("PROC MEANS: {} numeric columns", stats.len());

    if options.is_html() {
        let mut html = HtmlTable::new(["Variable", "N", "Mean", "Std Dev", "Minimum", "Maximum"]);
        for (name, s) in &stats {
            html.push_row(vec![
                name.to_string(),
                s.n.to_string(),
                format_optional(s.mean),
                format_optional(s.std),
                format_optional(s.min),
                format_optional(s.max),
            ]);
        }
        return StepResult::Means(MeansOutput {
            message,
            statistics: None,
            html: Some(html.render()),
        });
    }

    StepResult::Means(MeansOutput {
        message,
        statistics: Some(
            stats
                .into_iter()
                .map(|(name, s)| (name.to_string(), s))
                .collect::<BTreeMap<_, _>>(),
        ),
        html: None,
    })
}

/// `std` is the sample standard deviation and needs two values.
pub fn column_stats(cells: &[Option<f64>]) -> ColumnStats {
    let values: Vec<f64> = cells.iter().flatten().copied().collect();
    let n = values.len();
    if n == 0 {
        return ColumnStats {
            n,
            mean: None,
            std: None,
            min: None,
            max: None,
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    });

    ColumnStats {
        n,
        mean: Some(mean),
        std,
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_missing_cells() {
        let stats = column_stats(&[Some(2.0), None, Some(4.0)]);
        assert_eq!(stats.n, 2);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.min, Some(2.0));
        assert_eq!(stats.max, Some(4.0));
        assert!((stats.std.unwrap() - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = column_stats(&[Some(5.0)]);
        assert_eq!(stats.std, None);
        assert_eq!(stats.mean, Some(5.0));
    }

    #[test]
    fn all_missing_is_all_null() {
        let stats = column_stats(&[None, None]);
        assert_eq!(stats.n, 0);
        assert_eq!(stats.mean, None);
    }
}
