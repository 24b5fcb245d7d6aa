use std::collections::{BTreeMap, HashMap};

use crate::{
    output::{Counts, FreqOutput, HtmlTable, StepResult, format_float},
    plan::FreqParams,
    request::RunOptions,
    table::{Column, Table},
    value::Value,
};

pub const TOO_MANY_TABLES: &str = "Only 1 or 2 columns supported in TABLES";

/// Frequency tables.
///
/// No `TABLES` gives one-way counts for every column, one name gives
/// one-way counts for that column, two names a crosstab keyed
/// `outer -> inner -> count`. Missing cells count under `.`.
pub fn run(table: &Table, params: &FreqParams, options: &RunOptions) -> StepResult {
    let columns: Vec<&str> = match &params.tables {
        Some(tables) if !tables.is_empty() => tables.iter().map(String::as_str).collect(),
        _ => table.column_names().iter().map(String::as_str).collect(),
    };

    match (params.tables.as_ref().map_or(0, Vec::len), columns.as_slice()) {
        (n, _) if n > 2 => StepResult::error("PROC FREQ failed", TOO_MANY_TABLES),
        (2, [outer, inner]) => two_way(table, outer, inner, options),
        _ => one_way(table, &columns, options),
    }
}

fn one_way(table: &Table, columns: &[&str], options: &RunOptions) -> StepResult {
    let counted: Vec<(&str, Vec<(Value, usize)>)> = columns
        .iter()
        .map(|&name| (name, table.column(name).map(counts).unwrap_or_default()))
        .collect();

    let message = format!("PROC FREQ: one-way frequencies for {} columns", counted.len());

    if options.is_html() {
        let total = table.n_rows();
        let html = counted
            .iter()
            .map(|(name, levels)| {
                let mut html = HtmlTable::new([*name, "Frequency", "Percent"])
                    .with_caption(format!("Frequency of {}", name));
                for (value, count) in levels {
                    html.push_row(vec![
                        value.label(),
                        count.to_string(),
                        format_float(percent(*count, total)),
                    ]);
                }
                html.render()
            })
            .collect::<Vec<_>>()
            .join("\n");

        return StepResult::Freq(FreqOutput {
            message,
            frequencies: None,
            crosstab: None,
            html: Some(html),
        });
    }

    let frequencies: Counts = counted
        .into_iter()
        .map(|(name, levels)| {
            let inner = levels
                .into_iter()
                .map(|(value, count)| (value.label(), count))
                .collect::<BTreeMap<_, _>>();
            (name.to_string(), inner)
        })
        .collect();

    StepResult::Freq(FreqOutput {
        message,
        frequencies: Some(frequencies),
        crosstab: None,
        html: None,
    })
}

fn two_way(table: &Table, outer: &str, inner: &str, options: &RunOptions) -> StepResult {
    let (Some(rows), Some(cols)) = (table.column(outer), table.column(inner)) else {
        let missing = if table.has_column(outer) { inner } else { outer };
        return StepResult::error(
            "PROC FREQ failed",
            format!("Column '{}' not found", missing),
        );
    };

    let row_levels = levels(rows);
    let col_levels = levels(cols);
    let row_index = index_by_label(&row_levels);
    let col_index = index_by_label(&col_levels);

    let mut cells = vec![vec![0usize; col_levels.len()]; row_levels.len()];
    for row in 0..table.n_rows() {
        let r = row_index.get(&rows.get(row).label());
        let c = col_index.get(&cols.get(row).label());
        if let (Some(&r), Some(&c)) = (r, c) {
            cells[r][c] += 1;
        }
    }

    let message = format!("PROC FREQ: {} by {}", outer, inner);

    if options.is_html() {
        let header = std::iter::once(format!("{} / {}", outer, inner))
            .chain(col_levels.iter().map(Value::label))
            .chain(std::iter::once("Total".to_string()));
        let mut html = HtmlTable::new(header).with_caption(format!("Table of {} by {}", outer, inner));

        for (level, counts) in row_levels.iter().zip(&cells) {
            let mut line: Vec<String> = std::iter::once(level.label())
                .chain(counts.iter().map(usize::to_string))
                .collect();
            line.push(counts.iter().sum::<usize>().to_string());
            html.push_row(line);
        }

        let mut totals = vec!["Total".to_string()];
        totals.extend(
            (0..col_levels.len()).map(|c| cells.iter().map(|row| row[c]).sum::<usize>().to_string()),
        );
        totals.push(table.n_rows().to_string());
        html.push_row(totals);

        return StepResult::Freq(FreqOutput {
            message,
            frequencies: None,
            crosstab: None,
            html: Some(html.render()),
        });
    }

    let crosstab: Counts = row_levels
        .iter()
        .zip(&cells)
        .map(|(level, counts)| {
            let inner = col_levels
                .iter()
                .zip(counts)
                .map(|(value, count)| (value.label(), *count))
                .collect::<BTreeMap<_, _>>();
            (level.label(), inner)
        })
        .collect();

    StepResult::Freq(FreqOutput {
        message,
        frequencies: None,
        crosstab: Some(crosstab),
        html: None,
    })
}

/// Distinct cell values: numbers ascending, then text, then missing.
fn levels(column: &Column) -> Vec<Value> {
    counts(column).into_iter().map(|(value, _)| value).collect()
}

fn index_by_label(levels: &[Value]) -> HashMap<String, usize> {
    levels
        .iter()
        .enumerate()
        .map(|(i, level)| (level.label(), i))
        .collect()
}

/// Each distinct value with its count, in level order.
///
/// Cells are bucketed by display label in one pass; only the distinct
/// values are sorted.
fn counts(column: &Column) -> Vec<(Value, usize)> {
    let mut buckets: HashMap<String, (Value, usize)> = HashMap::new();
    for row in 0..column.len() {
        let value = column.get(row);
        buckets
            .entry(value.label())
            .or_insert_with(|| (value, 0))
            .1 += 1;
    }

    let mut counted: Vec<(Value, usize)> = buckets.into_values().collect();
    counted.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    counted
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}
