use std::collections::BTreeSet;

use crate::{
    ast::CompareOp,
    plan::{Clause, Clauses, WhereClause},
    table::{Column, Table},
    value::format_number,
};

/// The right-hand side of a `WHERE`, classified once per clause.
///
/// A literal that parses as a float is compared numerically; anything else
/// is compared as a string. This means `WHERE zip = 02134` compares the
/// number 2134, not the text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl Literal {
    pub fn parse(literal: &str) -> Self {
        match literal.parse::<f64>() {
            Ok(n) => Literal::Number(n),
            Err(_) => Literal::Text(literal.to_string()),
        }
    }
}

/// Applies the clauses of a DATA step.
///
/// The order is always WHERE, KEEP, DROP, RENAME, whatever order the
/// statements were written in.
///
/// # Examples
///
/// ```
/// use datastep_lang::plan::{Clause, Clauses};
/// use datastep_lang::table::{Column, Table};
/// use datastep_lang::transform::apply_clauses;
///
/// let table = Table::new(vec![
///     ("income".into(), Column::numeric([1.0, 2.0])),
///     ("age".into(), Column::numeric([30.0, 40.0])),
/// ]).unwrap();
///
/// // RENAME written first still runs after KEEP
/// let clauses: Clauses = [
///     Clause::Rename(vec![("income".into(), "salary".into())]),
///     Clause::Keep(vec!["income".into()]),
/// ].into_iter().collect();
///
/// let out = apply_clauses(&table, &clauses);
/// assert_eq!(out.column_names(), &["salary".to_string()]);
/// ```
pub fn apply_clauses(table: &Table, clauses: &Clauses) -> Table {
    let mut current = table.clone();

    for clause in clauses.canonical() {
        current = match clause {
            Clause::Where(filter) => apply_where(&current, filter),
            Clause::Keep(columns) => keep_columns(&current, columns),
            Clause::Drop(columns) => drop_columns(&current, columns),
            Clause::Rename(pairs) => rename_columns(&current, pairs),
        };
        tracing::debug!(
            clause = ?clause.kind(),
            rows = current.n_rows(),
            cols = current.n_cols(),
            "applied clause"
        );
    }

    current
}

/// Keeps rows satisfying `column op literal`, in their original order.
///
/// A column the table does not have leaves the table unchanged.
pub fn apply_where(table: &Table, clause: &WhereClause) -> Table {
    let Some(column) = table.column(&clause.column) else {
        tracing::debug!(column = %clause.column, "WHERE column not present, skipping filter");
        return table.clone();
    };

    let literal = Literal::parse(&clause.literal);
    let rows: Vec<usize> = (0..table.n_rows())
        .filter(|&row| row_matches(column, row, clause.op, &literal))
        .collect();

    table.take_rows(&rows)
}

fn row_matches(column: &Column, row: usize, op: CompareOp, literal: &Literal) -> bool {
    let ordering = match (column, literal) {
        (Column::Numeric(cells), Literal::Number(n)) => {
            cells[row].and_then(|cell| cell.partial_cmp(n))
        }
        (Column::Text(cells), Literal::Number(n)) => cells[row]
            .as_ref()
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .and_then(|cell| cell.partial_cmp(n)),
        (Column::Numeric(cells), Literal::Text(s)) => {
            cells[row].map(|cell| format_number(cell).as_str().cmp(s.as_str()))
        }
        (Column::Text(cells), Literal::Text(s)) => {
            cells[row].as_ref().map(|cell| cell.as_str().cmp(s.as_str()))
        }
    };

    match ordering {
        Some(ordering) => op.matches(ordering),
        None => missing_result(column, row, op),
    }
}

/// A cell that is missing, or cannot be ordered against the literal.
fn missing_result(column: &Column, row: usize, op: CompareOp) -> bool {
    // unparseable text against a number is simply unequal
    let present = !column.get(row).is_missing();
    if present {
        return op == CompareOp::NotEqual;
    }
    op.matches_missing()
}

/// Exactly the requested columns that exist, in the requested order.
pub fn keep_columns(table: &Table, columns: &[String]) -> Table {
    table.select(columns)
}

/// Removes the listed columns; unknown names are ignored.
pub fn drop_columns(table: &Table, columns: &BTreeSet<String>) -> Table {
    table.without(columns)
}

/// Applies `(old, new)` pairs in order; unknown `old` names are ignored.
pub fn rename_columns(table: &Table, pairs: &[(String, String)]) -> Table {
    let mut current = table.clone();

    for (old, new) in pairs {
        if !current.has_column(old) {
            continue;
        }
        match current.renamed(old, new) {
            Some(next) => current = next,
            None => tracing::warn!(
                %old,
                %new,
                "RENAME target already exists, keeping the original name"
            ),
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_classification() {
        assert_eq!(Literal::parse("30"), Literal::Number(30.0));
        assert_eq!(Literal::parse("-1.5e2"), Literal::Number(-150.0));
        assert_eq!(Literal::parse("F"), Literal::Text("F".into()));
    }

    #[test]
    fn missing_cells_only_pass_not_equal() {
        let column = Column::Numeric(vec![None]);
        let literal = Literal::Number(1.0);
        assert!(!row_matches(&column, 0, CompareOp::Equal, &literal));
        assert!(!row_matches(&column, 0, CompareOp::GreaterThan, &literal));
        assert!(row_matches(&column, 0, CompareOp::NotEqual, &literal));
    }

    #[test]
    fn text_cells_compare_numerically_when_they_parse() {
        let column = Column::text(["10", "9", "abc"]);
        let literal = Literal::Number(9.5);
        assert!(row_matches(&column, 0, CompareOp::GreaterThan, &literal));
        assert!(!row_matches(&column, 1, CompareOp::GreaterThan, &literal));
        assert!(!row_matches(&column, 2, CompareOp::GreaterThan, &literal));
        assert!(row_matches(&column, 2, CompareOp::NotEqual, &literal));
    }
}
