//! Lowering of parsed blocks into an ordered, typed execution plan.
//!
//! Every DATA block becomes a [`DataStep`] and every PROC block a
//! [`ProcStep`]. Structural problems (no `SET`, no `MODEL`, a statement that
//! makes no sense for the step) are reported here as [`PlanError`]s; column
//! existence is left to run time.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    ast::{Block, CompareOp, ProcName, ProcOption, Script, Spanned, Statement},
    lexer::Position,
};

/// Structurally invalid step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("DATA step '{step}' at {position} has no SET statement")]
    MissingSet { step: String, position: Position },

    #[error("DATA step '{step}' has a second SET statement at {position}; only one source is supported")]
    DuplicateSet { step: String, position: Position },

    #[error("PROC REG at {position} has no MODEL statement")]
    MissingModel { position: Position },

    #[error("MODEL {dependent} = at {position} names no independent variables")]
    EmptyModel { dependent: String, position: Position },

    #[error("OBS value '{value}' at {position} is not a non-negative whole number")]
    InvalidObs { value: String, position: Position },

    #[error("{statement} is not valid in {context} (at {position})")]
    UnexpectedStatement {
        statement: &'static str,
        context: String,
        position: Position,
    },
}

/// Where a DATA step reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub path: String,
    pub sheet: Option<String>,
}

impl SourceRef {
    pub fn new(path: impl Into<String>) -> Self {
        SourceRef {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// True when the path has no file extension, so it may name an
    /// in-memory dataset.
    pub fn is_bare_name(&self) -> bool {
        self.sheet.is_none()
            && !self.path.is_empty()
            && self.path.chars().all(|c| c.is_alphanumeric() || c == '_')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub op: CompareOp,
    pub literal: String,
}

/// Sub-operation of a DATA step.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Where(WhereClause),
    Keep(Vec<String>),
    Drop(BTreeSet<String>),
    Rename(Vec<(String, String)>),
}

/// Clause kinds in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClauseKind {
    Where,
    Keep,
    Drop,
    Rename,
}

impl Clause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            Clause::Where(_) => ClauseKind::Where,
            Clause::Keep(_) => ClauseKind::Keep,
            Clause::Drop(_) => ClauseKind::Drop,
            Clause::Rename(_) => ClauseKind::Rename,
        }
    }
}

/// At most one clause of each kind, remembered in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clauses {
    declared: Vec<Clause>,
}

impl Clauses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause, returning the clause of the same kind it replaced.
    pub fn insert(&mut self, clause: Clause) -> Option<Clause> {
        let replaced = self
            .declared
            .iter()
            .position(|c| c.kind() == clause.kind())
            .map(|i| self.declared.remove(i));
        self.declared.push(clause);
        replaced
    }

    /// Clauses as written in the script.
    pub fn declared(&self) -> &[Clause] {
        &self.declared
    }

    /// Clauses in application order: WHERE, KEEP, DROP, RENAME.
    pub fn canonical(&self) -> Vec<&Clause> {
        let mut ordered: Vec<&Clause> = self.declared.iter().collect();
        ordered.sort_by_key(|c| c.kind());
        ordered
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

impl FromIterator<Clause> for Clauses {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        let mut clauses = Clauses::new();
        for clause in iter {
            clauses.insert(clause);
        }
        clauses
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataStep {
    pub name: String,
    pub source: SourceRef,
    pub clauses: Clauses,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintParams {
    pub var: Option<Vec<String>>,
    pub obs: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeansParams {
    pub var: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreqParams {
    pub tables: Option<Vec<String>>,
}

/// Chart attached to a regression.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotRequest {
    /// Dependent variable against the first numeric predictor
    Auto,
    /// `PLOT y*x`
    Columns { x: String, y: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegParams {
    pub dependent: String,
    pub independent: Vec<String>,
    pub plot: Option<PlotRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Procedure {
    Print(PrintParams),
    Means(MeansParams),
    Freq(FreqParams),
    Reg(RegParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcStep {
    /// Named input dataset from `DATA=`; the current dataset otherwise
    pub data: Option<String>,
    pub procedure: Procedure,
}

impl ProcStep {
    pub fn kind(&self) -> ProcName {
        match self.procedure {
            Procedure::Print(_) => ProcName::Print,
            Procedure::Means(_) => ProcName::Means,
            Procedure::Freq(_) => ProcName::Freq,
            Procedure::Reg(_) => ProcName::Reg,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Data(DataStep),
    Proc(ProcStep),
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Step::Data(data) => format!("DATA {}", data.name),
            Step::Proc(proc) => format!("PROC {}", proc.kind()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanBuilder;

impl PlanBuilder {
    pub fn new() -> Self {
        PlanBuilder
    }

    /// Lowers every block, preserving script order.
    pub fn build(&self, script: &Script) -> Result<Vec<Step>, PlanError> {
        let steps = script
            .blocks
            .iter()
            .map(|block| self.build_block(block))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(steps = steps.len(), "built plan");
        Ok(steps)
    }

    fn build_block(&self, block: &Block) -> Result<Step, PlanError> {
        tracing::debug!(at = %block.position(), "lowering block");
        match block {
            Block::Data {
                name,
                position,
                statements,
            } => self.build_data_step(name, *position, statements).map(Step::Data),
            Block::Proc {
                name,
                position,
                options,
                statements,
            } => self
                .build_proc_step(*name, *position, options, statements)
                .map(Step::Proc),
        }
    }

    fn build_data_step(
        &self,
        name: &str,
        position: Position,
        statements: &[Spanned<Statement>],
    ) -> Result<DataStep, PlanError> {
        let mut source = None;
        let mut clauses = Clauses::new();

        for Spanned {
            node: statement,
            position: at,
        } in statements
        {
            let clause = match statement {
                Statement::Set { path, sheet } => {
                    if source.is_some() {
                        return Err(PlanError::DuplicateSet {
                            step: name.to_string(),
                            position: *at,
                        });
                    }
                    source = Some(SourceRef {
                        path: path.clone(),
                        sheet: sheet.clone(),
                    });
                    continue;
                }
                Statement::Where {
                    column,
                    op,
                    literal,
                } => Clause::Where(WhereClause {
                    column: column.clone(),
                    op: *op,
                    literal: literal.clone(),
                }),
                Statement::Keep(columns) => Clause::Keep(columns.clone()),
                Statement::Drop(columns) => Clause::Drop(columns.iter().cloned().collect()),
                Statement::Rename(pairs) => Clause::Rename(pairs.clone()),
                Statement::Var(_)
                | Statement::Obs(_)
                | Statement::Tables(_)
                | Statement::Model { .. }
                | Statement::Plot { .. } => {
                    return Err(PlanError::UnexpectedStatement {
                        statement: statement.keyword(),
                        context: format!("DATA step '{}'", name),
                        position: *at,
                    });
                }
            };

            if let Some(replaced) = clauses.insert(clause) {
                tracing::warn!(
                    step = name,
                    clause = ?replaced.kind(),
                    "repeated clause replaces the earlier one"
                );
            }
        }

        let source = source.ok_or_else(|| PlanError::MissingSet {
            step: name.to_string(),
            position,
        })?;

        Ok(DataStep {
            name: name.to_string(),
            source,
            clauses,
        })
    }

    fn build_proc_step(
        &self,
        name: ProcName,
        position: Position,
        options: &[Spanned<ProcOption>],
        statements: &[Spanned<Statement>],
    ) -> Result<ProcStep, PlanError> {
        let context = format!("PROC {}", name);
        let unexpected = |statement: &'static str, at: Position| PlanError::UnexpectedStatement {
            statement,
            context: context.clone(),
            position: at,
        };

        let mut data = None;
        let mut obs = None;
        let mut plots = false;
        for Spanned { node, position: at } in options {
            match node {
                ProcOption::Data(dataset) => data = Some(dataset.clone()),
                ProcOption::Obs(value) if name == ProcName::Print => obs = Some(parse_obs(value, *at)?),
                ProcOption::Plots if name == ProcName::Reg => plots = true,
                ProcOption::Obs(_) | ProcOption::Plots => return Err(unexpected(node.keyword(), *at)),
            }
        }

        let mut var = None;
        let mut tables = None;
        let mut model = None;
        let mut plot = None;
        for Spanned {
            node: statement,
            position: at,
        } in statements
        {
            match (name, statement) {
                (ProcName::Print | ProcName::Means, Statement::Var(columns)) => {
                    var = Some(columns.clone())
                }
                (ProcName::Print, Statement::Obs(value)) => obs = Some(parse_obs(value, *at)?),
                (ProcName::Freq, Statement::Tables(columns)) => tables = Some(columns.clone()),
                (
                    ProcName::Reg,
                    Statement::Model {
                        dependent,
                        independent,
                    },
                ) => {
                    if independent.is_empty() {
                        return Err(PlanError::EmptyModel {
                            dependent: dependent.clone(),
                            position: *at,
                        });
                    }
                    model = Some((dependent.clone(), independent.clone()));
                }
                (ProcName::Reg, Statement::Plot { y, x }) => {
                    plot = Some(PlotRequest::Columns {
                        x: x.clone(),
                        y: y.clone(),
                    })
                }
                (_, other) => return Err(unexpected(other.keyword(), *at)),
            }
        }

        let procedure = match name {
            ProcName::Print => Procedure::Print(PrintParams { var, obs }),
            ProcName::Means => Procedure::Means(MeansParams { var }),
            ProcName::Freq => Procedure::Freq(FreqParams { tables }),
            ProcName::Reg => {
                let (dependent, independent) = model.ok_or(PlanError::MissingModel { position })?;
                Procedure::Reg(RegParams {
                    dependent,
                    independent,
                    plot: plot.or(plots.then_some(PlotRequest::Auto)),
                })
            }
        };

        Ok(ProcStep { data, procedure })
    }
}

fn parse_obs(value: &str, position: Position) -> Result<usize, PlanError> {
    value.parse::<usize>().map_err(|_| PlanError::InvalidObs {
        value: value.to_string(),
        position,
    })
}
