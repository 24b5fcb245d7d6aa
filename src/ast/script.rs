use std::fmt;

use crate::ast::Statement;
use crate::lexer::Position;

/// A syntax node together with the position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub position: Position,
}

impl<T> Spanned<T> {
    pub fn new(node: T, position: Position) -> Self {
        Spanned { node, position }
    }
}

/// Procedures understood by `PROC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcName {
    Print,
    Means,
    Freq,
    Reg,
}

impl ProcName {
    pub const ALL: [(&'static str, ProcName); 4] = [
        ("print", ProcName::Print),
        ("means", ProcName::Means),
        ("freq", ProcName::Freq),
        ("reg", ProcName::Reg),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcName::Print => "PRINT",
            ProcName::Means => "MEANS",
            ProcName::Freq => "FREQ",
            ProcName::Reg => "REG",
        }
    }
}

impl fmt::Display for ProcName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options written on the `PROC` line itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcOption {
    /// `DATA=name`, read a named dataset instead of the current one
    Data(String),
    /// `OBS=n`
    Obs(String),
    /// `PLOTS`, request a chart with default axes
    Plots,
}

impl ProcOption {
    pub fn keyword(&self) -> &'static str {
        match self {
            ProcOption::Data(_) => "DATA=",
            ProcOption::Obs(_) => "OBS=",
            ProcOption::Plots => "PLOTS",
        }
    }
}

/// One DATA or PROC block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `DATA name; ... RUN;`
    Data {
        name: String,
        position: Position,
        statements: Vec<Spanned<Statement>>,
    },

    /// `PROC name [options]; ... RUN;`
    Proc {
        name: ProcName,
        position: Position,
        options: Vec<Spanned<ProcOption>>,
        statements: Vec<Spanned<Statement>>,
    },
}

impl Block {
    pub fn position(&self) -> Position {
        match self {
            Block::Data { position, .. } | Block::Proc { position, .. } => *position,
        }
    }

    pub fn statements(&self) -> &[Spanned<Statement>] {
        match self {
            Block::Data { statements, .. } | Block::Proc { statements, .. } => statements,
        }
    }
}

/// A parsed script: blocks in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub blocks: Vec<Block>,
}
