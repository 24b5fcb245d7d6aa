//! # DATA/PROC Script Language - Syntax Tree
//!
//! This module defines the syntax tree produced by [`crate::parser::Grammar`]
//! for the small SAS-like step language understood by this crate.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison operators used by `WHERE`
//! - **[statements]** - Statements that appear inside a step block
//! - **[script]** - Step blocks and the complete script
//!
//! ## Quick Start
//!
//! ```text
//! DATA adults;
//!   SET data/employees.csv;
//!   WHERE age > 30;
//!   KEEP name, age, income;
//!   RENAME income=salary;
//! RUN;
//!
//! PROC MEANS;
//! RUN;
//! ```
//!
//! ## Core Concepts
//!
//! ### Blocks
//!
//! A script is a sequence of blocks. A block is opened by a `DATA name;` or a
//! `PROC name;` statement and closed by `RUN;` (or `QUIT;`). A block is also
//! closed implicitly by the next `DATA`/`PROC` statement or end of input.
//!
//! ### Keywords
//!
//! Statement keywords are case-insensitive and only recognised at the start
//! of a statement, so a column can be called `obs` or `data`. Column and
//! dataset names are otherwise case-sensitive.
//!
//! ### Paths
//!
//! The operand of `SET` is read as a path: either quoted or a bare run of
//! characters such as `data/employees.csv`. An optional `path=` prefix and a
//! trailing `(sheet=name)` are accepted.
//!
//! ## Examples
//!
//! ### Frequency table
//!
//! ```text
//! PROC FREQ;
//!   TABLES gender*age;
//! RUN;
//! ```
//!
//! ### Regression with a chart
//!
//! ```text
//! PROC REG;
//!   MODEL income = age;
//!   PLOT income*age;
//! RUN;
//! ```
pub mod operators;
pub mod script;
pub mod statements;
pub mod tokens;

pub use operators::CompareOp;
pub use script::{Block, ProcName, ProcOption, Script, Spanned};
pub use statements::{Keyword, Statement};
pub use tokens::Token;
