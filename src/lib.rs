pub mod ast;
pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod loader;
pub mod output;
pub mod parser;
pub mod plan;
pub mod procs;
pub mod request;
pub mod table;
pub mod transform;
pub mod value;

pub use ast::{Block, Script, Statement, Token};
pub use chart::{ChartRenderer, PngChartRenderer};
pub use evaluator::{Environment, FatalError, Interpreter, run_script};
pub use lexer::{Lexer, Position, SyntaxError};
pub use loader::{DatasetLoader, FileLoader, LoadError, MemoryLoader};
pub use output::{Response, StepResult};
pub use parser::{Grammar, Parser};
pub use plan::{PlanBuilder, PlanError, Step};
pub use request::{OutputFormat, Request, RunOptions};
pub use table::{Column, Table};
pub use value::Value;
