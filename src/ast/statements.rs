use crate::ast::CompareOp;

/// Statement keywords, resolved case-insensitively at the head of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Data,
    Set,
    Where,
    Keep,
    Drop,
    Rename,
    Proc,
    Var,
    Obs,
    Tables,
    Model,
    Plot,
    Run,
    Quit,
}

impl Keyword {
    /// Every keyword with its canonical spelling.
    pub const ALL: [(&'static str, Keyword); 14] = [
        ("data", Keyword::Data),
        ("set", Keyword::Set),
        ("where", Keyword::Where),
        ("keep", Keyword::Keep),
        ("drop", Keyword::Drop),
        ("rename", Keyword::Rename),
        ("proc", Keyword::Proc),
        ("var", Keyword::Var),
        ("obs", Keyword::Obs),
        ("tables", Keyword::Tables),
        ("model", Keyword::Model),
        ("plot", Keyword::Plot),
        ("run", Keyword::Run),
        ("quit", Keyword::Quit),
    ];
}

/// Statement inside a DATA or PROC block.
///
/// The parser accepts every statement in every block; which statements are
/// meaningful for which step is decided by the plan builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Dataset source
    ///
    /// # Example
    /// ```text
    /// SET data/employees.csv;
    /// SET "report.xlsx" (sheet=Q1);
    /// ```
    Set { path: String, sheet: Option<String> },

    /// Row filter
    ///
    /// The literal is kept as written; numeric or string comparison is
    /// chosen when the step runs.
    ///
    /// # Example
    /// ```text
    /// WHERE age > 30;
    /// WHERE gender = 'F';
    /// ```
    Where {
        column: String,
        op: CompareOp,
        literal: String,
    },

    /// Columns to keep, in output order
    ///
    /// # Example
    /// ```text
    /// KEEP name, age, income;
    /// ```
    Keep(Vec<String>),

    /// Columns to remove
    ///
    /// # Example
    /// ```text
    /// DROP id gender;
    /// ```
    Drop(Vec<String>),

    /// Column renames, applied in order
    ///
    /// # Example
    /// ```text
    /// RENAME name=employee_name, income=salary;
    /// ```
    Rename(Vec<(String, String)>),

    /// Analysis variables
    ///
    /// # Example
    /// ```text
    /// VAR name age;
    /// ```
    Var(Vec<String>),

    /// Row limit for `PROC PRINT`
    ///
    /// # Example
    /// ```text
    /// OBS 10;
    /// ```
    Obs(String),

    /// Frequency table request
    ///
    /// # Example
    /// ```text
    /// TABLES gender*age;
    /// ```
    Tables(Vec<String>),

    /// Regression model
    ///
    /// # Example
    /// ```text
    /// MODEL income = age tenure;
    /// ```
    Model {
        dependent: String,
        independent: Vec<String>,
    },

    /// Chart request, `y*x`
    ///
    /// # Example
    /// ```text
    /// PLOT income*age;
    /// ```
    Plot { y: String, x: String },
}

impl Statement {
    /// Keyword used in diagnostics.
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::Set { .. } => "SET",
            Statement::Where { .. } => "WHERE",
            Statement::Keep(_) => "KEEP",
            Statement::Drop(_) => "DROP",
            Statement::Rename(_) => "RENAME",
            Statement::Var(_) => "VAR",
            Statement::Obs(_) => "OBS",
            Statement::Tables(_) => "TABLES",
            Statement::Model { .. } => "MODEL",
            Statement::Plot { .. } => "PLOT",
        }
    }
}
