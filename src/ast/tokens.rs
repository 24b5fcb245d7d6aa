#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Numeric literal, kept as written
    ///
    /// The text is preserved so `WHERE` can decide how to compare at run
    /// time.
    ///
    /// # Examples
    /// ```text
    /// 30
    /// -1.5
    /// 2e3
    /// ```
    Number(String),

    /// String literal enclosed in single or double quotes
    ///
    /// A doubled quote inside the literal stands for one quote character.
    ///
    /// # Examples
    /// ```text
    /// "Alice"
    /// 'O''Brien'
    /// ```
    String(String),

    /// Bare dataset path following `SET`
    ///
    /// # Examples
    /// ```text
    /// data/employees.csv
    /// C:\reports\q1.xlsx
    /// ```
    Path(String),

    // Identifiers
    /// Keyword, column name, dataset name, or bare literal
    ///
    /// Must start with a letter or underscore, followed by letters, digits,
    /// or underscores. Keywords are resolved by the parser.
    ///
    /// # Examples
    /// ```text
    /// DATA
    /// income
    /// _tmp1
    /// ```
    Word(String),

    // Comparison
    /// `=`, also used for assignments in `RENAME`, `MODEL` and options
    Eq,

    /// `!=` or `^=`
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Delimiters
    /// Statement terminator
    Semicolon,

    /// Separator in column lists
    Comma,

    /// Separator in `TABLES a*b` and `PLOT y*x`
    Star,

    /// Left parenthesis for `SET` options
    LParen,

    /// Right parenthesis
    RParen,

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in syntax error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string '{}'", s),
            Token::Path(p) => format!("path {}", p),
            Token::Word(w) => format!("'{}'", w),
            Token::Eq => "'='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Star => "'*'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
