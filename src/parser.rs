use std::collections::HashMap;
use std::mem;

use crate::{
    ast::{Block, CompareOp, Keyword, ProcName, ProcOption, Script, Spanned, Statement, Token},
    lexer::{Lexer, Position, SyntaxError},
};

/// Keyword tables for the step language.
///
/// Build one with [`Grammar::new`] at startup and share it by reference;
/// parsing never mutates it, so a single instance can serve any number of
/// scripts, from any number of threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    keywords: HashMap<&'static str, Keyword>,
    procedures: HashMap<&'static str, ProcName>,
    mnemonics: HashMap<&'static str, CompareOp>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Grammar {
            keywords: Keyword::ALL.into_iter().collect(),
            procedures: ProcName::ALL.into_iter().collect(),
            mnemonics: [
                ("eq", CompareOp::Equal),
                ("ne", CompareOp::NotEqual),
                ("lt", CompareOp::LessThan),
                ("gt", CompareOp::GreaterThan),
                ("le", CompareOp::LessEqual),
                ("ge", CompareOp::GreaterEqual),
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn keyword(&self, word: &str) -> Option<Keyword> {
        self.keywords.get(word.to_ascii_lowercase().as_str()).copied()
    }

    pub fn procedure(&self, word: &str) -> Option<ProcName> {
        self.procedures.get(word.to_ascii_lowercase().as_str()).copied()
    }

    fn mnemonic(&self, word: &str) -> Option<CompareOp> {
        self.mnemonics.get(word.to_ascii_lowercase().as_str()).copied()
    }

    /// Parses script text into blocks.
    pub fn parse(&self, source: &str) -> Result<Script, SyntaxError> {
        Parser::new(self, Lexer::new(source))?.parse_script()
    }
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    lexer: Lexer,
    current_token: Token,
    current_position: Position,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, mut lexer: Lexer) -> Result<Self, SyntaxError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_position();
        Ok(Parser {
            grammar,
            lexer,
            current_token,
            current_position,
        })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current_token = self.lexer.next_token()?;
        self.current_position = self.lexer.token_position();
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.current_position, message)
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.current_token.describe()
            )));
        }
        self.advance()
    }

    fn expect_word(&mut self, what: &str) -> Result<String, SyntaxError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Word(word) => {
                self.advance()?;
                Ok(word)
            }
            other => {
                let message = format!("expected {}, found {}", what, other.describe());
                self.current_token = other;
                Err(self.error(message))
            }
        }
    }

    /// Keyword at the head of the current statement, if any.
    fn head_keyword(&self) -> Option<Keyword> {
        match &self.current_token {
            Token::Word(word) => self.grammar.keyword(word),
            _ => None,
        }
    }

    pub fn parse_script(&mut self) -> Result<Script, SyntaxError> {
        let mut blocks = vec![];

        loop {
            match &self.current_token {
                Token::Eof => break,
                Token::Semicolon => self.advance()?,
                Token::Word(word) => match self.grammar.keyword(word) {
                    Some(Keyword::Data) => blocks.push(self.parse_data_block()?),
                    Some(Keyword::Proc) => blocks.push(self.parse_proc_block()?),
                    // a stray RUN; between blocks is harmless
                    Some(Keyword::Run | Keyword::Quit) => {
                        self.advance()?;
                        self.expect(Token::Semicolon)?;
                    }
                    Some(_) => {
                        return Err(self.error(format!(
                            "statement '{}' must appear inside a DATA or PROC step",
                            word.to_ascii_uppercase()
                        )));
                    }
                    None => return Err(self.error(format!("unknown statement '{}'", word))),
                },
                other => {
                    return Err(self.error(format!(
                        "expected DATA or PROC, found {}",
                        other.describe()
                    )));
                }
            }
        }

        Ok(Script { blocks })
    }

    fn parse_data_block(&mut self) -> Result<Block, SyntaxError> {
        let position = self.current_position;
        self.advance()?; // DATA
        let name = self.expect_word("a dataset name after DATA")?;
        self.expect(Token::Semicolon)?;
        let statements = self.parse_block_body()?;

        Ok(Block::Data {
            name,
            position,
            statements,
        })
    }

    fn parse_proc_block(&mut self) -> Result<Block, SyntaxError> {
        let position = self.current_position;
        self.advance()?; // PROC

        let name_position = self.current_position;
        let word = self.expect_word("a procedure name after PROC")?;
        let name = self
            .grammar
            .procedure(&word)
            .ok_or_else(|| SyntaxError::new(name_position, format!("unknown procedure '{}'", word)))?;

        let mut options = vec![];
        while !self.check(&Token::Semicolon) {
            options.push(self.parse_proc_option()?);
        }
        self.advance()?; // ;

        let statements = self.parse_block_body()?;

        Ok(Block::Proc {
            name,
            position,
            options,
            statements,
        })
    }

    fn parse_proc_option(&mut self) -> Result<Spanned<ProcOption>, SyntaxError> {
        let position = self.current_position;
        let word = self.expect_word("a PROC option")?;

        let option = match word.to_ascii_lowercase().as_str() {
            "data" => {
                self.expect(Token::Eq)?;
                ProcOption::Data(self.expect_word("a dataset name after DATA=")?)
            }
            "obs" => {
                self.expect(Token::Eq)?;
                ProcOption::Obs(self.parse_number("OBS=")?)
            }
            "plots" | "plot" => ProcOption::Plots,
            _ => {
                return Err(SyntaxError::new(
                    position,
                    format!("unknown PROC option '{}'", word),
                ));
            }
        };

        Ok(Spanned::new(option, position))
    }

    /// Statements up to `RUN;`, the next step, or end of input.
    fn parse_block_body(&mut self) -> Result<Vec<Spanned<Statement>>, SyntaxError> {
        let mut statements = vec![];

        loop {
            match &self.current_token {
                Token::Eof => break,
                Token::Semicolon => {
                    self.advance()?;
                    continue;
                }
                Token::Word(word) => {
                    let Some(keyword) = self.grammar.keyword(word) else {
                        return Err(self.error(format!("unknown statement '{}'", word)));
                    };
                    match keyword {
                        Keyword::Run | Keyword::Quit => {
                            self.advance()?;
                            self.expect(Token::Semicolon)?;
                            break;
                        }
                        Keyword::Data | Keyword::Proc => break,
                        _ => {
                            let position = self.current_position;
                            self.advance()?; // keyword
                            let statement = self.parse_statement(keyword)?;
                            statements.push(Spanned::new(statement, position));
                        }
                    }
                }
                other => {
                    return Err(self.error(format!(
                        "expected a statement, found {}",
                        other.describe()
                    )));
                }
            }
        }

        Ok(statements)
    }

    fn parse_statement(&mut self, keyword: Keyword) -> Result<Statement, SyntaxError> {
        let statement = match keyword {
            Keyword::Set => self.parse_set()?,
            Keyword::Where => self.parse_where()?,
            Keyword::Keep => Statement::Keep(self.parse_column_list("KEEP")?),
            Keyword::Drop => Statement::Drop(self.parse_column_list("DROP")?),
            Keyword::Rename => self.parse_rename()?,
            Keyword::Var => Statement::Var(self.parse_column_list("VAR")?),
            Keyword::Obs => Statement::Obs(self.parse_number("OBS")?),
            Keyword::Tables => self.parse_tables()?,
            Keyword::Model => self.parse_model()?,
            Keyword::Plot => self.parse_plot()?,
            Keyword::Data | Keyword::Proc | Keyword::Run | Keyword::Quit => {
                unreachable!("block keywords are handled by parse_block_body")
            }
        };
        self.expect(Token::Semicolon)?;
        Ok(statement)
    }

    fn parse_set(&mut self) -> Result<Statement, SyntaxError> {
        let path = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Path(path) | Token::String(path) => {
                self.advance()?;
                path
            }
            other => {
                let message = format!("expected a dataset path, found {}", other.describe());
                self.current_token = other;
                return Err(self.error(message));
            }
        };

        let mut sheet = None;
        if self.check(&Token::LParen) {
            self.advance()?;
            let option = self.expect_word("'sheet'")?;
            if !option.eq_ignore_ascii_case("sheet") {
                return Err(self.error(format!("unknown SET option '{}'", option)));
            }
            self.expect(Token::Eq)?;
            sheet = Some(self.parse_literal("a sheet name")?);
            self.expect(Token::RParen)?;
        }

        Ok(Statement::Set { path, sheet })
    }

    fn parse_where(&mut self) -> Result<Statement, SyntaxError> {
        let column = self.expect_word("a column name after WHERE")?;

        let op = match &self.current_token {
            Token::Eq => CompareOp::Equal,
            Token::NotEq => CompareOp::NotEqual,
            Token::Lt => CompareOp::LessThan,
            Token::Gt => CompareOp::GreaterThan,
            Token::LtEq => CompareOp::LessEqual,
            Token::GtEq => CompareOp::GreaterEqual,
            Token::Word(word) => match self.grammar.mnemonic(word) {
                Some(op) => op,
                None => return Err(self.error(format!("unknown comparison operator '{}'", word))),
            },
            other => {
                return Err(self.error(format!(
                    "expected a comparison operator, found {}",
                    other.describe()
                )));
            }
        };
        self.advance()?;

        let literal = self.parse_literal("a value to compare against")?;

        Ok(Statement::Where {
            column,
            op,
            literal,
        })
    }

    /// A number, quoted string, or bare word, returned as its text.
    fn parse_literal(&mut self, what: &str) -> Result<String, SyntaxError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Number(text) | Token::String(text) | Token::Word(text) => {
                self.advance()?;
                Ok(text)
            }
            other => {
                let message = format!("expected {}, found {}", what, other.describe());
                self.current_token = other;
                Err(self.error(message))
            }
        }
    }

    fn parse_number(&mut self, context: &str) -> Result<String, SyntaxError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Number(text) => {
                self.advance()?;
                Ok(text)
            }
            other => {
                let message = format!("expected a number after {}, found {}", context, other.describe());
                self.current_token = other;
                Err(self.error(message))
            }
        }
    }

    /// Words separated by whitespace or commas.
    fn parse_column_list(&mut self, keyword: &str) -> Result<Vec<String>, SyntaxError> {
        let mut columns = vec![];

        while !self.check(&Token::Semicolon) {
            if self.check(&Token::Comma) && !columns.is_empty() {
                self.advance()?;
                continue;
            }
            columns.push(self.expect_word("a column name")?);
        }

        if columns.is_empty() {
            return Err(self.error(format!("{} expects at least one column", keyword)));
        }
        Ok(columns)
    }

    fn parse_rename(&mut self) -> Result<Statement, SyntaxError> {
        let mut pairs = vec![];

        while !self.check(&Token::Semicolon) {
            if self.check(&Token::Comma) && !pairs.is_empty() {
                self.advance()?;
                continue;
            }
            let old = self.expect_word("a column name")?;
            self.expect(Token::Eq)?;
            let new = self.expect_word("a new column name")?;
            pairs.push((old, new));
        }

        if pairs.is_empty() {
            return Err(self.error("RENAME expects at least one old=new pair"));
        }
        Ok(Statement::Rename(pairs))
    }

    /// `a`, `a*b`, `a b`, or `a, b`.
    fn parse_tables(&mut self) -> Result<Statement, SyntaxError> {
        let mut columns = vec![];

        while !self.check(&Token::Semicolon) {
            if (self.check(&Token::Star) || self.check(&Token::Comma)) && !columns.is_empty() {
                self.advance()?;
                continue;
            }
            columns.push(self.expect_word("a column name")?);
        }

        if columns.is_empty() {
            return Err(self.error("TABLES expects at least one column"));
        }
        Ok(Statement::Tables(columns))
    }

    fn parse_model(&mut self) -> Result<Statement, SyntaxError> {
        let dependent = self.expect_word("a dependent variable after MODEL")?;
        self.expect(Token::Eq)?;

        let mut independent = vec![];
        while !self.check(&Token::Semicolon) {
            if self.check(&Token::Comma) && !independent.is_empty() {
                self.advance()?;
                continue;
            }
            independent.push(self.expect_word("an independent variable")?);
        }

        Ok(Statement::Model {
            dependent,
            independent,
        })
    }

    fn parse_plot(&mut self) -> Result<Statement, SyntaxError> {
        let y = self.expect_word("a y variable after PLOT")?;
        self.expect(Token::Star)?;
        let x = self.expect_word("an x variable after '*'")?;
        Ok(Statement::Plot { y, x })
    }
}

#[test]
fn test_grammar_resolves_keywords_case_insensitively() {
    let grammar = Grammar::new();
    assert_eq!(grammar.keyword("Keep"), Some(Keyword::Keep));
    assert_eq!(grammar.keyword("RUN"), Some(Keyword::Run));
    assert_eq!(grammar.procedure("means"), Some(ProcName::Means));
    assert_eq!(grammar.keyword("income"), None);
}

#[test]
fn test_grammar_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();
}
