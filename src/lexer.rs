use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Location of a token in the script text. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Malformed script text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("syntax error at {position}: {message}")]
pub struct SyntaxError {
    pub position: Position,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        SyntaxError {
            position,
            message: message.into(),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    cursor: Position,
    token_start: Position,
    at_statement_start: bool,
    expect_path: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            cursor: Position::start(),
            token_start: Position::start(),
            at_statement_start: true,
            expect_path: false,
        }
    }

    /// Start of the token most recently returned by [`Lexer::next_token`].
    pub fn token_position(&self) -> Position {
        self.token_start
    }

    /// Lexes the whole input, including the trailing [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.cursor.offset).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.cursor.offset + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.cursor.line += 1;
            self.cursor.column = 1;
        } else {
            self.cursor.column += 1;
        }
        self.cursor.offset += 1;
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.token_start, message)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skips whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.skip_whitespace();
            if self.current_char() == Some('/') && self.peek_char(1) == Some('*') {
                let start = self.cursor;
                self.advance();
                self.advance();
                loop {
                    match self.current_char() {
                        None => {
                            return Err(SyntaxError::new(start, "unterminated comment"));
                        }
                        Some('*') if self.peek_char(1) == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => self.advance(),
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            if ch == quote {
                if self.peek_char(1) == Some(quote) {
                    result.push(quote);
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance();
                return Ok(result);
            }
            result.push(ch);
            self.advance();
        }

        Err(self.error("unterminated string: missing closing quote"))
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut seen_dot = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        // a trailing dot as in `35.` belongs to the number
        let mut has_digits = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                has_digits = true;
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !seen_dot
                && (has_digits || self.peek_char(1).is_some_and(|c| c.is_ascii_digit()))
            {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let digit_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                    }
                    self.advance();
                }
                while let Some(ch) = self.current_char() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    number.push(ch);
                    self.advance();
                }
            }
        }

        Token::Number(number)
    }

    /// Consumes an optional `path=` prefix in front of a `SET` operand.
    fn skip_path_prefix(&mut self) {
        let saved = self.cursor;
        if self.current_char().is_some_and(|c| c.is_alphabetic()) {
            let word = self.read_identifier();
            if word.eq_ignore_ascii_case("path") {
                self.skip_whitespace();
                if self.current_char() == Some('=') {
                    self.advance();
                    self.skip_whitespace();
                    return;
                }
            }
        }
        self.cursor = saved;
    }

    fn read_path(&mut self) -> Result<Token, SyntaxError> {
        self.skip_path_prefix();
        self.token_start = self.cursor;

        match self.current_char() {
            Some(quote @ ('"' | '\'')) => Ok(Token::String(self.read_string(quote)?)),
            Some(ch) if is_path_char(ch) => {
                let mut path = String::new();
                while let Some(ch) = self.current_char() {
                    if !is_path_char(ch) {
                        break;
                    }
                    path.push(ch);
                    self.advance();
                }
                Ok(Token::Path(path))
            }
            _ => Err(self.error("expected a dataset path after SET")),
        }
    }

    fn single(&mut self, token: Token) -> Result<Token, SyntaxError> {
        self.advance();
        Ok(token)
    }

    fn double(&mut self, token: Token) -> Result<Token, SyntaxError> {
        self.advance();
        self.advance();
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, SyntaxError> {
        match self.current_char() {
            None => Ok(Token::Eof),
            Some(';') => self.single(Token::Semicolon),
            Some(',') => self.single(Token::Comma),
            Some('*') => self.single(Token::Star),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('=') => self.single(Token::Eq),
            Some('!' | '^') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::NotEq)
                } else {
                    Err(self.error(format!(
                        "unexpected '{}' (did you mean '!='?)",
                        self.current_char().unwrap_or('!')
                    )))
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::LtEq)
                } else {
                    self.single(Token::Lt)
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::GtEq)
                } else {
                    self.single(Token::Gt)
                }
            }
            Some(quote @ ('"' | '\'')) => Ok(Token::String(self.read_string(quote)?)),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                Ok(self.read_number())
            }
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                Ok(self.read_number())
            }
            Some(ch) if ch.is_ascii_digit() => Ok(self.read_number()),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(Token::Word(self.read_identifier())),
            Some(ch) => Err(self.error(format!("unexpected character '{}'", ch))),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_trivia()?;
        self.token_start = self.cursor;

        if self.expect_path {
            self.expect_path = false;
            self.at_statement_start = false;
            return self.read_path();
        }

        let token = self.scan()?;
        self.expect_path = self.at_statement_start
            && matches!(&token, Token::Word(w) if w.eq_ignore_ascii_case("set"));
        self.at_statement_start = token == Token::Semicolon;
        Ok(token)
    }
}

fn is_path_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, ';' | '(' | ')' | '"' | '\'')
}

#[test]
fn test_statement_tokens() {
    let mut lexer = Lexer::new("WHERE age >= 30;");
    assert_eq!(lexer.next_token().unwrap(), Token::Word("WHERE".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Word("age".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Number("30".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Semicolon);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_set_reads_bare_path() {
    let mut lexer = Lexer::new("set data/employees.csv;");
    assert_eq!(lexer.next_token().unwrap(), Token::Word("set".to_string()));
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Path("data/employees.csv".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::Semicolon);
}

#[test]
fn test_positions_track_lines() {
    let mut lexer = Lexer::new("DATA d;\n  SET x.csv;");
    for _ in 0..3 {
        lexer.next_token().unwrap();
    }
    assert_eq!(lexer.next_token().unwrap(), Token::Word("SET".to_string()));
    assert_eq!(lexer.token_position().line, 2);
    assert_eq!(lexer.token_position().column, 3);
}
