use log::{debug, trace};

use crate::{reporter::Reporter, token::Token, token_type::TokenTy, value::Value};

static KEYWORDS: phf::Map<&'static str, TokenTy> = phf::phf_map! {
    "and" =>    TokenTy::And,
    "class" =>  TokenTy::Class,
    "else" =>   TokenTy::Else,
    "false" =>  TokenTy::False,
    "for" =>    TokenTy::For,
    "fun" =>    TokenTy::Fun,
    "if" =>     TokenTy::If,
    "nil" =>    TokenTy::Nil,
    "or" =>     TokenTy::Or,
    "print" =>  TokenTy::Print,
    "return" => TokenTy::Return,
    "super" =>  TokenTy::Super,
    "this" =>   TokenTy::This,
    "true" =>   TokenTy::True,
    "var" =>    TokenTy::Var,
    "while" =>  TokenTy::While,
};

/// Single pass lexer over one source string.
///
/// `start` and `current` are byte offsets into `source` and always sit on
/// character boundaries, with `start <= current <= source.len()`.
pub struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            errors: Vec::new(),
        }
    }

    /// Scans the whole source. Always returns a sequence ending in exactly
    /// one `Eof` token; offending lexemes are left out and reported.
    pub fn scan_tokens(mut self, reporter: &mut Reporter) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens
            .push(Token::new(TokenTy::Eof, String::new(), None, self.line));

        debug!(
            "scanned {} tokens, {} errors",
            self.tokens.len(),
            self.errors.len()
        );
        for err in self.errors {
            reporter.scan_error(err);
        }
        self.tokens
    }

    fn scan_token(&mut self) {
        let ch = self.advance();
        match ch {
            '(' => self.add_token(TokenTy::LeftParen),
            ')' => self.add_token(TokenTy::RightParen),
            '{' => self.add_token(TokenTy::LeftBrace),
            '}' => self.add_token(TokenTy::RightBrace),
            ',' => self.add_token(TokenTy::Comma),
            '.' => self.add_token(TokenTy::Dot),
            '-' => self.add_token(TokenTy::Minus),
            '+' => self.add_token(TokenTy::Plus),
            ';' => self.add_token(TokenTy::Semicolon),
            '*' => self.add_token(TokenTy::Star),
            '!' => {
                let ty = if self.matches('=') {
                    TokenTy::BangEqual
                } else {
                    TokenTy::Bang
                };
                self.add_token(ty);
            }
            '=' => {
                let ty = if self.matches('=') {
                    TokenTy::EqualEqual
                } else {
                    TokenTy::Equal
                };
                self.add_token(ty);
            }
            '<' => {
                let ty = if self.matches('=') {
                    TokenTy::LessEqual
                } else {
                    TokenTy::Less
                };
                self.add_token(ty);
            }
            '>' => {
                let ty = if self.matches('=') {
                    TokenTy::GreaterEqual
                } else {
                    TokenTy::Greater
                };
                self.add_token(ty);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenTy::Slash);
                }
            }
            // skip
            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.line += 1;
            }
            '"' => {
                self.string();
            }
            ch if ch.is_ascii_digit() => {
                self.number();
            }
            ch if is_alpha(ch) => {
                self.identifier();
            }
            ch => self
                .errors
                .push(ScanError::UnexpectedCharacter { line: self.line, ch }),
        }
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        match KEYWORDS.get(text) {
            Some(&ty) => self.add_token(ty),
            None => self.add_token(TokenTy::Identifier),
        }
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // a trailing '.' without a digit after it is not part of the number
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // a digit run always parses; one too long for f64 becomes infinity
        let value = self.source[self.start..self.current]
            .parse::<f64>()
            .unwrap_or(f64::INFINITY);
        self.add_literal(TokenTy::Number, value.into());
    }

    fn string(&mut self) {
        let opening_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.errors
                .push(ScanError::UnterminatedString { line: opening_line });
            return;
        }

        // closing "
        self.advance();

        // trim
        let value = self.source[self.start + 1..self.current - 1].to_owned();
        self.add_literal(TokenTy::String, value.into());
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source[self.current..].chars().nth(1).unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.current += expected.len_utf8();
            true
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.peek();
        if !self.is_at_end() {
            self.current += ch.len_utf8();
        }
        ch
    }

    #[inline]
    fn add_token(&mut self, ty: TokenTy) {
        self.add_token_or_literal(ty, None)
    }

    #[inline]
    fn add_literal(&mut self, ty: TokenTy, literal: Value) {
        self.add_token_or_literal(ty, Some(literal))
    }

    fn add_token_or_literal(&mut self, ty: TokenTy, literal: Option<Value>) {
        let text = &self.source[self.start..self.current];
        let token = Token::new(ty, text, literal, self.line);
        trace!("token: {token}");
        self.tokens.push(token)
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_alpha_numeric(ch: char) -> bool {
    is_alpha(ch) || ch.is_ascii_digit()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("Unexpected character '{ch}'.")]
    UnexpectedCharacter { line: usize, ch: char },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize },
}

impl ScanError {
    pub fn line(&self) -> usize {
        match self {
            ScanError::UnexpectedCharacter { line, .. }
            | ScanError::UnterminatedString { line } => *line,
        }
    }
}
