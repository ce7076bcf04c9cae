use crate::{token_type::TokenTy, value::Value};

/// A scanned lexeme. `literal` is only set for `Number` and `String` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: TokenTy,
    pub lexeme: String,
    pub literal: Option<Value>,
    pub line: usize,
}

impl Token {
    pub fn new(ty: TokenTy, lexeme: impl Into<String>, literal: Option<Value>, line: usize) -> Self {
        Token {
            ty,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }

    /// Where a diagnostic about this token points: ` at end` for EOF,
    /// ` at '<lexeme>'` for everything else.
    pub fn location(&self) -> String {
        if self.ty == TokenTy::Eof {
            " at end".to_owned()
        } else {
            format!(" at '{}'", self.lexeme)
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(literal) => f.write_fmt(format_args!("{:?} {} {}", self.ty, self.lexeme, literal)),
            None => f.write_fmt(format_args!("{:?} {}", self.ty, self.lexeme)),
        }
    }
}
