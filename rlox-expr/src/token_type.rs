/// Lexical category of a [`Token`](crate::token::Token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTy {
    // single character
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // one or two character
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // literals
    Identifier,
    String,
    Number,

    // keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenTy {
    /// Keywords that open a statement. Panic-mode recovery stops in front of
    /// any of these.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenTy::Class
                | TokenTy::Fun
                | TokenTy::Var
                | TokenTy::For
                | TokenTy::If
                | TokenTy::While
                | TokenTy::Print
                | TokenTy::Return
        )
    }
}
