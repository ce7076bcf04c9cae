use std::borrow::Cow;

use log::{debug, trace};

use crate::{expr::Expr, reporter::Reporter, token::Token, token_type::TokenTy, value::Value};

/// How many groupings and prefix operators may nest inside each other.
pub const MAX_NESTING: usize = 128;

/// Recursive descent parser over a scanned token sequence.
///
/// The sequence always ends in an `Eof` token and `current` never moves
/// past it. `depth` counts the groupings and prefix operators currently
/// open and stays at or below [`MAX_NESTING`].
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.ty) != Some(TokenTy::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenTy::Eof, String::new(), None, line));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parses one expression starting at the cursor.
    ///
    /// On a syntax error the diagnostic goes to `reporter`, the cursor is
    /// moved to the next synchronization point and `None` is returned.
    /// Tokens following a complete expression are left in place.
    pub fn parse(&mut self, reporter: &mut Reporter) -> Option<Expr> {
        debug!("parsing from token {} of {}", self.current, self.tokens.len());
        match self.expression() {
            Ok(expr) => Some(expr),
            Err(err) => {
                reporter.parse_error(err);
                self.synchronize();
                None
            }
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while self.matches([TokenTy::BangEqual, TokenTy::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while self.matches([
            TokenTy::Greater,
            TokenTy::GreaterEqual,
            TokenTy::Less,
            TokenTy::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while self.matches([TokenTy::Minus, TokenTy::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while self.matches([TokenTy::Slash, TokenTy::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches([TokenTy::Bang, TokenTy::Minus]) {
            let operator = self.previous().clone();
            let right = self.nested(Self::unary)?;
            Ok(Expr::unary(operator, right))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.matches([TokenTy::False]) {
            Ok(Expr::Literal(Value::Boolean(false)))
        } else if self.matches([TokenTy::True]) {
            Ok(Expr::Literal(Value::Boolean(true)))
        } else if self.matches([TokenTy::Nil]) {
            Ok(Expr::Literal(Value::Nil))
        } else if self.matches([TokenTy::Number, TokenTy::String]) {
            let token = self.previous();
            match &token.literal {
                Some(value) => Ok(Expr::Literal(value.clone())),
                None => Err(ParseError::new(token.clone(), "Expect literal value.")),
            }
        } else if self.matches([TokenTy::LeftParen]) {
            let expr = self.nested(Self::expression)?;
            self.consume(TokenTy::RightParen, "Expect ')' after expression.")?;
            Ok(Expr::grouping(expr))
        } else {
            Err(ParseError::new(self.peek().clone(), "Expect expression."))
        }
    }

    /// Runs `rule` one nesting level deeper, failing at the token just
    /// consumed once [`MAX_NESTING`] levels are open.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                self.previous().clone(),
                "Expression nested too deeply.",
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Panic mode: drop tokens until just past a `;`, just before a token
    /// that starts a statement, or at `Eof`.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().ty == TokenTy::Semicolon {
                break;
            }

            if self.peek().ty.starts_statement() {
                break;
            }

            let skipped = self.advance();
            trace!("synchronize skipped {skipped}");
        }
        debug!("synchronized at {}", self.peek());
    }

    fn consume(&mut self, ty: TokenTy, message: &'static str) -> Result<&Token> {
        if self.check(ty) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(self.peek().clone(), message))
        }
    }

    fn matches<const N: usize>(&mut self, tys: [TokenTy; N]) -> bool {
        if tys.iter().any(|&ty| self.check(ty)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ty: TokenTy) -> bool {
        !self.is_at_end() && self.peek().ty == ty
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().ty == TokenTy::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
}

/// A syntax error located at `token`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: Cow<'static, str>,
}

impl ParseError {
    pub fn new(token: Token, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parser_for(source: &str) -> Parser {
        let mut reporter = Reporter::new();
        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        assert!(!reporter.had_error(), "scan errors in {source:?}");
        Parser::new(tokens)
    }

    fn parse(source: &str) -> (Option<Expr>, Reporter) {
        let mut reporter = Reporter::new();
        let expr = parser_for(source).parse(&mut reporter);
        (expr, reporter)
    }

    fn parse_ok(source: &str) -> Expr {
        let (expr, reporter) = parse(source);
        assert!(!reporter.had_error(), "parse errors in {source:?}");
        expr.expect("expression")
    }

    fn parse_err(source: &str) -> String {
        let (expr, reporter) = parse(source);
        assert_eq!(expr, None);
        assert!(reporter.had_error());
        reporter.diagnostics()[0].to_string()
    }

    fn op(ty: TokenTy, lexeme: &str) -> Token {
        Token::new(ty, lexeme, None, 1)
    }

    #[test]
    fn equality_is_left_associative() {
        let inner = Expr::binary(
            Expr::literal(1.0),
            op(TokenTy::EqualEqual, "=="),
            Expr::literal(2.0),
        );
        let outer = Expr::binary(inner, op(TokenTy::BangEqual, "!="), Expr::literal(3.0));

        assert_eq!(parse_ok("1 == 2 != 3"), outer);
    }

    #[test]
    fn subtraction_chains_lean_left() {
        let expected = Expr::binary(
            Expr::binary(
                Expr::literal(1.0),
                op(TokenTy::Minus, "-"),
                Expr::literal(2.0),
            ),
            op(TokenTy::Minus, "-"),
            Expr::literal(3.0),
        );

        assert_eq!(parse_ok("1 - 2 - 3"), expected);
    }

    #[test]
    fn prefix_operators_nest_to_the_right() {
        let expected = Expr::unary(
            op(TokenTy::Bang, "!"),
            Expr::unary(op(TokenTy::Minus, "-"), Expr::literal(1.0)),
        );

        assert_eq!(parse_ok("!-1"), expected);
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        let expected = Expr::binary(
            Expr::literal(1.0),
            op(TokenTy::Plus, "+"),
            Expr::binary(
                Expr::literal(2.0),
                op(TokenTy::Star, "*"),
                Expr::literal(3.0),
            ),
        );

        assert_eq!(parse_ok("1 + 2 * 3"), expected);
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        let expected = Expr::binary(
            Expr::binary(
                Expr::literal(1.0),
                op(TokenTy::Less, "<"),
                Expr::literal(2.0),
            ),
            op(TokenTy::EqualEqual, "=="),
            Expr::literal(true),
        );

        assert_eq!(parse_ok("1 < 2 == true"), expected);
    }

    #[test]
    fn unary_binds_tighter_than_factor() {
        let expected = Expr::binary(
            Expr::unary(op(TokenTy::Minus, "-"), Expr::literal(2.0)),
            op(TokenTy::Star, "*"),
            Expr::literal(3.0),
        );

        assert_eq!(parse_ok("-2 * 3"), expected);
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expected = Expr::binary(
            Expr::grouping(Expr::binary(
                Expr::literal(1.0),
                op(TokenTy::Plus, "+"),
                Expr::literal(2.0),
            )),
            op(TokenTy::Star, "*"),
            Expr::literal(3.0),
        );

        assert_eq!(parse_ok("(1 + 2) * 3"), expected);
    }

    #[test]
    fn keyword_and_token_literals() {
        assert_eq!(parse_ok("true"), Expr::literal(true));
        assert_eq!(parse_ok("false"), Expr::literal(false));
        assert_eq!(parse_ok("nil"), Expr::Literal(Value::Nil));
        assert_eq!(parse_ok("\"scone\""), Expr::literal("scone"));
        assert_eq!(parse_ok("45.67"), Expr::literal(45.67));
    }

    #[test]
    fn operator_tokens_keep_their_line() {
        let expr = parse_ok("1\n+\n2");
        match expr {
            Expr::Binary { operator, .. } => assert_eq!(operator.line, 2),
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn trailing_tokens_are_left_alone() {
        let (expr, reporter) = parse("1 + 2; 3");
        assert!(!reporter.had_error());
        assert!(matches!(expr, Some(Expr::Binary { .. })));
    }

    #[test]
    fn missing_operand_at_end() {
        assert_eq!(parse_err("1 +"), "[line 1] Error at end: Expect expression.");
        assert_eq!(parse_err(""), "[line 1] Error at end: Expect expression.");
    }

    #[test]
    fn missing_operand_at_token() {
        assert_eq!(parse_err("* 2"), "[line 1] Error at '*': Expect expression.");
        assert_eq!(
            parse_err("1 +\n)"),
            "[line 2] Error at ')': Expect expression."
        );
    }

    #[test]
    fn identifiers_are_not_expressions_yet() {
        assert_eq!(
            parse_err("biscotti"),
            "[line 1] Error at 'biscotti': Expect expression."
        );
    }

    #[test]
    fn unclosed_grouping() {
        assert_eq!(
            parse_err("(1 + 2"),
            "[line 1] Error at end: Expect ')' after expression."
        );
        assert_eq!(
            parse_err("(1 2)"),
            "[line 1] Error at '2': Expect ')' after expression."
        );
    }

    #[test]
    fn number_token_without_literal_is_rejected() {
        let mut reporter = Reporter::new();
        let mut parser = Parser::new(vec![Token::new(TokenTy::Number, "1", None, 1)]);
        assert_eq!(parser.parse(&mut reporter), None);
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "[line 1] Error at '1': Expect literal value."
        );
    }

    #[test]
    fn new_appends_missing_eof() {
        let parser = Parser::new(Vec::new());
        assert_eq!(parser.tokens, vec![Token::new(TokenTy::Eof, "", None, 1)]);

        let parser = Parser::new(vec![Token::new(TokenTy::Nil, "nil", None, 4)]);
        assert_eq!(parser.tokens.last().map(|t| (t.ty, t.line)), Some((TokenTy::Eof, 4)));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let source = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        let mut expr = parse_ok(&source);
        for _ in 0..MAX_NESTING {
            expr = match expr {
                Expr::Grouping(inner) => *inner,
                other => panic!("expected grouping, got {other:?}"),
            };
        }
        assert_eq!(expr, Expr::literal(1.0));

        let source = format!("{}true", "!".repeat(MAX_NESTING));
        assert!(matches!(parse_ok(&source), Expr::Unary { .. }));
    }

    #[test]
    fn deep_grouping_is_an_error_not_a_crash() {
        let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
        assert_eq!(
            parse_err(&source),
            "[line 1] Error at '(': Expression nested too deeply."
        );
    }

    #[test]
    fn deep_prefix_chain_is_an_error_not_a_crash() {
        let source = format!("-{}1", "!".repeat(5000));
        assert_eq!(
            parse_err(&source),
            "[line 1] Error at '!': Expression nested too deeply."
        );
    }

    #[test]
    fn depth_is_released_after_each_grouping() {
        let group = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        let source = [group.as_str(); 3].join(" + ");
        assert!(matches!(parse_ok(&source), Expr::Binary { .. }));
    }

    #[test]
    fn synchronize_stops_after_semicolon() {
        let mut reporter = Reporter::new();
        let mut parser = parser_for("1 + ; 2");

        assert_eq!(parser.parse(&mut reporter), None);
        assert_eq!(parser.peek().lexeme, "2");
        assert_eq!(parser.parse(&mut reporter), Some(Expr::literal(2.0)));
        assert_eq!(reporter.static_error_count(), 1);
    }

    #[test]
    fn synchronize_stops_before_statement_keyword() {
        let mut reporter = Reporter::new();
        let mut parser = parser_for("* 1 2 var x");

        assert_eq!(parser.parse(&mut reporter), None);
        assert_eq!(parser.peek().ty, TokenTy::Var);
    }

    #[test]
    fn synchronize_discards_the_offending_token() {
        let mut reporter = Reporter::new();
        let mut parser = parser_for("(1 print 2; 3");

        assert_eq!(parser.parse(&mut reporter), None);
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "[line 1] Error at 'print': Expect ')' after expression."
        );
        assert_eq!(parser.peek().lexeme, "3");
    }

    #[test]
    fn synchronize_never_passes_eof() {
        let mut reporter = Reporter::new();
        let mut parser = parser_for("1 + 2 +");

        assert_eq!(parser.parse(&mut reporter), None);
        assert!(parser.is_at_end());
        assert_eq!(parser.parse(&mut reporter), None);
        assert!(parser.is_at_end());
        assert_eq!(reporter.static_error_count(), 2);
    }
}
