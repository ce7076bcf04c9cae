use log::debug;

use crate::{interpreter::RuntimeError, parser::ParseError, scanner::ScanError};

/// A user-facing error message, formatted exactly as tooling expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A scan or parse error: `[line N] Error<location>: <message>`.
    Static {
        line: usize,
        location: String,
        message: String,
    },
    /// A runtime error: `<message>\n[line N]`.
    Runtime { line: usize, message: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Static {
                line,
                location,
                message,
            } => write!(f, "[line {line}] Error{location}: {message}"),
            Diagnostic::Runtime { line, message } => write!(f, "{message}\n[line {line}]"),
        }
    }
}

/// Collects diagnostics from every stage of a run.
///
/// The two flags only ever go from unset to set; [`Reporter::reset`] is the
/// one way back, used by the prompt between lines. Pending diagnostics are
/// handed to whoever prints them with [`Reporter::drain`], which leaves the
/// flags alone.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    static_errors: usize,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_error(&mut self, err: ScanError) {
        self.report(err.line(), String::new(), err.to_string());
    }

    pub fn parse_error(&mut self, err: ParseError) {
        self.report(err.token.line, err.token.location(), err.to_string());
    }

    pub fn runtime_error(&mut self, err: RuntimeError) {
        let diagnostic = Diagnostic::Runtime {
            line: err.token.line,
            message: err.to_string(),
        };
        debug!("runtime error recorded: {diagnostic:?}");
        self.diagnostics.push(diagnostic);
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: usize, location: String, message: String) {
        let diagnostic = Diagnostic::Static {
            line,
            location,
            message,
        };
        debug!("static error recorded: {diagnostic:?}");
        self.diagnostics.push(diagnostic);
        self.static_errors += 1;
    }

    /// Whether a scan or parse error has been recorded.
    pub fn had_error(&self) -> bool {
        self.static_errors > 0
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Number of scan and parse errors recorded so far, drained or not.
    pub fn static_error_count(&self) -> usize {
        self.static_errors
    }

    /// Diagnostics not yet drained.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Diagnostic> {
        self.diagnostics.drain(..)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{token::Token, token_type::TokenTy};

    #[test]
    fn scan_errors_have_no_location() {
        let mut reporter = Reporter::new();
        reporter.scan_error(ScanError::UnexpectedCharacter { line: 2, ch: '@' });

        assert!(reporter.had_error());
        assert!(!reporter.had_runtime_error());
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "[line 2] Error: Unexpected character '@'."
        );
    }

    #[test]
    fn parse_errors_point_at_token_or_end() {
        let mut reporter = Reporter::new();
        reporter.parse_error(ParseError::new(
            Token::new(TokenTy::Eof, "", None, 1),
            "Expect expression.",
        ));
        reporter.parse_error(ParseError::new(
            Token::new(TokenTy::Star, "*", None, 3),
            "Expect expression.",
        ));

        let printed: Vec<_> = reporter.drain().map(|d| d.to_string()).collect();
        assert_eq!(
            printed,
            [
                "[line 1] Error at end: Expect expression.",
                "[line 3] Error at '*': Expect expression.",
            ]
        );
        assert!(reporter.diagnostics().is_empty());
        assert_eq!(reporter.static_error_count(), 2);
        assert!(reporter.had_error());
    }

    #[test]
    fn runtime_errors_put_line_after_message() {
        let mut reporter = Reporter::new();
        reporter.runtime_error(RuntimeError::new(
            Token::new(TokenTy::Slash, "/", None, 7),
            "Division by zero.",
        ));

        assert!(reporter.had_runtime_error());
        assert!(!reporter.had_error());
        assert_eq!(
            reporter.diagnostics()[0].to_string(),
            "Division by zero.\n[line 7]"
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut reporter = Reporter::new();
        reporter.scan_error(ScanError::UnterminatedString { line: 1 });
        reporter.reset();

        assert!(!reporter.had_error());
        assert_eq!(reporter.static_error_count(), 0);
        assert!(reporter.diagnostics().is_empty());
    }
}
