//! Scanner, parser and tree-walking evaluator for Lox expressions.
//!
//! Source text goes through [`Scanner`] into tokens, through [`Parser`] into
//! an [`Expr`] tree and through [`Interpreter`] into a [`Value`]. Every
//! stage records its errors in a [`Reporter`]; [`Lox`] wires the stages
//! together the way the `rlox` binary runs them.

pub mod ast_printer;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod reporter;
pub mod scanner;
pub mod token;
pub mod token_type;
pub mod value;

pub use expr::Expr;
pub use interpreter::{Interpreter, RuntimeError};
pub use parser::{ParseError, Parser};
pub use reporter::{Diagnostic, Reporter};
pub use scanner::{ScanError, Scanner};
pub use token::Token;
pub use token_type::TokenTy;
pub use value::Value;

/// Process exit statuses, from the BSD `sysexits.h` family.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// Bad command line.
    pub const USAGE: i32 = 64;
    /// A scan or parse error was reported.
    pub const DATA_ERR: i32 = 65;
    /// A runtime error was reported.
    pub const SOFTWARE: i32 = 70;
    /// The script could not be read.
    pub const IO_ERR: i32 = 74;
}

/// One interpreter session. The reporter lives as long as the session, so
/// its flags describe everything run so far.
#[derive(Debug, Default)]
pub struct Lox {
    reporter: Reporter,
    interpreter: Interpreter,
}

impl Lox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans and parses `source`. Returns `None` if either stage reported
    /// an error for this input.
    ///
    /// A scan error alone is enough: the parser may well recover a tree
    /// from the remaining tokens, but that tree is not handed out.
    pub fn parse(&mut self, source: &str) -> Option<Expr> {
        let errors_before = self.reporter.static_error_count();

        let tokens = Scanner::new(source).scan_tokens(&mut self.reporter);
        let expr = Parser::new(tokens).parse(&mut self.reporter);

        if self.reporter.static_error_count() > errors_before {
            return None;
        }
        expr
    }

    /// Runs `source` through every stage. Errors end up in the reporter.
    pub fn run(&mut self, source: &str) -> Option<Value> {
        let expr = self.parse(source)?;
        match self.interpreter.interpret(&expr) {
            Ok(value) => Some(value),
            Err(err) => {
                self.reporter.runtime_error(err);
                None
            }
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    /// Exit status for everything run so far. Static errors win over
    /// runtime errors.
    pub fn exit_code(&self) -> i32 {
        if self.reporter.had_error() {
            exit_code::DATA_ERR
        } else if self.reporter.had_runtime_error() {
            exit_code::SOFTWARE
        } else {
            exit_code::SUCCESS
        }
    }
}
