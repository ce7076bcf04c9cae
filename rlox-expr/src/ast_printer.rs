use itertools::Itertools;

use crate::{expr::Expr, value::Value};

/// Fully parenthesized prefix form, e.g. `(* (- 123) (group 45.67))`.
pub fn ast_to_string(expr: &Expr) -> String {
    match expr {
        Expr::Binary {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left, right]),
        Expr::Grouping(expr) => parenthesize("group", &[expr]),
        Expr::Literal(value) => format!("{value}"),
        Expr::Unary { operator, right } => parenthesize(&operator.lexeme, &[right]),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    format!(
        "({name} {})",
        exprs.iter().map(|expr| ast_to_string(expr)).join(" ")
    )
}

/// Renders the tree back into Lox syntax that parses to the same tree.
///
/// Parentheses only appear where the tree has a `Grouping`; the parser's
/// trees are already shaped by precedence and left associativity, so
/// nothing else needs them.
pub fn ast_to_source(expr: &Expr) -> String {
    match expr {
        Expr::Binary {
            left,
            operator,
            right,
        } => format!(
            "{} {} {}",
            ast_to_source(left),
            operator.lexeme,
            ast_to_source(right)
        ),
        Expr::Grouping(expr) => format!("({})", ast_to_source(expr)),
        Expr::Literal(Value::String(s)) => format!("\"{s}\""),
        Expr::Literal(Value::Number(n)) if n.is_infinite() => overflowing_digits(*n),
        Expr::Literal(value) => format!("{value}"),
        Expr::Unary { operator, right } => format!("{}{}", operator.lexeme, ast_to_source(right)),
    }
}

/// A digit run too long for `f64`, which scans back to the same infinity.
fn overflowing_digits(n: f64) -> String {
    let sign = if n.is_sign_negative() { "-" } else { "" };
    format!("{sign}1{}", "0".repeat(f64::MAX_10_EXP as usize + 1))
}
