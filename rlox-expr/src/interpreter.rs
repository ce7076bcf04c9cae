use std::borrow::Cow;

use log::{debug, trace};

use crate::{expr::Expr, token::Token, token_type::TokenTy, value::Value};

/// Tree-walking evaluator.
///
/// Holds no state between calls, so a failed evaluation leaves nothing
/// behind for the next one.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    pub fn interpret(&self, expr: &Expr) -> Result<Value> {
        let result = self.evaluate(expr);
        match &result {
            Ok(value) => debug!("evaluated to {value:?}"),
            Err(err) => debug!("evaluation failed at {}: {err}", err.token),
        }
        result
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                trace!("{left:?} {} {right:?}", operator.lexeme);

                match operator.ty {
                    TokenTy::Plus => match (left, right) {
                        (Value::Number(left), Value::Number(right)) => Ok((left + right).into()),
                        (Value::String(left), Value::String(right)) => {
                            Ok(Value::String(left + right))
                        }
                        _ => Err(RuntimeError::new(
                            operator.clone(),
                            "Operands must be two numbers or two strings.",
                        )),
                    },
                    TokenTy::Minus => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left - right).into())
                    }
                    TokenTy::Star => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left * right).into())
                    }
                    TokenTy::Slash => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        if right == 0.0 {
                            return Err(RuntimeError::new(operator.clone(), "Division by zero."));
                        }
                        Ok((left / right).into())
                    }
                    TokenTy::Greater => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left > right).into())
                    }
                    TokenTy::GreaterEqual => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left >= right).into())
                    }
                    TokenTy::Less => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left < right).into())
                    }
                    TokenTy::LessEqual => {
                        let (left, right) = Self::check_number_operands(operator, &left, &right)?;
                        Ok((left <= right).into())
                    }
                    TokenTy::EqualEqual => Ok((left == right).into()),
                    TokenTy::BangEqual => Ok((left != right).into()),
                    _ => Err(Self::unknown_operator(operator)),
                }
            }
            Expr::Grouping(expr) => self.evaluate(expr),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.ty {
                    TokenTy::Minus => {
                        let right = Self::check_number_operand(operator, &right)?;
                        Ok((-right).into())
                    }
                    TokenTy::Bang => Ok((!right.is_truthy()).into()),
                    _ => Err(Self::unknown_operator(operator)),
                }
            }
        }
    }

    fn check_number_operand(operator: &Token, operand: &Value) -> Result<f64> {
        if let Value::Number(n) = *operand {
            Ok(n)
        } else {
            Err(RuntimeError::new(
                operator.clone(),
                "Operand must be a number.",
            ))
        }
    }

    fn check_number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
        match (left, right) {
            (Value::Number(left), Value::Number(right)) => Ok((*left, *right)),
            _ => Err(RuntimeError::new(
                operator.clone(),
                "Operands must be numbers.",
            )),
        }
    }

    fn unknown_operator(operator: &Token) -> RuntimeError {
        RuntimeError::new(
            operator.clone(),
            format!("Unknown operator '{}'.", operator.lexeme),
        )
    }
}

/// A failed evaluation, blamed on the operator token that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: Cow<'static, str>,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
