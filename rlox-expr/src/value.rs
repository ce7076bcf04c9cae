use std::borrow::Cow;

/// A runtime value. Also the payload of `Number` and `String` tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(Cow<'static, str>),
    Boolean(bool),
    Nil,
}

impl Value {
    /// `nil` and `false` are falsey, everything else (`0` and `""` included)
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            _ => true,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // integral floats already print without a trailing ".0"
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("nil"),
        }
    }
}
