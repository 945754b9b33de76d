//! The value model
//!
//! Every expression evaluates to a [`Value`]. Values are already in normal
//! form: evaluating one yields itself.

use crate::error::{FormulaError, FormulaResult};
use std::fmt;

/// A computed scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    /// Build an Integer from its literal text
    pub fn parse_integer(text: &str) -> FormulaResult<Value> {
        text.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| FormulaError::Type(format!("'{}' is not an integer: {}", text, e)))
    }

    /// Build a Float from its literal text
    pub fn parse_float(text: &str) -> FormulaResult<Value> {
        text.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| FormulaError::Type(format!("'{}' is not a float: {}", text, e)))
    }

    /// Build a Boolean from its literal text
    ///
    /// Only the words `true` and `false` (in any case) are accepted.
    pub fn parse_boolean(text: &str) -> FormulaResult<Value> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            Ok(Value::Boolean(true))
        } else if text.eq_ignore_ascii_case("false") {
            Ok(Value::Boolean(false))
        } else {
            Err(FormulaError::Type(format!("'{}' is not boolean", text)))
        }
    }

    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
        }
    }

    /// Check if this is an Integer or a Float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            // Keep a fractional part so floats stay distinguishable from integers
            Value::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
