//! Operator semantics
//!
//! Each operator checks that its evaluated operands are a variant combination
//! it accepts before computing anything. Integer arithmetic is checked: an
//! out-of-range result is an error, never a wrapped value.

use crate::error::{FormulaError, FormulaResult};
use crate::lexer::TokenKind;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,

    // Logical
    And,
    Or,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,

    // Comparison
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Equal,
    NotEqual,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    BitNot,
    IntCast,
    FloatCast,
}

/// Functions folded over a rectangular range of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Max,
    Min,
    Sum,
    Mean,
}

impl BinaryOperator {
    /// The operator a token tag stands for, if any
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Addition => BinaryOperator::Add,
            TokenKind::Subtraction => BinaryOperator::Subtract,
            TokenKind::Multiply => BinaryOperator::Multiply,
            TokenKind::Divide => BinaryOperator::Divide,
            TokenKind::Modulo => BinaryOperator::Modulo,
            TokenKind::Exponent => BinaryOperator::Exponent,
            TokenKind::LogAnd => BinaryOperator::And,
            TokenKind::LogOr => BinaryOperator::Or,
            TokenKind::BitAnd => BinaryOperator::BitAnd,
            TokenKind::BitOr => BinaryOperator::BitOr,
            TokenKind::BitXor => BinaryOperator::BitXor,
            TokenKind::LeftShift => BinaryOperator::ShiftLeft,
            TokenKind::RightShift => BinaryOperator::ShiftRight,
            TokenKind::LessThan => BinaryOperator::LessThan,
            TokenKind::LessThanEquals => BinaryOperator::LessEqual,
            TokenKind::GreaterThan => BinaryOperator::GreaterThan,
            TokenKind::GreaterThanEquals => BinaryOperator::GreaterEqual,
            TokenKind::Equals => BinaryOperator::Equal,
            TokenKind::NotEquals => BinaryOperator::NotEqual,
            _ => return None,
        })
    }

    /// The operator as written in formula text
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
        }
    }
}

impl UnaryOperator {
    /// The operator a token tag stands for, if any
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Not => UnaryOperator::Not,
            TokenKind::BitNot => UnaryOperator::BitNot,
            TokenKind::IntCast => UnaryOperator::IntCast,
            TokenKind::FloatCast => UnaryOperator::FloatCast,
            _ => return None,
        })
    }

    /// The operator as written in formula text
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::IntCast => "Int",
            UnaryOperator::FloatCast => "Float",
        }
    }
}

impl AggregateFunction {
    /// The function a token tag stands for, if any
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Max => AggregateFunction::Max,
            TokenKind::Min => AggregateFunction::Min,
            TokenKind::Sum => AggregateFunction::Sum,
            TokenKind::Mean => AggregateFunction::Mean,
            _ => return None,
        })
    }

    /// The function's keyword
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Max => "Max",
            AggregateFunction::Min => "Min",
            AggregateFunction::Sum => "Sum",
            AggregateFunction::Mean => "Mean",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply a binary operator to two evaluated operands
pub fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> FormulaResult<Value> {
    match op {
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo
        | BinaryOperator::Exponent => arithmetic(op, left, right),

        BinaryOperator::And | BinaryOperator::Or => match (left, right) {
            (Value::Boolean(l), Value::Boolean(r)) => Ok(Value::Boolean(if op == BinaryOperator::And {
                l && r
            } else {
                l || r
            })),
            (l, r) => Err(operand_types(op, &l, &r, FormulaError::Type)),
        },

        BinaryOperator::BitAnd
        | BinaryOperator::BitOr
        | BinaryOperator::BitXor
        | BinaryOperator::ShiftLeft
        | BinaryOperator::ShiftRight => match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => bitwise(op, l, r).map(Value::Integer),
            (l, r) => Err(operand_types(op, &l, &r, FormulaError::Type)),
        },

        BinaryOperator::LessThan
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterEqual
        | BinaryOperator::Equal
        | BinaryOperator::NotEqual => compare(op, &left, &right),
    }
}

/// Apply a unary operator to an evaluated operand
pub fn apply_unary(op: UnaryOperator, operand: Value) -> FormulaResult<Value> {
    match (op, operand) {
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::BitNot, Value::Integer(n)) => Ok(Value::Integer(!n)),
        (UnaryOperator::IntCast, Value::Float(n)) => {
            // 2^63 is exactly representable; anything at or above it is out of range
            if n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64 {
                Ok(Value::Integer(n.trunc() as i64))
            } else {
                Err(FormulaError::InvalidOperand(format!(
                    "{} cannot be converted to Integer",
                    n
                )))
            }
        }
        (UnaryOperator::FloatCast, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (op, operand) => {
            let expected = match op {
                UnaryOperator::Not => "Boolean",
                UnaryOperator::BitNot | UnaryOperator::FloatCast => "Integer",
                UnaryOperator::IntCast => "Float",
            };
            Err(FormulaError::Type(format!(
                "{} expects {}, got {}",
                op,
                expected,
                operand.type_name()
            )))
        }
    }
}

fn operand_types(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    make: fn(String) -> FormulaError,
) -> FormulaError {
    make(format!(
        "cannot apply '{}' to {} and {}",
        op,
        left.type_name(),
        right.type_name()
    ))
}

fn arithmetic(op: BinaryOperator, left: Value, right: Value) -> FormulaResult<Value> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => integer_arithmetic(op, l, r).map(Value::Integer),
        (Value::Float(l), Value::Float(r)) => Ok(Value::Float(float_arithmetic(op, l, r))),
        (Value::String(l), Value::String(r)) if op == BinaryOperator::Add => {
            Ok(Value::String(l + &r))
        }
        (l, r) => Err(operand_types(op, &l, &r, FormulaError::InvalidOperand)),
    }
}

fn overflow(op: BinaryOperator, l: i64, r: i64) -> FormulaError {
    FormulaError::Overflow(format!("{} {} {}", l, op, r))
}

fn integer_arithmetic(op: BinaryOperator, l: i64, r: i64) -> FormulaResult<i64> {
    match op {
        BinaryOperator::Add => l.checked_add(r).ok_or_else(|| overflow(op, l, r)),
        BinaryOperator::Subtract => l.checked_sub(r).ok_or_else(|| overflow(op, l, r)),
        BinaryOperator::Multiply => l.checked_mul(r).ok_or_else(|| overflow(op, l, r)),
        BinaryOperator::Divide => floor_div(l, r),
        BinaryOperator::Modulo => floor_mod(l, r),
        BinaryOperator::Exponent => integer_pow(l, r),
        _ => unreachable!("{} is not an arithmetic operator", op),
    }
}

fn float_arithmetic(op: BinaryOperator, l: f64, r: f64) -> f64 {
    match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => l / r,
        BinaryOperator::Modulo => {
            let rem = l % r;
            if rem != 0.0 && (rem < 0.0) != (r < 0.0) {
                rem + r
            } else {
                rem
            }
        }
        BinaryOperator::Exponent => l.powf(r),
        _ => unreachable!("{} is not an arithmetic operator", op),
    }
}

/// Integer division rounding toward negative infinity
pub fn floor_div(l: i64, r: i64) -> FormulaResult<i64> {
    if r == 0 {
        return Err(FormulaError::DivisionByZero(format!("{} / {}", l, r)));
    }
    let quotient = l
        .checked_div(r)
        .ok_or_else(|| overflow(BinaryOperator::Divide, l, r))?;
    if l % r != 0 && (l < 0) != (r < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Integer remainder taking the sign of the divisor
pub fn floor_mod(l: i64, r: i64) -> FormulaResult<i64> {
    if r == 0 {
        return Err(FormulaError::DivisionByZero(format!("{} % {}", l, r)));
    }
    let rem = l.wrapping_rem(r);
    if rem != 0 && (rem < 0) != (r < 0) {
        Ok(rem + r)
    } else {
        Ok(rem)
    }
}

fn integer_pow(base: i64, exp: i64) -> FormulaResult<i64> {
    if exp < 0 {
        return Err(FormulaError::InvalidOperand(format!(
            "negative exponent {} for Integer base {}",
            exp, base
        )));
    }
    match base {
        0 => Ok(if exp == 0 { 1 } else { 0 }),
        1 => Ok(1),
        -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(exp)
            .ok()
            .and_then(|e| base.checked_pow(e))
            .ok_or_else(|| overflow(BinaryOperator::Exponent, base, exp)),
    }
}

fn bitwise(op: BinaryOperator, l: i64, r: i64) -> FormulaResult<i64> {
    match op {
        BinaryOperator::BitAnd => Ok(l & r),
        BinaryOperator::BitOr => Ok(l | r),
        BinaryOperator::BitXor => Ok(l ^ r),
        BinaryOperator::ShiftLeft => shift_left(l, r),
        BinaryOperator::ShiftRight => shift_right(l, r),
        _ => unreachable!("{} is not a bitwise operator", op),
    }
}

// A negative amount shifts the other way.
fn shift_left(value: i64, amount: i64) -> FormulaResult<i64> {
    if amount < 0 {
        return shift_right(value, amount.checked_neg().unwrap_or(i64::MAX));
    }
    if value == 0 {
        return Ok(0);
    }
    if amount >= 64 {
        return Err(overflow(BinaryOperator::ShiftLeft, value, amount));
    }
    let shifted = value << amount;
    if shifted >> amount != value {
        return Err(overflow(BinaryOperator::ShiftLeft, value, amount));
    }
    Ok(shifted)
}

fn shift_right(value: i64, amount: i64) -> FormulaResult<i64> {
    if amount < 0 {
        return shift_left(value, amount.checked_neg().unwrap_or(i64::MAX));
    }
    Ok(value >> amount.min(63))
}

fn compare(op: BinaryOperator, left: &Value, right: &Value) -> FormulaResult<Value> {
    let ordering = match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => l.partial_cmp(r),
        (Value::Float(l), Value::Float(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => l.partial_cmp(r),
        (Value::Boolean(l), Value::Boolean(r)) => match op {
            BinaryOperator::Equal => return Ok(Value::Boolean(l == r)),
            BinaryOperator::NotEqual => return Ok(Value::Boolean(l != r)),
            _ => {
                return Err(FormulaError::InvalidOperand(format!(
                    "Booleans cannot be ordered with '{}'",
                    op
                )))
            }
        },
        (l, r) => return Err(operand_types(op, l, r, FormulaError::InvalidOperand)),
    };

    let result = match op {
        BinaryOperator::LessThan => ordering == Some(Ordering::Less),
        BinaryOperator::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOperator::GreaterThan => ordering == Some(Ordering::Greater),
        BinaryOperator::GreaterEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
        BinaryOperator::Equal => ordering == Some(Ordering::Equal),
        BinaryOperator::NotEqual => ordering != Some(Ordering::Equal),
        _ => unreachable!("{} is not a comparison operator", op),
    };
    Ok(Value::Boolean(result))
}

/// Fold numeric values with an aggregate function
///
/// Integers stay Integer until a Float joins the fold. `Max` and `Min`
/// return the winning value unchanged. `Mean` is folded as `Sum`; divide
/// the result with [`mean`].
pub fn fold_aggregate(function: AggregateFunction, values: &[Value]) -> FormulaResult<Value> {
    match function {
        AggregateFunction::Sum | AggregateFunction::Mean => {
            values.iter().try_fold(Value::Integer(0), |acc, v| add_numeric(acc, v))
        }
        AggregateFunction::Max | AggregateFunction::Min => {
            let wanted = if function == AggregateFunction::Max {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            let mut best: Option<&Value> = None;
            for value in values {
                best = match best {
                    Some(current) if numeric_cmp(value, current) != Some(wanted) => Some(current),
                    _ => Some(value),
                };
            }
            best.cloned().ok_or_else(|| {
                FormulaError::InvalidOperand(format!("{} of a range with no numeric cells", function))
            })
        }
    }
}

/// Divide a range sum by the range's coordinate-span product
pub fn mean(sum: Value, span: Option<i64>) -> FormulaResult<Value> {
    let span = span.ok_or_else(|| FormulaError::Overflow("range span".into()))?;
    if span == 0 {
        return Err(FormulaError::DivisionByZero(
            "mean over a range with zero span".into(),
        ));
    }
    match sum {
        Value::Integer(n) => floor_div(n, span).map(Value::Integer),
        Value::Float(n) => Ok(Value::Float(n / span as f64)),
        other => Err(FormulaError::Type(format!(
            "mean of {} value",
            other.type_name()
        ))),
    }
}

fn add_numeric(acc: Value, value: &Value) -> FormulaResult<Value> {
    match (acc, value) {
        (Value::Integer(a), Value::Integer(b)) => a
            .checked_add(*b)
            .map(Value::Integer)
            .ok_or_else(|| overflow(BinaryOperator::Add, a, *b)),
        (Value::Integer(a), Value::Float(b)) => Ok(Value::Float(a as f64 + b)),
        (Value::Float(a), Value::Integer(b)) => Ok(Value::Float(a + *b as f64)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (_, other) => Err(FormulaError::Type(format!(
            "cannot sum {} value",
            other.type_name()
        ))),
    }
}

fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        _ => None,
    }
}
