//! Evaluable expression trees
//!
//! [`Expr`] is the typed counterpart of [`AstNode`](crate::AstNode): operators
//! are resolved, literals are already values, and cell references carry
//! decoded coordinates. Expressions can be built by hand and stored in a grid
//! through their [`Display`](fmt::Display) form, which lexes back to the same
//! tree.

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use crate::operators::{self, AggregateFunction, BinaryOperator, UnaryOperator};
use crate::value::Value;
use gridkid_core::{CellAddress, CellRange};
use std::fmt;

/// An evaluable expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Value(Value),

    /// Dereference of another cell
    CellRef(CellAddress),

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Range aggregate
    Aggregate {
        function: AggregateFunction,
        range: CellRange,
    },
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Value(value.into())
    }

    pub fn cell(address: CellAddress) -> Self {
        Expr::CellRef(address)
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn aggregate(
        function: AggregateFunction,
        top_left: CellAddress,
        bottom_right: CellAddress,
    ) -> Self {
        Expr::Aggregate {
            function,
            range: CellRange::new(top_left, bottom_right),
        }
    }

    /// Evaluate against a grid
    ///
    /// Operands are evaluated before the operator checks their variants. Both
    /// operands of `&&` and `||` are always evaluated, even when the left one
    /// already decides the result.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
        match self {
            Expr::Value(value) => Ok(value.clone()),

            Expr::CellRef(address) => ctx.resolve(*address),

            Expr::Unary { op, operand } => {
                let operand = operand.evaluate(ctx)?;
                operators::apply_unary(*op, operand)
            }

            Expr::Binary { op, left, right } => {
                let left = left.evaluate(ctx)?;
                if let Some(decided) = short_circuit(*op, &left) {
                    log::trace!(
                        "'{}' decided by left operand ({}), evaluating right anyway",
                        op,
                        decided
                    );
                }
                let right = right.evaluate(ctx)?;
                operators::apply_binary(*op, left, right)
            }

            Expr::Aggregate { function, range } => evaluate_aggregate(*function, range, ctx),
        }
    }
}

/// The result a logical operator would have from its left operand alone
fn short_circuit(op: BinaryOperator, left: &Value) -> Option<bool> {
    match (op, left) {
        (BinaryOperator::And, Value::Boolean(false)) => Some(false),
        (BinaryOperator::Or, Value::Boolean(true)) => Some(true),
        _ => None,
    }
}

fn evaluate_aggregate(
    function: AggregateFunction,
    range: &CellRange,
    ctx: &EvaluationContext<'_>,
) -> FormulaResult<Value> {
    let mut values = Vec::new();

    // Unoccupied addresses would only fail to resolve, so they are never visited
    for address in ctx.grid().occupied_in(range) {
        match ctx.resolve(address) {
            Ok(value) if value.is_numeric() => values.push(value),
            Ok(value) => log::trace!(
                "{}: skipping {} with {} value",
                function,
                address,
                value.type_name()
            ),
            Err(err) => log::trace!("{}: skipping {}: {}", function, address, err),
        }
    }

    match function {
        AggregateFunction::Mean => {
            let sum = operators::fold_aggregate(AggregateFunction::Sum, &values)?;
            operators::mean(sum, range.span_product())
        }
        _ => operators::fold_aggregate(function, &values),
    }
}

impl fmt::Display for Expr {
    /// Formula text for the expression
    ///
    /// Composite operands are parenthesized so the text parses back to the
    /// same tree. Strings containing a double quote have no formula form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value(value) => write_literal(f, value),
            Expr::CellRef(address) => write!(f, "{}", address),
            Expr::Unary { op, operand } => {
                write!(f, "{} ", op)?;
                write_operand(f, operand)
            }
            Expr::Binary { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right)
            }
            Expr::Aggregate { function, range } => {
                write!(f, "{} {} {}", function, range.start, range.end)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::CellRef(_) => write!(f, "{}", expr),
        Expr::Value(value) if !is_negative(value) => write_literal(f, value),
        _ => write!(f, "( {} )", expr),
    }
}

fn is_negative(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n < 0,
        Value::Float(n) => !n.is_finite() || n.is_sign_negative(),
        _ => false,
    }
}

// There are no signed literals, so negatives are written as subtractions
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Integer(i64::MIN) => write!(f, "( 0 - {} ) - 1", i64::MAX),
        Value::Integer(n) if *n < 0 => write!(f, "0 - {}", n.unsigned_abs()),
        Value::Float(n) if n.is_nan() => f.write_str("0.0 / 0.0"),
        Value::Float(n) if n.is_infinite() && *n > 0.0 => f.write_str("1.0 / 0.0"),
        Value::Float(n) if n.is_infinite() => f.write_str("0.0 - ( 1.0 / 0.0 )"),
        Value::Float(n) if n.is_sign_negative() => write!(f, "0.0 - {}", Value::Float(-n)),
        Value::Boolean(true) => f.write_str("True"),
        Value::Boolean(false) => f.write_str("False"),
        Value::String(s) => write!(f, "\"{}\"", s),
        other => write!(f, "{}", other),
    }
}
