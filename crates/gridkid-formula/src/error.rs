//! Formula error types

use crate::lexer::Span;
use gridkid_core::CellAddress;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while lexing, parsing or evaluating a formula
///
/// None of these are recovered from locally; they propagate to the caller of
/// [`Interpreter::parse`](crate::Interpreter::parse). The one exception is
/// range aggregation, which skips cells that fail to resolve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Unrecognized token text
    #[error("Lex error: unknown character {text} at {}..{}", .span.start, .span.end)]
    Lex { text: String, span: Span },

    /// Malformed token stream
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operand variant not accepted by the operation
    #[error("Type error: {0}")]
    Type(String),

    /// Operand variants that cannot be combined
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Dereference of an address with no cell
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinate(String),

    /// Integer division, integer modulo or mean with a zero divisor
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Integer result out of range
    #[error("Integer overflow: {0}")]
    Overflow(String),

    /// A cell that (indirectly) dereferences itself
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(CellAddress),

    /// Dereference chain longer than the configured limit
    #[error("Dereference depth limit of {0} exceeded")]
    DepthLimit(usize),
}

/// The kind of a [`FormulaError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaErrorKind {
    Lex,
    Parse,
    Type,
    InvalidOperand,
    InvalidCoordinate,
    DivisionByZero,
    Overflow,
    CircularReference,
    DepthLimit,
}

impl FormulaError {
    /// The error's kind
    pub fn kind(&self) -> FormulaErrorKind {
        match self {
            FormulaError::Lex { .. } => FormulaErrorKind::Lex,
            FormulaError::Parse(_) => FormulaErrorKind::Parse,
            FormulaError::Type(_) => FormulaErrorKind::Type,
            FormulaError::InvalidOperand(_) => FormulaErrorKind::InvalidOperand,
            FormulaError::InvalidCoordinate(_) => FormulaErrorKind::InvalidCoordinate,
            FormulaError::DivisionByZero(_) => FormulaErrorKind::DivisionByZero,
            FormulaError::Overflow(_) => FormulaErrorKind::Overflow,
            FormulaError::CircularReference(_) => FormulaErrorKind::CircularReference,
            FormulaError::DepthLimit(_) => FormulaErrorKind::DepthLimit,
        }
    }
}

impl From<gridkid_core::Error> for FormulaError {
    fn from(err: gridkid_core::Error) -> Self {
        FormulaError::InvalidCoordinate(err.to_string())
    }
}
