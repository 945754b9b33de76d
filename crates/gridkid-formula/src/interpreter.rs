//! Formula interpreter
//!
//! Owns a [`Grid`] and runs formula text against it: assignments store text
//! in a cell, everything else is evaluated to a [`Value`].

use crate::ast::AstNode;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate_ast, EvaluationContext, EvaluationOptions};
use crate::expr::Expr;
use crate::lexer::{lex, TokenKind};
use crate::parser::parse_tokens;
use crate::value::Value;
use gridkid_core::{Cell, CellAddress, Grid};
use std::fmt;

/// Result of running one piece of formula text
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The text was an assignment; the formula was stored unevaluated
    Assigned {
        address: CellAddress,
        formula: String,
    },
    /// The text was an expression and evaluated to this value
    Value(Value),
}

impl Outcome {
    /// The computed value, if the text was an expression
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Assigned { .. } => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Assigned { address, formula } => {
                write!(f, "Assigned {} => {}", address, formula)
            }
            Outcome::Value(value) => write!(f, "{}", value),
        }
    }
}

/// Formula interpreter over a grid
///
/// # Example
/// ```rust
/// use gridkid_formula::{Interpreter, Value};
///
/// let mut interpreter = Interpreter::new();
/// interpreter.parse("{A,1}[4 ** 2]").unwrap();
///
/// let outcome = interpreter.parse("{A,1} + 1").unwrap();
/// assert_eq!(outcome.value(), Some(&Value::Integer(17)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    grid: Grid,
    options: EvaluationOptions,
}

impl Interpreter {
    /// Create an interpreter over an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// A root evaluation context over this interpreter's grid
    pub fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext::with_options(&self.grid, self.options)
    }

    /// Run formula text
    ///
    /// An assignment such as `{A,1}[4 ** 2]` stores its body in the grid
    /// without evaluating it. Any other text is parsed and evaluated.
    pub fn parse(&mut self, text: &str) -> FormulaResult<Outcome> {
        let tokens = lex(text)?;
        log::debug!(
            "tokens: [{}]",
            tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
        );

        if let [token] = tokens.as_slice() {
            if let (TokenKind::CellAssignment, Some(address)) = (token.kind, token.coordinates) {
                self.grid.insert(address, token.source.as_str());
                log::debug!("stored {} => {}", address, token.source);
                return Ok(Outcome::Assigned {
                    address,
                    formula: token.source.clone(),
                });
            }
        }

        let ast = parse_tokens(&tokens)?;
        log::debug!("ast: {}", ast);
        let value = evaluate_ast(&ast, &self.context())?;
        log::debug!("value: {}", value);
        Ok(Outcome::Value(value))
    }

    /// Evaluate expression text without changing the grid
    ///
    /// Assignment text is rejected as a parse error.
    pub fn evaluate(&self, text: &str) -> FormulaResult<Value> {
        let tokens = lex(text)?;
        let ast = parse_tokens(&tokens)?;
        self.evaluate_ast(&ast)
    }

    /// Evaluate an already parsed syntax tree
    pub fn evaluate_ast(&self, ast: &AstNode) -> FormulaResult<Value> {
        evaluate_ast(ast, &self.context())
    }

    pub fn evaluate_expr(&self, expr: &Expr) -> FormulaResult<Value> {
        expr.evaluate(&self.context())
    }

    /// Store an expression in a cell as formula text
    ///
    /// Returns the cell previously at `address`, if any.
    pub fn store(&mut self, address: CellAddress, expr: &Expr) -> Option<Cell> {
        self.grid.insert(address, expr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaErrorKind;
    use crate::operators::{AggregateFunction, BinaryOperator};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assignment_stores_text_unevaluated() {
        let mut interpreter = Interpreter::new();
        let outcome = interpreter.parse("{A,1}[4 ** 2]").unwrap();

        assert_eq!(
            outcome,
            Outcome::Assigned {
                address: CellAddress::new(1, 1),
                formula: "4 ** 2".into()
            }
        );
        assert_eq!(outcome.to_string(), "Assigned {A,1} => 4 ** 2");
        assert_eq!(
            interpreter.grid().lookup(&CellAddress::new(1, 1)).map(|c| c.formula()),
            Some("4 ** 2")
        );
        assert_eq!(interpreter.evaluate("{A,1}").unwrap(), Value::Integer(16));
    }

    #[test]
    fn test_assignment_of_broken_formula_succeeds() {
        let mut interpreter = Interpreter::new();
        interpreter.parse("{A,1}[70 + y]").unwrap();
        assert_eq!(
            interpreter.parse("{A,1}").unwrap_err().kind(),
            FormulaErrorKind::Lex
        );
    }

    #[test]
    fn test_reassignment_replaces_formula() {
        let mut interpreter = Interpreter::new();
        interpreter.parse("{A,1}[1]").unwrap();
        interpreter.parse("{A,1}[2]").unwrap();
        assert_eq!(interpreter.evaluate("{A,1}").unwrap(), Value::Integer(2));
        assert_eq!(interpreter.grid().len(), 1);
    }

    #[test]
    fn test_parse_expression() {
        let mut interpreter = Interpreter::new();
        let outcome = interpreter.parse("5 + 56").unwrap();
        assert_eq!(outcome, Outcome::Value(Value::Integer(61)));
        assert_eq!(outcome.to_string(), "61");
    }

    #[test]
    fn test_evaluate_rejects_assignment() {
        let interpreter = Interpreter::new();
        assert_eq!(
            interpreter.evaluate("{A,1}[1]").unwrap_err().kind(),
            FormulaErrorKind::Parse
        );
    }

    #[test]
    fn test_store_expression() {
        let mut interpreter = Interpreter::new();
        interpreter.parse("{A,1}[4]").unwrap();
        interpreter.parse("{A,2}[10]").unwrap();

        let expr = Expr::binary(
            BinaryOperator::Multiply,
            Expr::aggregate(
                AggregateFunction::Sum,
                CellAddress::new(1, 1),
                CellAddress::new(1, 2),
            ),
            Expr::value(-2),
        );
        interpreter.store(CellAddress::new(2, 1), &expr);

        assert_eq!(
            interpreter.grid().lookup(&CellAddress::new(2, 1)).map(|c| c.formula()),
            Some("( Sum {A,1} {A,2} ) * ( 0 - 2 )")
        );
        assert_eq!(interpreter.evaluate("{B,1}").unwrap(), Value::Integer(-28));
        assert_eq!(interpreter.evaluate_expr(&expr).unwrap(), Value::Integer(-28));
    }

    #[test]
    fn test_options_are_applied() {
        let mut interpreter =
            Interpreter::new().with_options(EvaluationOptions { max_depth: 1 });
        interpreter.parse("{A,1}[1]").unwrap();
        interpreter.parse("{A,2}[{A,1}]").unwrap();

        assert_eq!(interpreter.evaluate("{A,1}").unwrap(), Value::Integer(1));
        assert_eq!(
            interpreter.evaluate("{A,2}").unwrap_err().kind(),
            FormulaErrorKind::DepthLimit
        );
    }
}
