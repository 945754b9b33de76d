//! # gridkid-formula
//!
//! The gridkid formula language.
//!
//! Formula text goes through three stages:
//! - [`lex`] splits it into [`Token`]s
//! - [`parse_tokens`] builds an [`AstNode`] tree by precedence climbing
//! - [`evaluate_ast`] walks the tree against a [`Grid`](gridkid_core::Grid),
//!   producing a [`Value`]
//!
//! Cells store formula text, not trees. Dereferencing a cell runs its text
//! through all three stages again.
//!
//! ## Example
//!
//! ```rust
//! use gridkid_formula::{Interpreter, Value};
//!
//! let mut interpreter = Interpreter::new();
//! interpreter.parse("{A,1}[\"wowee\"]").unwrap();
//! interpreter.parse("{A,2}[\"zowee\"]").unwrap();
//!
//! let value = interpreter.evaluate("{A,1} + {A,2}").unwrap();
//! assert_eq!(value, Value::String("woweezowee".into()));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod interpreter;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod value;

pub use ast::AstNode;
pub use error::{FormulaError, FormulaErrorKind, FormulaResult};
pub use evaluator::{evaluate_ast, EvaluationContext, EvaluationOptions, DEFAULT_MAX_DEPTH};
pub use expr::Expr;
pub use interpreter::{Interpreter, Outcome};
pub use lexer::{lex, Span, Token, TokenKind};
pub use operators::{AggregateFunction, BinaryOperator, UnaryOperator};
pub use parser::{parse_formula, parse_tokens};
pub use value::Value;
