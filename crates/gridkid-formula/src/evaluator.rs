//! Formula evaluator
//!
//! Walks an [`AstNode`], turning each node into an [`Expr`] over its already
//! evaluated children and evaluating that. Cell dereferences re-enter the
//! whole lex, parse and evaluate pipeline on the referenced cell's text.

use crate::ast::AstNode;
use crate::error::{FormulaError, FormulaResult};
use crate::expr::Expr;
use crate::lexer::{lex, TokenKind};
use crate::operators::{AggregateFunction, BinaryOperator, UnaryOperator};
use crate::parser::parse_tokens;
use crate::value::Value;
use gridkid_core::{CellAddress, Grid};

/// Default limit on nested cell dereferences
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Longest dereference chain followed before giving up
    pub max_depth: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Evaluation context
///
/// Each dereferenced cell is evaluated in a child context that links back to
/// its parent, so the chain of cells currently being resolved is always known.
pub struct EvaluationContext<'a> {
    grid: &'a Grid,
    options: EvaluationOptions,
    /// Cell whose formula this context evaluates
    resolving: Option<CellAddress>,
    parent: Option<&'a EvaluationContext<'a>>,
    depth: usize,
}

impl<'a> EvaluationContext<'a> {
    /// Create a root context with default options
    pub fn new(grid: &'a Grid) -> Self {
        Self::with_options(grid, EvaluationOptions::default())
    }

    pub fn with_options(grid: &'a Grid, options: EvaluationOptions) -> Self {
        Self {
            grid,
            options,
            resolving: None,
            parent: None,
            depth: 0,
        }
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Check whether `address` is being resolved by this context or an ancestor
    pub fn is_resolving(&self, address: CellAddress) -> bool {
        let mut ctx = Some(self);
        while let Some(current) = ctx {
            if current.resolving == Some(address) {
                return true;
            }
            ctx = current.parent;
        }
        false
    }

    /// Evaluate the formula stored at `address`
    pub fn resolve(&self, address: CellAddress) -> FormulaResult<Value> {
        let cell = self.grid.lookup(&address).ok_or_else(|| {
            FormulaError::InvalidCoordinate(format!("no cell at {}", address))
        })?;

        if self.is_resolving(address) {
            return Err(FormulaError::CircularReference(address));
        }
        if self.depth >= self.options.max_depth {
            return Err(FormulaError::DepthLimit(self.options.max_depth));
        }

        let child = EvaluationContext {
            grid: self.grid,
            options: self.options,
            resolving: Some(address),
            parent: Some(self),
            depth: self.depth + 1,
        };

        let tokens = lex(cell.formula())?;
        let ast = parse_tokens(&tokens)?;
        let value = evaluate_ast(&ast, &child)?;
        log::trace!("{} = {}", address, value);
        Ok(value)
    }
}

/// Evaluate a syntax tree
pub fn evaluate_ast(node: &AstNode, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
    match node {
        AstNode::Leaf { kind, source } => evaluate_leaf(*kind, source, ctx),

        AstNode::Unary { op, operand } => {
            let op = UnaryOperator::from_token(*op).ok_or_else(|| failed_to_parse(*op))?;
            let operand = evaluate_ast(operand, ctx)?;
            Expr::unary(op, Expr::Value(operand)).evaluate(ctx)
        }

        AstNode::Binary { op, left, right } => {
            if let Some(function) = AggregateFunction::from_token(*op) {
                let top_left = aggregate_corner(left)?;
                let bottom_right = aggregate_corner(right)?;
                return Expr::aggregate(function, top_left, bottom_right).evaluate(ctx);
            }

            let op = BinaryOperator::from_token(*op).ok_or_else(|| failed_to_parse(*op))?;
            let left = evaluate_ast(left, ctx)?;
            let right = evaluate_ast(right, ctx)?;
            Expr::binary(op, Expr::Value(left), Expr::Value(right)).evaluate(ctx)
        }
    }
}

fn evaluate_leaf(kind: TokenKind, source: &str, ctx: &EvaluationContext<'_>) -> FormulaResult<Value> {
    match kind {
        TokenKind::IntegerPrim => Value::parse_integer(source),
        TokenKind::FloatPrim => Value::parse_float(source),
        TokenKind::BooleanPrim => Value::parse_boolean(source),
        TokenKind::StringPrim => Ok(Value::String(source.to_string())),
        TokenKind::CellDereference => ctx.resolve(CellAddress::parse(source)?),
        other => Err(failed_to_parse(other)),
    }
}

fn aggregate_corner(node: &AstNode) -> FormulaResult<CellAddress> {
    match node {
        AstNode::Leaf {
            kind: TokenKind::CellDereference,
            source,
        } => Ok(CellAddress::parse(source)?),
        other => Err(FormulaError::Parse(format!(
            "range corner must be a cell dereference, got {}",
            other
        ))),
    }
}

fn failed_to_parse(kind: TokenKind) -> FormulaError {
    FormulaError::Parse(format!("failed to parse {} node", kind))
}
