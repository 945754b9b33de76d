//! Formula syntax tree
//!
//! Nodes are tagged with the [`TokenKind`] they were built from. Leaves keep
//! their source text; it is only converted to a value at evaluation time.

use crate::lexer::TokenKind;
use std::fmt;

/// A node of the parsed formula
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Literal or cell dereference
    Leaf { kind: TokenKind, source: String },

    /// Prefix operator applied to one operand
    Unary { op: TokenKind, operand: Box<AstNode> },

    /// Binary operator, or a range aggregate over two dereference leaves
    Binary {
        op: TokenKind,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

impl AstNode {
    pub fn leaf(kind: TokenKind, source: impl Into<String>) -> Self {
        AstNode::Leaf {
            kind,
            source: source.into(),
        }
    }

    pub fn unary(op: TokenKind, operand: AstNode) -> Self {
        AstNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: TokenKind, left: AstNode, right: AstNode) -> Self {
        AstNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The node's tag
    pub fn tag(&self) -> TokenKind {
        match self {
            AstNode::Leaf { kind, .. } => *kind,
            AstNode::Unary { op, .. } | AstNode::Binary { op, .. } => *op,
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Leaf { kind, source } => write!(f, "{}({})", kind, source),
            AstNode::Unary { op, operand } => write!(f, "{}({})", op, operand),
            AstNode::Binary { op, left, right } => write!(f, "{}({}, {})", op, left, right),
        }
    }
}
