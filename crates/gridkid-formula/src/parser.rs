//! Formula parser
//!
//! A recursive descent parser over a token slice, one function per
//! precedence level. All binary levels are left-associative, `**` included.

use crate::ast::AstNode;
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{lex, Token, TokenKind};

/// Parse formula text into an AST
///
/// # Example
/// ```rust
/// use gridkid_formula::parse_formula;
///
/// let ast = parse_formula("1 + 2 * 3").unwrap();
/// assert_eq!(
///     ast.to_string(),
///     "Addition(IntegerPrim(1), Multiply(IntegerPrim(2), IntegerPrim(3)))"
/// );
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<AstNode> {
    let tokens = lex(formula)?;
    parse_tokens(&tokens)
}

/// Parse a token sequence into an AST
///
/// The whole sequence must form one expression; leftover tokens are an error.
pub fn parse_tokens(tokens: &[Token]) -> FormulaResult<AstNode> {
    let mut parser = TokenParser::new(tokens);
    let node = parser.parse_logical_or()?;

    if let Some(token) = parser.peek() {
        return Err(FormulaError::Parse(format!(
            "Unexpected token {} after expression",
            token
        )));
    }

    Ok(node)
}

/// Cursor over an immutable token slice
struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    // === Helper methods ===

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn consume(&mut self) -> FormulaResult<&'a Token> {
        let token = self
            .peek()
            .ok_or_else(|| FormulaError::Parse("Unexpected end of formula".into()))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: TokenKind) -> FormulaResult<&'a Token> {
        match self.peek() {
            Some(token) if token.kind == expected => self.consume(),
            Some(token) => Err(FormulaError::Parse(format!(
                "Expected {}, got {}",
                expected, token
            ))),
            None => Err(FormulaError::Parse(format!(
                "Expected {}, got end of formula",
                expected
            ))),
        }
    }

    /// One left-associative binary level: `operand (op operand)*`
    fn parse_left_assoc(
        &mut self,
        ops: &[TokenKind],
        operand: fn(&mut Self) -> FormulaResult<AstNode>,
    ) -> FormulaResult<AstNode> {
        let mut left = operand(self)?;

        while let Some(kind) = self.peek_kind().filter(|k| ops.contains(k)) {
            self.pos += 1;
            let right = operand(self)?;
            left = AstNode::binary(kind, left, right);
        }

        Ok(left)
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    //  1. Logical or: ||
    //  2. Logical and: &&
    //  3. Equality: ==, !=
    //  4. Relational: <, <=, >, >=
    //  5. Bitwise or: |
    //  6. Bitwise xor: ^
    //  7. Bitwise and: &
    //  8. Shift: <<, >>
    //  9. Additive: +, -
    // 10. Multiplicative: *, /, %
    // 11. Exponent: **
    // 12. Unary: !, ~, Int, Float (operand parsed from level 1)
    // 13. Atom: literals, dereferences, parentheses, aggregates

    fn parse_logical_or(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::LogOr], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::LogAnd], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(
            &[TokenKind::Equals, TokenKind::NotEquals],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(
            &[
                TokenKind::LessThan,
                TokenKind::LessThanEquals,
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEquals,
            ],
            Self::parse_bit_or,
        )
    }

    fn parse_bit_or(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::BitOr], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::BitXor], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::BitAnd], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(
            &[TokenKind::LeftShift, TokenKind::RightShift],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(
            &[TokenKind::Addition, TokenKind::Subtraction],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(
            &[TokenKind::Multiply, TokenKind::Divide, TokenKind::Modulo],
            Self::parse_exponent,
        )
    }

    fn parse_exponent(&mut self) -> FormulaResult<AstNode> {
        self.parse_left_assoc(&[TokenKind::Exponent], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> FormulaResult<AstNode> {
        match self.peek_kind() {
            Some(kind) if kind.is_unary() => {
                self.pos += 1;
                // The operand is a full expression, not just the next atom
                let operand = self.parse_logical_or()?;
                Ok(AstNode::unary(kind, operand))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> FormulaResult<AstNode> {
        let token = self.consume()?;

        match token.kind {
            kind if kind.is_atom() => Ok(AstNode::leaf(kind, token.source.as_str())),

            TokenKind::LeftParen => {
                let node = self.parse_logical_or()?;
                self.expect(TokenKind::RightParen)
                    .map_err(|e| FormulaError::Parse(format!("Unmatched '(': {}", e)))?;
                Ok(node)
            }

            kind if kind.is_aggregate() => {
                let top_left = self.expect(TokenKind::CellDereference)?;
                let bottom_right = self.expect(TokenKind::CellDereference)?;
                Ok(AstNode::binary(
                    kind,
                    AstNode::leaf(TokenKind::CellDereference, top_left.source.as_str()),
                    AstNode::leaf(TokenKind::CellDereference, bottom_right.source.as_str()),
                ))
            }

            TokenKind::CellAssignment => Err(FormulaError::Parse(
                "Cell assignment must be the whole formula".into(),
            )),

            _ => Err(FormulaError::Parse(format!("Unexpected token {}", token))),
        }
    }
}
