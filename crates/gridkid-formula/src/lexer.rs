//! Formula lexer
//!
//! Turns formula text into an ordered sequence of [`Token`]s. There are two
//! modes:
//!
//! - **Assignment**: text of the form `{A,1}[body]` becomes a single
//!   `CellAssignment` token carrying the body verbatim.
//! - **Expression**: anything else is split on whitespace, and each span is
//!   classified on its own. A span wrapped in double quotes is a string
//!   literal and may contain whitespace.

use crate::error::{FormulaError, FormulaResult};
use gridkid_core::CellAddress;
use lazy_regex::{regex, regex_is_match};
use std::fmt;

/// A byte-offset span in the formula text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Whole-formula assignment
    CellAssignment,

    // Atoms
    CellDereference,
    IntegerPrim,
    FloatPrim,
    BooleanPrim,
    StringPrim,
    LeftParen,
    RightParen,

    // Unary markers
    Not,
    BitNot,
    IntCast,
    FloatCast,

    // Range aggregates
    Max,
    Min,
    Sum,
    Mean,

    // Binary operators
    Exponent,
    Multiply,
    Divide,
    Modulo,
    Addition,
    Subtraction,
    LeftShift,
    RightShift,
    BitAnd,
    BitOr,
    BitXor,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Equals,
    NotEquals,
    LogAnd,
    LogOr,
}

impl TokenKind {
    /// Kinds that parse into a leaf node
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            TokenKind::CellDereference
                | TokenKind::IntegerPrim
                | TokenKind::FloatPrim
                | TokenKind::BooleanPrim
                | TokenKind::StringPrim
        )
    }

    /// Prefix operators taking one operand
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            TokenKind::Not | TokenKind::BitNot | TokenKind::IntCast | TokenKind::FloatCast
        )
    }

    /// Range aggregate keywords
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            TokenKind::Max | TokenKind::Min | TokenKind::Sum | TokenKind::Mean
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text. For string literals, the text between the quotes; for an
    /// assignment, the bracketed body.
    pub source: String,
    pub span: Span,
    /// Target cell, set only on `CellAssignment` tokens
    pub coordinates: Option<CellAddress>,
}

impl Token {
    pub fn new(kind: TokenKind, source: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            source: source.into(),
            span,
            coordinates: None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})@{}..{}",
            self.kind, self.source, self.span.start, self.span.end
        )?;
        if let Some(coords) = self.coordinates {
            write!(f, " -> {}", coords)?;
        }
        Ok(())
    }
}

/// Lex formula text into tokens
///
/// # Example
/// ```rust
/// use gridkid_formula::{lex, TokenKind};
///
/// let tokens = lex("{A,1} + 2").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::CellDereference, TokenKind::Addition, TokenKind::IntegerPrim]
/// );
/// ```
pub fn lex(input: &str) -> FormulaResult<Vec<Token>> {
    if let Some(token) = lex_assignment(input)? {
        return Ok(vec![token]);
    }

    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = input[pos..].chars().next() {
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let rest = &input[pos..];
        let len = if c == '"' {
            rest[1..]
                .find('"')
                .map(|close| close + 2)
                .ok_or_else(|| FormulaError::Lex {
                    text: rest.to_string(),
                    span: Span::new(pos, input.len()),
                })?
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };

        emit_tokens(&rest[..len], pos, &mut tokens)?;
        pos += len;
    }

    Ok(tokens)
}

fn lex_assignment(input: &str) -> FormulaResult<Option<Token>> {
    let Some(caps) = regex!(r"(?s)^\s*(\{[A-Z]+,\s*[0-9]+\})\[(.*)\]\s*$").captures(input) else {
        return Ok(None);
    };
    let (Some(target), Some(body)) = (caps.get(1), caps.get(2)) else {
        return Ok(None);
    };

    let address = CellAddress::parse(target.as_str())?;
    let mut token = Token::new(
        TokenKind::CellAssignment,
        body.as_str(),
        Span::new(body.start(), body.end()),
    );
    token.coordinates = Some(address);
    Ok(Some(token))
}

/// Classify one whitespace-delimited span, pushing one or more tokens
///
/// Unary markers at the front of a span are split off and the remainder is
/// classified again, so `!!True` yields three tokens.
fn emit_tokens(text: &str, start: usize, tokens: &mut Vec<Token>) -> FormulaResult<()> {
    let span = Span::new(start, start + text.len());

    // Atoms
    let atom = if regex_is_match!(r"^\{[A-Z]+,[0-9]+\}$", text) {
        Some(TokenKind::CellDereference)
    } else if regex_is_match!(r"^[0-9]+$", text) {
        Some(TokenKind::IntegerPrim)
    } else if regex_is_match!(r"^[0-9]+\.[0-9]+$", text) {
        Some(TokenKind::FloatPrim)
    } else if text == "True" || text == "False" {
        Some(TokenKind::BooleanPrim)
    } else {
        None
    };
    if let Some(kind) = atom {
        tokens.push(Token::new(kind, text, span));
        return Ok(());
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        tokens.push(Token::new(
            TokenKind::StringPrim,
            &text[1..text.len() - 1],
            span,
        ));
        return Ok(());
    }

    match text {
        "(" => {
            tokens.push(Token::new(TokenKind::LeftParen, text, span));
            return Ok(());
        }
        ")" => {
            tokens.push(Token::new(TokenKind::RightParen, text, span));
            return Ok(());
        }
        _ => {}
    }

    // Unary markers
    if let Some((marker, kind)) = unary_prefix(text) {
        let marker_end = start + marker.len();
        tokens.push(Token::new(kind, marker, Span::new(start, marker_end)));
        let rest = &text[marker.len()..];
        if !rest.is_empty() {
            emit_tokens(rest, marker_end, tokens)?;
        }
        return Ok(());
    }

    let kind = match text {
        // Range aggregates
        "Max" => TokenKind::Max,
        "Min" => TokenKind::Min,
        "Sum" => TokenKind::Sum,
        "Mean" => TokenKind::Mean,

        // Two-character operators
        "**" => TokenKind::Exponent,
        "<<" => TokenKind::LeftShift,
        ">>" => TokenKind::RightShift,
        "<=" => TokenKind::LessThanEquals,
        ">=" => TokenKind::GreaterThanEquals,
        "!=" => TokenKind::NotEquals,
        "==" => TokenKind::Equals,
        "&&" => TokenKind::LogAnd,
        "||" => TokenKind::LogOr,

        // Single-character operators
        "*" => TokenKind::Multiply,
        "/" => TokenKind::Divide,
        "%" => TokenKind::Modulo,
        "+" => TokenKind::Addition,
        "-" => TokenKind::Subtraction,
        "&" => TokenKind::BitAnd,
        "|" => TokenKind::BitOr,
        "^" => TokenKind::BitXor,
        "<" => TokenKind::LessThan,
        ">" => TokenKind::GreaterThan,

        _ => {
            return Err(FormulaError::Lex {
                text: text.to_string(),
                span,
            })
        }
    };

    tokens.push(Token::new(kind, text, span));
    Ok(())
}

fn unary_prefix(text: &str) -> Option<(&'static str, TokenKind)> {
    if text.starts_with('!') && text != "!=" {
        Some(("!", TokenKind::Not))
    } else if text.starts_with('~') {
        Some(("~", TokenKind::BitNot))
    } else if text.starts_with("Int") {
        Some(("Int", TokenKind::IntCast))
    } else if text.starts_with("Float") {
        Some(("Float", TokenKind::FloatCast))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_assignment() {
        let tokens = lex("{A,1}[4 ** 2]").unwrap();
        assert_eq!(tokens.len(), 1);

        let token = &tokens[0];
        assert_eq!(token.kind, TokenKind::CellAssignment);
        assert_eq!(token.source, "4 ** 2");
        assert_eq!(token.coordinates, Some(CellAddress::new(1, 1)));
        assert_eq!(token.span, Span::new(6, 12));
    }

    #[test]
    fn test_lex_assignment_with_space_after_comma() {
        let tokens = lex("{B, 2}[24.3]").unwrap();
        assert_eq!(tokens[0].coordinates, Some(CellAddress::new(2, 2)));
        assert_eq!(tokens[0].source, "24.3");
    }

    #[test]
    fn test_lex_assignment_keeps_body_verbatim() {
        let tokens = lex("{C,3}[ ??? [nested] ]").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CellAssignment);
        assert_eq!(tokens[0].source, " ??? [nested] ");
    }

    #[test]
    fn test_lex_atoms() {
        assert_eq!(
            kinds("{A,1} 42 3.14 True False \"hi\" ( )"),
            vec![
                TokenKind::CellDereference,
                TokenKind::IntegerPrim,
                TokenKind::FloatPrim,
                TokenKind::BooleanPrim,
                TokenKind::BooleanPrim,
                TokenKind::StringPrim,
                TokenKind::LeftParen,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn test_lex_operators() {
        assert_eq!(
            kinds("** * / % + - << >> & | ^ < <= > >= == != && ||"),
            vec![
                TokenKind::Exponent,
                TokenKind::Multiply,
                TokenKind::Divide,
                TokenKind::Modulo,
                TokenKind::Addition,
                TokenKind::Subtraction,
                TokenKind::LeftShift,
                TokenKind::RightShift,
                TokenKind::BitAnd,
                TokenKind::BitOr,
                TokenKind::BitXor,
                TokenKind::LessThan,
                TokenKind::LessThanEquals,
                TokenKind::GreaterThan,
                TokenKind::GreaterThanEquals,
                TokenKind::Equals,
                TokenKind::NotEquals,
                TokenKind::LogAnd,
                TokenKind::LogOr,
            ]
        );
    }

    #[test]
    fn test_lex_spans() {
        let tokens = lex("70  +\t{B,2}").unwrap();
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(spans, vec![Span::new(0, 2), Span::new(4, 5), Span::new(6, 11)]);
    }

    #[test]
    fn test_lex_unary_prefixes_are_split() {
        assert_eq!(
            kinds("!!True"),
            vec![TokenKind::Not, TokenKind::Not, TokenKind::BooleanPrim]
        );
        assert_eq!(kinds("~5"), vec![TokenKind::BitNot, TokenKind::IntegerPrim]);
        assert_eq!(kinds("Int 3.2"), vec![TokenKind::IntCast, TokenKind::FloatPrim]);
        assert_eq!(kinds("Float3"), vec![TokenKind::FloatCast, TokenKind::IntegerPrim]);

        let tokens = lex("!!True").unwrap();
        assert_eq!(tokens[2].span, Span::new(2, 6));
        assert_eq!(tokens[2].source, "True");
    }

    #[test]
    fn test_lex_not_equals_is_not_split() {
        assert_eq!(kinds("1 != 2")[1], TokenKind::NotEquals);
    }

    #[test]
    fn test_lex_aggregates() {
        assert_eq!(
            kinds("Sum {A,1} {B,2}"),
            vec![
                TokenKind::Sum,
                TokenKind::CellDereference,
                TokenKind::CellDereference
            ]
        );
        assert_eq!(kinds("Max Min Mean"), vec![TokenKind::Max, TokenKind::Min, TokenKind::Mean]);
    }

    #[test]
    fn test_lex_string_with_spaces() {
        let tokens = lex("\"hello world\" + \"!\"").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].source, "hello world");
        assert_eq!(tokens[0].span, Span::new(0, 13));
        assert_eq!(tokens[2].source, "!");
    }

    #[test]
    fn test_lex_empty() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("   ").unwrap().is_empty());
    }

    #[test]
    fn test_lex_unknown_character() {
        let err = lex("70 + y").unwrap_err();
        assert_eq!(err.kind(), FormulaErrorKind::Lex);
        assert_eq!(
            err,
            FormulaError::Lex {
                text: "y".into(),
                span: Span::new(5, 6)
            }
        );

        assert_eq!(lex("1+2").unwrap_err().kind(), FormulaErrorKind::Lex);
        assert_eq!(lex("{a,1}").unwrap_err().kind(), FormulaErrorKind::Lex);
        assert_eq!(lex("Integer").unwrap_err().kind(), FormulaErrorKind::Lex);
    }

    #[test]
    fn test_lex_unterminated_string() {
        let err = lex("1 + \"oops").unwrap_err();
        assert_eq!(err.kind(), FormulaErrorKind::Lex);
    }
}
