//! Tests for formula evaluation through the interpreter

use gridkid_core::CellAddress;
use gridkid_formula::{
    parse_formula, FormulaError, FormulaErrorKind, Interpreter, Outcome, Value,
};
use pretty_assertions::assert_eq;

fn run(interpreter: &mut Interpreter, text: &str) -> Value {
    match interpreter.parse(text).unwrap() {
        Outcome::Value(value) => value,
        other => panic!("expected a value from {:?}, got {}", text, other),
    }
}

fn error_kind(interpreter: &mut Interpreter, text: &str) -> FormulaErrorKind {
    interpreter.parse(text).unwrap_err().kind()
}

/// Test the precedence ladder end to end
#[test]
fn test_operator_precedence() {
    let mut interpreter = Interpreter::new();

    assert_eq!(run(&mut interpreter, "2 + 3 * 4"), Value::Integer(14));
    assert_eq!(run(&mut interpreter, "2 * 3 ** 2"), Value::Integer(18));
    assert_eq!(run(&mut interpreter, "1 << 2 + 1"), Value::Integer(8));
    assert_eq!(run(&mut interpreter, "6 & 3 ^ 1"), Value::Integer(3));
    assert_eq!(run(&mut interpreter, "4 | 1 < 6"), Value::Boolean(true));
    assert_eq!(run(&mut interpreter, "1 < 2 == 3 < 4"), Value::Boolean(true));
    assert_eq!(
        run(&mut interpreter, "False && True || True"),
        Value::Boolean(true)
    );
}

/// Integer division rounds toward negative infinity
#[test]
fn test_integer_division() {
    let mut interpreter = Interpreter::new();

    assert_eq!(run(&mut interpreter, "7 / 2"), Value::Integer(3));
    assert_eq!(run(&mut interpreter, "( 0 - 7 ) / 2"), Value::Integer(-4));
    assert_eq!(run(&mut interpreter, "( 0 - 7 ) % 2"), Value::Integer(1));
    assert_eq!(run(&mut interpreter, "7.0 / 2.0"), Value::Float(3.5));
}

#[test]
fn test_division_by_zero() {
    let mut interpreter = Interpreter::new();

    assert_eq!(
        error_kind(&mut interpreter, "1 / 0"),
        FormulaErrorKind::DivisionByZero
    );
    assert_eq!(
        error_kind(&mut interpreter, "1 % 0"),
        FormulaErrorKind::DivisionByZero
    );
    assert_eq!(
        run(&mut interpreter, "1.0 / 0.0"),
        Value::Float(f64::INFINITY)
    );
}

/// String cells concatenate, Integer cells sum, mixed cells fail
#[test]
fn test_cell_addition_by_variant() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[\"wowee\"]").unwrap();
    interpreter.parse("{A,2}[\"zowee\"]").unwrap();
    interpreter.parse("{B,1}[5]").unwrap();
    interpreter.parse("{B,2}[56]").unwrap();

    assert_eq!(
        run(&mut interpreter, "{A,1} + {A,2}"),
        Value::String("woweezowee".into())
    );
    assert_eq!(run(&mut interpreter, "{B,1} + {B,2}"), Value::Integer(61));
    assert_eq!(
        error_kind(&mut interpreter, "{A,1} + {B,1}"),
        FormulaErrorKind::InvalidOperand
    );
}

/// Integer and Float cells do not mix
#[test]
fn test_integer_plus_float_cell() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[5]").unwrap();
    interpreter.parse("{B,2}[24.3]").unwrap();

    assert_eq!(run(&mut interpreter, "{B,2}"), Value::Float(24.3));
    assert_eq!(
        error_kind(&mut interpreter, "{A,1} + {B,2}"),
        FormulaErrorKind::InvalidOperand
    );
    assert_eq!(
        run(&mut interpreter, "( Float {A,1} ) + {B,2}"),
        Value::Float(29.3)
    );
    // A cast applies to the whole expression after it
    assert_eq!(
        error_kind(&mut interpreter, "Float {A,1} + {B,2}"),
        FormulaErrorKind::InvalidOperand
    );
}

/// Assignment stores text; the formula is evaluated on every dereference
#[test]
fn test_assignment_is_lazy() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[4 ** 2]").unwrap();
    interpreter.parse("{A,2}[{A,1} + 1]").unwrap();

    assert_eq!(run(&mut interpreter, "{A,2}"), Value::Integer(17));

    interpreter.parse("{A,1}[2]").unwrap();
    assert_eq!(run(&mut interpreter, "{A,2}"), Value::Integer(3));
}

/// A range with one unresolved cell: Sum 14, Max 10, Min 4
#[test]
fn test_range_aggregates_skip_missing_cells() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[4]").unwrap();
    interpreter.parse("{A,3}[10]").unwrap();

    assert_eq!(run(&mut interpreter, "Sum {A,1} {A,3}"), Value::Integer(14));
    assert_eq!(run(&mut interpreter, "Max {A,1} {A,3}"), Value::Integer(10));
    assert_eq!(run(&mut interpreter, "Min {A,1} {A,3}"), Value::Integer(4));
}

#[test]
fn test_range_aggregates_skip_non_numeric_and_failing_cells() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[1.5]").unwrap();
    interpreter.parse("{A,2}[True]").unwrap();
    interpreter.parse("{B,1}[1 / 0]").unwrap();
    interpreter.parse("{B,2}[2]").unwrap();

    assert_eq!(run(&mut interpreter, "Sum {A,1} {B,2}"), Value::Float(3.5));
    assert_eq!(run(&mut interpreter, "Mean {A,1} {B,2}"), Value::Float(3.5));
}

#[test]
fn test_mean_of_degenerate_range_divides_by_zero() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[4]").unwrap();
    interpreter.parse("{A,3}[10]").unwrap();

    assert_eq!(
        error_kind(&mut interpreter, "Mean {A,1} {A,3}"),
        FormulaErrorKind::DivisionByZero
    );
}

#[test]
fn test_empty_range() {
    let mut interpreter = Interpreter::new();

    assert_eq!(run(&mut interpreter, "Sum {A,1} {C,3}"), Value::Integer(0));
    assert_eq!(
        error_kind(&mut interpreter, "Max {A,1} {C,3}"),
        FormulaErrorKind::InvalidOperand
    );
}

#[test]
fn test_nested_not() {
    let mut interpreter = Interpreter::new();

    assert_eq!(
        parse_formula("!!True").unwrap().to_string(),
        "Not(Not(BooleanPrim(True)))"
    );
    assert_eq!(run(&mut interpreter, "!!True"), Value::Boolean(true));
    assert_eq!(run(&mut interpreter, "!True"), Value::Boolean(false));
}

#[test]
fn test_casts() {
    let mut interpreter = Interpreter::new();

    assert_eq!(run(&mut interpreter, "Int 3.2"), Value::Integer(3));
    assert_eq!(run(&mut interpreter, "Float 3"), Value::Float(3.0));
    assert_eq!(error_kind(&mut interpreter, "Int 3"), FormulaErrorKind::Type);
}

#[test]
fn test_type_errors() {
    let mut interpreter = Interpreter::new();

    assert_eq!(error_kind(&mut interpreter, "! 1"), FormulaErrorKind::Type);
    assert_eq!(error_kind(&mut interpreter, "1 && True"), FormulaErrorKind::Type);
    assert_eq!(error_kind(&mut interpreter, "1.0 << 1"), FormulaErrorKind::Type);
}

#[test]
fn test_lex_and_parse_errors() {
    let mut interpreter = Interpreter::new();

    assert_eq!(error_kind(&mut interpreter, "70 + y"), FormulaErrorKind::Lex);
    assert_eq!(error_kind(&mut interpreter, ""), FormulaErrorKind::Parse);
    assert_eq!(error_kind(&mut interpreter, "( 1 + 2"), FormulaErrorKind::Parse);
    assert_eq!(error_kind(&mut interpreter, "1 +"), FormulaErrorKind::Parse);
    assert_eq!(error_kind(&mut interpreter, "1 2"), FormulaErrorKind::Parse);
}

#[test]
fn test_missing_cell() {
    let mut interpreter = Interpreter::new();

    assert_eq!(
        error_kind(&mut interpreter, "{Q,7} + 1"),
        FormulaErrorKind::InvalidCoordinate
    );
}

#[test]
fn test_circular_reference() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[{A,2} + 1]").unwrap();
    interpreter.parse("{A,2}[{A,1} + 1]").unwrap();

    assert_eq!(
        interpreter.parse("{A,1}").unwrap_err(),
        FormulaError::CircularReference(CellAddress::new(1, 1))
    );
}

#[test]
fn test_failed_parse_leaves_grid_unchanged() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{A,1}[1]").unwrap();

    assert!(interpreter.parse("{A,1} + y").is_err());
    assert_eq!(interpreter.grid().len(), 1);
    assert_eq!(run(&mut interpreter, "{A,1}"), Value::Integer(1));
}

#[test]
fn test_error_messages() {
    let mut interpreter = Interpreter::new();

    assert_eq!(
        interpreter.parse("70 + y").unwrap_err().to_string(),
        "Lex error: unknown character y at 5..6"
    );
    assert_eq!(
        interpreter.parse("{A,1}").unwrap_err().to_string(),
        "Invalid coordinates: no cell at {A,1}"
    );
}

/// Aggregates over a tall range only visit the occupied cells
#[test]
fn test_aggregate_over_tall_sparse_range() {
    let mut interpreter = Interpreter::new();
    interpreter.grid_mut().insert(CellAddress::new(1, 1), "4");
    interpreter.grid_mut().insert(CellAddress::new(1, 3), "10");
    interpreter.grid_mut().insert(CellAddress::new(3, 7), "\"ignored\"");

    assert_eq!(
        run(&mut interpreter, "Sum {A,1} {A,20000000}"),
        Value::Integer(14)
    );
    assert_eq!(
        run(&mut interpreter, "Max {ZZ,999999999} {A,1}"),
        Value::Integer(10)
    );
}

/// A corner pair written right to left gives a negative Mean divisor
#[test]
fn test_mean_with_reversed_corners() {
    let mut interpreter = Interpreter::new();
    interpreter.parse("{B,1}[4]").unwrap();
    interpreter.parse("{A,2}[8]").unwrap();

    assert_eq!(run(&mut interpreter, "Mean {B,1} {A,2}"), Value::Integer(-12));
    assert_eq!(run(&mut interpreter, "Mean {A,1} {B,2}"), Value::Integer(12));
}
