use pretty_assertions::assert_eq;
use zeal_eval::{EngineError, ExprEngine};
use zeal_store::{LockMode, ScopeId, ScopeStore};
use zeal_value::{Kind, RecordField, RecordValue, Value};

use crate::Engine;

const FS: ScopeId = 1;

fn store() -> ScopeStore {
    ScopeStore::new(LockMode::SingleThread)
}

fn eval(store: &ScopeStore, text: &str) -> Result<Option<Value>, EngineError> {
    Engine.eval(store, FS, text)
}

fn eval_ok(store: &ScopeStore, text: &str) -> Value {
    eval(store, text).unwrap().unwrap()
}

#[test]
fn empty_input_is_no_result() {
    assert_eq!(eval(&store(), "").unwrap(), None);
    assert_eq!(eval(&store(), "   ").unwrap(), None);
}

#[test]
fn literals() {
    let s = store();
    assert_eq!(eval_ok(&s, "42"), Value::Int(42));
    assert_eq!(eval_ok(&s, "3.5"), Value::Float(3.5));
    assert_eq!(eval_ok(&s, "\"hi\""), Value::string("hi"));
    assert_eq!(eval_ok(&s, "true"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "false"), Value::Bool(false));
}

#[test]
fn oversized_integer_literal_becomes_uint() {
    assert_eq!(
        eval_ok(&store(), "18446744073709551615"),
        Value::Uint(u64::MAX)
    );
}

#[test]
fn precedence_and_grouping() {
    let s = store();
    assert_eq!(eval_ok(&s, "1 + 2 * 3"), Value::Int(7));
    assert_eq!(eval_ok(&s, "(1 + 2) * 3"), Value::Int(9));
    assert_eq!(eval_ok(&s, "10 - 4 - 3"), Value::Int(3));
    assert_eq!(eval_ok(&s, "20 / 4 / 5"), Value::Int(1));
    assert_eq!(eval_ok(&s, "7 % 3"), Value::Int(1));
}

#[test]
fn unary_operators() {
    let s = store();
    assert_eq!(eval_ok(&s, "-5"), Value::Int(-5));
    assert_eq!(eval_ok(&s, "- -5"), Value::Int(5));
    assert_eq!(eval_ok(&s, "-2.5"), Value::Float(-2.5));
    assert_eq!(eval_ok(&s, "!true"), Value::Bool(false));
    assert_eq!(eval_ok(&s, "-5 + 3"), Value::Int(-2));
}

#[test]
fn mixed_numeric_arithmetic_promotes_to_float() {
    let s = store();
    assert_eq!(eval_ok(&s, "1 + 0.5"), Value::Float(1.5));
    assert_eq!(eval_ok(&s, "3.0 * 2"), Value::Float(6.0));
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval_ok(&store(), "\"foo\" + \"bar\""),
        Value::string("foobar")
    );
}

#[test]
fn comparisons() {
    let s = store();
    assert_eq!(eval_ok(&s, "1 < 2"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "2 <= 2"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "2 > 3"), Value::Bool(false));
    assert_eq!(eval_ok(&s, "1.5 >= 1"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "\"a\" < \"b\""), Value::Bool(true));
    assert_eq!(eval_ok(&s, "1 == 1.0"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "1 != 2"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "\"x\" == \"x\""), Value::Bool(true));
}

#[test]
fn boolean_connectives() {
    let s = store();
    assert_eq!(eval_ok(&s, "true && false"), Value::Bool(false));
    assert_eq!(eval_ok(&s, "true || false"), Value::Bool(true));
    assert_eq!(eval_ok(&s, "1 < 2 && 2 < 3"), Value::Bool(true));
}

#[test]
fn variables_resolve_from_the_store() {
    let s = store();
    s.set(FS, "x", Value::Int(10));
    s.set(FS, "name", Value::string("zeal"));
    assert_eq!(eval_ok(&s, "x * 2"), Value::Int(20));
    assert_eq!(eval_ok(&s, "name + \"!\""), Value::string("zeal!"));
}

#[test]
fn unknown_variable_errors() {
    assert_eq!(
        eval(&store(), "missing + 1"),
        Err(EngineError::UnknownIdent("missing".to_string()))
    );
}

#[test]
fn integer_division_by_zero() {
    assert_eq!(eval(&store(), "1 / 0"), Err(EngineError::DivisionByZero));
    assert_eq!(eval(&store(), "1 % 0"), Err(EngineError::DivisionByZero));
}

#[test]
fn integer_overflow_is_reported() {
    assert_eq!(
        eval(&store(), "9223372036854775807 + 1"),
        Err(EngineError::Overflow("+"))
    );
}

#[test]
fn kind_mismatch_is_reported() {
    assert_eq!(
        eval(&store(), "1 && true"),
        Err(EngineError::KindMismatch {
            op: "&&".to_string(),
            left: Kind::Int,
            right: Kind::Bool,
        })
    );
}

#[test]
fn trailing_tokens_are_a_parse_error() {
    assert!(matches!(
        eval(&store(), "1 2"),
        Err(EngineError::Parse(_))
    ));
}

#[test]
fn list_and_map_element_access() {
    let s = store();
    s.set(FS, "xs", Value::IntList(vec![10, 20, 30]));
    let mut m = rustc_hash_map();
    m.insert("k".to_string(), Value::Int(7));
    s.set(FS, "m", Value::Map(m));
    assert_eq!(eval_ok(&s, "xs[1]"), Value::Int(20));
    assert_eq!(eval_ok(&s, "xs[1 + 1]"), Value::Int(30));
    assert_eq!(eval_ok(&s, "m[\"k\"]"), Value::Int(7));
    assert!(matches!(
        eval(&s, "xs[9]"),
        Err(EngineError::NoElement { .. })
    ));
}

#[test]
fn string_indexing_yields_one_character() {
    let s = store();
    s.set(FS, "word", Value::string("abc"));
    assert_eq!(eval_ok(&s, "word[2]"), Value::string("c"));
}

#[test]
fn record_field_access() {
    let s = store();
    let rec = RecordValue::new(
        "Point",
        vec![
            RecordField {
                name: "x".to_string(),
                kind: Kind::Int,
                value: Value::Int(3),
            },
            RecordField {
                name: "y".to_string(),
                kind: Kind::Int,
                value: Value::Int(4),
            },
        ],
    )
    .unwrap();
    s.set(FS, "p", Value::Record(rec));
    assert_eq!(eval_ok(&s, "p.x + p.y"), Value::Int(7));
    assert_eq!(eval_ok(&s, "p[\"y\"]"), Value::Int(4));
    assert_eq!(eval_ok(&s, "p[1]"), Value::Int(4));
}

fn rustc_hash_map() -> rustc_hash::FxHashMap<String, Value> {
    rustc_hash::FxHashMap::default()
}
