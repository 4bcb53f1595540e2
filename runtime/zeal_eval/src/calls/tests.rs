use pretty_assertions::assert_eq;
use zeal_store::ScopeId;
use zeal_value::Value;

use zeal_eval::{EvalError, RETURN_SLOT};

use crate::testutil::{arithmetic_funcs, Func, Script};

const FS: ScopeId = 1;

#[test]
fn nested_calls_resolve_innermost_first() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    // g(3) = 6, then f(6) = 7.
    assert_eq!(
        ev.evaluate(FS, "f(g(3))", true, true).unwrap(),
        Some(Value::Int(7))
    );
}

#[test]
fn argument_expressions_evaluate_in_the_caller_scope() {
    let script = Script::new(arithmetic_funcs());
    script.store().set(FS, "x", Value::Int(5));
    let ev = script.evaluator();
    assert_eq!(
        ev.evaluate(FS, "f(x + 1)", true, true).unwrap(),
        Some(Value::Int(7))
    );
}

#[test]
fn too_many_arguments_is_fatal() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    assert_eq!(
        ev.evaluate(FS, "f(1, 2)", true, true),
        Err(EvalError::ArgCount {
            name: "f".to_string(),
            max: 1,
            got: 2,
        })
    );
}

#[test]
fn fewer_arguments_than_declared_is_allowed() {
    let mut funcs = arithmetic_funcs();
    funcs.push(Func {
        name: "h",
        params: &["a", "b", "c"],
        body: Some("a + b"),
    });
    let script = Script::new(funcs);
    let ev = script.evaluator();
    assert_eq!(
        ev.evaluate(FS, "h(1, 2)", true, true).unwrap(),
        Some(Value::Int(3))
    );
}

#[test]
fn empty_argument_term_is_fatal() {
    let mut funcs = arithmetic_funcs();
    funcs.push(Func {
        name: "h",
        params: &["a", "b", "c"],
        body: Some("a"),
    });
    let script = Script::new(funcs);
    let ev = script.evaluator();
    assert!(matches!(
        ev.evaluate(FS, "h(1, , 2)", true, true),
        Err(EvalError::Syntax { .. })
    ));
}

#[test]
fn unterminated_parameter_list_is_fatal() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    assert!(matches!(
        ev.evaluate(FS, "f(1", true, true),
        Err(EvalError::Syntax { .. })
    ));
}

#[test]
fn unregistered_names_are_not_call_sites() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    // `(3)` groups, `q` is no function: the engine sees a plain
    // expression and reports the unknown variable.
    assert!(matches!(
        ev.evaluate(FS, "q(3)", true, true),
        Err(EvalError::Engine(_))
    ));
}

#[test]
fn procedure_call_leaves_no_value_behind() {
    let script = Script::new(vec![Func {
        name: "p",
        params: &["x"],
        body: None,
    }]);
    let ev = script.evaluator();
    assert_eq!(ev.evaluate(FS, "p(1)", true, false).unwrap(), None);
    assert_eq!(script.store().get(FS, RETURN_SLOT), None);
}

#[test]
fn return_slot_is_cleared_after_reading() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    assert_eq!(
        ev.evaluate(FS, "f(1)", true, true).unwrap(),
        Some(Value::Int(2))
    );
    assert_eq!(script.store().get(FS, RETURN_SLOT), None);
}

#[test]
fn string_results_requote_inside_larger_expressions() {
    let script = Script::new(vec![Func {
        name: "shout",
        params: &["s"],
        body: Some("s + \"!\""),
    }]);
    let ev = script.evaluator();
    assert_eq!(
        ev.evaluate(FS, "shout(\"hi\") + \"?\"", true, true).unwrap(),
        Some(Value::string("hi!?"))
    );
}

#[test]
fn call_frames_are_torn_down() {
    let script = Script::new(arithmetic_funcs());
    let ev = script.evaluator();
    ev.evaluate(FS, "f(1)", true, true).unwrap();
    // Frames allocate upward from 100; the first one is gone again.
    assert_eq!(script.store().scope_len(100), 0);
}

#[test]
fn caller_variables_are_not_visible_in_the_frame() {
    let script = Script::new(vec![Func {
        name: "peek",
        params: &["x"],
        body: Some("hidden + x"),
    }]);
    script.store().set(FS, "hidden", Value::Int(9));
    let ev = script.evaluator();
    assert!(matches!(
        ev.evaluate(FS, "peek(1)", true, true),
        Err(EvalError::Engine(_))
    ));
}

#[test]
fn non_finite_results_cannot_splice_into_expressions() {
    let script = Script::new(vec![Func {
        name: "square",
        params: &["x"],
        body: Some("x * x"),
    }]);
    script.store().set(FS, "huge", Value::Float(f64::MAX));
    let ev = script.evaluator();
    // As the whole statement the result passes straight through.
    assert_eq!(
        ev.evaluate(FS, "square(huge)", true, true).unwrap(),
        Some(Value::Float(f64::INFINITY))
    );
    // Spliced into a larger expression there is no literal to render.
    assert_eq!(
        ev.evaluate(FS, "square(huge) + 1", true, true),
        Err(EvalError::NonFinite {
            value: f64::INFINITY,
        })
    );
}
