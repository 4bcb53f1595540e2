//! Whole-pipeline tests: statements through `wrapped_eval`, dispatching
//! user-defined functions against the reference expression engine.

use std::sync::atomic::{AtomicU32, Ordering};

use pretty_assertions::assert_eq;
use zeal_eval::{
    CallDispatcher, CallRecord, EvalConfig, EvalError, Evaluator, FuncId, FunctionRegistry,
};
use zeal_store::{LockMode, ScopeId, ScopeStore};
use zeal_value::Value;

const GLOBAL: ScopeId = 1;
const FRAME_BASE: u32 = 100;

struct Func {
    name: &'static str,
    params: &'static [&'static str],
    body: &'static str,
}

/// Minimal embedding host: owns the store, registers script functions,
/// and dispatches them by evaluating their body expression in a fresh
/// call frame.
struct Host {
    store: ScopeStore,
    engine: zeal_expr::Engine,
    funcs: Vec<Func>,
    frames: AtomicU32,
}

impl Host {
    fn new(funcs: Vec<Func>) -> Self {
        Host {
            store: ScopeStore::new(LockMode::Threaded),
            engine: zeal_expr::Engine,
            funcs,
            frames: AtomicU32::new(FRAME_BASE),
        }
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.store, &self.engine, self, self, EvalConfig::default())
    }

    fn run(&self, statement: &str) -> Result<Option<Value>, EvalError> {
        self.evaluator()
            .wrapped_eval(GLOBAL, GLOBAL, statement)
            .map(|r| r.value)
    }
}

impl FunctionRegistry for Host {
    fn lookup(&self, name: &str) -> Option<FuncId> {
        self.funcs
            .iter()
            .position(|f| f.name == name)
            .map(|i| FuncId(i as u32))
    }

    fn param_count(&self, id: FuncId) -> usize {
        self.funcs[id.0 as usize].params.len()
    }
}

impl CallDispatcher for Host {
    fn next_call_frame(&self) -> ScopeId {
        self.frames.fetch_add(1, Ordering::SeqCst)
    }

    fn invoke(&self, record: &CallRecord, args: Vec<Value>) -> Result<(), EvalError> {
        let func = &self.funcs[record.func.0 as usize];
        self.store.create_table(record.call_fs, 8);
        for (param, arg) in func.params.iter().zip(args) {
            self.store.set(record.call_fs, param, arg);
        }
        let result = self
            .evaluator()
            .evaluate(record.call_fs, func.body, true, true);
        self.store.drop_table(record.call_fs);
        if let Some(v) = result? {
            self.store.set(record.caller_fs, record.return_slot, v);
        }
        Ok(())
    }
}

/// Route evaluator tracing to the test output when `RUST_LOG` asks for it.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn arithmetic_host() -> Host {
    init_logging();
    Host::new(vec![
        Func {
            name: "f",
            params: &["x"],
            body: "x + 1",
        },
        Func {
            name: "g",
            params: &["x"],
            body: "x * 2",
        },
    ])
}

#[test]
fn nested_calls_compose() {
    let host = arithmetic_host();
    assert_eq!(host.run("r = f(g(3))").unwrap(), Some(Value::Int(7)));
    assert_eq!(host.store.get(GLOBAL, "r"), Some(Value::Int(7)));
}

#[test]
fn call_frames_come_and_go() {
    let host = arithmetic_host();
    host.run("f(g(1))").unwrap();
    // Both frames were torn down after their calls returned.
    assert_eq!(host.store.scope_len(FRAME_BASE), 0);
    assert_eq!(host.store.scope_len(FRAME_BASE + 1), 0);
}

#[test]
fn parameters_shadow_nothing_in_the_caller() {
    let host = arithmetic_host();
    host.run("x = 50").unwrap();
    host.run("y = f(2)").unwrap();
    // The frame bound its own `x`; the caller's is untouched.
    assert_eq!(host.store.get(GLOBAL, "x"), Some(Value::Int(50)));
    assert_eq!(host.store.get(GLOBAL, "y"), Some(Value::Int(3)));
}

#[test]
fn malformed_call_aborts_the_statement() {
    let host = arithmetic_host();
    assert!(host.run("x = f(1, 2").is_err());
    assert!(matches!(
        host.run("x = f(1, 2)"),
        Err(EvalError::ArgCount { .. })
    ));
    assert_eq!(host.store.get(GLOBAL, "x"), None);
}

#[test]
fn a_short_script_runs_end_to_end() {
    let host = arithmetic_host();
    host.run("total = 0").unwrap();
    host.run("total += f(1)").unwrap();
    host.run("total += g(2)").unwrap();
    host.run("total *= 2").unwrap();
    assert_eq!(host.store.get(GLOBAL, "total"), Some(Value::Int(12)));
}

#[test]
fn interpolation_feeds_call_arguments() {
    let host = arithmetic_host();
    host.run("n = 4").unwrap();
    assert_eq!(host.run("g({n})").unwrap(), Some(Value::Int(8)));
}

#[test]
fn indexed_writes_grow_lists_in_place() {
    let host = arithmetic_host();
    host.store
        .set(GLOBAL, "arr", Value::IntList(vec![1, 2, 3]));
    host.run("arr[10] = 99").unwrap();
    let Some(Value::IntList(items)) = host.store.get(GLOBAL, "arr") else {
        panic!("arr is no longer an int list");
    };
    assert_eq!(items.len(), 18);
    assert_eq!(items[10], 99);
}

#[test]
fn call_results_feed_element_writes() {
    let host = arithmetic_host();
    host.store.set(GLOBAL, "arr", Value::IntList(vec![0, 0]));
    host.run("arr[f(0)] = g(5)").unwrap();
    assert_eq!(
        host.store.get_element(GLOBAL, "arr", "1"),
        Some(Value::Int(10))
    );
}

#[test]
fn interpolated_text_becomes_a_string_variable() {
    let host = arithmetic_host();
    host.run("who = \"world\"").unwrap();
    host.run("greeting = hello {who}").unwrap();
    assert_eq!(
        host.store.get(GLOBAL, "greeting"),
        Some(Value::string("hello world"))
    );
}
