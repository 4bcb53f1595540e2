//! Shared scaffolding for the crate's unit tests: a store wired to the
//! reference expression engine, with a scriptable function set.

use std::sync::atomic::{AtomicU32, Ordering};

use zeal_store::{LockMode, ScopeId, ScopeStore};
use zeal_value::Value;

// Imports go through the externally built `zeal_eval` (self
// dev-dependency) rather than `crate::` so that the trait instances
// match the ones `zeal_expr::Engine` implements.
use zeal_eval::{
    CallDispatcher, CallRecord, EvalConfig, EvalError, Evaluator, FuncId, FunctionRegistry,
};

/// One scriptable function: named parameters plus a body expression.
/// A `None` body models a procedure that produces no return value.
pub(crate) struct Func {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub body: Option<&'static str>,
}

/// Test harness owning the store, the reference engine, and a function
/// set it both registers and dispatches.
pub(crate) struct Script {
    store: ScopeStore,
    engine: zeal_expr::Engine,
    funcs: Vec<Func>,
    frames: AtomicU32,
}

impl Script {
    pub fn new(funcs: Vec<Func>) -> Self {
        Script {
            store: ScopeStore::new(LockMode::Threaded),
            engine: zeal_expr::Engine,
            funcs,
            // Call frames land well clear of the test scopes.
            frames: AtomicU32::new(100),
        }
    }

    pub fn empty() -> Self {
        Script::new(Vec::new())
    }

    pub fn store(&self) -> &ScopeStore {
        &self.store
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.store, &self.engine, self, self, EvalConfig::default())
    }

    pub fn evaluator_with(&self, config: EvalConfig) -> Evaluator<'_> {
        Evaluator::new(&self.store, &self.engine, self, self, config)
    }
}

impl FunctionRegistry for Script {
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

impl CallDispatcher for Script {
    fn next_call_frame(&self) -> ScopeId {
        self.frames.fetch_add(1, Ordering::SeqCst)
    }

    fn invoke(&self, record: &CallRecord, args: Vec<Value>) -> Result<(), EvalError> {
        let func = &self.funcs[record.func.0 as usize];
        self.store.create_table(record.call_fs, 8);
        for (param, arg) in func.params.iter().zip(args) {
            self.store.set(record.call_fs, param, arg);
        }
        let result = match func.body {
            Some(body) => self.evaluator().evaluate(record.call_fs, body, true, true),
            None => Ok(None),
        };
        self.store.drop_table(record.call_fs);
        if let Some(v) = result? {
            self.store.set(record.caller_fs, record.return_slot, v);
        }
        Ok(())
    }
}

/// The standard two-function set used across call tests:
/// `f(x) = x + 1` and `g(x) = x * 2`.
pub(crate) fn arithmetic_funcs() -> Vec<Func> {
    vec![
        Func {
            name: "f",
            params: &["x"],
            body: Some("x + 1"),
        },
        Func {
            name: "g",
            params: &["x"],
            body: Some("x * 2"),
        },
    ]
}
