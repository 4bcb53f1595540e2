//! Collaborator contracts the evaluation core consumes.

use zeal_store::{ScopeId, ScopeStore};
use zeal_value::Value;

use crate::errors::{EngineError, EvalError};

/// The well-known variable a user-defined call leaves its return value
/// in, within the caller's scope.
pub const RETURN_SLOT: &str = "@temp";

/// Identifier of a registered user-defined (script) function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// One pending user-defined call: the callee, the freshly allocated
/// call-frame scope, the caller's scope, and the return slot name.
#[derive(Clone, Debug)]
pub struct CallRecord {
    pub func: FuncId,
    pub call_fs: ScopeId,
    pub caller_fs: ScopeId,
    pub return_slot: &'static str,
}

/// Grammar-level evaluator for flat, call-free expression text.
///
/// Purely functional with respect to variables: it reads the store, it
/// never writes it. Returns `Ok(None)` for empty input.
pub trait ExprEngine {
    fn eval(
        &self,
        store: &ScopeStore,
        fs: ScopeId,
        text: &str,
    ) -> Result<Option<Value>, EngineError>;
}

/// Executes a registered user-defined function synchronously.
///
/// `invoke` binds the arguments into `record.call_fs`, runs the function
/// body to completion, and leaves the return value (if any) in
/// `record.return_slot` within `record.caller_fs`. The call-frame
/// lifecycle — creating and tearing down the frame's scope storage — is
/// the dispatcher's responsibility.
pub trait CallDispatcher {
    /// Allocate a fresh call-frame scope id.
    fn next_call_frame(&self) -> ScopeId;

    fn invoke(&self, record: &CallRecord, args: Vec<Value>) -> Result<(), EvalError>;
}

/// Names the user-defined functions and their declared arity. Standard
/// library and grammar builtins are *not* in this registry; the call
/// resolver only treats registered names as call sites.
pub trait FunctionRegistry {
    fn lookup(&self, name: &str) -> Option<FuncId>;

    /// Declared parameter count; calls may pass fewer arguments, never
    /// more.
    fn param_count(&self, id: FuncId) -> usize;
}
