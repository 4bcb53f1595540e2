//! Runtime evaluation core for the Zeal scripting language.
//!
//! This crate ties the variable store to expression text: it resolves
//! `{name}` interpolation, detects and executes user-defined function
//! calls embedded in expression text, delegates flat arithmetic/boolean
//! reduction to an [`ExprEngine`], and performs assignment — including
//! into list/map elements and record fields.
//!
//! # Architecture
//!
//! [`Evaluator`] bundles the four collaborators:
//! - the [`zeal_store::ScopeStore`] holding all variable state,
//! - an [`ExprEngine`] for flat, call-free expression text,
//! - a [`CallDispatcher`] that executes registered user-defined functions,
//! - a [`FunctionRegistry`] naming them and their declared arity.
//!
//! The public surface — [`Evaluator::evaluate`], [`Evaluator::interpolate`],
//! [`Evaluator::resolve_assignment`], [`Evaluator::wrapped_eval`] and the
//! store accessors — is the only entry collaborators (debugger, profiler,
//! standard library) may use to read or mutate variable state.

mod assign;
mod calls;
mod config;
mod errors;
mod evaluator;
mod interpolate;
mod traits;

#[cfg(test)]
mod testutil;

pub use assign::ExprResult;
pub use config::EvalConfig;
pub use errors::{EngineError, EvalError};
pub use evaluator::{fast_convert, Evaluator};
pub use traits::{CallDispatcher, CallRecord, ExprEngine, FuncId, FunctionRegistry, RETURN_SLOT};
