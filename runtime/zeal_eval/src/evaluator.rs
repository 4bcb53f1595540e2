//! Top-level expression evaluation entry point.

use zeal_store::{ScopeId, ScopeStore};
use zeal_value::Value;

use crate::calls::ResolvedTok;
use crate::config::EvalConfig;
use crate::errors::EvalError;
use crate::traits::{CallDispatcher, ExprEngine, FunctionRegistry};

/// The evaluation core: variable store plus the three external
/// collaborators, bundled behind the only entry points other components
/// are permitted to call.
pub struct Evaluator<'a> {
    pub(crate) store: &'a ScopeStore,
    pub(crate) engine: &'a dyn ExprEngine,
    pub(crate) dispatcher: &'a dyn CallDispatcher,
    pub(crate) registry: &'a dyn FunctionRegistry,
    pub(crate) config: EvalConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        store: &'a ScopeStore,
        engine: &'a dyn ExprEngine,
        dispatcher: &'a dyn CallDispatcher,
        registry: &'a dyn FunctionRegistry,
        config: EvalConfig,
    ) -> Self {
        Evaluator {
            store,
            engine,
            dispatcher,
            registry,
            config,
        }
    }

    pub fn store(&self) -> &ScopeStore {
        self.store
    }

    /// Evaluate one expression in scope `fs`.
    ///
    /// Optionally interpolates first, reduces any user-defined calls in
    /// the text, then hands the flat remainder to the expression engine.
    /// `Ok(None)` means "no result" and is only possible when
    /// `should_error` is false; with `should_error` set, a miss becomes
    /// a fatal [`EvalError`].
    ///
    /// Fallbacks: an engine error on lexically numeric text yields a
    /// last-resort integer-then-float parse, and a miss or error on text
    /// that interpolation changed yields the interpolated text as a
    /// string literal.
    pub fn evaluate(
        &self,
        fs: ScopeId,
        text: &str,
        interpolate_first: bool,
        should_error: bool,
    ) -> Result<Option<Value>, EvalError> {
        let (cooked, changed) = if interpolate_first {
            self.interpolate(fs, text)
        } else {
            (text.to_string(), false)
        };

        let flat = if has_call_site(&cooked) {
            let toks = zeal_lexer::tokenize(&cooked)?;
            let resolved = self.resolve_calls(fs, &toks)?;
            if let [ResolvedTok::Value(v)] = resolved.as_slice() {
                // The whole expression reduced to one call result.
                return Ok(Some(v.clone()));
            }
            crate::calls::flatten(&resolved)?
        } else {
            cooked.clone()
        };

        match self.engine.eval(self.store, fs, &flat) {
            Ok(Some(v)) => Ok(Some(v)),
            Ok(None) => {
                if changed {
                    // Interpolation rewrote the text but the engine had
                    // nothing to reduce: treat the result as a literal.
                    Ok(Some(Value::Str(cooked)))
                } else if should_error {
                    Err(EvalError::Eval { expr: flat })
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                if is_numeric_text(&flat) {
                    let lit = flat.trim();
                    if let Ok(n) = lit.parse::<i64>() {
                        return Ok(Some(Value::Int(n)));
                    }
                    if let Ok(x) = lit.parse::<f64>() {
                        return Ok(Some(Value::Float(x)));
                    }
                }
                if changed {
                    // Same literal fallback as the miss path: prose that
                    // only made sense after interpolation is a string.
                    return Ok(Some(Value::Str(cooked)));
                }
                if should_error {
                    Err(EvalError::Engine(err))
                } else {
                    tracing::debug!(error = %err, expr = %flat, "engine miss, caller opted out of erroring");
                    Ok(None)
                }
            }
        }
    }
}

/// A `(` anywhere past position 0 marks a possible call site.
fn has_call_site(text: &str) -> bool {
    text.bytes().position(|b| b == b'(').is_some_and(|i| i > 0)
}

/// Lexically numeric: an optional leading minus, then digits and at most
/// one decimal point.
fn is_numeric_text(text: &str) -> bool {
    let body = text.trim();
    let body = body.strip_prefix('-').unwrap_or(body);
    !body.is_empty()
        && body.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && body.bytes().filter(|&b| b == b'.').count() <= 1
}

/// Best-effort literal classifier: integer, float, or the text itself.
/// Never errors.
pub fn fast_convert(text: &str) -> Value {
    let lit = text.trim();
    if !is_numeric_text(lit) {
        return Value::string(text);
    }
    if lit.contains('.') {
        lit.parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::string(text))
    } else {
        lit.parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::string(text))
    }
}
