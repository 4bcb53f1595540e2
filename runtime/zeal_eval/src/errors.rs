//! Error types for the evaluation core.
//!
//! Every `EvalError` is fatal at statement granularity: the embedding
//! application is expected to abort the running script when one surfaces.
//! Soft outcomes — variable/key/field lookup misses, or an engine miss
//! the caller opted out of erroring on — are encoded as `Ok(None)` /
//! `Option::None`, never as errors. There are no retries anywhere in
//! this core.

use zeal_lexer::LexError;
use zeal_store::StoreError;
use zeal_value::{Kind, ValueError};

/// Error reported by the grammar-level expression engine.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown variable `{0}`")]
    UnknownIdent(String),
    #[error("no element `{key}` in {kind} value")]
    NoElement { key: String, kind: Kind },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),
    #[error("operator `{op}` cannot combine {left} and {right}")]
    KindMismatch { op: String, left: Kind, right: Kind },
}

/// Error raised while evaluating a statement or expression.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Malformed call or assignment syntax. Reported with diagnostic
    /// context; aborts the whole statement.
    #[error("syntax error: {detail}")]
    Syntax { detail: String },
    /// The engine could not reduce the expression and no literal or
    /// numeric fallback applied.
    #[error("could not evaluate `{expr}`")]
    Eval { expr: String },
    /// A negative integer used as an element index.
    #[error("invalid negative element index {index}")]
    NegativeIndex { index: i64 },
    /// Dotted-field assignment against something that is not a record.
    #[error("`{name}` is not a record value")]
    NotRecord { name: String },
    /// More arguments than the callee declares parameters.
    #[error("call to `{name}` passes {got} arguments, only {max} declared")]
    ArgCount {
        name: String,
        max: usize,
        got: usize,
    },
    /// A container-valued call result spliced into a larger expression;
    /// only scalar results can be rendered back into expression text.
    #[error("a {kind} call result cannot be embedded in a larger expression")]
    Embed { kind: Kind },
    /// A `NaN` or infinite float call result spliced into a larger
    /// expression. Neither has a literal form the engine can re-lex.
    #[error("non-finite call result {value} cannot be embedded in a larger expression")]
    NonFinite { value: f64 },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl EvalError {
    pub(crate) fn syntax(detail: impl Into<String>) -> Self {
        EvalError::Syntax {
            detail: detail.into(),
        }
    }
}
