//! Runtime values for the Zeal scripting runtime.
//!
//! `Value` is a closed tagged union: every consumer matches exhaustively
//! instead of asserting a type and risking a runtime failure on mismatch.
//! Typed list variants keep their element kind as part of the variant, so
//! element writes can be validated with [`Kind::accepts`] before they land.
//!
//! Textual rendering (the `Display` impl) is the canonical form used by
//! string interpolation: integers in base 10, floats in Rust's shortest
//! form, lists as `[a,b,c]`, maps as `{k:v,...}` with sorted keys.

mod kind;
mod record;

use std::fmt;

use rustc_hash::FxHashMap;

pub use kind::Kind;
pub use record::{RecordField, RecordValue};

/// Error raised by value-level operations (record field access, kind checks).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("record `{record}` has no field `{field}`")]
    UnknownField { record: String, field: String },
    #[error("field `{field}` holds {expected}, cannot assign {got}")]
    FieldKindMismatch {
        field: String,
        expected: Kind,
        got: Kind,
    },
    #[error("record `{record}` declares field `{field}` twice")]
    DuplicateField { record: String, field: String },
}

/// A dynamically-typed runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence: an unset variable slot or a missing result.
    Unset,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Byte(u8),
    Float(f64),
    Str(String),
    /// Ordered list of a single element type.
    IntList(Vec<i64>),
    UintList(Vec<u64>),
    FloatList(Vec<f64>),
    BoolList(Vec<bool>),
    StrList(Vec<String>),
    ByteList(Vec<u8>),
    /// Ordered list with mixed element types.
    List(Vec<Value>),
    /// String-keyed map; mixed values cover the typed-map cases.
    Map(FxHashMap<String, Value>),
    /// User-declared record value with named, kind-checked fields.
    Record(RecordValue),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create an empty string-keyed map.
    #[inline]
    pub fn empty_map() -> Self {
        Value::Map(FxHashMap::default())
    }

    /// The kind tag for this value. Total: every variant has a kind.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Unset => Kind::Unset,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Byte(_) => Kind::Byte,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::IntList(_) => Kind::IntList,
            Value::UintList(_) => Kind::UintList,
            Value::FloatList(_) => Kind::FloatList,
            Value::BoolList(_) => Kind::BoolList,
            Value::StrList(_) => Kind::StrList,
            Value::ByteList(_) => Kind::ByteList,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Record,
        }
    }

    /// Best-effort signed integer coercion.
    ///
    /// Strings parse in base 10; floats truncate. Booleans and containers
    /// do not coerce.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Uint(n) => i64::try_from(*n).ok(),
            Value::Byte(b) => Some(i64::from(*b)),
            Value::Float(f) if f.is_finite() => Some(*f as i64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Best-effort unsigned integer coercion.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            Value::Byte(b) => Some(u64::from(*b)),
            Value::Float(f) if f.is_finite() && *f >= 0.0 => Some(*f as u64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Best-effort float coercion.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            Value::Uint(n) => Some(*n as f64),
            Value::Byte(b) => Some(f64::from(*b)),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Unset
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::Byte(b) => write!(f, "{b}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::IntList(v) => join(f, v),
            Value::UintList(v) => join(f, v),
            Value::FloatList(v) => join(f, v),
            Value::BoolList(v) => join(f, v),
            Value::StrList(v) => join(f, v),
            Value::ByteList(v) => join(f, v),
            Value::List(v) => join(f, v),
            Value::Map(m) => {
                // Sorted keys so the rendering is deterministic.
                let mut keys: Vec<&String> = m.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}:{}", m[*k])?;
                }
                write!(f, "}}")
            }
            Value::Record(r) => write!(f, "{r}"),
        }
    }
}
