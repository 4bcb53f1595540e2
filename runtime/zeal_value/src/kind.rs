//! Kind taxonomy for runtime values.

use std::fmt;

/// The kind tag of a [`crate::Value`], plus `Any` for record fields and
/// list slots declared without a concrete type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Unset,
    Bool,
    Int,
    Uint,
    Byte,
    Float,
    Str,
    IntList,
    UintList,
    FloatList,
    BoolList,
    StrList,
    ByteList,
    List,
    Map,
    Record,
    /// Accepts any set value. Used by mixed containers and untyped fields.
    Any,
}

impl Kind {
    /// Whether a value of kind `incoming` may be stored in a slot declared
    /// as `self`.
    ///
    /// `Any` accepts everything except `Unset`; `Unset` is assignable
    /// nowhere. The mixed `List` kind accepts no typed-list value — a
    /// typed list is a distinct container, not a subtype.
    pub fn accepts(self, incoming: Kind) -> bool {
        match self {
            Kind::Any => incoming != Kind::Unset,
            Kind::Unset => false,
            k => k == incoming,
        }
    }

    /// The element kind stored in a list of this kind, if it is a list.
    pub fn element(self) -> Option<Kind> {
        match self {
            Kind::IntList => Some(Kind::Int),
            Kind::UintList => Some(Kind::Uint),
            Kind::FloatList => Some(Kind::Float),
            Kind::BoolList => Some(Kind::Bool),
            Kind::StrList => Some(Kind::Str),
            Kind::ByteList => Some(Kind::Byte),
            Kind::List => Some(Kind::Any),
            _ => None,
        }
    }

    /// Display name, also used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Unset => "unset",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Byte => "byte",
            Kind::Float => "float",
            Kind::Str => "string",
            Kind::IntList => "[int]",
            Kind::UintList => "[uint]",
            Kind::FloatList => "[float]",
            Kind::BoolList => "[bool]",
            Kind::StrList => "[string]",
            Kind::ByteList => "[byte]",
            Kind::List => "[any]",
            Kind::Map => "map",
            Kind::Record => "record",
            Kind::Any => "any",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
