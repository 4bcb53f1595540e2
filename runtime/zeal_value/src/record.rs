//! User-declared record values.
//!
//! A record is a named tuple of (field name, declared kind, current value).
//! Field writes are validated against the declared kind and go through
//! copy-then-mutate: [`RecordValue::with_field`] returns a new record, it
//! never mutates in place. The caller stores the copy back as the
//! variable's new value, so concurrent readers only ever observe whole
//! records.

use std::fmt;

use crate::{Kind, Value, ValueError};

/// One declared field of a record.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub kind: Kind,
    pub value: Value,
}

/// A record instance: type name plus fields in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    type_name: String,
    fields: Vec<RecordField>,
}

impl RecordValue {
    /// Build a record from declared fields. Duplicate field names are
    /// rejected.
    pub fn new(
        type_name: impl Into<String>,
        fields: Vec<RecordField>,
    ) -> Result<Self, ValueError> {
        let type_name = type_name.into();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ValueError::DuplicateField {
                    record: type_name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(RecordValue { type_name, fields })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Declared kind of a field.
    pub fn field_kind(&self, name: &str) -> Option<Kind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    /// Field value by position, for generic element-by-position walks.
    pub fn field_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).map(|f| &f.value)
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordField> {
        self.fields.iter()
    }

    /// Copy this record with one field replaced.
    ///
    /// The field must exist and its declared kind must accept the new
    /// value's kind.
    pub fn with_field(&self, name: &str, value: Value) -> Result<RecordValue, ValueError> {
        let Some(pos) = self.fields.iter().position(|f| f.name == name) else {
            return Err(ValueError::UnknownField {
                record: self.type_name.clone(),
                field: name.to_string(),
            });
        };
        let declared = self.fields[pos].kind;
        if !declared.accepts(value.kind()) {
            return Err(ValueError::FieldKindMismatch {
                field: name.to_string(),
                expected: declared,
                got: value.kind(),
            });
        }
        let mut copy = self.clone();
        copy.fields[pos].value = value;
        Ok(copy)
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.type_name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, field.value)?;
        }
        write!(f, " }}")
    }
}
