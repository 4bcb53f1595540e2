//! Indexed read/write into container-typed variable values.

use zeal_value::{Kind, Value};

use crate::table::ScopeTable;
use crate::{ScopeId, ScopeStore, StoreError};

/// Headroom added when a direct-indexed write lands beyond a list's
/// current length: the list grows to `max(2 * len, index + headroom)`.
pub const ELEMENT_HEADROOM: usize = 8;

impl ScopeStore {
    /// Read one element of a container-typed variable.
    ///
    /// Maps index by key, lists parse the key as an integer position, a
    /// string yields the single character at that position, and records
    /// resolve a field by name falling back to an element-by-position
    /// walk. `None` when the variable is absent or the key cannot be
    /// resolved.
    pub fn get_element(&self, fs: ScopeId, name: &str, key: &str) -> Option<Value> {
        let value = self.get(fs, name)?;
        match value {
            Value::Map(m) => m.get(key).cloned(),
            Value::IntList(v) => v.get(index(key)?).map(|n| Value::Int(*n)),
            Value::UintList(v) => v.get(index(key)?).map(|n| Value::Uint(*n)),
            Value::FloatList(v) => v.get(index(key)?).map(|x| Value::Float(*x)),
            Value::BoolList(v) => v.get(index(key)?).map(|b| Value::Bool(*b)),
            Value::StrList(v) => v.get(index(key)?).map(Value::string),
            Value::ByteList(v) => v.get(index(key)?).map(|b| Value::Byte(*b)),
            Value::List(v) => v.get(index(key)?).cloned(),
            Value::Str(s) => s.chars().nth(index(key)?).map(|c| Value::string(c.to_string())),
            Value::Record(r) => match r.field(key) {
                Some(v) => Some(v.clone()),
                None => r.field_at(index(key)?).cloned(),
            },
            _ => None,
        }
    }

    /// Write one element of a container-typed variable.
    ///
    /// An absent variable becomes a fresh string-keyed map (the default
    /// container). Maps and lists mutate in place; the whole write runs
    /// under one write-lock scope, so concurrent element writes to the
    /// same variable serialize and none is lost. Lists require a
    /// non-negative integer key and grow (zero-filled, explicit headroom
    /// policy) when the index is out of range; a value the list's
    /// element kind does not accept is a type error. Anything else is
    /// reported and the write is skipped.
    pub fn set_element(
        &self,
        fs: ScopeId,
        name: &str,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let table = tables.entry(fs).or_insert_with(|| {
            tracing::debug!(fs, "scope table created on first element write");
            ScopeTable::new()
        });
        let Some(current) = table.get_mut(name) else {
            let mut m = rustc_hash::FxHashMap::default();
            m.insert(key.to_string(), value);
            table.set(name, Value::Map(m));
            return Ok(());
        };

        match current {
            Value::Map(m) => {
                m.insert(key.to_string(), value);
                Ok(())
            }
            Value::IntList(v) => {
                set_list_element(name, key, v, value, Kind::Int, |val| match val {
                    Value::Int(n) => Some(n),
                    _ => None,
                })
            }
            Value::UintList(v) => {
                set_list_element(name, key, v, value, Kind::Uint, |val| match val {
                    Value::Uint(n) => Some(n),
                    _ => None,
                })
            }
            Value::FloatList(v) => {
                set_list_element(name, key, v, value, Kind::Float, |val| match val {
                    Value::Float(x) => Some(x),
                    _ => None,
                })
            }
            Value::BoolList(v) => {
                set_list_element(name, key, v, value, Kind::Bool, |val| match val {
                    Value::Bool(b) => Some(b),
                    _ => None,
                })
            }
            Value::StrList(v) => {
                set_list_element(name, key, v, value, Kind::Str, |val| match val {
                    Value::Str(s) => Some(s),
                    _ => None,
                })
            }
            Value::ByteList(v) => {
                set_list_element(name, key, v, value, Kind::Byte, |val| match val {
                    Value::Byte(b) => Some(b),
                    _ => None,
                })
            }
            Value::List(v) => {
                // Mixed list: any set value goes in, holes fill with Unset.
                set_list_element(name, key, v, value, Kind::Any, Some)
            }
            other => {
                tracing::warn!(name, kind = %other.kind(), "element write into non-container skipped");
                Err(StoreError::NotIndexable {
                    name: name.to_string(),
                    kind: other.kind(),
                })
            }
        }
    }
}

/// In-place list element write. The caller holds the store's write lock
/// for the full operation.
fn set_list_element<T, F>(
    name: &str,
    key: &str,
    items: &mut Vec<T>,
    value: Value,
    expected: Kind,
    unwrap: F,
) -> Result<(), StoreError>
where
    T: Default,
    F: FnOnce(Value) -> Option<T>,
{
    let Some(idx) = index(key) else {
        return Err(StoreError::BadIndex {
            name: name.to_string(),
            key: key.to_string(),
        });
    };
    let got = value.kind();
    let Some(item) = unwrap(value) else {
        return Err(StoreError::ElementKind {
            name: name.to_string(),
            expected,
            got,
        });
    };
    if idx >= items.len() {
        let target = (items.len() * 2).max(idx + ELEMENT_HEADROOM);
        items.resize_with(target, T::default);
    }
    items[idx] = item;
    Ok(())
}

/// Parse a non-negative integer element index.
fn index(key: &str) -> Option<usize> {
    key.trim().parse().ok()
}
