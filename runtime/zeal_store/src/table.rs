//! One scope's backing storage: a dense growable array of variables.

use zeal_value::Value;

/// A named variable slot. Identity within the store is `(scope, name)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    name: String,
    value: Value,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Dense array of variables for a single scope.
///
/// The live region is `[0, count)` with no gaps. Lookup scans from the
/// highest occupied index downward: newer variables are appended later
/// and looked up more often. Appending at full capacity doubles the
/// capacity (explicit policy, minimum 1) and preserves entry order;
/// removal shifts higher entries down one slot so the region stays dense.
#[derive(Clone, Debug, Default)]
pub struct ScopeTable {
    slots: Vec<Variable>,
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ScopeTable {
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Number of live variables.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reverse linear scan for `name`. O(count) worst case, cheap for
    /// recently-declared variables.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.slots.iter().rposition(|v| v.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.lookup(name).map(|i| &self.slots[i].value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.lookup(name).map(|i| &mut self.slots[i].value)
    }

    /// Overwrite in place when present, append otherwise. Always
    /// succeeds; the return value is a caller convenience.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.lookup(name) {
            Some(i) => self.slots[i].value = value,
            None => self.push(name.to_string(), value),
        }
        true
    }

    fn push(&mut self, name: String, value: Value) {
        if self.slots.len() == self.slots.capacity() {
            // Double the capacity rather than leaving the growth factor
            // to the allocator.
            let grow_by = self.slots.capacity().max(1);
            tracing::debug!(
                count = self.slots.len(),
                new_capacity = self.slots.capacity() + grow_by,
                "scope table grows"
            );
            self.slots.reserve_exact(grow_by);
        }
        self.slots.push(Variable { name, value });
    }

    /// Remove `name`, shifting higher entries down to keep the live
    /// region dense. No-op when absent.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.lookup(name) {
            Some(i) => {
                self.slots.remove(i);
                true
            }
            None => false,
        }
    }

    /// Iterate live variables in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|v| (v.name.as_str(), &v.value))
    }
}
