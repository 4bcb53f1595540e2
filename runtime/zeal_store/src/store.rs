//! The scope registry: scope id to owned table, behind one lock.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use zeal_value::{Kind, Value};

use crate::table::ScopeTable;
use crate::ScopeId;

/// Concurrency mode declared by the embedding application.
///
/// The lock itself is never elided — safe Rust has no sound way to skip
/// it — but the mode makes the embedder's threading contract explicit
/// instead of a process-global flag. An uncontended `parking_lot` lock
/// costs a couple of atomic operations, which is the single-threaded
/// overhead the original opt-out existed to avoid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockMode {
    /// Multiple script threads share this store.
    Threaded,
    /// The embedder guarantees single-threaded execution.
    SingleThread,
}

/// Process-wide variable store partitioned by scope id.
///
/// Scope storage is created on first write to an unknown id, or
/// explicitly pre-sized with [`ScopeStore::create_table`]. Tearing a
/// scope down again is the call-frame lifecycle's job, via
/// [`ScopeStore::drop_table`].
#[derive(Debug)]
pub struct ScopeStore {
    pub(crate) tables: RwLock<FxHashMap<ScopeId, ScopeTable>>,
    mode: LockMode,
}

impl ScopeStore {
    pub fn new(mode: LockMode) -> Self {
        ScopeStore {
            tables: RwLock::new(FxHashMap::default()),
            mode,
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Read a variable's current value.
    pub fn get(&self, fs: ScopeId, name: &str) -> Option<Value> {
        self.tables.read().get(&fs)?.get(name).cloned()
    }

    /// Kind of a variable's current value.
    pub fn get_type(&self, fs: ScopeId, name: &str) -> Option<Kind> {
        self.tables.read().get(&fs)?.get(name).map(Value::kind)
    }

    /// Write a variable, creating the scope's table on first use.
    /// Overwrites in place when the name exists. Always succeeds.
    pub fn set(&self, fs: ScopeId, name: &str, value: Value) -> bool {
        let mut tables = self.tables.write();
        let table = tables.entry(fs).or_insert_with(|| {
            tracing::debug!(fs, "scope table created on first write");
            ScopeTable::new()
        });
        table.set(name, value)
    }

    /// Remove a variable, compacting the scope's live region. No-op when
    /// absent.
    pub fn unset(&self, fs: ScopeId, name: &str) {
        if let Some(table) = self.tables.write().get_mut(&fs) {
            table.remove(name);
        }
    }

    /// Remove `key` from a container-typed variable. No-op when the
    /// variable is absent or its type has no keyed removal.
    pub fn delete_element(&self, fs: ScopeId, name: &str, key: &str) {
        let mut tables = self.tables.write();
        let Some(value) = tables.get_mut(&fs).and_then(|t| t.get_mut(name)) else {
            return;
        };
        match value {
            Value::Map(m) => {
                m.remove(key);
            }
            Value::IntList(v) => remove_index(v, key),
            Value::UintList(v) => remove_index(v, key),
            Value::FloatList(v) => remove_index(v, key),
            Value::BoolList(v) => remove_index(v, key),
            Value::StrList(v) => remove_index(v, key),
            Value::ByteList(v) => remove_index(v, key),
            Value::List(v) => remove_index(v, key),
            other => {
                tracing::debug!(name, kind = %other.kind(), "delete_element on non-container, skipped");
            }
        }
    }

    /// Allocate backing storage for `fs` sized to `capacity` with zero
    /// count. Deliberate no-op when the table already exists: storage
    /// another actor populated must not be clobbered.
    pub fn create_table(&self, fs: ScopeId, capacity: usize) -> bool {
        let mut tables = self.tables.write();
        if tables.contains_key(&fs) {
            return false;
        }
        tracing::debug!(fs, capacity, "scope table pre-allocated");
        tables.insert(fs, ScopeTable::with_capacity(capacity));
        true
    }

    /// Tear down a scope's storage entirely. Called by the call-frame
    /// lifecycle when a frame exits.
    pub fn drop_table(&self, fs: ScopeId) {
        self.tables.write().remove(&fs);
    }

    /// Number of live variables in a scope (0 when unallocated).
    pub fn scope_len(&self, fs: ScopeId) -> usize {
        self.tables.read().get(&fs).map_or(0, ScopeTable::count)
    }

    /// Backing capacity of a scope's table (0 when unallocated).
    pub fn scope_capacity(&self, fs: ScopeId) -> usize {
        self.tables.read().get(&fs).map_or(0, ScopeTable::capacity)
    }

    /// Clone out every live variable of a scope under one read-lock
    /// scope. This is the internally-consistent batch read the
    /// interpolator works from; a concurrent writer blocks until the
    /// batch completes.
    pub fn snapshot(&self, fs: ScopeId) -> Vec<(String, Value)> {
        self.tables.read().get(&fs).map_or_else(Vec::new, |t| {
            t.iter().map(|(n, v)| (n.to_string(), v.clone())).collect()
        })
    }
}

fn remove_index<T>(items: &mut Vec<T>, key: &str) {
    if let Ok(i) = key.trim().parse::<usize>() {
        if i < items.len() {
            items.remove(i);
        }
    }
}
