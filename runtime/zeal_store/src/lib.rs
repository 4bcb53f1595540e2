//! Scope-partitioned variable store.
//!
//! Variables live in flat, integer-identified namespaces ("scopes",
//! roughly one per execution frame). Each scope is an independent dense
//! array of `(name, value)` pairs optimized for recently-declared names;
//! the scope registry sits behind a single process-wide read/write lock.
//!
//! # Locking
//!
//! All mutation and lookup is serialized by one `parking_lot::RwLock`:
//! reads take the read lock, value overwrite and append/grow take the
//! write lock for the whole operation. [`LockMode`] is the embedder's
//! explicit concurrency declaration, passed to the constructor instead of
//! a mutable global flag.

mod element;
mod store;
mod table;

pub use element::ELEMENT_HEADROOM;
pub use store::{LockMode, ScopeStore};
pub use table::{ScopeTable, Variable};

use zeal_value::Kind;

/// One execution frame / namespace identifier.
pub type ScopeId = u32;

/// Error raised by element-level writes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("`{name}` ({kind}) does not support element assignment")]
    NotIndexable { name: String, kind: Kind },
    #[error("`{name}[{key}]`: key is not a valid element index")]
    BadIndex { name: String, key: String },
    #[error("`{name}` holds {expected} elements, cannot store {got}")]
    ElementKind {
        name: String,
        expected: Kind,
        got: Kind,
    },
}
