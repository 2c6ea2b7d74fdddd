//! Thread-safe holder of the current trie snapshot.
//!
//! Readers take the read lock only long enough to clone the current `Trie`
//! handle; traversal then runs lock-free on that private snapshot. Writers are
//! serialized by a separate mutex, build the next snapshot without blocking
//! readers, and take the write lock only to publish it.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::trie::Trie;
use crate::{Error, Result};

/// A value read from a [`TrieStore`].
///
/// The guard pins the snapshot the value was read from, so it stays valid no
/// matter how many writes the store publishes while the guard is held.
pub struct ValueGuard<T> {
    /// The snapshot the value was read from
    snapshot: Trie,

    /// The value itself
    value: Arc<T>,
}

impl<T> ValueGuard<T> {
    fn new(snapshot: Trie, value: Arc<T>) -> Self {
        ValueGuard { snapshot, value }
    }

    /// Returns the snapshot this value was read from.
    pub fn snapshot(&self) -> &Trie {
        &self.snapshot
    }
}

impl<T> Deref for ValueGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> AsRef<T> for ValueGuard<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueGuard").field(&*self.value).finish()
    }
}

/// A concurrent key-value store backed by a persistent [`Trie`].
///
/// Any number of threads may read while one thread at a time writes.
///
/// # Examples
///
/// ```
/// use cow_trie::TrieStore;
///
/// let store = TrieStore::new();
/// store.put("x", 1u32);
///
/// let guard = store.get::<u32>("x").unwrap();
/// store.put("x", 2u32);
///
/// // The guard still sees the value it was read at
/// assert_eq!(*guard, 1);
/// assert_eq!(*store.get::<u32>("x").unwrap(), 2);
/// ```
#[derive(Default)]
pub struct TrieStore {
    /// The most recently published snapshot
    root: RwLock<Trie>,

    /// Held by a writer for its whole read-modify-publish sequence
    write_lock: Mutex<()>,
}

impl TrieStore {
    /// Creates a store holding an empty trie.
    pub fn new() -> Self {
        TrieStore::default()
    }

    /// Creates a store whose current snapshot is `trie`.
    pub fn from_trie(trie: Trie) -> Self {
        TrieStore {
            root: RwLock::new(trie),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Trie {
        self.root.read().clone()
    }

    /// Looks up `key` in the current snapshot.
    ///
    /// Returns `None` if the key is absent or holds a value of a type other
    /// than `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<ValueGuard<T>> {
        let snapshot = self.snapshot();

        let value = snapshot.payload(key).and_then(|p| p.downcast_arc::<T>());

        match value {
            Some(value) => Some(ValueGuard::new(snapshot, value)),
            None => {
                tracing::trace!(key, "store get: not found");
                None
            }
        }
    }

    /// Like [`get`](TrieStore::get), but tells a missing key apart from a
    /// value stored under a different type.
    pub fn lookup<T: Any + Send + Sync>(&self, key: &str) -> Result<ValueGuard<T>> {
        let snapshot = self.snapshot();

        let payload = snapshot
            .payload(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;

        let value = payload.downcast_arc::<T>().ok_or_else(|| Error::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            found: payload.type_name,
        })?;

        Ok(ValueGuard::new(snapshot, value))
    }

    /// Stores `value` under `key`, replacing any existing value.
    pub fn put<T: Any + Send + Sync>(&self, key: &str, value: T) {
        let _writer = self.write_lock.lock();

        let next = self.snapshot().put(key, value);
        let size = next.len();
        *self.root.write() = next;

        tracing::trace!(key, size, "store put");
    }

    /// Removes the value stored under `key`, if any.
    pub fn remove(&self, key: &str) {
        let _writer = self.write_lock.lock();

        let current = self.snapshot();
        let next = current.remove(key);
        if next.ptr_eq(&current) {
            return;
        }
        let size = next.len();
        *self.root.write() = next;

        tracing::trace!(key, size, "store remove");
    }
}

impl fmt::Debug for TrieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieStore").field("len", &self.root.read().len()).finish()
    }
}
