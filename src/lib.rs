//! # Copy-on-write trie
//!
//! A persistent trie mapping string keys to values of any type, and a
//! thread-safe store built on top of it.
//!
//! This crate provides an immutable trie that uses structural sharing via `Arc`
//! to efficiently create new versions of the trie while sharing unchanged parts.
//!
//! ## Features
//!
//! - **Immutable API**: `put` and `remove` return a new trie instance
//! - **Structural Sharing**: only the path to the modified key is copied
//! - **Per-key value types**: each key holds a value of its own type, checked at `get`
//! - **Snapshot store**: [`TrieStore`] lets readers keep using a value while writers move on
//!
//! ## Example
//!
//! ```rust
//! use cow_trie::Trie;
//!
//! // Create a new trie
//! let trie = Trie::new();
//!
//! // Insert some values (each operation returns a new trie)
//! let trie = trie.put("hello", 1u32);
//! let trie = trie.put("world", String::from("two"));
//!
//! // Lookup values with the type they were stored as
//! assert_eq!(trie.get::<u32>("hello"), Some(&1));
//! assert_eq!(trie.get::<String>("world").map(String::as_str), Some("two"));
//! assert_eq!(trie.get::<u32>("world"), None);
//! ```

mod key;
mod node;
mod store;
mod trie;

// Re-export public types
pub use crate::key::EMPTY_KEY;
pub use crate::store::{TrieStore, ValueGuard};
pub use crate::trie::Trie;

use thiserror::Error;

/// Result type alias for trie lookups
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the checked lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No value is stored under the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// A value is stored under the key, but as a different type
    #[error("Type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}
