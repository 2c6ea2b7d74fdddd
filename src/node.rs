//! Internal node implementation for the trie.
//!
//! This module contains the `TrieNode` structure that forms the backbone of
//! the trie. `TrieNode` instances are always wrapped in an `Arc` once they are
//! published into a `Trie`, and from then on they are never mutated: every
//! modification works on a shallow clone.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased value stored at a node, tagged with the name of the type it
/// was stored as.
#[derive(Clone)]
pub struct Payload {
    /// The value itself, shared between every snapshot that contains it
    pub value: Arc<dyn Any + Send + Sync>,

    /// `std::any::type_name` of the stored type, for diagnostics only
    pub type_name: &'static str,
}

impl Payload {
    /// Wraps a value of type `T`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Payload {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrows the value as `T`, if that is the type it was stored as.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns a new owning handle to the value as `T`, if that is the type it
    /// was stored as.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Internal node type for the trie.
///
/// Each node owns one edge-level position in the key space: a map of
/// children keyed by the next character, and an optional payload when a key
/// terminates here.
#[derive(Debug, Default)]
pub struct TrieNode {
    /// Child nodes indexed by the next character of the key
    pub children: BTreeMap<char, Arc<TrieNode>>,

    /// The value stored at this node, if any
    pub value: Option<Payload>,
}

impl TrieNode {
    /// Creates a new empty node
    pub fn new() -> Self {
        TrieNode::default()
    }

    /// Creates a new childless node holding the given payload
    pub fn with_payload(payload: Payload) -> Self {
        TrieNode {
            children: BTreeMap::new(),
            value: Some(payload),
        }
    }

    /// Returns whether a key terminates at this node
    pub fn is_value_node(&self) -> bool {
        self.value.is_some()
    }

    /// Returns whether this node is a leaf node (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of values stored in this subtree
    pub fn subtree_size(&self) -> usize {
        let mut count = if self.is_value_node() { 1 } else { 0 };

        for child in self.children.values() {
            count += child.subtree_size();
        }

        count
    }

    /// Creates a shallow clone of this node without its value.
    ///
    /// Children are shared with `self`.
    pub fn without_value(&self) -> Self {
        TrieNode {
            children: self.children.clone(),
            value: None,
        }
    }

    /// Creates a shallow clone of this node carrying `payload` instead of its
    /// current value.
    pub fn with_value(&self, payload: Payload) -> Self {
        TrieNode {
            children: self.children.clone(),
            value: Some(payload),
        }
    }
}

/// Cloning a node is shallow: the children map is copied, but every child is
/// the same `Arc` as in the original, and so is the payload.
impl Clone for TrieNode {
    fn clone(&self) -> Self {
        TrieNode {
            children: self.children.clone(),
            value: self.value.clone(),
        }
    }
}
