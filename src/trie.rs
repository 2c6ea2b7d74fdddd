//! The main trie implementation.
//!
//! This module contains the `Trie` type, an immutable snapshot of a
//! character-keyed trie whose values may each have a different type.

use std::any::Any;
use std::sync::Arc;

use crate::key::resolve;
use crate::node::{Payload, TrieNode};
use crate::{Error, Result};

/// An immutable trie with structural sharing.
///
/// Every key maps to a value of whatever type it was stored with. All
/// operations that would modify the trie return a new trie instance that
/// shares unchanged parts of the structure with the original via `Arc`:
/// only the nodes on the path to the modified key are copied.
///
/// An empty key is stored under [`EMPTY_KEY`](crate::EMPTY_KEY).
#[derive(Debug, Clone, Default)]
pub struct Trie {
    /// The root node of the trie, absent when the trie is empty
    pub(crate) root: Option<Arc<TrieNode>>,

    /// The number of values stored in the trie
    size: usize,
}

impl Trie {
    /// Creates a new, empty trie.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::Trie;
    ///
    /// let trie = Trie::new();
    /// assert!(trie.is_empty());
    /// ```
    pub fn new() -> Self {
        Trie { root: None, size: 0 }
    }

    /// Returns the number of values stored in the trie.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::Trie;
    ///
    /// let trie = Trie::new();
    /// assert_eq!(trie.len(), 0);
    ///
    /// let trie = trie.put("hello", 42u32);
    /// assert_eq!(trie.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the trie contains no values.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns `true` if both tries are the same snapshot, i.e. share their
    /// root node (or are both empty).
    pub fn ptr_eq(&self, other: &Trie) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Walks the character path of `key` and returns the node it ends at.
    fn find_node(&self, key: &str) -> Option<&Arc<TrieNode>> {
        let mut current = self.root.as_ref()?;

        for c in resolve(key).chars() {
            current = current.children.get(&c)?;
        }

        Some(current)
    }

    /// Returns the payload stored for `key`, whatever its type.
    pub(crate) fn payload(&self, key: &str) -> Option<&Payload> {
        self.find_node(key)?.value.as_ref()
    }

    /// Retrieves a reference to the value stored for the given key, if any.
    ///
    /// The value is only returned when it was stored as `T`; a value of any
    /// other type is reported as absent, just like a missing key.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::Trie;
    ///
    /// let trie = Trie::new().put("hello", 42u32);
    ///
    /// assert_eq!(trie.get::<u32>("hello"), Some(&42));
    /// assert_eq!(trie.get::<u64>("hello"), None);
    /// assert_eq!(trie.get::<u32>("world"), None);
    /// ```
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.payload(key)?.downcast_ref::<T>()
    }

    /// Like [`get`](Trie::get), but tells a missing key apart from a value
    /// stored under a different type.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::{Error, Trie};
    ///
    /// let trie = Trie::new().put("k", String::from("v"));
    ///
    /// assert_eq!(trie.lookup::<String>("k").unwrap(), "v");
    /// assert!(matches!(trie.lookup::<u32>("k"), Err(Error::TypeMismatch { .. })));
    /// assert!(matches!(trie.lookup::<u32>("nope"), Err(Error::NotFound(_))));
    /// ```
    pub fn lookup<T: Any + Send + Sync>(&self, key: &str) -> Result<&T> {
        let payload = self
            .payload(key)
            .ok_or_else(|| Error::NotFound(key.to_string()))?;

        payload
            .downcast_ref::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
                found: payload.type_name,
            })
    }

    /// Returns `true` if the trie holds a value of any type for the key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.payload(key).is_some()
    }

    /// Stores `value` under `key`, returning a new trie.
    ///
    /// If the key already exists its value is replaced, whatever type it had,
    /// and every longer key beneath it is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::Trie;
    ///
    /// let trie1 = Trie::new();
    /// let trie2 = trie1.put("hello", 42u32);
    ///
    /// assert!(trie1.is_empty());
    /// assert_eq!(trie2.get::<u32>("hello"), Some(&42));
    /// ```
    pub fn put<T: Any + Send + Sync>(&self, key: &str, value: T) -> Self {
        let key = resolve(key);

        let (new_root, value_replaced) =
            Self::put_recursive(self.root.as_ref(), key, Payload::new(value));

        let new_size = if value_replaced { self.size } else { self.size + 1 };

        Trie {
            root: Some(new_root),
            size: new_size,
        }
    }

    // Copies the path for `key` below `node`, synthesizing empty nodes where
    // the path does not exist yet. Returns the new subtree root and whether a
    // value was overwritten.
    fn put_recursive(node: Option<&Arc<TrieNode>>, key: &str, payload: Payload) -> (Arc<TrieNode>, bool) {
        let mut chars = key.chars();

        let next_char = match chars.next() {
            Some(c) => c,
            None => {
                // End of the key: keep whatever lies beneath, swap the value
                return match node {
                    Some(existing) => (Arc::new(existing.with_value(payload)), existing.is_value_node()),
                    None => (Arc::new(TrieNode::with_payload(payload)), false),
                };
            }
        };

        let mut new_node = match node {
            Some(existing) => TrieNode::clone(existing),
            None => TrieNode::new(),
        };

        let child = node.and_then(|n| n.children.get(&next_char));
        let (new_child, value_replaced) = Self::put_recursive(child, chars.as_str(), payload);

        new_node.children.insert(next_char, new_child);

        (Arc::new(new_node), value_replaced)
    }

    /// Removes the value stored under `key`, returning a new trie.
    ///
    /// Longer keys sharing the prefix are kept. Nodes left with neither a
    /// value nor children are pruned. If there is nothing to remove, the
    /// returned trie is the same snapshot as `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cow_trie::Trie;
    ///
    /// let trie1 = Trie::new().put("hello", 42u32);
    /// let trie2 = trie1.remove("hello");
    ///
    /// assert!(trie2.is_empty());
    /// assert_eq!(trie1.get::<u32>("hello"), Some(&42));
    /// ```
    pub fn remove(&self, key: &str) -> Self {
        let root = match &self.root {
            Some(root) => root,
            None => return self.clone(),
        };

        match Self::remove_recursive(root, resolve(key)) {
            Some(new_root) => Trie {
                root: new_root,
                size: self.size - 1,
            },
            None => {
                tracing::debug!(key, "remove: no value stored under key");
                self.clone()
            }
        }
    }

    // Returns `None` when there is no value to remove below `node`, otherwise
    // the replacement for `node`, which is itself `None` if the node was
    // pruned away.
    fn remove_recursive(node: &Arc<TrieNode>, key: &str) -> Option<Option<Arc<TrieNode>>> {
        let mut chars = key.chars();

        let next_char = match chars.next() {
            Some(c) => c,
            None => {
                if !node.is_value_node() {
                    return None;
                }
                if node.is_leaf() {
                    return Some(None);
                }
                return Some(Some(Arc::new(node.without_value())));
            }
        };

        let child = node.children.get(&next_char)?;
        let new_child = Self::remove_recursive(child, chars.as_str())?;

        let mut new_node = TrieNode::clone(node);
        match new_child {
            Some(new_child) => {
                new_node.children.insert(next_char, new_child);
            }
            None => {
                new_node.children.remove(&next_char);
            }
        }

        if new_node.is_leaf() && !new_node.is_value_node() {
            return Some(None);
        }

        Some(Some(Arc::new(new_node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMPTY_KEY;

    fn child<'a>(node: &'a Arc<TrieNode>, c: char) -> &'a Arc<TrieNode> {
        node.children.get(&c).expect("missing child")
    }

    #[test]
    fn test_new_trie() {
        let trie = Trie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.len(), 0);
        assert!(trie.root.is_none());
    }

    #[test]
    fn test_get_nonexistent() {
        let trie = Trie::new();
        assert_eq!(trie.get::<u32>("anything"), None);
        assert_eq!(trie.get::<u32>(""), None);
    }

    #[test]
    fn test_put_and_get() {
        let trie = Trie::new().put("he", String::from("llo")).put("h", String::from("i"));

        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get::<String>("he").map(String::as_str), Some("llo"));
        assert_eq!(trie.get::<String>("h").map(String::as_str), Some("i"));
        assert_eq!(trie.get::<String>("hel"), None);
    }

    #[test]
    fn test_mixed_value_types() {
        let trie = Trie::new()
            .put("int", 7i32)
            .put("string", String::from("seven"))
            .put("vec", vec![7u8; 3])
            .put("in", 7.5f64);

        assert_eq!(trie.get::<i32>("int"), Some(&7));
        assert_eq!(trie.get::<String>("string").map(String::as_str), Some("seven"));
        assert_eq!(trie.get::<Vec<u8>>("vec"), Some(&vec![7, 7, 7]));
        assert_eq!(trie.get::<f64>("in"), Some(&7.5));
    }

    #[test]
    fn test_type_mismatch_is_not_found() {
        let trie = Trie::new().put("k", String::from("v"));

        assert_eq!(trie.get::<i32>("k"), None);
        assert!(trie.contains_key("k"));
    }

    #[test]
    fn test_lookup_errors() {
        let trie = Trie::new().put("k", 1u64);

        assert_eq!(trie.lookup::<u64>("k"), Ok(&1));
        assert_eq!(
            trie.lookup::<u32>("k"),
            Err(Error::TypeMismatch {
                key: "k".to_string(),
                expected: std::any::type_name::<u32>(),
                found: std::any::type_name::<u64>(),
            })
        );
        assert_eq!(trie.lookup::<u64>("kk"), Err(Error::NotFound("kk".to_string())));
    }

    #[test]
    fn test_put_replace() {
        let trie1 = Trie::new().put("hello", 42u32);
        let trie2 = trie1.put("hello", 100u32);

        assert_eq!(trie1.len(), 1);
        assert_eq!(trie2.len(), 1);
        assert_eq!(trie1.get::<u32>("hello"), Some(&42));
        assert_eq!(trie2.get::<u32>("hello"), Some(&100));
    }

    #[test]
    fn test_put_replace_with_other_type() {
        let trie = Trie::new().put("key", 1u32).put("key", "one");

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get::<u32>("key"), None);
        assert_eq!(trie.get::<&str>("key"), Some(&"one"));
    }

    #[test]
    fn test_overwrite_keeps_descendants() {
        let trie = Trie::new().put("ab", 1u32).put("abc", 2u32).put("ab", 3u32);

        assert_eq!(trie.get::<u32>("ab"), Some(&3));
        assert_eq!(trie.get::<u32>("abc"), Some(&2));
    }

    #[test]
    fn test_empty_key_uses_sentinel() {
        let trie = Trie::new().put("", String::from("empty"));

        assert_eq!(trie.get::<String>("").map(String::as_str), Some("empty"));
        assert_eq!(trie.get::<String>(EMPTY_KEY).map(String::as_str), Some("empty"));
        assert!(!trie.root.as_ref().map_or(false, |r| r.is_value_node()));

        let trie = trie.remove("");
        assert!(trie.is_empty());
        assert_eq!(trie.get::<String>(""), None);
    }

    #[test]
    fn test_unicode_keys() {
        let trie = Trie::new().put("日本", 1u8).put("日", 2u8);

        assert_eq!(trie.get::<u8>("日本"), Some(&1));
        assert_eq!(trie.get::<u8>("日"), Some(&2));
        let root = trie.root.as_ref().unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(child(child(root, '日'), '本').subtree_size(), 1);
    }

    #[test]
    fn test_structural_sharing() {
        let trie1 = Trie::new().put("hello", 1u32).put("world", 2u32);
        let trie2 = trie1.put("help", 3u32);

        let root1 = trie1.root.as_ref().unwrap();
        let root2 = trie2.root.as_ref().unwrap();

        // The path to "help" was copied
        assert!(!Arc::ptr_eq(root1, root2));
        assert!(!Arc::ptr_eq(child(root1, 'h'), child(root2, 'h')));

        // The untouched "world" branch is shared
        assert!(Arc::ptr_eq(child(root1, 'w'), child(root2, 'w')));

        // So is the "lo" tail beneath "hel"
        let hel1 = child(child(child(root1, 'h'), 'e'), 'l');
        let hel2 = child(child(child(root2, 'h'), 'e'), 'l');
        assert!(Arc::ptr_eq(child(hel1, 'l'), child(hel2, 'l')));
    }

    #[test]
    fn test_children_are_ordered() {
        let trie = Trie::new().put("c", 1u8).put("a", 2u8).put("b", 3u8);
        let root = trie.root.as_ref().unwrap();

        let keys: Vec<char> = root.children.keys().copied().collect();
        assert_eq!(keys, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_remove_existing() {
        let trie = Trie::new().put("hello", 42u32).put("world", 100u32);

        let trie2 = trie.remove("hello");

        assert_eq!(trie2.len(), 1);
        assert_eq!(trie2.get::<u32>("hello"), None);
        assert_eq!(trie2.get::<u32>("world"), Some(&100));

        // The original trie should be unchanged
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get::<u32>("hello"), Some(&42));
    }

    #[test]
    fn test_remove_nonexistent_returns_same_snapshot() {
        let trie = Trie::new().put("hello", 42u32);

        let trie2 = trie.remove("world");
        assert!(trie2.ptr_eq(&trie));
        assert_eq!(trie2.len(), 1);

        // A prefix that exists but holds no value
        let trie3 = trie.remove("hell");
        assert!(trie3.ptr_eq(&trie));

        // A key running past an existing leaf
        let trie4 = trie.remove("hello!");
        assert!(trie4.ptr_eq(&trie));

        let empty = Trie::new();
        assert!(empty.remove("anything").ptr_eq(&empty));
    }

    #[test]
    fn test_remove_keeps_descendants() {
        let trie = Trie::new().put("abc", 1u32).put("ab", 2u32);

        let trie2 = trie.remove("ab");

        assert_eq!(trie2.get::<u32>("ab"), None);
        assert_eq!(trie2.get::<u32>("abc"), Some(&1));
        assert_eq!(trie2.len(), 1);
    }

    #[test]
    fn test_remove_prunes_empty_nodes() {
        let trie = Trie::new().put("ab", 1u32).put("abcd", 2u32);

        let trie2 = trie.remove("abcd");
        let root = trie2.root.as_ref().unwrap();
        let b = child(child(root, 'a'), 'b');
        assert!(b.is_leaf());
        assert!(b.is_value_node());

        let trie3 = trie2.remove("ab");
        assert!(trie3.root.is_none());
        assert!(trie3.is_empty());
    }

    #[test]
    fn test_remove_structural_sharing() {
        let trie = Trie::new().put("hello", 1u32).put("help", 2u32).put("world", 3u32);

        let trie2 = trie.remove("world");

        let root1 = trie.root.as_ref().unwrap();
        let root2 = trie2.root.as_ref().unwrap();
        assert!(Arc::ptr_eq(child(root1, 'h'), child(root2, 'h')));
        assert!(!root2.children.contains_key(&'w'));

        let trie3 = trie.remove("hello");
        let root3 = trie3.root.as_ref().unwrap();
        assert!(!Arc::ptr_eq(child(root1, 'h'), child(root3, 'h')));
        assert!(Arc::ptr_eq(child(root1, 'w'), child(root3, 'w')));
    }
}
