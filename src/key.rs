//! Key resolution for trie paths.
//!
//! A zero-length key has no characters to walk, so it is stored under a
//! reserved literal name instead.

/// The literal key an empty key is stored under.
///
/// `""` and `"default_key"` therefore address the same entry.
pub const EMPTY_KEY: &str = "default_key";

/// Maps a caller-supplied key to the character path walked in the trie.
pub fn resolve(key: &str) -> &str {
    if key.is_empty() {
        EMPTY_KEY
    } else {
        key
    }
}
