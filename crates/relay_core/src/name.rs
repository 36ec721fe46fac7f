//! Hashed symbols
//!
//! Event names, type names and function names are all `Name`s. Two names are
//! equal when their hashes are equal, the same way the engine compares its own
//! symbols, so lookups never touch the text.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Hash a symbol the way [`Name`] does. The empty string hashes to 0.
pub const fn hash_name(text: &str) -> u64 {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return 0;
    }

    // FNV-1a
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// An interned, hash-compared symbol
#[derive(Clone)]
pub struct Name {
    hash: u64,
    text: Arc<str>,
}

impl Name {
    /// Create a name from text
    pub fn new(text: &str) -> Self {
        Self {
            hash: hash_name(text),
            text: text.into(),
        }
    }

    /// The empty name
    pub fn none() -> Self {
        Self {
            hash: 0,
            text: "".into(),
        }
    }

    /// Check if this is the empty name
    #[inline]
    pub fn is_none(&self) -> bool {
        self.hash == 0
    }

    /// Get the text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Get the precomputed hash
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::none()
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.hash == hash_name(other)
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.hash == hash_name(other)
    }
}

impl Borrow<u64> for Name {
    fn borrow(&self) -> &u64 {
        &self.hash
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.text)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&Name> for Name {
    fn from(name: &Name) -> Self {
        name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_name_equality_by_hash() {
        let a = Name::new("Session/Start");
        let b = Name::from(String::from("Session/Start"));
        assert_eq!(a, b);
        assert_eq!(a, "Session/Start");
        assert_ne!(a, Name::new("Session/End"));
    }

    #[test]
    fn test_none_name() {
        assert!(Name::none().is_none());
        assert!(Name::new("").is_none());
        assert!(!Name::new("x").is_none());
        assert_eq!(Name::default(), Name::none());
    }

    #[test]
    fn test_hash_is_const() {
        const HASH: u64 = hash_name("Input/Key");
        assert_eq!(Name::new("Input/Key").hash_value(), HASH);
    }

    #[test]
    fn test_lookup_by_hash() {
        let mut map = HashMap::new();
        map.insert(Name::new("Entity/Attach"), 1);
        assert_eq!(map.get(&hash_name("Entity/Attach")), Some(&1));
    }
}
