//! Symbol names.
//!
//! A `Name` carries its text behind an `Rc` together with a pre-computed hash,
//! so clones are cheap and most comparisons never look at the characters.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Clone)]
pub struct Name {
    hash: u64,
    text: Rc<str>,
}

impl Name {
    pub fn new(text: &str) -> Self {
        Self {
            hash: Self::hash_str(text),
            text: Rc::from(text),
        }
    }

    /// Hash used for the fast equality check.
    #[inline]
    pub fn hash_str(s: &str) -> u64 {
        let mut hasher = ahash::AHasher::default();
        hasher.write(s.as_bytes());
        hasher.finish()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn fast_hash(&self) -> u64 {
        self.hash
    }

    /// Orders names case-insensitively, falling back to the exact text for ties.
    pub fn cmp_nocase(&self, other: &Name) -> Ordering {
        let upper = |c: char| c.to_ascii_uppercase();
        self.text
            .chars()
            .map(upper)
            .cmp(other.text.chars().map(upper))
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        if Rc::ptr_eq(&self.text, &other.text) {
            return true;
        }
        // Hash collision or separately created names.
        self.text == other.text
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(&s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.text)
    }
}
