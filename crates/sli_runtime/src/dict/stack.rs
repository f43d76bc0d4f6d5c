use std::rc::Rc;

use sli_core::Name;

use super::dictionary::{AsKey, DictRef, Dictionary};
use crate::core::Token;

/// Scoped name resolution: the system dictionary at the bottom, the user
/// dictionary above it and any dictionaries opened with `begin` on top.
pub struct DictionaryStack {
    dicts: Vec<DictRef>,
}

impl DictionaryStack {
    pub fn new() -> Self {
        Self {
            dicts: vec![Dictionary::new_ref(), Dictionary::new_ref()],
        }
    }

    pub fn system(&self) -> &DictRef {
        &self.dicts[0]
    }

    pub fn user(&self) -> &DictRef {
        &self.dicts[1]
    }

    pub fn top(&self) -> &DictRef {
        &self.dicts[self.dicts.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.dicts.len()
    }

    pub fn begin(&mut self, dict: DictRef) {
        self.dicts.push(dict);
    }

    /// Closes the innermost scope; the system and user dictionaries stay.
    pub fn end(&mut self) -> Option<DictRef> {
        if self.dicts.len() > 2 {
            self.dicts.pop()
        } else {
            None
        }
    }

    /// Copy of the innermost binding of `name`.
    pub fn lookup<K: AsKey + ?Sized>(&self, name: &K) -> Option<Token> {
        self.dicts
            .iter()
            .rev()
            .find_map(|d| d.borrow().get(name).cloned())
    }

    pub fn known<K: AsKey + ?Sized>(&self, name: &K) -> bool {
        self.dicts.iter().any(|d| d.borrow().known(name))
    }

    /// Binding of `name` in the system dictionary only.
    pub fn base_lookup<K: AsKey + ?Sized>(&self, name: &K) -> Option<Token> {
        self.system().borrow().get(name).cloned()
    }

    /// Binds `name` in the innermost dictionary.
    pub fn def(&self, name: impl Into<Name>, token: Token) {
        self.top().borrow_mut().insert_move(name, token);
    }

    pub fn base_def(&self, name: impl Into<Name>, token: Token) {
        self.system().borrow_mut().insert_move(name, token);
    }

    /// Finds the dictionary holding the innermost binding of `name`.
    pub fn where_defined<K: AsKey + ?Sized>(&self, name: &K) -> Option<DictRef> {
        self.dicts
            .iter()
            .rev()
            .find(|d| d.borrow().known(name))
            .map(Rc::clone)
    }
}

impl Default for DictionaryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DictionaryStack {
    fn drop(&mut self) {
        for d in self.dicts.iter().rev() {
            if let Ok(mut d) = d.try_borrow_mut() {
                d.clear();
            }
        }
    }
}
