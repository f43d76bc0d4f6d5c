use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use hashbrown::HashSet;
use indexmap::{Equivalent, IndexMap};
use sli_core::Name;

use crate::core::{DictHandle, Token, Value};
use crate::errors::SliError;
use crate::util::Appendable;

pub type DictRef = Rc<RefCell<Dictionary>>;

type TokenMap = IndexMap<Name, Token, ahash::RandomState>;

const RULE_WIDTH: usize = 50;
const NAME_WIDTH: usize = 25;
const TYPE_WIDTH: usize = 20;

/// Borrowed lookup key with the same hash as the corresponding `Name`.
#[derive(Clone, Copy)]
pub struct NameKey<'a> {
    hash: u64,
    text: &'a str,
}

impl Hash for NameKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl Equivalent<Name> for NameKey<'_> {
    fn equivalent(&self, key: &Name) -> bool {
        self.hash == key.fast_hash() && self.text == key.as_str()
    }
}

/// Anything a dictionary can be searched by.
pub trait AsKey {
    fn as_key(&self) -> NameKey<'_>;
}

impl AsKey for str {
    fn as_key(&self) -> NameKey<'_> {
        NameKey {
            hash: Name::hash_str(self),
            text: self,
        }
    }
}

impl AsKey for String {
    fn as_key(&self) -> NameKey<'_> {
        self.as_str().as_key()
    }
}

impl AsKey for Name {
    fn as_key(&self) -> NameKey<'_> {
        NameKey {
            hash: self.fast_hash(),
            text: self.as_str(),
        }
    }
}

/// Name to token mapping.
///
/// Every read through `lookup`, `get` or `get_mut` marks the entry as
/// accessed, which lets callers find entries nobody ever looked at.
#[derive(Default)]
pub struct Dictionary {
    map: TokenMap,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_ref() -> DictRef {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn known<K: AsKey + ?Sized>(&self, name: &K) -> bool {
        self.map.contains_key(&name.as_key())
    }

    pub fn get<K: AsKey + ?Sized>(&self, name: &K) -> Option<&Token> {
        let token = self.map.get(&name.as_key())?;
        token.set_access_flag();
        Some(token)
    }

    pub fn get_mut<K: AsKey + ?Sized>(&mut self, name: &K) -> Option<&mut Token> {
        let token = self.map.get_mut(&name.as_key())?;
        token.set_access_flag();
        Some(token)
    }

    /// Like `get`, but a missing name is an error.
    pub fn lookup<K: AsKey + ?Sized>(&self, name: &K) -> Result<&Token, SliError> {
        let key = name.as_key();
        self.get(name).ok_or_else(|| SliError::undefined(key.text))
    }

    /// Reads an entry without marking it accessed.
    pub fn peek<K: AsKey + ?Sized>(&self, name: &K) -> Option<&Token> {
        self.map.get(&name.as_key())
    }

    /// Slot for `name`, created void if missing.
    ///
    /// Writing a dictionary through the slot skips the cycle check of `insert`.
    pub fn entry_mut(&mut self, name: impl Into<Name>) -> &mut Token {
        self.map.entry(name.into()).or_insert_with(Token::void)
    }

    /// Stores a copy of `token`.
    pub fn insert(&mut self, name: impl Into<Name>, token: &Token) {
        self.insert_move(name, token.clone());
    }

    /// Stores `token` itself.
    pub fn insert_move(&mut self, name: impl Into<Name>, token: Token) {
        let token = self.demote_cycle(token);
        self.map.insert(name.into(), token);
    }

    pub fn remove<K: AsKey + ?Sized>(&mut self, name: &K) -> Option<Token> {
        self.map.shift_remove(&name.as_key())
    }

    /// Entries in insertion order. Iteration does not count as access.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Token)> {
        self.map.iter()
    }

    /// Empties the dictionary and, recursively, every dictionary it owns.
    pub fn clear(&mut self) {
        let me: *const Dictionary = self;
        let entries = std::mem::take(&mut self.map);
        for (name, token) in entries {
            if let Some(Value::Dictionary(DictHandle::Owned(inner))) = token.value() {
                if inner.as_ptr() as *const Dictionary == me {
                    continue;
                }
                match inner.try_borrow_mut() {
                    Ok(mut d) => d.clear(),
                    Err(_) => log::debug!("dictionary '{}' is in use, not cleared", name),
                }
            }
        }
    }

    /// Copies every entry into `target`.
    ///
    /// Fails with `UndefinedName` on the first name `target` already knows;
    /// `target` is left untouched in that case.
    pub fn add_dict(&self, target: &mut Dictionary) -> Result<(), SliError> {
        if let Some(name) = self.map.keys().find(|n| target.known(*n)) {
            return Err(SliError::undefined(name.as_str()));
        }
        for (name, token) in &self.map {
            target.insert(name.clone(), token);
        }
        Ok(())
    }

    /// Removes every name of this dictionary from `target`.
    pub fn remove_dict(&self, target: &mut Dictionary) {
        for name in self.map.keys() {
            target.remove(name);
        }
    }

    pub fn clear_access_flags(&self) {
        let mut seen = HashSet::new();
        self.clear_flags_rec(&mut seen);
    }

    fn clear_flags_rec(&self, seen: &mut HashSet<*const Dictionary>) {
        if !seen.insert(self as *const Dictionary) {
            return;
        }
        for token in self.map.values() {
            token.clear_access_flag();
            if let Some(Value::Dictionary(DictHandle::Owned(inner))) = token.value() {
                if let Ok(d) = inner.try_borrow() {
                    d.clear_flags_rec(seen);
                }
            }
        }
    }

    pub fn all_accessed(&self) -> bool {
        self.unaccessed().is_empty()
    }

    /// Names never read, nested entries as `outer::inner`.
    pub fn unaccessed(&self) -> Vec<String> {
        let mut missed = Vec::new();
        let mut seen = HashSet::new();
        self.collect_unaccessed("", &mut missed, &mut seen);
        missed
    }

    fn collect_unaccessed(
        &self,
        prefix: &str,
        missed: &mut Vec<String>,
        seen: &mut HashSet<*const Dictionary>,
    ) {
        if !seen.insert(self as *const Dictionary) {
            return;
        }
        for (name, token) in &self.map {
            if !token.accessed() {
                missed.push(format!("{prefix}{name}"));
            } else if let Some(Value::Dictionary(DictHandle::Owned(inner))) = token.value() {
                if let Ok(d) = inner.try_borrow() {
                    d.collect_unaccessed(&format!("{prefix}{name}::"), missed, seen);
                }
            }
        }
    }

    /// Renders a sorted table of all entries.
    pub fn info(&self) -> String {
        let rule = "-".repeat(RULE_WIDTH);
        let mut out = String::new();
        if !self.map.is_empty() {
            out.append_str(&rule);
            out.push('\n');
            out.append_padded("Name", NAME_WIDTH);
            out.append_padded("Type", TYPE_WIDTH);
            out.append_str("Value\n");
            out.append_str(&rule);
            out.push('\n');
            let mut entries: Vec<(&Name, &Token)> = self.map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp_nocase(b.0));
            for (name, token) in entries {
                out.append_padded(name.as_str(), NAME_WIDTH);
                out.append_padded(token.type_name(), TYPE_WIDTH);
                match token.datum() {
                    Some(d) => d.print(&mut out),
                    None => out.push_str("<void>"),
                }
                out.push('\n');
            }
            out.append_str(&rule);
            out.push('\n');
        }
        out.append_str("Total number of entries: ");
        out.append_i64(self.map.len() as i64);
        out.push('\n');
        out
    }

    /// Stores a dictionary that reaches back to `self` as an alias.
    fn demote_cycle(&self, mut token: Token) -> Token {
        let inner = match token.value() {
            Some(Value::Dictionary(DictHandle::Owned(d))) => Rc::clone(d),
            _ => return token,
        };
        let mut seen = HashSet::new();
        if reaches(&inner, self, &mut seen) {
            log::debug!("storing self-reaching dictionary as alias");
            if let Some(v) = token.value_mut() {
                *v = Value::Dictionary(DictHandle::Alias(Rc::downgrade(&inner)));
            }
        }
        token
    }
}

fn reaches(from: &DictRef, target: &Dictionary, seen: &mut HashSet<*const Dictionary>) -> bool {
    let ptr = from.as_ptr() as *const Dictionary;
    if std::ptr::eq(ptr, target) {
        return true;
    }
    if !seen.insert(ptr) {
        return false;
    }
    let Ok(d) = from.try_borrow() else {
        return false;
    };
    d.map.values().any(|t| match t.value() {
        Some(Value::Dictionary(DictHandle::Owned(inner))) => reaches(inner, target, seen),
        _ => false,
    })
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("<<");
        for (name, token) in &self.map {
            out.push_str(name.as_str());
            out.push(' ');
            match token.datum() {
                Some(d) => d.print(&mut out),
                None => out.push_str("<void>"),
            }
            out.push(',');
        }
        out.push_str(">>");
        f.write_str(&out)
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.map.iter().map(|(k, v)| (k.as_str(), v)))
            .finish()
    }
}
