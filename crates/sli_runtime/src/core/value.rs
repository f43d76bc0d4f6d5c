//! Datum payloads.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use sli_core::Name;

use super::token::Token;
use super::types::{Action, TypeTag};
use crate::dict::{DictRef, Dictionary};
use crate::errors::SliError;
use crate::interp::Interpreter;
use crate::typechk::TypeTrie;

pub type BuiltinFn = fn(&mut Interpreter) -> Result<(), SliError>;

#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Double(f64),
    Bool(bool),
    String(String),
    /// Executable name, looked up when executed.
    Name(Name),
    /// Literal name, pushed as is.
    Literal(Name),
    Procedure(Procedure),
    LitProcedure(Procedure),
    Array(Vec<Token>),
    Dictionary(DictHandle),
    Function(Function),
    Trie(TrieHandle),
    Primitive(Primitive),
    Callback(Token),
    Mark,
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) => TypeTag::Integer,
            Value::Double(_) => TypeTag::Double,
            Value::Bool(_) => TypeTag::Bool,
            Value::String(_) => TypeTag::String,
            Value::Name(_) => TypeTag::Name,
            Value::Literal(_) => TypeTag::Literal,
            Value::Procedure(_) => TypeTag::Procedure,
            Value::LitProcedure(_) => TypeTag::LitProcedure,
            Value::Array(_) => TypeTag::Array,
            Value::Dictionary(_) => TypeTag::Dictionary,
            Value::Function(_) => TypeTag::Function,
            Value::Trie(_) => TypeTag::Trie,
            Value::Primitive(_) => TypeTag::Primitive,
            Value::Callback(_) => TypeTag::Callback,
            Value::Mark => TypeTag::Mark,
        }
    }

    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Name(a), Value::Name(b)) => a == b,
            (Value::Literal(a), Value::Literal(b)) => a == b,
            (Value::Procedure(a), Value::Procedure(b)) => a.tokens() == b.tokens(),
            (Value::LitProcedure(a), Value::LitProcedure(b)) => a.tokens() == b.tokens(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Dictionary(a), Value::Dictionary(b)) => a.identity() == b.identity(),
            (Value::Function(a), Value::Function(b)) => a.name() == b.name(),
            (Value::Trie(a), Value::Trie(b)) => Rc::ptr_eq(&a.trie, &b.trie),
            (Value::Primitive(a), Value::Primitive(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => a == b,
            (Value::Mark, Value::Mark) => true,
            _ => false,
        }
    }
}

/// A value together with its access attributes.
#[derive(Clone)]
pub struct Datum {
    value: Value,
    writeable: bool,
}

impl Datum {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            writeable: true,
        }
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.value.tag()
    }

    pub fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    #[inline]
    pub fn action(&self) -> Action {
        self.tag().default_action()
    }

    pub fn is_writeable(&self) -> bool {
        self.writeable
    }

    pub fn set_writeable(&mut self, writeable: bool) {
        self.writeable = writeable;
    }

    pub fn equals(&self, other: &Datum) -> bool {
        self.value.equals(&other.value)
    }
}

/// An immutable sequence of tokens executed in order.
#[derive(Clone)]
pub struct Procedure(Rc<[Token]>);

impl Procedure {
    pub fn new(tokens: Vec<Token>) -> Self {
        Procedure(Rc::from(tokens))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Token> {
        self.0.get(pos)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }
}

impl FromIterator<Token> for Procedure {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Procedure(iter.into_iter().collect())
    }
}

#[derive(Clone)]
pub struct Function {
    name: Name,
    func: BuiltinFn,
}

impl Function {
    pub fn new(name: impl Into<Name>, func: BuiltinFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    #[inline]
    pub fn call(&self, interp: &mut Interpreter) -> Result<(), SliError> {
        (self.func)(interp)
    }
}

/// A named overload table.
#[derive(Clone)]
pub struct TrieHandle {
    name: Name,
    trie: Rc<RefCell<TypeTrie>>,
}

impl TrieHandle {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            trie: Rc::new(RefCell::new(TypeTrie::new())),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn trie(&self) -> &Rc<RefCell<TypeTrie>> {
        &self.trie
    }
}

/// Reference to a dictionary.
///
/// A dictionary stored inside one of its own descendants is held as an
/// `Alias`, so reference cycles never keep dictionaries alive.
#[derive(Clone)]
pub enum DictHandle {
    Owned(DictRef),
    Alias(Weak<RefCell<Dictionary>>),
}

impl DictHandle {
    /// The referenced dictionary, if it is still alive.
    pub fn get(&self) -> Option<DictRef> {
        match self {
            DictHandle::Owned(d) => Some(Rc::clone(d)),
            DictHandle::Alias(w) => w.upgrade(),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, DictHandle::Alias(_))
    }

    pub fn identity(&self) -> *const RefCell<Dictionary> {
        match self {
            DictHandle::Owned(d) => Rc::as_ptr(d),
            DictHandle::Alias(w) => w.as_ptr(),
        }
    }
}

/// Control-flow steps that live on the execution stack above their frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Iterate,
    Loop,
    Repeat,
    For,
    ForAllArray,
    ForAllIndexedArray,
    ForAllString,
    ForAllIndexedString,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Iterate => "%iterate",
            Primitive::Loop => "%loop",
            Primitive::Repeat => "%repeat",
            Primitive::For => "%for",
            Primitive::ForAllArray => "%forallarray",
            Primitive::ForAllIndexedArray => "%forallindexedarray",
            Primitive::ForAllString => "%forallstring",
            Primitive::ForAllIndexedString => "%forallindexedstring",
        }
    }

    /// Number of execution stack entries of the frame, primitive included.
    pub fn frame_size(self) -> usize {
        match self {
            Primitive::Iterate => 3,
            Primitive::Loop => 4,
            Primitive::Repeat => 5,
            Primitive::For => 7,
            _ => 6,
        }
    }
}
