//! Tokens: owning handles to pooled datums.

use std::cell::Cell;
use std::fmt;
use std::mem;

use sli_core::{Name, PoolBox};

use super::registry::PoolRegistry;
use super::types::TypeTag;
use super::value::{BuiltinFn, Datum, DictHandle, Function, Primitive, Procedure, Value};
use crate::dict::DictRef;
use crate::dict::access::FromToken;
use crate::errors::SliError;

/// Owning handle to at most one datum.
///
/// A void token holds nothing. Cloning a token clones its datum; `take` and
/// `swap` move datums without copying them.
pub struct Token {
    datum: Option<PoolBox<Datum>>,
    accessed: Cell<bool>,
}

impl Token {
    #[inline]
    pub fn void() -> Self {
        Self {
            datum: None,
            accessed: Cell::new(false),
        }
    }

    pub fn new(value: Value) -> Self {
        Self::from_datum(Datum::new(value))
    }

    pub fn from_datum(datum: Datum) -> Self {
        Self {
            datum: Some(PoolRegistry::alloc(datum)),
            accessed: Cell::new(false),
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.datum.is_none()
    }

    #[inline]
    pub fn datum(&self) -> Option<&Datum> {
        self.datum.as_deref()
    }

    #[inline]
    pub fn datum_mut(&mut self) -> Option<&mut Datum> {
        self.datum.as_deref_mut()
    }

    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.datum().map(Datum::value)
    }

    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut Value> {
        self.datum_mut().map(Datum::value_mut)
    }

    #[inline]
    pub fn tag(&self) -> Option<TypeTag> {
        self.datum().map(Datum::tag)
    }

    pub fn type_name(&self) -> &'static str {
        self.datum().map_or("void", Datum::type_name)
    }

    #[inline]
    pub fn is_a(&self, tag: TypeTag) -> bool {
        self.tag() == Some(tag)
    }

    /// Moves the datum out, leaving this token void.
    #[inline]
    pub fn take(&mut self) -> Token {
        mem::replace(self, Token::void())
    }

    #[inline]
    pub fn swap(&mut self, other: &mut Token) {
        mem::swap(self, other);
    }

    pub fn clear(&mut self) {
        self.datum = None;
    }

    pub fn accessed(&self) -> bool {
        self.accessed.get()
    }

    pub fn set_access_flag(&self) {
        self.accessed.set(true);
    }

    pub fn clear_access_flag(&self) {
        self.accessed.set(false);
    }

    pub fn is_writeable(&self) -> bool {
        self.datum().is_some_and(Datum::is_writeable)
    }

    pub fn set_writeable(&mut self, writeable: bool) {
        if let Some(d) = self.datum_mut() {
            d.set_writeable(writeable);
        }
    }

    /// Typed extraction.
    pub fn get<T: FromToken>(&self) -> Result<T, SliError> {
        T::from_token(self)
    }

    pub fn int(i: i64) -> Self {
        Token::new(Value::Integer(i))
    }

    pub fn double(f: f64) -> Self {
        Token::new(Value::Double(f))
    }

    pub fn bool(b: bool) -> Self {
        Token::new(Value::Bool(b))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Token::new(Value::String(s.into()))
    }

    pub fn name(name: impl Into<Name>) -> Self {
        Token::new(Value::Name(name.into()))
    }

    pub fn literal(name: impl Into<Name>) -> Self {
        Token::new(Value::Literal(name.into()))
    }

    pub fn procedure(tokens: Vec<Token>) -> Self {
        Token::new(Value::Procedure(Procedure::new(tokens)))
    }

    pub fn lit_procedure(tokens: Vec<Token>) -> Self {
        Token::new(Value::LitProcedure(Procedure::new(tokens)))
    }

    pub fn array(items: Vec<Token>) -> Self {
        Token::new(Value::Array(items))
    }

    pub fn dictionary(dict: DictRef) -> Self {
        Token::new(Value::Dictionary(DictHandle::Owned(dict)))
    }

    pub fn function(name: impl Into<Name>, func: BuiltinFn) -> Self {
        Token::new(Value::Function(Function::new(name, func)))
    }

    pub fn primitive(p: Primitive) -> Self {
        Token::new(Value::Primitive(p))
    }

    pub fn callback(action: Token) -> Self {
        Token::new(Value::Callback(action))
    }

    pub fn mark() -> Self {
        Token::new(Value::Mark)
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::void()
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        match self.datum() {
            Some(d) => Token::from_datum(d.clone()),
            None => Token::void(),
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self.datum(), other.datum()) {
            (Some(a), Some(b)) => a.equals(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl From<Value> for Token {
    fn from(value: Value) -> Self {
        Token::new(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "Token<{}>({})", v.tag(), v.to_pretty_string()),
            None => f.write_str("Token<void>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_leaves_void_behind() {
        let mut a = Token::int(7);
        let b = a.take();
        assert!(a.is_void());
        assert_eq!(b.get::<i64>(), Ok(7));
    }

    #[test]
    fn clone_is_deep_and_resets_access() {
        let a = Token::array(vec![Token::int(1), Token::int(2)]);
        a.set_access_flag();
        let mut b = a.clone();
        assert!(!b.accessed());
        if let Some(Value::Array(items)) = b.value_mut() {
            items.push(Token::int(3));
        }
        assert_ne!(a, b);
    }

    #[test]
    fn tokens_come_from_the_pool_of_their_type() {
        let before = PoolRegistry::stats(TypeTag::Mark).instantiations;
        let m = Token::mark();
        assert_eq!(PoolRegistry::stats(TypeTag::Mark).instantiations, before + 1);
        drop(m);
        assert_eq!(PoolRegistry::stats(TypeTag::Mark).instantiations, before);
    }
}
