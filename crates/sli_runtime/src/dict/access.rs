//! Typed reads and writes of dictionary entries.

use sli_core::Name;

use super::dictionary::{DictRef, Dictionary};
use crate::core::{DictHandle, Procedure, Token, Value};
use crate::errors::SliError;

/// Extraction of a Rust value from a token of the matching type.
pub trait FromToken: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;

    fn from_token(token: &Token) -> Result<Self, SliError> {
        token
            .value()
            .and_then(Self::from_value)
            .ok_or_else(|| SliError::type_mismatch(Self::EXPECTED, token.type_name()))
    }
}

/// Conversion of a Rust value into a fresh token.
pub trait IntoToken {
    fn into_token(self) -> Token;
}

impl FromToken for i64 {
    const EXPECTED: &'static str = "integertype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromToken for f64 {
    const EXPECTED: &'static str = "doubletype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromToken for bool {
    const EXPECTED: &'static str = "booltype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromToken for String {
    const EXPECTED: &'static str = "stringtype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromToken for Name {
    const EXPECTED: &'static str = "nametype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Name(n) | Value::Literal(n) => Some(n.clone()),
            _ => None,
        }
    }
}

impl FromToken for Procedure {
    const EXPECTED: &'static str = "proceduretype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Procedure(p) | Value::LitProcedure(p) => Some(p.clone()),
            _ => None,
        }
    }
}

impl FromToken for DictRef {
    const EXPECTED: &'static str = "dictionarytype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Dictionary(h) => h.get(),
            _ => None,
        }
    }
}

impl FromToken for Vec<Token> {
    const EXPECTED: &'static str = "arraytype";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromToken for Vec<f64> {
    const EXPECTED: &'static str = "array of doubles";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(|t| t.value().and_then(f64::from_value)).collect(),
            _ => None,
        }
    }
}

impl FromToken for Vec<i64> {
    const EXPECTED: &'static str = "array of integers";
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(|t| t.value().and_then(i64::from_value)).collect(),
            _ => None,
        }
    }
}

impl IntoToken for Token {
    fn into_token(self) -> Token {
        self
    }
}

impl IntoToken for i64 {
    fn into_token(self) -> Token {
        Token::int(self)
    }
}

impl IntoToken for i32 {
    fn into_token(self) -> Token {
        Token::int(self as i64)
    }
}

impl IntoToken for f64 {
    fn into_token(self) -> Token {
        Token::double(self)
    }
}

impl IntoToken for bool {
    fn into_token(self) -> Token {
        Token::bool(self)
    }
}

impl IntoToken for String {
    fn into_token(self) -> Token {
        Token::string(self)
    }
}

impl IntoToken for &str {
    fn into_token(self) -> Token {
        Token::string(self)
    }
}

impl IntoToken for Name {
    fn into_token(self) -> Token {
        Token::literal(self)
    }
}

impl IntoToken for Procedure {
    fn into_token(self) -> Token {
        Token::new(Value::Procedure(self))
    }
}

impl IntoToken for DictRef {
    fn into_token(self) -> Token {
        Token::new(Value::Dictionary(DictHandle::Owned(self)))
    }
}

impl IntoToken for Vec<Token> {
    fn into_token(self) -> Token {
        Token::array(self)
    }
}

impl IntoToken for Vec<f64> {
    fn into_token(self) -> Token {
        Token::array(self.into_iter().map(Token::double).collect())
    }
}

impl IntoToken for Vec<i64> {
    fn into_token(self) -> Token {
        Token::array(self.into_iter().map(Token::int).collect())
    }
}

/// Reads `name` as a `T`.
///
/// A missing entry, a void entry and an entry of another type all report
/// `UndefinedName`.
pub fn get_value<T: FromToken>(dict: &Dictionary, name: &str) -> Result<T, SliError> {
    let token = dict.lookup(name)?;
    T::from_token(token).map_err(|err| {
        log::debug!("'{}' cannot be read: {}", name, err);
        SliError::undefined(name)
    })
}

pub fn def<T: IntoToken>(dict: &mut Dictionary, name: &str, value: T) {
    dict.insert_move(name, value.into_token());
}

/// Overwrites `target` with the value of `name` if present.
///
/// Returns whether `target` was updated.
pub fn update_value<T: FromToken>(
    dict: &Dictionary,
    name: &str,
    target: &mut T,
) -> Result<bool, SliError> {
    match dict.peek(name) {
        Some(t) if !t.is_void() => {
            *target = get_value(dict, name)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Creates `name` as an empty array unless it already exists.
pub fn initialize_property_array(dict: &mut Dictionary, name: &str) {
    if !dict.known(name) {
        dict.insert_move(name, Token::array(Vec::new()));
    }
}

pub fn append_property<T: IntoToken>(
    dict: &mut Dictionary,
    name: &str,
    value: T,
) -> Result<(), SliError> {
    let token = dict.get_mut(name).ok_or_else(|| SliError::undefined(name))?;
    let found = token.type_name();
    match token.value_mut() {
        Some(Value::Array(items)) => {
            items.push(value.into_token());
            Ok(())
        }
        _ => Err(SliError::type_mismatch("arraytype", found)),
    }
}

/// Adds `values` element-wise to the array of doubles at `name`.
///
/// An empty array takes `values` as they are; otherwise the lengths must agree.
pub fn accumulate_property(
    dict: &mut Dictionary,
    name: &str,
    values: &[f64],
) -> Result<(), SliError> {
    let token = dict.get_mut(name).ok_or_else(|| SliError::undefined(name))?;
    let found = token.type_name();
    let Some(Value::Array(items)) = token.value_mut() else {
        return Err(SliError::type_mismatch("arraytype", found));
    };
    if items.is_empty() {
        items.extend(values.iter().copied().map(Token::double));
        return Ok(());
    }
    if items.len() != values.len() {
        return Err(SliError::type_mismatch(
            format!("array of {} doubles", values.len()),
            format!("array of {} elements", items.len()),
        ));
    }
    for (item, v) in items.iter_mut().zip(values) {
        let found = item.type_name();
        match item.value_mut() {
            Some(Value::Double(acc)) => *acc += v,
            _ => return Err(SliError::type_mismatch("doubletype", found)),
        }
    }
    Ok(())
}
