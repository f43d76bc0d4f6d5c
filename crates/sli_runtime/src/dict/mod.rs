pub mod access;
mod dictionary;
mod stack;

pub use dictionary::{AsKey, DictRef, Dictionary, NameKey};
pub use stack::DictionaryStack;
