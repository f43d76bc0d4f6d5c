//! Stack-machine runtime: tokens, dictionaries, typed overload dispatch and
//! the control-flow engine.

#![allow(clippy::new_without_default)]
#![allow(clippy::len_without_is_empty)]

pub mod core;
pub mod dict;
pub mod errors;
pub mod interp;
pub mod typechk;

mod builtins;
pub mod builtins_registry;
mod config;
mod util;

pub use crate::core::{
    Action, Datum, DatumConverter, DictHandle, Function, PoolRegistry, Primitive, Procedure,
    Token, TypeSlot, TypeTag, Value,
};
pub use dict::{DictRef, Dictionary, DictionaryStack};
pub use errors::{SliError, SliResult};
pub use interp::{DebugCommand, DebugPrompt, Interpreter, ScriptedPrompt, StdinPrompt, TokenStack};
pub use typechk::{TypeSequence, TypeTrie};

pub use builtins_registry::{BuiltinProvider, BuiltinRegistry, StdBuiltinProvider};
pub use config::RuntimeConfig;
pub use util::{Appendable, SharedBuffer};

pub use sli_core::{Name, PoolConfig, PoolStats};
