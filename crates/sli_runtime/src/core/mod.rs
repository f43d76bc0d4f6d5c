pub mod convert;
mod print;
pub mod registry;
pub mod token;
pub mod types;
pub mod value;

pub use convert::DatumConverter;
pub use registry::PoolRegistry;
pub use token::Token;
pub use types::{Action, TypeSlot, TypeTag};
pub use value::{BuiltinFn, Datum, DictHandle, Function, Primitive, Procedure, TrieHandle, Value};
