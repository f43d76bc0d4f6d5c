//! Core types for the SLI runtime.
//!
//! This crate contains the building blocks that do not depend on the interpreter:
//! - `Pool` - fixed-size-class slab allocator with a free list
//! - `PoolBox` - owning pointer whose block is returned to its pool on drop
//! - `Name` - hashed, cheaply clonable symbol used as dictionary key

pub mod name;
pub mod pool;

pub use name::Name;
pub use pool::{Pool, PoolBox, PoolConfig, PoolStats, SharedPool, LINK_SIZE};
