//! Core operators.
//!
//! Typed operators are only reached through their overload table, so the
//! operand types are known to match when they run.

mod control;
mod math;
mod stack;

pub(crate) use control::*;
pub(crate) use math::*;
pub(crate) use stack::*;
