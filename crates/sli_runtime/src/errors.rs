//! Runtime error taxonomy.
//!
//! None of these errors is handled inside the core: they unwind through the
//! execution stack, where every control frame renders its backtrace, and abort
//! the current top-level statement.

use std::fmt;

pub mod messages {
    pub const UNDEFINED_NAME: &str = "UndefinedName";
    pub const ARGUMENT_TYPE: &str = "ArgumentType";
    pub const STACK_UNDERFLOW: &str = "StackUnderflow";
    pub const TYPE_MISMATCH: &str = "TypeMismatch";
    pub const INVALID_EXIT: &str = "InvalidExit";
    pub const READ_ONLY: &str = "ReadOnly";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SliError {
    /// A name is missing from a dictionary, or a dictionary merge collided on it.
    UndefinedName { name: String },
    /// No overload accepts the operand at `level` (0 = top of stack).
    ArgumentType { level: usize },
    /// An operation needed `needed` operands but only `available` were present.
    StackUnderflow { needed: usize, available: usize },
    /// A value was not of the expected type.
    TypeMismatch { expected: String, found: String },
    /// `exit` was executed outside of any loop.
    InvalidExit,
    /// Attempt to redefine a read-only entry.
    ReadOnly { name: String },
}

pub type SliResult<T> = Result<T, SliError>;

impl SliError {
    pub fn undefined(name: impl Into<String>) -> Self {
        SliError::UndefinedName { name: name.into() }
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        SliError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn underflow(needed: usize, available: usize) -> Self {
        SliError::StackUnderflow { needed, available }
    }

    /// Short error name as shown in the first line of a report.
    pub fn kind(&self) -> &'static str {
        match self {
            SliError::UndefinedName { .. } => messages::UNDEFINED_NAME,
            SliError::ArgumentType { .. } => messages::ARGUMENT_TYPE,
            SliError::StackUnderflow { .. } => messages::STACK_UNDERFLOW,
            SliError::TypeMismatch { .. } => messages::TYPE_MISMATCH,
            SliError::InvalidExit => messages::INVALID_EXIT,
            SliError::ReadOnly { .. } => messages::READ_ONLY,
        }
    }
}

impl fmt::Display for SliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind())?;
        match self {
            SliError::UndefinedName { name } => write!(f, "name '{}' is not defined", name),
            SliError::ArgumentType { level } => {
                write!(f, "no matching overload for the operand at level {}", level)
            }
            SliError::StackUnderflow { needed, available } => write!(
                f,
                "expected {} operands, but only {} available",
                needed, available
            ),
            SliError::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            SliError::InvalidExit => write!(f, "exit called outside of a loop"),
            SliError::ReadOnly { name } => write!(f, "'{}' is read-only", name),
        }
    }
}

impl std::error::Error for SliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind_first() {
        let err = SliError::underflow(2, 1);
        assert_eq!(
            err.to_string(),
            "StackUnderflow: expected 2 operands, but only 1 available"
        );
        assert_eq!(SliError::ArgumentType { level: 1 }.kind(), "ArgumentType");
        assert!(SliError::undefined("tau").to_string().contains("'tau'"));
    }
}
