//! Type tags and the dispatch action attached to each type.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Integer,
    Double,
    Bool,
    String,
    Name,
    Literal,
    Procedure,
    LitProcedure,
    Array,
    Dictionary,
    Function,
    Trie,
    Primitive,
    Callback,
    Mark,
}

/// What the interpreter does when a datum of a given type reaches the top of
/// the execution stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Move the token to the operand stack.
    Push,
    /// Replace the name with the value it is bound to.
    Lookup,
    /// Open a procedure frame.
    Iterate,
    /// Push the executable form of a literal procedure.
    PushProcedure,
    /// Call a built-in function.
    Call,
    /// Select an overload by the operand types and call it.
    Dispatch,
    /// Advance a control-flow frame by one step.
    Step,
    /// Replace the callback by the token it wraps.
    Unwrap,
}

impl TypeTag {
    pub const COUNT: usize = 15;

    pub const ALL: [TypeTag; TypeTag::COUNT] = [
        TypeTag::Integer,
        TypeTag::Double,
        TypeTag::Bool,
        TypeTag::String,
        TypeTag::Name,
        TypeTag::Literal,
        TypeTag::Procedure,
        TypeTag::LitProcedure,
        TypeTag::Array,
        TypeTag::Dictionary,
        TypeTag::Function,
        TypeTag::Trie,
        TypeTag::Primitive,
        TypeTag::Callback,
        TypeTag::Mark,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Integer => "integertype",
            TypeTag::Double => "doubletype",
            TypeTag::Bool => "booltype",
            TypeTag::String => "stringtype",
            TypeTag::Name => "nametype",
            TypeTag::Literal => "literaltype",
            TypeTag::Procedure => "proceduretype",
            TypeTag::LitProcedure => "literalproceduretype",
            TypeTag::Array => "arraytype",
            TypeTag::Dictionary => "dictionarytype",
            TypeTag::Function => "functiontype",
            TypeTag::Trie => "trietype",
            TypeTag::Primitive => "primitivetype",
            TypeTag::Callback => "callbacktype",
            TypeTag::Mark => "marktype",
        }
    }

    pub fn default_action(self) -> Action {
        match self {
            TypeTag::Name => Action::Lookup,
            TypeTag::Procedure => Action::Iterate,
            TypeTag::LitProcedure => Action::PushProcedure,
            TypeTag::Function => Action::Call,
            TypeTag::Trie => Action::Dispatch,
            TypeTag::Primitive => Action::Step,
            TypeTag::Callback => Action::Unwrap,
            _ => Action::Push,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One position of an overload signature: a concrete type or the wildcard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeSlot {
    Is(TypeTag),
    Any,
}

impl TypeSlot {
    #[inline]
    pub fn matches(self, tag: TypeTag) -> bool {
        match self {
            TypeSlot::Is(t) => t == tag,
            TypeSlot::Any => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeSlot::Is(t) => t.name(),
            TypeSlot::Any => "anytype",
        }
    }
}

impl From<TypeTag> for TypeSlot {
    fn from(tag: TypeTag) -> Self {
        TypeSlot::Is(tag)
    }
}

impl fmt::Display for TypeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
