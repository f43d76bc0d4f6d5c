use smallvec::SmallVec;

use super::builtins;
use crate::core::{BuiltinFn, TypeSlot, TypeTag};
use crate::interp::Interpreter;
use crate::typechk::TypeSequence;

enum Entry {
    Plain(BuiltinFn),
    Typed(TypeSequence, BuiltinFn),
}

pub struct BuiltinRegistry {
    entries: Vec<(String, Entry)>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, fun: BuiltinFn) {
        self.entries.push((name.to_string(), Entry::Plain(fun)));
    }

    /// Registers one overload of `name`; `types` lists the operands top of stack first.
    pub fn register_typed(&mut self, name: &str, types: &[TypeSlot], fun: BuiltinFn) {
        let types: TypeSequence = SmallVec::from_slice(types);
        self.entries.push((name.to_string(), Entry::Typed(types, fun)));
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|(n, _)| n.clone()).collect();
        names.dedup();
        names
    }

    pub fn install_into(self, interp: &mut Interpreter) {
        for (name, entry) in self.entries {
            match entry {
                Entry::Plain(fun) => interp.register(&name, fun),
                Entry::Typed(types, fun) => {
                    interp.register_typed(&name, &types, fun);
                }
            }
        }
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub trait BuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry);
}

pub struct StdBuiltinProvider;

const ANY: TypeSlot = TypeSlot::Any;
const INT: TypeSlot = TypeSlot::Is(TypeTag::Integer);
const DBL: TypeSlot = TypeSlot::Is(TypeTag::Double);
const BOOL: TypeSlot = TypeSlot::Is(TypeTag::Bool);
const STR: TypeSlot = TypeSlot::Is(TypeTag::String);
const LIT: TypeSlot = TypeSlot::Is(TypeTag::Literal);
const PROC: TypeSlot = TypeSlot::Is(TypeTag::Procedure);
const ARRAY: TypeSlot = TypeSlot::Is(TypeTag::Array);

impl BuiltinProvider for StdBuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry) {
        // stack
        registry.register_typed("pop", &[ANY], builtins::builtin_pop);
        registry.register_typed("dup", &[ANY], builtins::builtin_dup);
        registry.register_typed("exch", &[ANY, ANY], builtins::builtin_exch);
        registry.register_typed("exec", &[ANY], builtins::builtin_exec);
        registry.register_typed("def", &[ANY, LIT], builtins::builtin_def);
        // arithmetic
        registry.register_typed("add", &[INT, INT], builtins::builtin_add_ii);
        registry.register_typed("add", &[DBL, DBL], builtins::builtin_add_dd);
        registry.register_typed("sub", &[INT, INT], builtins::builtin_sub_ii);
        registry.register_typed("sub", &[DBL, DBL], builtins::builtin_sub_dd);
        registry.register_typed("mul", &[INT, INT], builtins::builtin_mul_ii);
        registry.register_typed("mul", &[DBL, DBL], builtins::builtin_mul_dd);
        registry.register_typed("gt", &[INT, INT], builtins::builtin_gt_ii);
        registry.register_typed("gt", &[DBL, DBL], builtins::builtin_gt_dd);
        // control
        registry.register_typed("if", &[PROC, BOOL], builtins::builtin_if);
        registry.register_typed("loop", &[PROC], builtins::builtin_loop);
        registry.register("exit", builtins::builtin_exit);
        registry.register_typed("repeat", &[PROC, INT], builtins::builtin_repeat);
        registry.register_typed("for", &[PROC, INT, INT, INT], builtins::builtin_for);
        registry.register_typed("forall", &[PROC, ARRAY], builtins::builtin_forall);
        registry.register_typed("forall", &[PROC, STR], builtins::builtin_forall);
        registry.register_typed("forallindexed", &[PROC, ARRAY], builtins::builtin_forallindexed);
        registry.register_typed("forallindexed", &[PROC, STR], builtins::builtin_forallindexed);
    }
}
