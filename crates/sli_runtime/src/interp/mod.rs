//! The execution engine.
//!
//! Executing a token means pushing it on the execution stack and stepping
//! until the stack drains back to where it started. Every step looks at the
//! top token and performs the action of its type. Procedures and loops keep
//! their state in frames on the execution stack, topped by a primitive that
//! advances the frame by one element per step.

mod control;
mod debug;
mod stack;

use std::io::{self, Write};
use std::rc::Rc;

use sli_core::Name;

use crate::builtins_registry::{BuiltinProvider, BuiltinRegistry, StdBuiltinProvider};
use crate::config::RuntimeConfig;
use crate::core::{
    Action, BuiltinFn, Function, PoolRegistry, Primitive, Procedure, Token, TrieHandle, TypeSlot,
    Value,
};
use crate::dict::access::{FromToken, IntoToken};
use crate::dict::{DictRef, DictionaryStack};
use crate::errors::SliError;

pub use debug::{DebugCommand, DebugPrompt, ScriptedPrompt, StdinPrompt};
pub use stack::TokenStack;

pub struct Interpreter {
    pub(crate) ostack: TokenStack,
    pub(crate) estack: TokenStack,
    dicts: DictionaryStack,
    config: RuntimeConfig,
    call_depth: usize,
    prompt: Option<Box<dyn DebugPrompt>>,
    diag: Box<dyn Write>,
    callback: Token,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_provider(config, &StdBuiltinProvider)
    }

    /// Creates an interpreter whose system dictionary holds the operators of `provider`.
    pub fn with_provider(config: RuntimeConfig, provider: &dyn BuiltinProvider) -> Self {
        PoolRegistry::install(config.pools);
        let mut interp = Self {
            ostack: TokenStack::new(),
            estack: TokenStack::new(),
            dicts: DictionaryStack::new(),
            config,
            call_depth: 0,
            prompt: None,
            diag: Box::new(io::stderr()),
            callback: Token::void(),
        };
        let mut registry = BuiltinRegistry::new();
        provider.install(&mut registry);
        registry.install_into(&mut interp);
        interp
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn set_step_mode(&mut self, on: bool) {
        self.config.step_mode = on;
    }

    pub fn set_debug_prompt(&mut self, prompt: Box<dyn DebugPrompt>) {
        self.prompt = Some(prompt);
    }

    /// Redirects backtraces, listings and step-mode messages.
    pub fn set_diagnostics(&mut self, out: Box<dyn Write>) {
        self.diag = out;
    }

    pub fn ostack(&self) -> &TokenStack {
        &self.ostack
    }

    pub fn ostack_mut(&mut self) -> &mut TokenStack {
        &mut self.ostack
    }

    pub fn estack(&self) -> &TokenStack {
        &self.estack
    }

    pub fn dictionaries(&self) -> &DictionaryStack {
        &self.dicts
    }

    pub fn dictionaries_mut(&mut self) -> &mut DictionaryStack {
        &mut self.dicts
    }

    /// Number of open procedure and loop frames.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub fn push(&mut self, value: impl IntoToken) {
        self.ostack.push(value.into_token());
    }

    /// Pops the top operand as a `T`; the operand stays if it has another type.
    pub fn pop<T: FromToken>(&mut self) -> Result<T, SliError> {
        let value = self.ostack.top()?.get::<T>()?;
        self.ostack.pop()?;
        Ok(value)
    }

    pub fn lookup(&self, name: &str) -> Option<Token> {
        self.dicts.lookup(name)
    }

    /// Binds `name` in the innermost dictionary unless it holds a read-only binding.
    pub fn def(&mut self, name: impl Into<Name>, token: Token) -> Result<(), SliError> {
        let name = name.into();
        let top = Rc::clone(self.dicts.top());
        let mut top = top.borrow_mut();
        if let Some(old) = top.peek(&name) {
            if old.datum().is_some_and(|d| !d.is_writeable()) {
                return Err(SliError::ReadOnly {
                    name: name.to_string(),
                });
            }
        }
        top.insert_move(name, token);
        Ok(())
    }

    /// Binds a plain operator in the system dictionary.
    pub fn register(&mut self, name: &str, func: BuiltinFn) {
        let mut token = Token::function(name, func);
        token.set_writeable(false);
        self.dicts.base_def(name, token);
    }

    /// Adds an overload of `name` for operands of `types` (top of stack first).
    ///
    /// Returns false if the signature was already taken.
    pub fn register_typed(&mut self, name: &str, types: &[TypeSlot], func: BuiltinFn) -> bool {
        let system = Rc::clone(self.dicts.system());
        let existing = match system.borrow().peek(name).and_then(Token::value) {
            Some(Value::Trie(handle)) => Some(handle.clone()),
            Some(other) => {
                log::warn!(
                    "{} is bound to a {}, replaced by an overload table",
                    name,
                    other.tag().name()
                );
                None
            }
            None => None,
        };
        let handle = match existing {
            Some(handle) => handle,
            None => {
                let handle = TrieHandle::new(name);
                let mut token = Token::new(Value::Trie(handle.clone()));
                token.set_writeable(false);
                system.borrow_mut().insert_move(name, token);
                handle
            }
        };
        handle
            .trie()
            .borrow_mut()
            .insert_move(types, Token::function(name, func))
    }

    /// Merges `source` into the dictionary bound to `target`.
    pub fn add_dict(&self, source: &DictRef, target: &str) -> Result<(), SliError> {
        let target = self.resolve_dict(target)?;
        if Rc::ptr_eq(source, &target) {
            return match source.borrow().iter().next() {
                Some((name, _)) => Err(SliError::undefined(name.as_str())),
                None => Ok(()),
            };
        }
        source.borrow().add_dict(&mut target.borrow_mut())
    }

    /// Removes the names of `source` from the dictionary bound to `target`.
    pub fn remove_dict(&self, source: &DictRef, target: &str) -> Result<(), SliError> {
        let target = self.resolve_dict(target)?;
        if Rc::ptr_eq(source, &target) {
            let names: Vec<Name> = source.borrow().iter().map(|(n, _)| n.clone()).collect();
            let mut dict = source.borrow_mut();
            for name in &names {
                dict.remove(name);
            }
            return Ok(());
        }
        source.borrow().remove_dict(&mut target.borrow_mut());
        Ok(())
    }

    fn resolve_dict(&self, name: &str) -> Result<DictRef, SliError> {
        let token = self
            .dicts
            .lookup(name)
            .ok_or_else(|| SliError::undefined(name))?;
        token.get::<DictRef>()
    }

    /// Runs `action` once the execution stack next drains to the statement base.
    pub fn set_callback(&mut self, action: Token) {
        self.callback = Token::callback(action);
    }

    pub fn clear_callback(&mut self) {
        self.callback.clear();
    }

    /// Executes one top-level statement.
    ///
    /// On failure the frames opened by the statement render their backtrace
    /// to the diagnostic sink and are discarded; the operand stack keeps
    /// whatever the statement left on it.
    pub fn execute(&mut self, token: Token) -> Result<(), SliError> {
        let base = self.estack.load();
        let depth = self.call_depth;
        self.estack.push(token);
        let result = self.run(base);
        if let Err(err) = &result {
            log::debug!("statement failed: {}", err);
            self.backtrace(base, err);
            self.estack.truncate(base);
            self.call_depth = depth;
        }
        result
    }

    /// Executes statements in order, stopping at the first failure.
    pub fn execute_all<I: IntoIterator<Item = Token>>(&mut self, tokens: I) -> Result<(), SliError> {
        for token in tokens {
            self.execute(token)?;
        }
        Ok(())
    }

    fn run(&mut self, base: usize) -> Result<(), SliError> {
        loop {
            while self.estack.load() > base {
                self.step()?;
            }
            if self.callback.is_void() {
                return Ok(());
            }
            let callback = self.callback.take();
            self.estack.push(callback);
        }
    }

    fn step(&mut self) -> Result<(), SliError> {
        let action = match self.estack.top()?.datum() {
            Some(d) => d.action(),
            None => {
                self.estack.pop()?;
                return Ok(());
            }
        };
        match action {
            Action::Push => {
                let token = self.estack.pop()?;
                self.ostack.push(token);
            }
            Action::Lookup => {
                let name = self.estack.top()?.get::<Name>()?;
                let value = self
                    .dicts
                    .lookup(&name)
                    .ok_or_else(|| SliError::undefined(name.as_str()))?;
                *self.estack.top_mut()? = value;
            }
            Action::Iterate => {
                self.estack.push(Token::int(0));
                self.estack.push(Token::primitive(Primitive::Iterate));
                self.enter_frame();
            }
            Action::PushProcedure => {
                let proc = self.estack.pop()?.get::<Procedure>()?;
                self.ostack.push(Token::new(Value::Procedure(proc)));
            }
            Action::Call => {
                let func = function_of(&self.estack.pop()?)?;
                func.call(self)?;
            }
            Action::Dispatch => {
                let token = self.estack.pop()?;
                let Some(Value::Trie(handle)) = token.value() else {
                    return Err(SliError::type_mismatch("trietype", token.type_name()));
                };
                let func = {
                    let trie = handle.trie().borrow();
                    let selected = trie.lookup(&self.ostack).inspect_err(|err| {
                        log::debug!("no overload of {} applies: {}", handle.name(), err)
                    })?;
                    function_of(selected)?
                };
                func.call(self)?;
            }
            Action::Step => {
                let primitive = match self.estack.top()?.value() {
                    Some(Value::Primitive(p)) => *p,
                    _ => return Err(SliError::type_mismatch("primitivetype", "void")),
                };
                self.step_primitive(primitive)?;
            }
            Action::Unwrap => {
                let token = self.estack.pop()?;
                let inner = match token.value() {
                    Some(Value::Callback(inner)) => inner.clone(),
                    _ => Token::void(),
                };
                self.estack.push(inner);
            }
        }
        Ok(())
    }

    pub(crate) fn enter_frame(&mut self) {
        self.call_depth += 1;
    }

    pub(crate) fn leave_frame(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn function_of(token: &Token) -> Result<Function, SliError> {
    match token.value() {
        Some(Value::Function(f)) => Ok(f.clone()),
        _ => Err(SliError::type_mismatch("functiontype", token.type_name())),
    }
}
