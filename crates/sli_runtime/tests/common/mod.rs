#![allow(dead_code)]

use sli_runtime::{Interpreter, RuntimeConfig, SharedBuffer, Token};

pub fn interpreter() -> (Interpreter, SharedBuffer) {
    interpreter_with(RuntimeConfig::default())
}

pub fn interpreter_with(config: RuntimeConfig) -> (Interpreter, SharedBuffer) {
    let mut interp = Interpreter::with_config(config);
    let diag = SharedBuffer::new();
    interp.set_diagnostics(Box::new(diag.clone()));
    (interp, diag)
}

pub fn int(i: i64) -> Token {
    Token::int(i)
}

pub fn name(s: &str) -> Token {
    Token::name(s)
}

pub fn lit(s: &str) -> Token {
    Token::literal(s)
}

/// A procedure as it appears in source: pushed, not run.
pub fn body(tokens: Vec<Token>) -> Token {
    Token::lit_procedure(tokens)
}

pub fn ints(interp: &Interpreter) -> Vec<i64> {
    interp
        .ostack()
        .iter()
        .map(|t| t.get::<i64>().unwrap())
        .collect()
}

pub fn run(interp: &mut Interpreter, statement: Vec<Token>) {
    interp.execute_all(statement).unwrap();
}
