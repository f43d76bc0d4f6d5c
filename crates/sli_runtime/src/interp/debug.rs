//! Interactive stepping.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::core::Token;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugCommand {
    /// Show the current procedure with the cursor marked, then ask again.
    List,
    /// Execute the next element.
    Continue,
}

impl DebugCommand {
    pub fn from_input(line: &str) -> Self {
        match line.trim_start().chars().next() {
            Some('l') | Some('L') => DebugCommand::List,
            _ => DebugCommand::Continue,
        }
    }
}

/// Asked for a command before every step while step mode is on.
pub trait DebugPrompt {
    fn command(&mut self, next: &Token) -> DebugCommand;
}

/// Reads commands from standard input.
pub struct StdinPrompt;

impl DebugPrompt for StdinPrompt {
    fn command(&mut self, next: &Token) -> DebugCommand {
        eprint!("   {}  (l: list, return: step) > ", next);
        io::stderr().flush().ok();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => DebugCommand::Continue,
            Ok(_) => DebugCommand::from_input(&line),
        }
    }
}

/// Replays a fixed command sequence and continues once it runs out.
#[derive(Default)]
pub struct ScriptedPrompt {
    commands: VecDeque<DebugCommand>,
}

impl ScriptedPrompt {
    pub fn new(commands: impl IntoIterator<Item = DebugCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

impl DebugPrompt for ScriptedPrompt {
    fn command(&mut self, _next: &Token) -> DebugCommand {
        self.commands.pop_front().unwrap_or(DebugCommand::Continue)
    }
}
