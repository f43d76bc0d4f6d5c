//! Loop frames and their primitives.
//!
//! Frame layouts on the execution stack, bottom to top:
//!
//! ```text
//! %iterate              proc pos %iterate
//! %loop                 mark proc pos %loop
//! %repeat               mark count proc pos %repeat
//! %for                  mark incr limit counter proc pos %for
//! %forall...            mark object limit count proc %forall...
//! ```

use std::io::Write;

use super::Interpreter;
use super::debug::DebugCommand;
use crate::core::{Primitive, Procedure, Token, TypeTag, Value};
use crate::errors::SliError;

impl Interpreter {
    pub(crate) fn step_primitive(&mut self, primitive: Primitive) -> Result<(), SliError> {
        match primitive {
            Primitive::Iterate => self.step_iterate(),
            Primitive::Loop => self.step_loop(),
            Primitive::Repeat => self.step_repeat(),
            Primitive::For => self.step_for(),
            Primitive::ForAllArray
            | Primitive::ForAllIndexedArray
            | Primitive::ForAllString
            | Primitive::ForAllIndexedString => self.step_forall(primitive),
        }
    }

    pub(crate) fn open_loop(&mut self, proc: Procedure) {
        // no element of an empty body can ever call `exit`
        if proc.is_empty() {
            return;
        }
        self.estack.push(Token::mark());
        self.estack.push(Token::new(Value::Procedure(proc)));
        self.estack.push(Token::int(0));
        self.estack.push(Token::primitive(Primitive::Loop));
        self.enter_frame();
    }

    pub(crate) fn open_repeat(&mut self, count: i64, proc: Procedure) {
        let len = proc.len() as i64;
        self.estack.push(Token::mark());
        self.estack.push(Token::int(count));
        self.estack.push(Token::new(Value::Procedure(proc)));
        self.estack.push(Token::int(len));
        self.estack.push(Token::primitive(Primitive::Repeat));
        self.enter_frame();
    }

    pub(crate) fn open_for(&mut self, start: i64, incr: i64, limit: i64, proc: Procedure) {
        let len = proc.len() as i64;
        self.estack.push(Token::mark());
        self.estack.push(Token::int(incr));
        self.estack.push(Token::int(limit));
        self.estack.push(Token::int(start));
        self.estack.push(Token::new(Value::Procedure(proc)));
        self.estack.push(Token::int(len));
        self.estack.push(Token::primitive(Primitive::For));
        self.enter_frame();
    }

    /// Opens a `forall` frame over an array or the bytes of a string.
    pub(crate) fn open_forall(
        &mut self,
        object: Token,
        proc: Procedure,
        indexed: bool,
    ) -> Result<(), SliError> {
        let (limit, primitive) = match (object.value(), indexed) {
            (Some(Value::Array(items)), false) => (items.len(), Primitive::ForAllArray),
            (Some(Value::Array(items)), true) => (items.len(), Primitive::ForAllIndexedArray),
            (Some(Value::String(s)), false) => (s.len(), Primitive::ForAllString),
            (Some(Value::String(s)), true) => (s.len(), Primitive::ForAllIndexedString),
            _ => {
                return Err(SliError::type_mismatch(
                    "arraytype or stringtype",
                    object.type_name(),
                ));
            }
        };
        self.estack.push(Token::mark());
        self.estack.push(object);
        self.estack.push(Token::int(limit as i64));
        self.estack.push(Token::int(0));
        self.estack.push(Token::new(Value::Procedure(proc)));
        self.estack.push(Token::primitive(primitive));
        self.enter_frame();
        Ok(())
    }

    /// Leaves the innermost loop: everything down to and including its mark
    /// is removed from the execution stack.
    pub(crate) fn exit_loop(&mut self) -> Result<(), SliError> {
        let Some(above) = self.estack.iter().rev().position(|t| t.is_a(TypeTag::Mark)) else {
            return Err(SliError::InvalidExit);
        };
        for _ in 0..=above {
            let token = self.estack.pop()?;
            if token.is_a(TypeTag::Primitive) {
                self.leave_frame();
            }
        }
        Ok(())
    }

    fn step_iterate(&mut self) -> Result<(), SliError> {
        let proc = self.frame_proc(2)?;
        let pos = self.frame_int(1)? as usize;
        let Some(next) = proc.get(pos).cloned() else {
            return self.close_frame(Primitive::Iterate);
        };
        self.pause(&proc, pos, &next);
        if pos + 1 == proc.len() && self.config.optimize_tail_recursion {
            self.close_frame(Primitive::Iterate)?;
        } else {
            self.set_frame_int(1, pos as i64 + 1)?;
        }
        self.estack.push(next);
        Ok(())
    }

    fn step_loop(&mut self) -> Result<(), SliError> {
        let proc = self.frame_proc(2)?;
        let pos = self.frame_int(1)? as usize;
        match proc.get(pos).cloned() {
            Some(next) => self.advance(&proc, pos, next),
            None => {
                self.set_frame_int(1, 0)?;
                self.note("Loop: starting new iteration.");
                Ok(())
            }
        }
    }

    fn step_repeat(&mut self) -> Result<(), SliError> {
        let proc = self.frame_proc(2)?;
        let pos = self.frame_int(1)? as usize;
        if let Some(next) = proc.get(pos).cloned() {
            return self.advance(&proc, pos, next);
        }
        let count = self.frame_int(3)?;
        if count > 0 {
            self.set_frame_int(1, 0)?;
            self.set_frame_int(3, count - 1)?;
            self.note(&format!("repeat: {} iterations left.", count - 1));
            Ok(())
        } else {
            self.close_frame(Primitive::Repeat)
        }
    }

    fn step_for(&mut self) -> Result<(), SliError> {
        let proc = self.frame_proc(2)?;
        let pos = self.frame_int(1)? as usize;
        if let Some(next) = proc.get(pos).cloned() {
            return self.advance(&proc, pos, next);
        }
        let counter = self.frame_int(3)?;
        let limit = self.frame_int(4)?;
        let incr = self.frame_int(5)?;
        if (incr > 0 && counter <= limit) || (incr < 0 && counter >= limit) {
            self.set_frame_int(1, 0)?;
            self.ostack.push(Token::int(counter));
            match counter.checked_add(incr) {
                Some(c) => self.set_frame_int(3, c)?,
                // the counter cannot move past the limit: stop after this round
                None => self.set_frame_int(5, 0)?,
            }
            self.note(&format!(
                "for: Limit: {} Step: {} Iterator: {}",
                limit, incr, counter
            ));
            Ok(())
        } else {
            self.close_frame(Primitive::For)
        }
    }

    fn step_forall(&mut self, primitive: Primitive) -> Result<(), SliError> {
        let count = self.frame_int(2)?;
        let limit = self.frame_int(3)?;
        if count >= limit {
            return self.close_frame(primitive);
        }
        let idx = count as usize;
        let object = self.estack.pick(4)?;
        let element = match object.value() {
            Some(Value::Array(items)) => items.get(idx).cloned(),
            Some(Value::String(s)) => s.as_bytes().get(idx).map(|b| Token::int(i64::from(*b))),
            _ => None,
        }
        .ok_or_else(|| SliError::type_mismatch("arraytype or stringtype", object.type_name()))?;
        if self.config.step_mode {
            self.note(&format!(
                "{}: Limit: {} Pos: {} Iterator: {}",
                primitive.name(),
                limit,
                count,
                element
            ));
        }
        self.ostack.push(element);
        if matches!(
            primitive,
            Primitive::ForAllIndexedArray | Primitive::ForAllIndexedString
        ) {
            self.ostack.push(Token::int(count));
        }
        self.set_frame_int(2, count + 1)?;
        let body = self.estack.pick(1)?.clone();
        self.estack.push(body);
        Ok(())
    }

    /// Pushes element `pos` of a loop body and moves the cursor past it.
    fn advance(&mut self, proc: &Procedure, pos: usize, next: Token) -> Result<(), SliError> {
        self.pause(proc, pos, &next);
        self.set_frame_int(1, pos as i64 + 1)?;
        self.estack.push(next);
        Ok(())
    }

    fn close_frame(&mut self, primitive: Primitive) -> Result<(), SliError> {
        self.estack.pop_n(primitive.frame_size())?;
        self.leave_frame();
        Ok(())
    }

    fn frame_int(&self, pick: usize) -> Result<i64, SliError> {
        self.estack.pick(pick)?.get::<i64>()
    }

    fn set_frame_int(&mut self, pick: usize, value: i64) -> Result<(), SliError> {
        let token = self.estack.pick_mut(pick)?;
        let found = token.type_name();
        match token.value_mut() {
            Some(Value::Integer(i)) => {
                *i = value;
                Ok(())
            }
            _ => Err(SliError::type_mismatch("integertype", found)),
        }
    }

    fn frame_proc(&self, pick: usize) -> Result<Procedure, SliError> {
        self.estack.pick(pick)?.get::<Procedure>()
    }

    /// Consults the debug prompt before `next` runs, in step mode only.
    fn pause(&mut self, proc: &Procedure, pos: usize, next: &Token) {
        if !self.config.step_mode {
            return;
        }
        loop {
            let command = match self.prompt.as_mut() {
                Some(prompt) => prompt.command(next),
                None => DebugCommand::Continue,
            };
            log::debug!("step at {} of {}: {:?}", pos, proc.len(), command);
            match command {
                DebugCommand::List => {
                    let mut out = String::new();
                    proc.list(&mut out, "", pos as isize);
                    out.push('\n');
                    self.diag.write_all(out.as_bytes()).ok();
                }
                DebugCommand::Continue => break,
            }
        }
    }

    fn note(&mut self, message: &str) {
        if self.config.step_mode {
            writeln!(self.diag, "{}", message).ok();
        }
    }

    /// Writes the error and one entry per frame above `base`, innermost first.
    pub(super) fn backtrace(&mut self, base: usize, err: &SliError) {
        let mut out = String::new();
        out.push_str(&err.to_string());
        out.push('\n');
        let frames = self.estack.load().saturating_sub(base);
        for at in 0..frames {
            if let Ok(Some(Value::Primitive(p))) = self.estack.pick(at).map(Token::value) {
                self.render_frame(*p, at, &mut out);
            }
        }
        self.diag.write_all(out.as_bytes()).ok();
    }

    fn render_frame(&self, primitive: Primitive, at: usize, out: &mut String) {
        let int_at = |n: usize| {
            self.estack
                .pick(at + n)
                .ok()
                .and_then(|t| t.get::<i64>().ok())
                .unwrap_or(0)
        };
        let proc_at = |n: usize| {
            self.estack
                .pick(at + n)
                .ok()
                .and_then(|t| t.get::<Procedure>().ok())
        };
        let (header, body, cursor) = match primitive {
            Primitive::Iterate => ("In procedure:".to_string(), proc_at(2), int_at(1) - 1),
            Primitive::Loop => ("During loop:".to_string(), proc_at(2), int_at(1) - 1),
            Primitive::Repeat => (
                format!("During repeat with {} iterations remaining.", int_at(3)),
                proc_at(2),
                int_at(1) - 1,
            ),
            Primitive::For => (
                format!("During for at iterator value {}.", int_at(3) - int_at(5)),
                proc_at(2),
                int_at(1) - 1,
            ),
            Primitive::ForAllArray => (
                format!("During forall (array) at iteration {}.", int_at(2)),
                proc_at(1),
                -1,
            ),
            Primitive::ForAllIndexedArray => (
                format!("During forallindexed (array) at iteration {}.", int_at(2) - 1),
                proc_at(1),
                -1,
            ),
            Primitive::ForAllString => (
                format!("During forall (string) at iteration {}.", int_at(2) - 1),
                proc_at(1),
                -1,
            ),
            Primitive::ForAllIndexedString => (
                format!("During forallindexed (string) at iteration {}.", int_at(2) - 1),
                proc_at(1),
                -1,
            ),
        };
        out.push_str(&header);
        out.push('\n');
        if let Some(body) = body {
            body.list(out, "", cursor as isize);
            out.push('\n');
        }
    }
}
