use crate::core::{Procedure, Token, Value};
use crate::errors::SliError;
use crate::interp::Interpreter;

/// `bool proc if`
pub(crate) fn builtin_if(interp: &mut Interpreter) -> Result<(), SliError> {
    let proc = interp.pop::<Procedure>()?;
    if interp.pop::<bool>()? {
        interp.estack.push(Token::new(Value::Procedure(proc)));
    }
    Ok(())
}

/// `proc loop`
pub(crate) fn builtin_loop(interp: &mut Interpreter) -> Result<(), SliError> {
    let proc = interp.pop::<Procedure>()?;
    interp.open_loop(proc);
    Ok(())
}

pub(crate) fn builtin_exit(interp: &mut Interpreter) -> Result<(), SliError> {
    interp.exit_loop()
}

/// `n proc repeat`
pub(crate) fn builtin_repeat(interp: &mut Interpreter) -> Result<(), SliError> {
    let proc = interp.pop::<Procedure>()?;
    let count = interp.pop::<i64>()?;
    interp.open_repeat(count, proc);
    Ok(())
}

/// `start incr limit proc for`
pub(crate) fn builtin_for(interp: &mut Interpreter) -> Result<(), SliError> {
    interp.ostack.require(4)?;
    let proc = interp.pop::<Procedure>()?;
    let limit = interp.pop::<i64>()?;
    let incr = interp.pop::<i64>()?;
    let start = interp.pop::<i64>()?;
    interp.open_for(start, incr, limit, proc);
    Ok(())
}

/// `obj proc forall`
pub(crate) fn builtin_forall(interp: &mut Interpreter) -> Result<(), SliError> {
    let proc = interp.pop::<Procedure>()?;
    let object = interp.ostack.pop()?;
    interp.open_forall(object, proc, false)
}

/// `obj proc forallindexed`
pub(crate) fn builtin_forallindexed(interp: &mut Interpreter) -> Result<(), SliError> {
    let proc = interp.pop::<Procedure>()?;
    let object = interp.ostack.pop()?;
    interp.open_forall(object, proc, true)
}
