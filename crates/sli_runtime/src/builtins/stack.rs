use sli_core::Name;

use crate::errors::SliError;
use crate::interp::Interpreter;

pub(crate) fn builtin_pop(interp: &mut Interpreter) -> Result<(), SliError> {
    interp.ostack.pop()?;
    Ok(())
}

pub(crate) fn builtin_dup(interp: &mut Interpreter) -> Result<(), SliError> {
    let top = interp.ostack.top()?.clone();
    interp.ostack.push(top);
    Ok(())
}

pub(crate) fn builtin_exch(interp: &mut Interpreter) -> Result<(), SliError> {
    let a = interp.ostack.pop()?;
    let b = interp.ostack.pop()?;
    interp.ostack.push(a);
    interp.ostack.push(b);
    Ok(())
}

/// Moves the top operand to the execution stack.
pub(crate) fn builtin_exec(interp: &mut Interpreter) -> Result<(), SliError> {
    let token = interp.ostack.pop()?;
    interp.estack.push(token);
    Ok(())
}

/// `/name value def`
pub(crate) fn builtin_def(interp: &mut Interpreter) -> Result<(), SliError> {
    interp.ostack.require(2)?;
    let name = interp.ostack.pick(1)?.get::<Name>()?;
    let value = interp.ostack.pop()?;
    interp.ostack.pop()?;
    interp.def(name, value)
}
