use crate::core::Token;
use crate::errors::SliError;
use crate::interp::Interpreter;

fn binary_int(
    interp: &mut Interpreter,
    op: fn(i64, i64) -> i64,
) -> Result<(), SliError> {
    let b = interp.pop::<i64>()?;
    let a = interp.pop::<i64>()?;
    interp.ostack.push(Token::int(op(a, b)));
    Ok(())
}

fn binary_double(
    interp: &mut Interpreter,
    op: fn(f64, f64) -> f64,
) -> Result<(), SliError> {
    let b = interp.pop::<f64>()?;
    let a = interp.pop::<f64>()?;
    interp.ostack.push(Token::double(op(a, b)));
    Ok(())
}

pub(crate) fn builtin_add_ii(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_int(interp, i64::wrapping_add)
}

pub(crate) fn builtin_add_dd(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_double(interp, |a, b| a + b)
}

pub(crate) fn builtin_sub_ii(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_int(interp, i64::wrapping_sub)
}

pub(crate) fn builtin_sub_dd(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_double(interp, |a, b| a - b)
}

pub(crate) fn builtin_mul_ii(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_int(interp, i64::wrapping_mul)
}

pub(crate) fn builtin_mul_dd(interp: &mut Interpreter) -> Result<(), SliError> {
    binary_double(interp, |a, b| a * b)
}

pub(crate) fn builtin_gt_ii(interp: &mut Interpreter) -> Result<(), SliError> {
    let b = interp.pop::<i64>()?;
    let a = interp.pop::<i64>()?;
    interp.ostack.push(Token::bool(a > b));
    Ok(())
}

pub(crate) fn builtin_gt_dd(interp: &mut Interpreter) -> Result<(), SliError> {
    let b = interp.pop::<f64>()?;
    let a = interp.pop::<f64>()?;
    interp.ostack.push(Token::bool(a > b));
    Ok(())
}
