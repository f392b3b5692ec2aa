//! Arithmetic operations: +, -, *, /
//!
//! All four accept any mixture of Integer and Float (at least one
//! argument). If every operand is an Integer the computation stays
//! Integer, with `/` truncating toward zero; any Float operand widens the
//! whole reduction to Float. Variadic forms reduce left to right:
//! `(- 10 1 2)` is 7, `(/ 8 2 2)` is 2.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_float(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
        }
    }

    fn to_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Integer(n),
            Num::Float(n) => Value::Float(n),
        }
    }
}

fn coerce(function: &str, value: &Value) -> Result<Num, EvalError> {
    match value {
        Value::Integer(n) => Ok(Num::Int(*n)),
        Value::Float(n) => Ok(Num::Float(*n)),
        other => Err(EvalError::type_error(function, "number", other.type_name())),
    }
}

fn reduce(
    function: &'static str,
    args: &[Value],
    int_op: fn(i64, i64) -> Result<i64, EvalError>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error(function, "at least 1", 0));
    }

    let mut acc = coerce(function, &args[0])?;
    for arg in &args[1..] {
        let next = coerce(function, arg)?;
        acc = match (acc, next) {
            (Num::Int(a), Num::Int(b)) => Num::Int(int_op(a, b)?),
            (a, b) => Num::Float(float_op(a.as_float(), b.as_float())),
        };
    }
    Ok(acc.to_value())
}

pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    reduce("+", args, |a, b| Ok(a + b), |a, b| a + b)
}

pub fn builtin_sub(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() == 1 {
        return match coerce("-", &args[0])? {
            Num::Int(n) => Ok(Value::Integer(-n)),
            Num::Float(n) => Ok(Value::Float(-n)),
        };
    }
    reduce("-", args, |a, b| Ok(a - b), |a, b| a - b)
}

pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    reduce("*", args, |a, b| Ok(a * b), |a, b| a * b)
}

pub fn builtin_div(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("/", "at least 1", 0));
    }
    if args.len() == 1 {
        return match coerce("/", &args[0])? {
            Num::Int(0) => Err(EvalError::IoError("/: division by zero".into())),
            Num::Int(n) => Ok(Value::Integer(1 / n)),
            Num::Float(n) => Ok(Value::Float(1.0 / n)),
        };
    }
    reduce(
        "/",
        args,
        |a, b| {
            if b == 0 {
                Err(EvalError::IoError("/: division by zero".into()))
            } else {
                Ok(a / b)
            }
        },
        |a, b| a / b,
    )
}

pub fn register(env: &Rc<Environment>) {
    let defs: [(&'static str, fn(&[Value]) -> Result<Value, EvalError>); 4] = [
        ("+", builtin_add),
        ("-", builtin_sub),
        ("*", builtin_mul),
        ("/", builtin_div),
    ];
    for (name, func) in defs {
        env.define(
            crate::symbol::Symbol::intern(name),
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name,
                min_arity: 1,
                max_arity: None,
                func: Box::new(func),
            })),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_stays_integer_when_all_operands_are_integer() {
        let result = builtin_add(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]).unwrap();
        assert!(matches!(result, Value::Integer(6)));
    }

    #[test]
    fn any_float_operand_widens_the_result() {
        let result = builtin_add(&[Value::Integer(1), Value::Float(2.5)]).unwrap();
        assert!(matches!(result, Value::Float(n) if (n - 3.5).abs() < 1e-9));
    }

    #[test]
    fn subtraction_with_one_arg_negates() {
        assert!(matches!(builtin_sub(&[Value::Integer(5)]), Ok(Value::Integer(-5))));
    }

    #[test]
    fn variadic_reduction_is_left_to_right() {
        let result = builtin_sub(&[Value::Integer(10), Value::Integer(1), Value::Integer(2)]).unwrap();
        assert!(matches!(result, Value::Integer(7)));

        let result = builtin_div(&[Value::Integer(8), Value::Integer(2), Value::Integer(2)]).unwrap();
        assert!(matches!(result, Value::Integer(2)));
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        let result = builtin_div(&[Value::Integer(-7), Value::Integer(2)]).unwrap();
        assert!(matches!(result, Value::Integer(-3)));
    }

    #[test]
    fn division_by_zero_is_an_io_error() {
        assert!(matches!(
            builtin_div(&[Value::Integer(1), Value::Integer(0)]),
            Err(EvalError::IoError(_))
        ));
    }

    #[test]
    fn zero_arguments_to_subtraction_is_an_error() {
        assert!(builtin_sub(&[]).is_err());
    }

    #[test]
    fn zero_arguments_to_plus_and_times_is_an_error() {
        assert!(matches!(builtin_add(&[]), Err(EvalError::ArityError(_))));
        assert!(matches!(builtin_mul(&[]), Err(EvalError::ArityError(_))));
    }
}
