//! List construction and access: list, cons, append, car, cdr, list-ref,
//! length, reverse, map, range

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::apply;
use crate::value::{NativeProcedure, Value};
use std::rc::Rc;

fn as_list<'a>(function: &str, value: &'a Value) -> Result<&'a [Value], EvalError> {
    value
        .as_list()
        .ok_or_else(|| EvalError::type_error(function, "list", value.type_name()))
}

pub fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

pub fn builtin_cons(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("cons", "2", args.len()));
    }
    let tail = as_list("cons", &args[1])?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

pub fn builtin_append(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("append", "2", args.len()));
    }
    let front = as_list("append", &args[0])?;
    let back = as_list("append", &args[1])?;
    let mut items = Vec::with_capacity(front.len() + back.len());
    items.extend_from_slice(front);
    items.extend_from_slice(back);
    Ok(Value::list(items))
}

pub fn builtin_car(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("car", "1", args.len()));
    }
    let items = as_list("car", &args[0])?;
    items
        .first()
        .cloned()
        .ok_or_else(|| EvalError::TypeError("car: empty list".into()))
}

pub fn builtin_cdr(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("cdr", "1", args.len()));
    }
    let items = as_list("cdr", &args[0])?;
    if items.is_empty() {
        return Err(EvalError::TypeError("cdr: empty list".into()));
    }
    Ok(Value::list(items[1..].to_vec()))
}

pub fn builtin_list_ref(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("list-ref", "2", args.len()));
    }
    let items = as_list("list-ref", &args[0])?;
    let index = match &args[1] {
        Value::Integer(n) if *n >= 0 => *n as usize,
        other => return Err(EvalError::type_error("list-ref", "non-negative integer", other.type_name())),
    };
    items
        .get(index)
        .cloned()
        .ok_or_else(|| EvalError::TypeError(format!("list-ref: index {index} out of bounds")))
}

pub fn builtin_length(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("length", "1", args.len()));
    }
    let items = as_list("length", &args[0])?;
    Ok(Value::Integer(items.len() as i64))
}

pub fn builtin_reverse(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("reverse", "1", args.len()));
    }
    let mut items = as_list("reverse", &args[0])?.to_vec();
    items.reverse();
    Ok(Value::list(items))
}

pub fn builtin_map(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error("map", "2", args.len()));
    }
    if !matches!(args[0], Value::Procedure(_) | Value::NativeProcedure(_)) {
        return Err(EvalError::type_error("map", "procedure", args[0].type_name()));
    }
    let items = as_list("map", &args[1])?;
    let mapped: Result<Vec<Value>, EvalError> = items
        .iter()
        .map(|item| apply(args[0].clone(), vec![item.clone()]))
        .collect();
    Ok(Value::list(mapped?))
}

pub fn builtin_range(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() || args.len() > 3 {
        return Err(EvalError::arity_error("range", "1-3", args.len()));
    }
    let as_int = |v: &Value| match v {
        Value::Integer(n) => Ok(*n),
        other => Err(EvalError::type_error("range", "integer", other.type_name())),
    };

    let (start, stop, step) = match args.len() {
        1 => (0, as_int(&args[0])?, 1),
        2 => (as_int(&args[0])?, as_int(&args[1])?, 1),
        _ => (as_int(&args[0])?, as_int(&args[1])?, as_int(&args[2])?),
    };

    if step == 0 {
        return Err(EvalError::TypeError("range: step must not be 0".into()));
    }

    let mut items = Vec::new();
    let mut n = start;
    if step > 0 {
        while n < stop {
            items.push(Value::Integer(n));
            n += step;
        }
    } else {
        while n > stop {
            items.push(Value::Integer(n));
            n += step;
        }
    }
    Ok(Value::list(items))
}

pub fn register(env: &Rc<Environment>) {
    let fixed1: [(&'static str, fn(&[Value]) -> Result<Value, EvalError>); 4] = [
        ("car", builtin_car as fn(&[Value]) -> Result<Value, EvalError>),
        ("cdr", builtin_cdr),
        ("length", builtin_length),
        ("reverse", builtin_reverse),
    ];
    for (name, func) in fixed1 {
        env.define(
            crate::symbol::Symbol::intern(name),
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name,
                min_arity: 1,
                max_arity: Some(1),
                func: Box::new(func),
            })),
        );
    }

    let fixed2: [(&'static str, fn(&[Value]) -> Result<Value, EvalError>); 4] = [
        ("cons", builtin_cons),
        ("append", builtin_append),
        ("list-ref", builtin_list_ref),
        ("map", builtin_map),
    ];
    for (name, func) in fixed2 {
        env.define(
            crate::symbol::Symbol::intern(name),
            Value::NativeProcedure(Rc::new(NativeProcedure {
                name,
                min_arity: 2,
                max_arity: Some(2),
                func: Box::new(func),
            })),
        );
    }

    env.define(
        crate::symbol::Symbol::intern("list"),
        Value::NativeProcedure(Rc::new(NativeProcedure {
            name: "list",
            min_arity: 0,
            max_arity: None,
            func: Box::new(builtin_list),
        })),
    );

    env.define(
        crate::symbol::Symbol::intern("range"),
        Value::NativeProcedure(Rc::new(NativeProcedure {
            name: "range",
            min_arity: 1,
            max_arity: Some(3),
            func: Box::new(builtin_range),
        })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(ints: &[i64]) -> Value {
        Value::list(ints.iter().map(|n| Value::Integer(*n)).collect())
    }

    #[test]
    fn cons_prepends() {
        let result = builtin_cons(&[Value::Integer(1), list_of(&[2, 3])]).unwrap();
        assert_eq!(format!("{result}"), "(1 2 3)");
    }

    #[test]
    fn car_and_cdr_on_empty_list_error() {
        assert!(builtin_car(&[list_of(&[])]).is_err());
        assert!(builtin_cdr(&[list_of(&[])]).is_err());
    }

    #[test]
    fn append_concatenates_two_lists() {
        let result = builtin_append(&[list_of(&[1, 2]), list_of(&[3, 4])]).unwrap();
        assert_eq!(format!("{result}"), "(1 2 3 4)");
    }

    #[test]
    fn list_ref_out_of_bounds_errors() {
        assert!(builtin_list_ref(&[list_of(&[1, 2]), Value::Integer(5)]).is_err());
    }

    #[test]
    fn reverse_reverses_in_place_into_a_new_list() {
        let result = builtin_reverse(&[list_of(&[1, 2, 3])]).unwrap();
        assert_eq!(format!("{result}"), "(3 2 1)");
    }

    #[test]
    fn range_one_arg_starts_at_zero() {
        let result = builtin_range(&[Value::Integer(3)]).unwrap();
        assert_eq!(format!("{result}"), "(0 1 2)");
    }

    #[test]
    fn range_with_negative_step_counts_down() {
        let result = builtin_range(&[Value::Integer(5), Value::Integer(0), Value::Integer(-1)]).unwrap();
        assert_eq!(format!("{result}"), "(5 4 3 2 1)");
    }

    #[test]
    fn range_where_step_cannot_reach_stop_is_empty() {
        let result = builtin_range(&[Value::Integer(0), Value::Integer(5), Value::Integer(-1)]).unwrap();
        assert_eq!(format!("{result}"), "()");
    }

    #[test]
    fn range_rejects_zero_step() {
        assert!(builtin_range(&[Value::Integer(0), Value::Integer(5), Value::Integer(0)]).is_err());
    }
}
