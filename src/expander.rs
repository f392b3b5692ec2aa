// ABOUTME: Pre-evaluation expansion pass: macro dispatch and quasiquote rewriting

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{apply, evaluate, parse_param_shape};
use crate::symbol::{Symbol, KEYWORDS};
use crate::value::{Procedure, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// User-defined macro transformers, populated only by top-level
/// `define-macro` forms and consulted only here — the evaluator never sees
/// an unexpanded macro call.
#[derive(Default)]
pub struct MacroTable {
    transformers: RefCell<HashMap<Symbol, Rc<Procedure>>>,
}

impl MacroTable {
    pub fn new() -> MacroTable {
        MacroTable::default()
    }

    fn define(&self, name: Symbol, transformer: Rc<Procedure>) {
        self.transformers.borrow_mut().insert(name, transformer);
    }

    pub fn get(&self, name: Symbol) -> Option<Rc<Procedure>> {
        self.transformers.borrow().get(&name).cloned()
    }
}

/// Rewrites `expr` into code the evaluator can run directly: macro calls
/// are expanded (recursively, since a transformer's output may itself
/// invoke another macro), `quasiquote` becomes `cons`/`append`/`quote`
/// construction code, and `define-macro` forms are consumed here and
/// replaced with `Value::Unit`. `top_level` marks the outermost source
/// context and any position inside a `begin` whose own context is top
/// level — the only context where `define-macro` is allowed.
pub fn expand(
    expr: &Value,
    env: &Rc<Environment>,
    macros: &MacroTable,
    top_level: bool,
) -> Result<Value, EvalError> {
    let items = match expr {
        Value::List(items) => items,
        _ => return Ok(expr.clone()),
    };
    if items.is_empty() {
        return Err(EvalError::SyntaxError("cannot evaluate the empty list as code".into()));
    }

    if let Some(head) = items[0].as_symbol() {
        if head == KEYWORDS.quote {
            if items.len() != 2 {
                return Err(EvalError::SyntaxError("quote: expected 1 argument".into()));
            }
            return Ok(expr.clone());
        }

        if head == KEYWORDS.quasiquote {
            if items.len() != 2 {
                return Err(EvalError::SyntaxError("quasiquote: expected 1 argument".into()));
            }
            return expand_quasiquote(&items[1], 1, env, macros);
        }

        if head == KEYWORDS.if_ {
            return expand_if(&items[1..], env, macros);
        }

        if head == KEYWORDS.set {
            return expand_set(&items[1..], env, macros);
        }

        if head == KEYWORDS.define {
            return expand_define(&items[1..], env, macros);
        }

        if head == KEYWORDS.define_macro {
            if !top_level {
                return Err(EvalError::MacroError(
                    "define-macro: only allowed at top level".into(),
                ));
            }
            return expand_define_macro(&items[1..], env, macros);
        }

        if head == KEYWORDS.begin {
            return expand_begin(&items[1..], env, macros, top_level);
        }

        if head == KEYWORDS.lambda {
            return expand_lambda(&items[1..], env, macros);
        }

        if let Some(transformer) = macros.get(head) {
            let args: Vec<Value> = items[1..].to_vec();
            let expansion = apply(Value::Procedure(transformer), args)?;
            return expand(&expansion, env, macros, top_level);
        }
    }

    let expanded: Result<Vec<Value>, EvalError> =
        items.iter().map(|e| expand(e, env, macros, false)).collect();
    Ok(Value::list(expanded?))
}

fn expand_if(rest: &[Value], env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    if rest.len() < 2 || rest.len() > 3 {
        return Err(EvalError::SyntaxError("if: expected 2 or 3 arguments".into()));
    }
    let test = expand(&rest[0], env, macros, false)?;
    let consequent = expand(&rest[1], env, macros, false)?;
    let alternate = if rest.len() == 3 {
        expand(&rest[2], env, macros, false)?
    } else {
        Value::Unit
    };
    Ok(Value::list(vec![
        Value::symbol("if"),
        test,
        consequent,
        alternate,
    ]))
}

fn expand_set(rest: &[Value], env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    if rest.len() != 2 {
        return Err(EvalError::SyntaxError("set!: expected 2 arguments".into()));
    }
    if rest[0].as_symbol().is_none() {
        return Err(EvalError::SyntaxError(
            "set!: first argument must be a symbol".into(),
        ));
    }
    let value = expand(&rest[1], env, macros, false)?;
    Ok(Value::list(vec![Value::symbol("set!"), rest[0].clone(), value]))
}

fn expand_begin(
    rest: &[Value],
    env: &Rc<Environment>,
    macros: &MacroTable,
    top_level: bool,
) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Ok(Value::Unit);
    }
    let mut form = vec![Value::symbol("begin")];
    for f in rest {
        form.push(expand(f, env, macros, top_level)?);
    }
    Ok(Value::list(form))
}

fn expand_lambda(rest: &[Value], env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::SyntaxError("lambda: missing parameter list".into()));
    }
    let params = rest[0].clone();
    parse_param_shape(&params)?;
    if rest[1..].is_empty() {
        return Err(EvalError::SyntaxError("lambda: missing body".into()));
    }
    let body = if rest[1..].len() == 1 {
        expand(&rest[1], env, macros, false)?
    } else {
        let mut begin_form = vec![Value::symbol("begin")];
        for f in &rest[1..] {
            begin_form.push(expand(f, env, macros, false)?);
        }
        Value::list(begin_form)
    };
    Ok(Value::list(vec![Value::symbol("lambda"), params, body]))
}

fn expand_define(rest: &[Value], env: &Rc<Environment>, macros: &MacroTable) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::SyntaxError("define: missing name".into()));
    }
    match &rest[0] {
        Value::Symbol(_) => {
            if rest.len() > 2 {
                return Err(EvalError::SyntaxError("define: expected 1 or 2 arguments".into()));
            }
            let mut form = vec![Value::symbol("define"), rest[0].clone()];
            for f in &rest[1..] {
                form.push(expand(f, env, macros, false)?);
            }
            Ok(Value::list(form))
        }
        Value::List(spec) if !spec.is_empty() => {
            // `(define (f p...) body...)` desugars to `(define f (lambda (p...) body...))`.
            let name = spec[0].clone();
            let params = Value::list(spec[1..].to_vec());
            let mut lambda_form = vec![Value::symbol("lambda"), params];
            lambda_form.extend(rest[1..].iter().cloned());
            let define_form = Value::list(vec![Value::symbol("define"), name, Value::list(lambda_form)]);
            expand(&define_form, env, macros, false)
        }
        _ => Err(EvalError::SyntaxError(
            "define: expected a symbol or (name params...)".into(),
        )),
    }
}

fn expand_define_macro(
    rest: &[Value],
    env: &Rc<Environment>,
    macros: &MacroTable,
) -> Result<Value, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::SyntaxError("define-macro: missing macro spec".into()));
    }
    let (name, rhs) = match &rest[0] {
        // `(define-macro name expr)` — the direct form; `expr` must evaluate
        // to a Procedure (commonly a `lambda` with a variadic parameter, the
        // only way to give a macro transformer a rest-style signature).
        Value::Symbol(name) => {
            if rest.len() != 2 {
                return Err(EvalError::SyntaxError(
                    "define-macro: expected a name and one expression".into(),
                ));
            }
            (*name, rest[1].clone())
        }
        // `(define-macro (name params...) body...)` — desugars like `define`.
        Value::List(spec) if !spec.is_empty() => {
            let name = spec[0].as_symbol().ok_or_else(|| {
                EvalError::SyntaxError("define-macro: macro name must be a symbol".into())
            })?;
            if rest[1..].is_empty() {
                return Err(EvalError::MacroError(format!(
                    "define-macro: {name} has an empty body"
                )));
            }
            let params = Value::list(spec[1..].to_vec());
            let mut lambda_form = vec![Value::symbol("lambda"), params];
            lambda_form.extend(rest[1..].iter().cloned());
            (name, Value::list(lambda_form))
        }
        _ => {
            return Err(EvalError::SyntaxError(
                "define-macro: expected a symbol or (name params...)".into(),
            ))
        }
    };

    let expanded_rhs = expand(&rhs, env, macros, false)?;
    let value = evaluate(expanded_rhs, env.clone())
        .map_err(|e| EvalError::MacroError(format!("define-macro {name}: {e}")))?;
    let transformer = match value {
        Value::Procedure(p) => p,
        other => {
            return Err(EvalError::MacroError(format!(
                "define-macro: {name}'s right-hand side evaluated to a non-procedure: {other}"
            )))
        }
    };
    macros.define(name, transformer);
    Ok(Value::Unit)
}

/// `quasiquote` template rewriting, per the standard depth-tracked rules:
/// `unquote` at depth 1 splices in evaluated code, `unquote-splicing` does
/// the same via `append`, and nested `quasiquote`/`unquote` adjust depth so
/// only the outermost level's unquotes fire.
fn expand_quasiquote(
    template: &Value,
    depth: u32,
    env: &Rc<Environment>,
    macros: &MacroTable,
) -> Result<Value, EvalError> {
    let items = match template {
        Value::List(items) => items,
        other => return Ok(wrap_quote(other.clone())),
    };

    if let Some(head) = items.first().and_then(Value::as_symbol) {
        if head == KEYWORDS.unquote_splicing {
            return Err(EvalError::SyntaxError(
                "unquote-splicing: not valid at the head of a quasiquoted form".into(),
            ));
        }
        if head == KEYWORDS.unquote && items.len() == 2 {
            return if depth == 1 {
                expand(&items[1], env, macros, false)
            } else {
                let inner = expand_quasiquote(&items[1], depth - 1, env, macros)?;
                Ok(list_form("unquote", inner))
            };
        }
        if head == KEYWORDS.quasiquote && items.len() == 2 {
            let inner = expand_quasiquote(&items[1], depth + 1, env, macros)?;
            return Ok(list_form("quasiquote", inner));
        }
    }

    // Build up the list right-to-left as `(cons head rest)` or, for a
    // spliced head, `(append spliced rest)`.
    let mut result = wrap_quote(Value::list(vec![]));
    for item in items.iter().rev() {
        if let Some(sub) = item.as_list() {
            if sub.len() == 2 && sub[0].as_symbol() == Some(KEYWORDS.unquote_splicing) {
                let spliced = if depth == 1 {
                    expand(&sub[1], env, macros, false)?
                } else {
                    let inner = expand_quasiquote(&sub[1], depth - 1, env, macros)?;
                    list_form("unquote-splicing", inner)
                };
                result = Value::list(vec![Value::symbol("append"), spliced, result]);
                continue;
            }
        }
        let head = expand_quasiquote(item, depth, env, macros)?;
        result = Value::list(vec![Value::symbol("cons"), head, result]);
    }
    Ok(result)
}

fn wrap_quote(v: Value) -> Value {
    Value::list(vec![Value::symbol("quote"), v])
}

fn list_form(name: &str, arg: Value) -> Value {
    Value::list(vec![Value::symbol(name), arg])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_one;

    fn expand_and_eval(src: &str, env: &Rc<Environment>, macros: &MacroTable) -> Value {
        let parsed = read_one(src).unwrap();
        let expanded = expand(&parsed, env, macros, true).unwrap();
        evaluate(expanded, env.clone()).unwrap()
    }

    #[test]
    fn quote_passes_through_untouched() {
        let env = Environment::new();
        let macros = MacroTable::new();
        let parsed = read_one("(quote (a b c))").unwrap();
        let expanded = expand(&parsed, &env, &macros, true).unwrap();
        assert_eq!(format!("{expanded}"), "(quote (a b c))");
    }

    #[test]
    fn if_with_two_arms_gets_an_explicit_unit_else() {
        let env = Environment::new();
        let macros = MacroTable::new();
        let parsed = read_one("(if #t 1)").unwrap();
        let expanded = expand(&parsed, &env, &macros, true).unwrap();
        assert_eq!(expanded.as_list().unwrap().len(), 4);
    }

    #[test]
    fn quasiquote_without_unquote_builds_equivalent_literal() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        let result = expand_and_eval("`(1 2 3)", &env, &macros);
        assert_eq!(format!("{result}"), "(1 2 3)");
    }

    #[test]
    fn quasiquote_splices_unquote_values() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        env.define(Symbol::intern("x"), Value::Integer(5));
        let result = expand_and_eval("`(a ,x c)", &env, &macros);
        assert_eq!(format!("{result}"), "(a 5 c)");
    }

    #[test]
    fn quasiquote_splicing_flattens_a_list() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        env.define(Symbol::intern("xs"), Value::list(vec![Value::Integer(1), Value::Integer(2)]));
        let result = expand_and_eval("`(a ,@xs b)", &env, &macros);
        assert_eq!(format!("{result}"), "(a 1 2 b)");
    }

    #[test]
    fn bare_unquote_splicing_at_head_is_a_syntax_error() {
        let env = Environment::new();
        let macros = MacroTable::new();
        let parsed = read_one("`(,@(list 1 2))").unwrap();
        assert!(matches!(
            expand(&parsed, &env, &macros, true),
            Err(EvalError::SyntaxError(_))
        ));
    }

    #[test]
    fn define_macro_registers_a_transformer_and_consumes_the_form() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        let parsed = read_one("(define-macro (my-if c t e) (list 'if c t e))").unwrap();
        let expanded = expand(&parsed, &env, &macros, true).unwrap();
        assert!(matches!(expanded, Value::Unit));
        assert!(macros.get(Symbol::intern("my-if")).is_some());
    }

    #[test]
    fn define_macro_outside_top_level_is_a_macro_error() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        let parsed = read_one("(if #t (define-macro (m x) x) 1)").unwrap();
        assert!(matches!(
            expand(&parsed, &env, &macros, true),
            Err(EvalError::MacroError(_))
        ));
    }

    #[test]
    fn define_macro_is_visible_inside_a_top_level_begin() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        let parsed = read_one("(begin (define-macro (m x) x))").unwrap();
        expand(&parsed, &env, &macros, true).unwrap();
        assert!(macros.get(Symbol::intern("m")).is_some());
    }

    #[test]
    fn define_macro_direct_form_supports_a_variadic_transformer() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        let parsed = read_one("(define-macro count-args (lambda all (length all)))").unwrap();
        expand(&parsed, &env, &macros, true).unwrap();
        assert!(macros.get(Symbol::intern("count-args")).is_some());
    }

    #[test]
    fn macro_invocation_expands_before_evaluation() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        expand(
            &read_one("(define-macro (my-if c t e) (list 'if c t e))").unwrap(),
            &env,
            &macros,
            true,
        )
        .unwrap();
        let result = expand_and_eval("(my-if #t 1 2)", &env, &macros);
        assert!(matches!(result, Value::Integer(1)));
    }

    #[test]
    fn macro_idempotence_no_macro_heads_survive_expansion() {
        let env = Environment::new();
        let macros = MacroTable::new();
        crate::builtins::register_core(&env);
        expand(
            &read_one("(define-macro (my-if c t e) (list 'if c t e))").unwrap(),
            &env,
            &macros,
            true,
        )
        .unwrap();
        let expanded = expand(&read_one("(my-if #t 1 2)").unwrap(), &env, &macros, true).unwrap();
        fn no_macro_heads(v: &Value, macros: &MacroTable) -> bool {
            match v {
                Value::List(items) if !items.is_empty() => {
                    if let Some(s) = items[0].as_symbol() {
                        if macros.get(s).is_some() {
                            return false;
                        }
                    }
                    items.iter().all(|i| no_macro_heads(i, macros))
                }
                _ => true,
            }
        }
        assert!(no_macro_heads(&expanded, &macros));
    }
}
