// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::EvalError;
use crate::symbol::Symbol;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<Symbol, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain)
    pub fn define(&self, name: Symbol, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a symbol in THIS scope and parent scopes recursively
    pub fn get(&self, name: Symbol) -> Result<Value, EvalError> {
        if let Some(value) = self.bindings.borrow().get(&name) {
            return Ok(value.clone());
        }

        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }

        Err(EvalError::UnboundSymbol(name.to_string()))
    }

    /// Mutates the nearest enclosing binder of `name`. Never creates a new
    /// binding — `set!` on an unbound symbol is an error.
    pub fn set(&self, name: Symbol, value: Value) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(&name) {
            self.bindings.borrow_mut().insert(name, value);
            return Ok(());
        }

        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }

        Err(EvalError::UnboundSymbol(name.to_string()))
    }
}
