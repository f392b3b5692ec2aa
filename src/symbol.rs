// ABOUTME: Process-wide interned identifiers for the Lisp interpreter

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Mutex;

struct SymbolTable {
    names: Vec<Box<str>>,
    lookup: std::collections::HashMap<Box<str>, u32>,
}

impl SymbolTable {
    fn new() -> Self {
        SymbolTable {
            names: Vec::new(),
            lookup: std::collections::HashMap::new(),
        }
    }

    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        let boxed: Box<str> = name.into();
        self.names.push(boxed.clone());
        self.lookup.insert(boxed, id);
        id
    }
}

static TABLE: Lazy<Mutex<SymbolTable>> = Lazy::new(|| Mutex::new(SymbolTable::new()));

/// An interned identifier. Equality is identity; the intern table is
/// process-wide, shared across every `Interpreter`, and never shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub fn intern(name: &str) -> Symbol {
        let mut table = TABLE.lock().expect("symbol table poisoned");
        Symbol(table.intern(name))
    }

    pub fn name(self) -> Box<str> {
        let table = TABLE.lock().expect("symbol table poisoned");
        table.names[self.0 as usize].clone()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The reserved form-keyword and quote-family symbols, interned once and
/// reused by the reader, expander and evaluator instead of re-interning a
/// string literal on every dispatch.
pub struct Keywords {
    pub quote: Symbol,
    pub if_: Symbol,
    pub set: Symbol,
    pub define: Symbol,
    pub define_macro: Symbol,
    pub lambda: Symbol,
    pub begin: Symbol,
    pub quasiquote: Symbol,
    pub unquote: Symbol,
    pub unquote_splicing: Symbol,
    pub append: Symbol,
    pub cons: Symbol,
}

pub static KEYWORDS: Lazy<Keywords> = Lazy::new(|| Keywords {
    quote: Symbol::intern("quote"),
    if_: Symbol::intern("if"),
    set: Symbol::intern("set!"),
    define: Symbol::intern("define"),
    define_macro: Symbol::intern("define-macro"),
    lambda: Symbol::intern("lambda"),
    begin: Symbol::intern("begin"),
    quasiquote: Symbol::intern("quasiquote"),
    unquote: Symbol::intern("unquote"),
    unquote_splicing: Symbol::intern("unquote-splicing"),
    append: Symbol::intern("append"),
    cons: Symbol::intern("cons"),
});
