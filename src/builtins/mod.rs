//! # Built-in procedures
//!
//! The mandatory built-in set, organized into one sub-module per category,
//! each with its own `register(env)` function mirroring the others'
//! signature. `register_core` wires up every category that needs nothing
//! beyond an `Environment`; `register_io` additionally wires `load`, which
//! needs the macro table and file-system accessor to recursively evaluate
//! a loaded script in the global environment.

use crate::env::Environment;
use crate::expander::MacroTable;
use crate::fs_accessor::FileSystemAccessor;
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
pub mod control;
pub mod io;
pub mod lists;
pub mod predicates;

pub use arithmetic::register as register_arithmetic;
pub use comparison::register as register_comparison;
pub use control::register as register_control;
pub use lists::register as register_lists;
pub use predicates::register as register_predicates;

/// Registers every built-in that only needs an environment to bind into:
/// arithmetic, comparison, predicates, list operations, and control/
/// diagnostics. `load` is registered separately via [`register_io`] because
/// it also needs the macro table and file-system accessor.
pub fn register_core(env: &Rc<Environment>) {
    register_arithmetic(env);
    register_comparison(env);
    register_predicates(env);
    register_lists(env);
    register_control(env);
}

/// Registers `load`, the one built-in that reaches outside pure
/// environment/argument plumbing into the file-system accessor.
pub fn register_io(env: &Rc<Environment>, macros: Rc<MacroTable>, fs: Rc<FileSystemAccessor>) {
    io::register(env, macros, fs);
}
