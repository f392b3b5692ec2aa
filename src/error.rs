// ABOUTME: Error types for reading, expanding and evaluating Lisp code

use thiserror::Error;

/// The one error type threaded through `Reader`, `Expand` and `Evaluate`.
/// Variants match the set named by the error-handling design: malformed
/// source text, an unbound reference, a value of the wrong shape, a
/// procedure called with the wrong number of arguments, a failed `assert`,
/// an I/O failure from the file-system accessor, and a malformed macro use.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    SyntaxError(String),

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("arity error: {0}")]
    ArityError(String),

    #[error("assertion failed: {0}")]
    AssertionFailed(String),

    #[error("io error: {0}")]
    IoError(String),

    #[error("macro error: {0}")]
    MacroError(String),
}

impl EvalError {
    pub fn type_error(function: &str, expected: &str, actual: &str) -> Self {
        EvalError::TypeError(format!("{function}: expected {expected}, got {actual}"))
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityError(format!(
            "{function}: expected {} argument(s), got {actual}",
            expected.into()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_message_names_function_and_types() {
        let err = EvalError::type_error("car", "list", "integer");
        assert_eq!(err.to_string(), "type error: car: expected list, got integer");
    }

    #[test]
    fn arity_error_message_names_counts() {
        let err = EvalError::arity_error("cons", "2", 1);
        assert_eq!(
            err.to_string(),
            "arity error: cons: expected 2 argument(s), got 1"
        );
    }

    #[test]
    fn variants_have_distinct_display_prefixes() {
        assert!(EvalError::SyntaxError("x".into()).to_string().starts_with("syntax error"));
        assert!(EvalError::UnboundSymbol("x".into()).to_string().starts_with("unbound symbol"));
        assert!(EvalError::MacroError("x".into()).to_string().starts_with("macro error"));
    }
}
