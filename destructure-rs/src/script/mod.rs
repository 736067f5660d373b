//! Destructuring scripts.
//!
//! A small line-oriented notation for driving the evaluator by hand:
//!
//! - `let` / `const` / `var` declarations with any pattern on the left
//! - `PATTERN = VALUE` reassignment (swaps included)
//! - `fn name(params)` definitions and `name(args)` calls
//! - `echo VALUE`
//!
//! # Quick start
//!
//! ```rust
//! use destructure::script::Session;
//!
//! let mut session = Session::new();
//! session
//!     .exec_script("let { name = 'Guest', ...rest } = { age: 3 }")
//!     .unwrap();
//! assert_eq!(session.output, vec![r#"name = "Guest""#, "rest = { age: 3 }"]);
//! ```

pub mod expr;
pub mod session;
pub mod stmt;

use std::fmt;

pub use expr::{parse_expr, parse_pattern, parse_signature, parse_value, Expr};
pub use session::{Session, Undeclared};
pub use stmt::{parse_script, parse_script_with, parse_stmt, parse_stmt_with, Stmt};

/// A statement that failed to parse or run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptError {}
