//! Evaluation failures.

use std::fmt;

/// Which structure a pattern demanded of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sequence,
    Mapping,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Sequence => f.write_str("an array"),
            Shape::Mapping => f.write_str("an object"),
        }
    }
}

/// A default expression could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultError {
    /// The expression read a name this pattern binds later.
    ForwardReference(String),
    /// The expression read a name nothing defines.
    Unbound(String),
    /// Caller-supplied expression failure.
    Failed(String),
}

impl fmt::Display for DefaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultError::ForwardReference(name) => {
                write!(f, "cannot access '{name}' before initialization")
            }
            DefaultError::Unbound(name) => write!(f, "{name} is not defined"),
            DefaultError::Failed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DefaultError {}

/// Why an evaluation produced no bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A structural pattern met a value with no such structure.
    NotDestructurable {
        /// Where in the value the mismatch happened, e.g. `$.address[0]`.
        path: String,
        expected: Shape,
        /// [`Value::kind`](crate::value::Value::kind) of the offending value.
        found: &'static str,
    },
    /// A default expression failed; its error is carried as-is.
    Default(DefaultError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::NotDestructurable {
                path,
                expected,
                found,
            } => write!(f, "cannot destructure {found} as {expected} at {path}"),
            BindError::Default(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Default(e) => Some(e),
            BindError::NotDestructurable { .. } => None,
        }
    }
}

impl From<DefaultError> for BindError {
    fn from(e: DefaultError) -> Self {
        BindError::Default(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = BindError::NotDestructurable {
            path: "$.address".into(),
            expected: Shape::Mapping,
            found: "null",
        };
        assert_eq!(e.to_string(), "cannot destructure null as an object at $.address");
        let e = BindError::from(DefaultError::Unbound("limit".into()));
        assert_eq!(e.to_string(), "limit is not defined");
    }

    #[test]
    fn default_error_is_carried_verbatim() {
        let inner = DefaultError::Failed("boom".into());
        let e: BindError = inner.clone().into();
        assert_eq!(e, BindError::Default(inner));
    }
}
