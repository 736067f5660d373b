//! Binding a call's arguments to a function's parameter patterns.
//!
//! Each parameter is a full [`Pattern`] matched against the argument in the
//! same position; a missing argument is [`Value::Unset`], exactly as a short
//! array is for an array pattern.  Parameters are bound left to right into a
//! single result, so a later parameter's default can read an earlier one
//! (`fn(a, b = a)`).

use std::collections::HashSet;

use super::bindings::{Bindings, Environment};
use super::Matcher;
use crate::error::BindError;
use crate::pattern::{check_names, Limits, Pattern, PatternError};
use crate::value::Value;

/// A function's declared parameters.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Pattern>,
    rest: Option<String>,
}

impl Signature {
    pub fn new(params: impl IntoIterator<Item = Pattern>) -> Self {
        Signature {
            params: params.into_iter().collect(),
            rest: None,
        }
    }

    /// Collect surplus arguments into a sequence bound to `name` (`...name`).
    pub fn with_rest(mut self, name: impl Into<String>) -> Self {
        self.rest = Some(name.into());
        self
    }

    pub fn params(&self) -> &[Pattern] {
        &self.params
    }

    pub fn rest(&self) -> Option<&str> {
        self.rest.as_deref()
    }

    /// Every name the signature binds, in binding order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.params.iter().flat_map(Pattern::names).collect();
        names.extend(self.rest.as_deref());
        names
    }

    /// Check every parameter, then names across parameters.
    pub fn check(&self, limits: &Limits) -> Result<(), PatternError> {
        for p in &self.params {
            p.check(limits)?;
        }
        check_names(self.names(), limits)
    }
}

/// Bind `args` to `signature`'s parameters.
///
/// Surplus arguments are dropped unless the signature has a rest parameter.
pub fn bind_call(
    signature: &Signature,
    args: Vec<Value>,
    prior: &dyn Environment,
) -> Result<Bindings, BindError> {
    let declared: HashSet<&str> = signature.names().into_iter().collect();
    let mut matcher = Matcher::new(declared, prior);
    let mut args = args.into_iter();
    for (i, param) in signature.params.iter().enumerate() {
        let arg = args.next().unwrap_or(Value::Unset);
        matcher.bind_arg(i, param, arg)?;
    }
    if let Some(rest) = &signature.rest {
        matcher.emit(rest, Value::Seq(args.collect()));
    }
    Ok(matcher.finish())
}
