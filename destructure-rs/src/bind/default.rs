//! Default expressions and the scope they are evaluated in.
//!
//! A default is a thunk: it runs only when its slot's value is unset, once
//! per evaluation, and sees exactly the bindings emitted before it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::trace;

use super::bindings::{Bindings, Environment};
use crate::error::DefaultError;
use crate::value::Value;

type Thunk = dyn Fn(&DefaultScope<'_>) -> Result<Value, DefaultError> + Send + Sync;

/// A caller-supplied default, shared cheaply between pattern clones.
#[derive(Clone)]
pub struct DefaultExpr {
    label: Arc<str>,
    thunk: Arc<Thunk>,
}

impl DefaultExpr {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&DefaultScope<'_>) -> Result<Value, DefaultError> + Send + Sync + 'static,
    {
        DefaultExpr {
            label: Arc::from("<fn>"),
            thunk: Arc::new(f),
        }
    }

    /// A constant; each invocation yields a fresh clone.
    pub fn value(value: impl Into<Value>) -> Self {
        let value = value.into();
        let label = value.to_string();
        DefaultExpr::new(move |_| Ok(value.clone())).labeled(label)
    }

    /// Read another name, e.g. `[a, b = a]`.
    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = name.clone();
        DefaultExpr::new(move |scope| scope.lookup(&name)).labeled(label)
    }

    pub fn empty_mapping() -> Self {
        DefaultExpr::value(Value::empty_map())
    }

    pub fn empty_sequence() -> Self {
        DefaultExpr::value(Value::empty_seq())
    }

    /// Text shown for this default in `Debug` output.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Arc::from(label.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for DefaultExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultExpr({})", self.label)
    }
}

// ── Scope ─────────────────────────────────────────────────────────────────────

/// What a default expression may read.
pub struct DefaultScope<'a> {
    produced: &'a Bindings,
    declared: &'a HashSet<&'a str>,
    prior: &'a dyn Environment,
}

impl<'a> DefaultScope<'a> {
    pub(crate) fn new(
        produced: &'a Bindings,
        declared: &'a HashSet<&'a str>,
        prior: &'a dyn Environment,
    ) -> Self {
        DefaultScope {
            produced,
            declared,
            prior,
        }
    }

    /// Resolve `name`: bindings emitted so far, then the enclosing environment.
    ///
    /// A name the pattern binds but has not reached yet is a forward
    /// reference even when the enclosing environment also defines it.
    pub fn lookup(&self, name: &str) -> Result<Value, DefaultError> {
        if let Some(v) = self.produced.get(name) {
            return Ok(v.clone());
        }
        if self.declared.contains(name) {
            return Err(DefaultError::ForwardReference(name.to_owned()));
        }
        self.prior
            .lookup(name)
            .ok_or_else(|| DefaultError::Unbound(name.to_owned()))
    }

    /// Bindings emitted earlier in this evaluation.
    pub fn produced(&self) -> &Bindings {
        self.produced
    }
}

/// Run `expr` once against `scope`.
pub fn evaluate_default(expr: &DefaultExpr, scope: &DefaultScope<'_>) -> Result<Value, DefaultError> {
    trace!("evaluating default {}", expr.label);
    (expr.thunk)(scope)
}
