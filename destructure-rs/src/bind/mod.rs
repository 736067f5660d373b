//! The pattern-binding evaluator.
//!
//! [`evaluate`] walks a [`Pattern`] against a [`Value`] and returns the
//! bindings it produces, or the first failure.  The walk is strictly left to
//! right: array slots in index order, object slots in declared order, so a
//! default expression always sees every binding emitted before it.
//!
//! ```rust
//! use destructure::bind::{evaluate, EmptyEnv};
//! use destructure::pattern::{ObjectSlot, Pattern};
//! use destructure::value::Value;
//!
//! let pattern = Pattern::object([ObjectSlot::from(Pattern::binding("name").or_value("Guest"))]);
//!
//! let b = evaluate(&pattern, Value::empty_map(), &EmptyEnv).unwrap();
//! assert_eq!(b.get("name"), Some(&Value::from("Guest")));
//!
//! let b = evaluate(&pattern, Value::map([("name", Value::Null)]), &EmptyEnv).unwrap();
//! assert_eq!(b.get("name"), Some(&Value::Null));
//! ```

pub mod bindings;
pub mod call;
pub mod default;

use std::collections::HashSet;
use std::fmt::Write as _;

use log::{debug, trace};

use crate::error::{BindError, Shape};
use crate::pattern::{ArrayPattern, ArraySlot, ObjectPattern, Pattern};
use crate::value::Value;

pub use bindings::{Bindings, EmptyEnv, Environment, Store};
pub use call::{bind_call, Signature};
pub use default::{evaluate_default, DefaultExpr, DefaultScope};

// ── Entry points ──────────────────────────────────────────────────────────────

/// Match `pattern` against `value`.
///
/// `prior` supplies the names defaults may read besides the pattern's own
/// earlier bindings.  On failure nothing is returned; there is no partial
/// result.
pub fn evaluate(
    pattern: &Pattern,
    value: Value,
    prior: &dyn Environment,
) -> Result<Bindings, BindError> {
    let declared: HashSet<&str> = pattern.names().into_iter().collect();
    let mut matcher = Matcher::new(declared, prior);
    matcher.bind(pattern, value)?;
    Ok(matcher.finish())
}

/// Reassignment: match as [`evaluate`] does, then overwrite `store`.
///
/// Every value is computed before the first write, so `[a, b] = [b, a]`
/// swaps.  Defaults read `store` for names the pattern does not bind.
pub fn assign<S: Store>(pattern: &Pattern, value: Value, store: &mut S) -> Result<Bindings, BindError> {
    let bindings = evaluate(pattern, value, &*store)?;
    for (name, value) in bindings.iter() {
        store.store(name, value.clone());
    }
    Ok(bindings)
}

// ── Matcher ───────────────────────────────────────────────────────────────────

/// One step of the path from the matched value's root to the current slot.
#[derive(Debug, Clone, Copy)]
enum Segment<'p> {
    Index(usize),
    Key(&'p str),
    Arg(usize),
}

/// State for a single evaluation.
pub(crate) struct Matcher<'p> {
    declared: HashSet<&'p str>,
    prior: &'p dyn Environment,
    out: Bindings,
    path: Vec<Segment<'p>>,
}

impl<'p> Matcher<'p> {
    pub(crate) fn new(declared: HashSet<&'p str>, prior: &'p dyn Environment) -> Self {
        Matcher {
            declared,
            prior,
            out: Bindings::new(),
            path: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Bindings {
        self.out
    }

    /// Bind the `i`th call argument.
    pub(crate) fn bind_arg(&mut self, i: usize, pattern: &'p Pattern, value: Value) -> Result<(), BindError> {
        self.path.push(Segment::Arg(i));
        let r = self.bind(pattern, value);
        self.path.pop();
        r
    }

    pub(crate) fn emit(&mut self, name: &str, value: Value) {
        trace!("bind {name} = {value}");
        self.out.insert(name, value);
    }

    fn bind(&mut self, pattern: &'p Pattern, value: Value) -> Result<(), BindError> {
        match pattern {
            Pattern::Defaulted(inner, expr) => {
                let value = if value.is_unset() {
                    let scope = DefaultScope::new(&self.out, &self.declared, self.prior);
                    evaluate_default(expr, &scope).map_err(|e| {
                        debug!("default at {} failed: {e}", self.render_path());
                        BindError::Default(e)
                    })?
                } else {
                    value
                };
                self.bind(inner, value)
            }
            Pattern::Binding(name) | Pattern::Renamed { name, .. } => {
                self.emit(name, value);
                Ok(())
            }
            Pattern::Array(array) => match value {
                Value::Seq(items) => self.bind_array(array, items),
                other => Err(self.not_destructurable(Shape::Sequence, &other)),
            },
            Pattern::Object(object) => match value {
                Value::Map(map) => self.bind_object(object, map),
                other => Err(self.not_destructurable(Shape::Mapping, &other)),
            },
        }
    }

    fn bind_array(&mut self, array: &'p ArrayPattern, items: Vec<Value>) -> Result<(), BindError> {
        let mut items = items.into_iter();
        for (i, slot) in array.slots.iter().enumerate() {
            // Past the end reads as unset, same as an explicit unset element.
            let item = items.next().unwrap_or(Value::Unset);
            if let ArraySlot::Bind(p) = slot {
                self.path.push(Segment::Index(i));
                let r = self.bind(p, item);
                self.path.pop();
                r?;
            }
        }
        if let Some(rest) = &array.rest {
            self.emit(rest, Value::Seq(items.collect()));
        }
        Ok(())
    }

    fn bind_object(&mut self, object: &'p ObjectPattern, map: crate::value::Mapping) -> Result<(), BindError> {
        for slot in &object.slots {
            let key = slot_key(slot);
            let item = map.get(key).cloned().unwrap_or(Value::Unset);
            self.path.push(Segment::Key(key));
            let r = self.bind(&slot.pattern, item);
            self.path.pop();
            r?;
        }
        if let Some(rest) = &object.rest {
            let claimed: HashSet<&str> = object.slots.iter().map(slot_key).collect();
            let remaining = map
                .into_iter()
                .filter(|(k, _)| !claimed.contains(k.as_str()))
                .collect();
            self.emit(rest, Value::Map(remaining));
        }
        Ok(())
    }

    fn not_destructurable(&self, expected: Shape, found: &Value) -> BindError {
        let path = self.render_path();
        debug!("cannot destructure {} as {expected} at {path}", found.kind());
        BindError::NotDestructurable {
            path,
            expected,
            found: found.kind(),
        }
    }

    fn render_path(&self) -> String {
        let mut s = String::new();
        match self.path.first() {
            Some(Segment::Arg(_)) => {}
            _ => s.push('$'),
        }
        for seg in &self.path {
            // Writing into a String cannot fail.
            let _ = match seg {
                Segment::Index(i) => write!(s, "[{i}]"),
                Segment::Key(k) if crate::pattern::is_identifier(k) => write!(s, ".{k}"),
                Segment::Key(k) => write!(s, "[{k:?}]"),
                Segment::Arg(i) => write!(s, "arguments[{i}]"),
            };
        }
        s
    }
}

/// The key a slot reads; an empty slot key falls back to the pattern's own.
fn slot_key(slot: &crate::pattern::ObjectSlot) -> &str {
    if slot.key.is_empty() {
        slot.pattern.source_key().unwrap_or_default()
    } else {
        &slot.key
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
