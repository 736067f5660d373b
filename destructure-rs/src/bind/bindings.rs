//! The output of one evaluation, and the environments defaults read from.

use std::fmt;

use indexmap::IndexMap;

use crate::value::Value;

// ── Environment ───────────────────────────────────────────────────────────────

/// Read access to names bound outside the pattern being evaluated.
///
/// Default expressions fall back to this once the pattern's own bindings
/// have been searched.
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Writable storage targeted by reassignment.
pub trait Store: Environment {
    /// Overwrite (or create) `name`.
    fn store(&mut self, name: &str, value: Value);
}

/// An environment with no names in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEnv;

impl Environment for EmptyEnv {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

// ── Bindings ──────────────────────────────────────────────────────────────────

/// Ordered `name → value` pairs produced by one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: IndexMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Record `name`; an existing name keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `name = value` line per binding.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k} = {v}")).collect()
    }
}

impl Environment for Bindings {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Store for Bindings {
    fn store(&mut self, name: &str, value: Value) {
        self.insert(name, value);
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut b = Bindings::new();
        for (k, v) in iter {
            b.insert(k, v);
        }
        b
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.to_lines().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut b = Bindings::new();
        b.insert("a", Value::Int(1));
        b.insert("b", Value::Int(2));
        b.insert("a", Value::Int(3));
        assert_eq!(b.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(b.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn lines() {
        let b: Bindings = [("x", Value::Null), ("y", Value::from("hi"))].into_iter().collect();
        assert_eq!(b.to_lines(), vec!["x = null", "y = \"hi\""]);
        assert_eq!(b.to_string(), "x = null\ny = \"hi\"");
    }

    #[test]
    fn environments() {
        let b: Bindings = [("x", Value::Int(1))].into_iter().collect();
        assert_eq!(b.lookup("x"), Some(Value::Int(1)));
        assert_eq!(b.lookup("y"), None);
        assert_eq!(EmptyEnv.lookup("x"), None);
        let r = &b;
        assert_eq!(r.lookup("x"), Some(Value::Int(1)));
    }
}
