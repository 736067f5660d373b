//! Runtime values a pattern is matched against.
//!
//! Values are a closed tagged union: two "no value" sentinels, scalars, and
//! the two structural shapes (ordered sequences and insertion-ordered
//! mappings).  The evaluator matches on them exhaustively and never probes
//! for structure any other way.

use std::fmt;

use indexmap::IndexMap;

use crate::pattern::is_identifier;

// ── Value ─────────────────────────────────────────────────────────────────────

/// A runtime value.
///
/// `Unset` and `Null` are distinct: `Unset` means "nothing was supplied
/// here" and triggers defaults, `Null` is a deliberate value and never does.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Unset,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(Mapping),
}

impl Value {
    /// Build a sequence from anything yielding values.
    pub fn seq<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Build a mapping from `(key, value)` pairs, keeping their order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(entries.into_iter().collect())
    }

    pub fn empty_seq() -> Self {
        Value::Seq(Vec::new())
    }

    pub fn empty_map() -> Self {
        Value::Map(Mapping::new())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Value::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Name of the value's kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unset => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Seq(_) => "array",
            Value::Map(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                // Keep a fractional part so the text reads back as a float.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{x:.1}")
                } else if x.fract() == 0.0 {
                    // Large integral floats need an exponent to stay floats.
                    write!(f, "{x:e}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => write_quoted(f, s),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => write!(f, "{map}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Map(map)
    }
}

// ── Mapping ───────────────────────────────────────────────────────────────────

/// String-keyed mapping that remembers insertion order.
///
/// Re-inserting an existing key replaces its value in place; the key keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<String, Value>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
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
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if is_identifier(key) {
                f.write_str(key)?;
            } else {
                write_quoted(f, key)?;
            }
            write!(f, ": {value}")?;
        }
        f.write_str(" }")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(Value::Unset, Value::Null);
        assert_ne!(Value::Null, Value::Int(0));
        assert_ne!(Value::Unset, Value::Str(String::new()));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn default_is_unset() {
        assert!(Value::default().is_unset());
    }

    #[test]
    fn display_scalars() {
        assert_eq!(Value::Unset.to_string(), "undefined");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(1e15).to_string(), "1e15");
        assert_eq!(Value::Float(-2.5e20).to_string(), "-2.5e20");
        assert_eq!(Value::from("say \"hi\"").to_string(), r#""say \"hi\"""#);
    }

    #[test]
    fn display_nested() {
        let v = Value::map([
            ("name", Value::from("Ada")),
            ("tags", Value::seq(["x", "y"])),
            ("full name", Value::Null),
        ]);
        assert_eq!(
            v.to_string(),
            r#"{ name: "Ada", tags: ["x", "y"], "full name": null }"#
        );
        assert_eq!(Value::empty_map().to_string(), "{}");
        assert_eq!(Value::empty_seq().to_string(), "[]");
    }

    #[test]
    fn mapping_keeps_insertion_order() {
        let mut m = Mapping::new();
        m.insert("c", 3);
        m.insert("a", 1);
        m.insert("b", 2);
        m.insert("a", 10);
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(m.get("a"), Some(&Value::Int(10)));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::Unset.kind(), "undefined");
        assert_eq!(Value::Float(1.5).kind(), "number");
        assert_eq!(Value::empty_seq().kind(), "array");
        assert_eq!(Value::empty_map().kind(), "object");
    }

    #[test]
    fn accessors() {
        let v = Value::seq([1, 2]);
        assert_eq!(v.as_seq().map(<[Value]>::len), Some(2));
        assert!(v.as_map().is_none());
        assert!(Value::empty_map().as_map().is_some_and(Mapping::is_empty));
    }
}
