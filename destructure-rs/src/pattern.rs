//! Binding patterns: the declarative trees that say how to unpack a value.
//!
//! A pattern is authored once and then evaluated many times.  Construction
//! is plain enum building (or the helper constructors below); [`Pattern::check`]
//! validates a finished tree before first use.
//!
//! | Node | Notation | Meaning |
//! |------|----------|---------|
//! | [`Pattern::Binding`]   | `x`           | bind the matched value to `x` |
//! | [`Pattern::Renamed`]   | `{ k: x }`    | bind the value under key `k` to `x` |
//! | [`Pattern::Defaulted`] | `p = expr`    | substitute `expr` when the value is unset |
//! | [`Pattern::Array`]     | `[a, , ...r]` | positional slots, skips, rest |
//! | [`Pattern::Object`]    | `{a, ...r}`   | keyed slots, rest |

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::bind::default::DefaultExpr;
use crate::value::Value;

// ── Public types ─────────────────────────────────────────────────────────────

/// A node of a binding pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Binding(String),
    /// Bind the value found under `key` to `name`.
    ///
    /// Inside an object pattern the enclosing [`ObjectSlot::key`] is what is
    /// looked up; `key` records where the name came from so shorthand slot
    /// construction can recover it.
    Renamed { name: String, key: String },
    Defaulted(Box<Pattern>, DefaultExpr),
    Array(ArrayPattern),
    Object(ObjectPattern),
}

/// One position of an array pattern.
#[derive(Debug, Clone)]
pub enum ArraySlot {
    /// Consume a position without binding it (`[, x]`).
    Skip,
    Bind(Pattern),
}

#[derive(Debug, Clone, Default)]
pub struct ArrayPattern {
    pub slots: Vec<ArraySlot>,
    /// Collects every position after the last slot.
    pub rest: Option<String>,
}

/// One keyed entry of an object pattern.
#[derive(Debug, Clone)]
pub struct ObjectSlot {
    pub key: String,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPattern {
    pub slots: Vec<ObjectSlot>,
    /// Collects every entry whose key no slot claims.
    pub rest: Option<String>,
}

/// Construction-time limits applied by [`Pattern::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Permit the same output name twice in one pattern (the later binding wins).
    pub allow_duplicates: bool,
    /// Deepest nesting accepted, counting every node on the path.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            allow_duplicates: false,
            max_depth: 64,
        }
    }
}

/// Error returned when a pattern fails its construction checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    InvalidName(String),
    DuplicateName(String),
    /// An object slot whose pattern gives no key to look up.
    MissingKey,
    /// An object slot keyed `slot` holding a rename that reads `renamed`.
    KeyMismatch { slot: String, renamed: String },
    TooDeep { depth: usize, max: usize },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidName(name) => write!(f, "invalid binding name '{name}'"),
            PatternError::DuplicateName(name) => {
                write!(f, "identifier '{name}' has already been declared")
            }
            PatternError::MissingKey => f.write_str("object pattern slot has no key"),
            PatternError::KeyMismatch { slot, renamed } => {
                write!(f, "object slot key '{slot}' does not match renamed key '{renamed}'")
            }
            PatternError::TooDeep { depth, max } => {
                write!(f, "pattern nesting depth {depth} exceeds limit {max}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

// ── Construction ──────────────────────────────────────────────────────────────

impl Pattern {
    pub fn binding(name: impl Into<String>) -> Self {
        Pattern::Binding(name.into())
    }

    /// `{ key: name }`
    pub fn renamed(name: impl Into<String>, key: impl Into<String>) -> Self {
        Pattern::Renamed {
            name: name.into(),
            key: key.into(),
        }
    }

    pub fn array<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArraySlot>,
    {
        Pattern::Array(ArrayPattern {
            slots: slots.into_iter().map(Into::into).collect(),
            rest: None,
        })
    }

    pub fn object<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ObjectSlot>,
    {
        Pattern::Object(ObjectPattern {
            slots: slots.into_iter().map(Into::into).collect(),
            rest: None,
        })
    }

    /// Attach a rest name to an array or object pattern.
    ///
    /// Other nodes are returned unchanged; a `Defaulted` node forwards to its
    /// inner pattern.
    pub fn with_rest(self, name: impl Into<String>) -> Self {
        match self {
            Pattern::Array(mut a) => {
                a.rest = Some(name.into());
                Pattern::Array(a)
            }
            Pattern::Object(mut o) => {
                o.rest = Some(name.into());
                Pattern::Object(o)
            }
            Pattern::Defaulted(inner, expr) => Pattern::Defaulted(Box::new(inner.with_rest(name)), expr),
            other => other,
        }
    }

    /// Wrap in a default evaluated when the matched value is unset.
    pub fn default_to(self, expr: DefaultExpr) -> Self {
        Pattern::Defaulted(Box::new(self), expr)
    }

    /// Shorthand for a constant default.
    pub fn or_value(self, value: impl Into<Value>) -> Self {
        self.default_to(DefaultExpr::value(value))
    }

    /// The `= {}` / `= []` guard: default to an empty container of the
    /// pattern's own shape, so an absent value never fails to destructure.
    pub fn or_empty(self) -> Self {
        let expr = match self.shape_root() {
            Pattern::Array(_) => DefaultExpr::empty_sequence(),
            _ => DefaultExpr::empty_mapping(),
        };
        self.default_to(expr)
    }

    fn shape_root(&self) -> &Pattern {
        match self {
            Pattern::Defaulted(inner, _) => inner.shape_root(),
            other => other,
        }
    }

    /// The key a shorthand object slot built from this pattern looks up.
    pub fn source_key(&self) -> Option<&str> {
        match self {
            Pattern::Binding(name) => Some(name),
            Pattern::Renamed { key, .. } => Some(key),
            Pattern::Defaulted(inner, _) => inner.source_key(),
            Pattern::Array(_) | Pattern::Object(_) => None,
        }
    }

    /// Every output name, in the order an evaluation would emit them.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Binding(name) | Pattern::Renamed { name, .. } => out.push(name),
            Pattern::Defaulted(inner, _) => inner.collect_names(out),
            Pattern::Array(a) => {
                for slot in &a.slots {
                    if let ArraySlot::Bind(p) = slot {
                        p.collect_names(out);
                    }
                }
                out.extend(a.rest.as_deref());
            }
            Pattern::Object(o) => {
                for slot in &o.slots {
                    slot.pattern.collect_names(out);
                }
                out.extend(o.rest.as_deref());
            }
        }
    }

    /// Nesting depth; a lone leaf is 1.
    pub fn depth(&self) -> usize {
        match self {
            Pattern::Binding(_) | Pattern::Renamed { .. } => 1,
            Pattern::Defaulted(inner, _) => 1 + inner.depth(),
            Pattern::Array(a) => {
                1 + a
                    .slots
                    .iter()
                    .filter_map(|s| match s {
                        ArraySlot::Bind(p) => Some(p.depth()),
                        ArraySlot::Skip => None,
                    })
                    .max()
                    .unwrap_or(0)
            }
            Pattern::Object(o) => 1 + o.slots.iter().map(|s| s.pattern.depth()).max().unwrap_or(0),
        }
    }

    /// Validate names, keys, and nesting depth.
    pub fn check(&self, limits: &Limits) -> Result<(), PatternError> {
        let depth = self.depth();
        if depth > limits.max_depth {
            return Err(PatternError::TooDeep {
                depth,
                max: limits.max_depth,
            });
        }
        self.check_keys()?;
        check_names(self.names(), limits)
    }

    fn renamed_key(&self) -> Option<&str> {
        match self {
            Pattern::Renamed { key, .. } => Some(key),
            Pattern::Defaulted(inner, _) => inner.renamed_key(),
            _ => None,
        }
    }

    fn check_keys(&self) -> Result<(), PatternError> {
        match self {
            Pattern::Binding(_) | Pattern::Renamed { .. } => Ok(()),
            Pattern::Defaulted(inner, _) => inner.check_keys(),
            Pattern::Array(a) => a.slots.iter().try_for_each(|s| match s {
                ArraySlot::Bind(p) => p.check_keys(),
                ArraySlot::Skip => Ok(()),
            }),
            Pattern::Object(o) => o.slots.iter().try_for_each(|s| {
                if s.key.is_empty() && s.pattern.source_key().is_none() {
                    return Err(PatternError::MissingKey);
                }
                match s.pattern.renamed_key() {
                    Some(renamed) if !s.key.is_empty() && renamed != s.key => {
                        return Err(PatternError::KeyMismatch {
                            slot: s.key.clone(),
                            renamed: renamed.to_owned(),
                        })
                    }
                    _ => {}
                }
                s.pattern.check_keys()
            }),
        }
    }
}

/// Reject invalid and (unless allowed) repeated names.
pub(crate) fn check_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
    limits: &Limits,
) -> Result<(), PatternError> {
    let mut seen = HashSet::new();
    for name in names {
        if !is_identifier(name) {
            return Err(PatternError::InvalidName(name.to_owned()));
        }
        if !seen.insert(name) && !limits.allow_duplicates {
            return Err(PatternError::DuplicateName(name.to_owned()));
        }
    }
    Ok(())
}

impl From<Pattern> for ArraySlot {
    fn from(p: Pattern) -> Self {
        ArraySlot::Bind(p)
    }
}

impl ObjectSlot {
    pub fn new(key: impl Into<String>, pattern: Pattern) -> Self {
        ObjectSlot {
            key: key.into(),
            pattern,
        }
    }

    /// `{ name }`
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        ObjectSlot::new(name.clone(), Pattern::Binding(name))
    }
}

/// Shorthand slot: the key is taken from the pattern itself.
///
/// Structural patterns carry no key; such a slot ends up with an empty key and
/// is rejected by [`Pattern::check`].
impl From<Pattern> for ObjectSlot {
    fn from(pattern: Pattern) -> Self {
        let key = pattern.source_key().unwrap_or_default().to_owned();
        ObjectSlot { key, pattern }
    }
}

// ── Names ─────────────────────────────────────────────────────────────────────

fn identifier_re() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex is valid")
    })
}

/// Returns `true` if `s` can be used as a binding name.
pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Pattern {
        Pattern::object([
            ObjectSlot::named("name"),
            ObjectSlot::new("age", Pattern::renamed("years", "age").or_value(0)),
            ObjectSlot::new(
                "address",
                Pattern::object([ObjectSlot::named("city")]).or_empty(),
            ),
        ])
        .with_rest("others")
    }

    #[test]
    fn names_in_emit_order() {
        assert_eq!(person().names(), vec!["name", "years", "city", "others"]);
    }

    #[test]
    fn array_names_skip_holes() {
        let p = Pattern::array([ArraySlot::Skip, Pattern::binding("b").into()]).with_rest("tail");
        assert_eq!(p.names(), vec!["b", "tail"]);
    }

    #[test]
    fn depth() {
        assert_eq!(Pattern::binding("x").depth(), 1);
        // object → defaulted → object → binding
        assert_eq!(person().depth(), 4);
    }

    #[test]
    fn check_accepts_valid() {
        assert_eq!(person().check(&Limits::default()), Ok(()));
    }

    #[test]
    fn check_rejects_duplicates() {
        let p = Pattern::array([Pattern::binding("a"), Pattern::binding("a")]);
        assert_eq!(
            p.check(&Limits::default()),
            Err(PatternError::DuplicateName("a".into()))
        );
        let lax = Limits {
            allow_duplicates: true,
            ..Limits::default()
        };
        assert_eq!(p.check(&lax), Ok(()));
    }

    #[test]
    fn check_rejects_bad_names() {
        let p = Pattern::binding("1x");
        assert_eq!(
            p.check(&Limits::default()),
            Err(PatternError::InvalidName("1x".into()))
        );
        let p = Pattern::array([Pattern::binding("ok")]).with_rest("not ok");
        assert!(matches!(p.check(&Limits::default()), Err(PatternError::InvalidName(_))));
    }

    #[test]
    fn check_rejects_depth() {
        let mut p = Pattern::binding("x");
        for _ in 0..10 {
            p = Pattern::array([p]);
        }
        let limits = Limits {
            max_depth: 5,
            ..Limits::default()
        };
        assert_eq!(
            p.check(&limits),
            Err(PatternError::TooDeep { depth: 11, max: 5 })
        );
    }

    #[test]
    fn shorthand_slot_from_structural_pattern_has_no_key() {
        let p = Pattern::object([Pattern::array([Pattern::binding("x")])]);
        assert_eq!(p.check(&Limits::default()), Err(PatternError::MissingKey));
    }

    #[test]
    fn check_rejects_rename_reading_another_key() {
        let p = Pattern::object([ObjectSlot::new("a", Pattern::renamed("x", "b"))]);
        assert_eq!(
            p.check(&Limits::default()),
            Err(PatternError::KeyMismatch {
                slot: "a".into(),
                renamed: "b".into(),
            })
        );
        let p = Pattern::object([ObjectSlot::new("a", Pattern::renamed("x", "b").or_value(0))]);
        assert!(matches!(p.check(&Limits::default()), Err(PatternError::KeyMismatch { .. })));

        // Matching keys, and plain bindings under an explicit key, are fine.
        let p = Pattern::object([
            ObjectSlot::new("a", Pattern::renamed("x", "a")),
            ObjectSlot::new("b", Pattern::binding("y")),
        ]);
        assert_eq!(p.check(&Limits::default()), Ok(()));
    }

    #[test]
    fn shorthand_slot_keys() {
        let slot = ObjectSlot::from(Pattern::renamed("n", "name").or_value("anon"));
        assert_eq!(slot.key, "name");
        let slot = ObjectSlot::from(Pattern::binding("id"));
        assert_eq!(slot.key, "id");
    }

    #[test]
    fn or_empty_picks_shape() {
        let p = Pattern::array([Pattern::binding("x")]).or_empty();
        assert!(matches!(&p, Pattern::Defaulted(inner, _) if matches!(**inner, Pattern::Array(_))));
    }

    #[test]
    fn with_rest_through_default() {
        let p = Pattern::object([ObjectSlot::named("a")]).or_empty().with_rest("r");
        assert_eq!(p.names(), vec!["a", "r"]);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("name"));
        assert!(is_identifier("_x1"));
        assert!(is_identifier("$el"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("full name"));
        assert!(!is_identifier("9lives"));
    }
}
