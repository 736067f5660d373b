//! `destructurerc` configuration file parser.
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `/set <name>=<value>` or `/set <name> <value>` | set a variable |
//! | Lines starting with `;` | comment, ignored |
//! | Any other `/command` | silently skipped |
//!
//! Recognised variables:
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `duplicates` | `reject`, `allow` | `reject` |
//! | `maxdepth` | integer ≥ 1 | `64` |
//! | `loglevel` | `off`, `error`, `warn`, `info`, `debug`, `trace` | unset |
//! | `undeclared` | `error`, `declare` | `error` |

use std::path::Path;

use log::LevelFilter;

use crate::pattern::Limits;
use crate::script::Undeclared;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Settings read from an rc file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub limits: Limits,
    /// `None` leaves the choice to the command line.
    pub log_level: Option<LevelFilter>,
    pub undeclared: Undeclared,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Unknown directives and variables are skipped.  A line that names a
    /// known variable with a bad value is reported and leaves the setting
    /// unchanged.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let Some(rest) = line.strip_prefix('/') else { continue };

            let (cmd, args_str) = rest
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((rest, ""));

            if cmd == "set" {
                let tokens = split_args(args_str.trim());
                if let Err(msg) = parse_set(&tokens).and_then(|(k, v)| config.set(&k, &v)) {
                    errors.push(ConfigError { line: lineno, message: msg });
                }
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Apply one `name=value` setting.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "duplicates" => {
                self.limits.allow_duplicates = match value {
                    "reject" => false,
                    "allow" => true,
                    _ => return Err(format!("duplicates: expected reject or allow, got '{value}'")),
                }
            }
            "maxdepth" => match value.parse::<usize>() {
                Ok(n) if n >= 1 => self.limits.max_depth = n,
                _ => return Err(format!("maxdepth: expected a positive integer, got '{value}'")),
            },
            "loglevel" => {
                let level = value
                    .parse::<LevelFilter>()
                    .map_err(|_| format!("loglevel: unknown level '{value}'"))?;
                self.log_level = Some(level);
            }
            "undeclared" => {
                self.undeclared = match value {
                    "error" => Undeclared::Error,
                    "declare" => Undeclared::Declare,
                    _ => return Err(format!("undeclared: expected error or declare, got '{value}'")),
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// ── Argument tokenizer ────────────────────────────────────────────────────────

/// Split `s` into whitespace-delimited tokens, honouring double-quoted strings
/// and `\"` escapes within them.
fn split_args(s: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    cur.push(escaped);
                }
            }
            c if c.is_ascii_whitespace() && !in_quotes => {
                if !cur.is_empty() {
                    args.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        args.push(cur);
    }
    args
}

// ── /set ─────────────────────────────────────────────────────────────────────

/// Parse `/set <name>=<value>` or `/set <name> <value>` into a pair.
fn parse_set(tokens: &[String]) -> Result<(String, String), String> {
    let Some(first) = tokens.first() else {
        return Err("/set: requires an argument".into());
    };

    let (name, value) = if let Some((name, value)) = first.split_once('=') {
        (name.to_owned(), value.to_owned())
    } else if tokens.len() >= 2 {
        (first.clone(), tokens[1..].join(" "))
    } else {
        return Err(format!("/set: missing value for '{first}'"));
    };

    if name.is_empty() {
        return Err("/set: variable name cannot be empty".into());
    }
    Ok((name, value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- split_args -----------------------------------------------------------

    #[test]
    fn split_simple() {
        assert_eq!(split_args("maxdepth 8"), ["maxdepth", "8"]);
    }

    #[test]
    fn split_quoted() {
        assert_eq!(split_args(r#""log level" "\"x\"""#), ["log level", r#""x""#]);
    }

    // -- /set -----------------------------------------------------------------

    #[test]
    fn defaults() {
        let (cfg, errs) = Config::load_str("");
        assert!(errs.is_empty());
        assert_eq!(cfg, Config::default());
        assert!(!cfg.limits.allow_duplicates);
        assert_eq!(cfg.limits.max_depth, 64);
        assert_eq!(cfg.log_level, None);
        assert_eq!(cfg.undeclared, Undeclared::Error);
    }

    #[test]
    fn set_equals_syntax() {
        let (cfg, errs) = Config::load_str("/set duplicates=allow");
        assert!(errs.is_empty(), "{errs:?}");
        assert!(cfg.limits.allow_duplicates);
    }

    #[test]
    fn set_space_syntax() {
        let (cfg, errs) = Config::load_str("/set maxdepth 8\n/set loglevel debug");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.limits.max_depth, 8);
        assert_eq!(cfg.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn undeclared_policy() {
        let (cfg, errs) = Config::load_str("/set undeclared=declare");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.undeclared, Undeclared::Declare);
    }

    #[test]
    fn bad_values_are_reported_and_ignored() {
        let (cfg, errs) = Config::load_str("/set maxdepth=0\n/set duplicates=maybe\n/set loglevel=loud");
        assert_eq!(errs.iter().map(|e| e.line).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_without_value_is_error() {
        let (_, errs) = Config::load_str("/set maxdepth");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("missing value"));
    }

    #[test]
    fn comments_and_unknown_lines_skipped() {
        let src = "\
;; destructurerc\n\
\n\
/def something else\n\
/set colour=blue\n\
plain text\n\
/set duplicates=allow\n";
        let (cfg, errs) = Config::load_str(src);
        assert!(errs.is_empty(), "{errs:?}");
        assert!(cfg.limits.allow_duplicates);
    }

    #[test]
    fn load_file_from_disk() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "/set maxdepth=3").unwrap();
        let (cfg, errs) = Config::load_file(f.path()).unwrap();
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.limits.max_depth, 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_file(&dir.path().join("nope")).is_err());
    }
}
