//! Command-line argument parsing.
//!
//! Usage:
//!   destructure [-d] [-f[<file>]] [-c<stmt>]... [<script>...]

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which config file to load.
    pub config: ConfigFile,
    /// Statements to run before any script (`-c<stmt>`, repeatable).
    pub commands: Vec<String>,
    /// Script files in order; `-` is stdin.
    pub scripts: Vec<PathBuf>,
    /// Debug logging (`-d`).
    pub debug: bool,
}

impl CliArgs {
    /// No `-c` and no scripts: read the script from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.commands.is_empty() && self.scripts.is_empty()
    }
}

/// How to choose the user config file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search the standard locations (see [`find_user_config`]).
    #[default]
    Search,
    /// `-f` with no file argument: skip user config.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

pub const USAGE: &str = "Usage: destructure [-d] [-f[<file>]] [-c<stmt>]... [<script>...]";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.scripts.extend(argv[i + 1..].iter().map(PathBuf::from));
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            args.scripts.push(PathBuf::from(arg));
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -c<stmt>
                'c' => {
                    let stmt = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a statement argument".to_owned());
                    };
                    args.commands.push(stmt);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Candidate config paths in search order.
///
/// `$DESTRUCTURERC`, then `destructurerc` in the platform config directory,
/// then `~/.destructurerc`.
pub fn config_candidates() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = std::env::var_os("DESTRUCTURERC").filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(p));
    }
    if let Some(dirs) = ProjectDirs::from("", "", "destructure") {
        paths.push(dirs.config_dir().join("destructurerc"));
    }
    if let Some(base) = BaseDirs::new() {
        paths.push(base.home_dir().join(".destructurerc"));
    }
    paths
}

/// Search for the user config file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    config_candidates().into_iter().find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args_read_stdin() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert!(a.reads_stdin());
        assert!(!a.debug);
        assert!(matches!(a.config, ConfigFile::Search));
    }

    #[test]
    fn scripts_in_order() {
        let a = parse_argv(&argv(&["one.ds", "-", "two.ds"])).unwrap();
        assert_eq!(
            a.scripts,
            vec![PathBuf::from("one.ds"), PathBuf::from("-"), PathBuf::from("two.ds")]
        );
        assert!(!a.reads_stdin());
    }

    #[test]
    fn debug_flag() {
        assert!(parse_argv(&argv(&["-d"])).unwrap().debug);
    }

    #[test]
    fn config_skip() {
        let a = parse_argv(&argv(&["-f"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
        let a = parse_argv(&argv(&["-f", "-d"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
        assert!(a.debug);
    }

    #[test]
    fn config_explicit_embedded() {
        let a = parse_argv(&argv(&["-fmyrc"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("myrc")));
    }

    #[test]
    fn config_explicit_separate() {
        let a = parse_argv(&argv(&["-f", "myrc", "script.ds"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("myrc")));
        assert_eq!(a.scripts, vec![PathBuf::from("script.ds")]);
    }

    #[test]
    fn commands_repeat() {
        let a = parse_argv(&argv(&["-clet x = 1", "-c", "echo x"])).unwrap();
        assert_eq!(a.commands, vec!["let x = 1", "echo x"]);
        assert!(!a.reads_stdin());
    }

    #[test]
    fn combined_flags() {
        let a = parse_argv(&argv(&["-dc", "echo 1"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.commands, vec!["echo 1"]);
    }

    #[test]
    fn command_without_argument() {
        assert!(parse_argv(&argv(&["-c"])).is_err());
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["--", "-d"])).unwrap();
        assert!(!a.debug);
        assert_eq!(a.scripts, vec![PathBuf::from("-d")]);
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }

    #[test]
    fn config_candidates_end_with_home_dotfile() {
        if let Some(last) = config_candidates().last() {
            assert!(last.ends_with(".destructurerc"));
        }
    }
}
