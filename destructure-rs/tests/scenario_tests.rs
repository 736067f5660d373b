//! Scenario tests: run destructuring scripts through the built binary and
//! compare its stdout line by line.
//!
//! Each script is piped to the binary on stdin with `-f`, so no user config is
//! loaded.

use std::io::Write;
use std::process::{Command, Output, Stdio};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn binary() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_destructure"))
}

fn run(args: &[&str], script: &str) -> Output {
    let mut child = Command::new(binary())
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn destructure binary");
    // The binary may exit without reading stdin (`-c`, bad options).
    let _ = child
        .stdin
        .take()
        .expect("stdin not open")
        .write_all(script.as_bytes());
    child.wait_with_output().expect("wait failed")
}

fn stdout_lines(out: &Output) -> Vec<String> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Run `script` and assert it succeeds with exactly `expected` on stdout.
fn check(script: &str, expected: &[&str]) {
    let out = run(&["-f"], script);
    assert!(
        out.status.success(),
        "script failed:\n{script}\nstderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(stdout_lines(&out), expected, "script:\n{script}");
}

// ── Arrays ────────────────────────────────────────────────────────────────────

#[test]
fn array_basics() {
    check(
        "\
const colors = ['red', 'green', 'blue']
let [first, second] = colors
let [, , third] = colors
let [head, ...tail] = colors",
        &[
            r#"colors = ["red", "green", "blue"]"#,
            r#"first = "red""#,
            r#"second = "green""#,
            r#"third = "blue""#,
            r#"head = "red""#,
            r#"tail = ["green", "blue"]"#,
        ],
    );
}

#[test]
fn array_defaults_and_short_input() {
    check(
        "let [a = 1, b = 2, c] = [undefined, null]",
        &["a = 1", "b = null", "c = undefined"],
    );
}

#[test]
fn swap_variables() {
    check(
        "\
let left = 'L'
let right = 'R'
[left, right] = [right, left]
echo [left, right]",
        &[
            r#"left = "L""#,
            r#"right = "R""#,
            r#"left = "R""#,
            r#"right = "L""#,
            r#"["R", "L"]"#,
        ],
    );
}

// ── Objects ───────────────────────────────────────────────────────────────────

#[test]
fn object_rename_default_and_rest() {
    check(
        "\
const user = { id: 7, name: 'Ada', role: 'admin', 'last seen': null }
let { name: displayName, email = 'none', ...others } = user",
        &[
            r#"user = { id: 7, name: "Ada", role: "admin", "last seen": null }"#,
            r#"displayName = "Ada""#,
            r#"email = "none""#,
            r#"others = { id: 7, role: "admin", "last seen": null }"#,
        ],
    );
}

#[test]
fn guest_default_only_for_missing() {
    check(
        "\
let { name = 'Guest' } = {}
var { name = 'Guest' } = { name: null }",
        &[r#"name = "Guest""#, "name = null"],
    );
}

#[test]
fn nested_with_fallback() {
    check(
        "\
let { address: { city = 'Unknown', zip } = {} } = { name: 'Ada' }
let { geo: [lat, lng] = [0, 0] } = {}",
        &[r#"city = "Unknown""#, "zip = undefined", "lat = 0", "lng = 0"],
    );
}

#[test]
fn defaults_read_earlier_bindings() {
    check(
        "let [w, h = w, { area = h }] = [3, undefined, {}]",
        &["w = 3", "h = 3", "area = 3"],
    );
}

// ── Functions ─────────────────────────────────────────────────────────────────

#[test]
fn function_parameters() {
    check(
        "\
fn draw({ size = 'big', coords = { x: 0, y: 0 }, radius = 25 } = {})
draw({ coords: { x: 18, y: 30 }, radius: 30 })
draw()",
        &[
            r#"size = "big""#,
            "coords = { x: 18, y: 30 }",
            "radius = 30",
            r#"size = "big""#,
            "coords = { x: 0, y: 0 }",
            "radius = 25",
        ],
    );
}

#[test]
fn rest_parameter() {
    check(
        "fn sum(first, ...more)\nsum(1, 2, 3)",
        &["first = 1", "more = [2, 3]"],
    );
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[test]
fn unguarded_parameter_fails_with_line() {
    let out = run(&["-f"], "fn show({ a })\nshow({})\nshow()\n");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_lines(&out), vec!["a = undefined"]);
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(
        err.contains("line 3: cannot destructure undefined as an object at arguments[0]"),
        "stderr: {err}"
    );
}

#[test]
fn nested_failure_reports_path() {
    let out = run(&["-f"], "let { tags: [, { label }] } = { tags: ['a', null] }");
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("cannot destructure null as an object at $.tags[1]"), "stderr: {err}");
}

#[test]
fn forward_reference_fails() {
    let out = run(&["-f"], "let [a = b, b = 1] = []");
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("cannot access 'b' before initialization"), "stderr: {err}");
}

#[test]
fn deep_nesting_exits_cleanly() {
    let depth = 100_000;
    let script = format!("let {}x{} = 1\n", "[".repeat(depth), "]".repeat(depth));
    let out = run(&["-f"], &script);
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("line 1: nesting too deep"), "stderr: {err}");

    let out = run(&["-f"], &format!("echo {}{}\n", "[".repeat(depth), "]".repeat(depth)));
    assert_eq!(out.status.code(), Some(1));
}

// ── Command line ──────────────────────────────────────────────────────────────

#[test]
fn commands_skip_stdin() {
    let out = run(&["-f", "-c", "let [x] = [1]", "-c", "echo x"], "echo 'unread'");
    assert!(out.status.success());
    assert_eq!(stdout_lines(&out), vec!["x = 1", "1"]);
}

#[test]
fn script_files_run_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let one = dir.path().join("one.ds");
    let two = dir.path().join("two.ds");
    std::fs::write(&one, "let pair = [1, 2]\n").unwrap();
    std::fs::write(&two, "let [a, b] = pair\n").unwrap();

    let out = run(&[one.to_str().unwrap(), two.to_str().unwrap(), "-f"], "");
    assert!(out.status.success());
    assert_eq!(stdout_lines(&out), vec!["pair = [1, 2]", "a = 1", "b = 2"]);
}

#[test]
fn rc_file_settings_apply() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join("destructurerc");
    std::fs::write(&rc, "; test rc\n/set duplicates=allow\n/set undeclared=declare\n").unwrap();
    let rc_arg = format!("-f{}", rc.display());

    let out = run(&[rc_arg.as_str()], "var [a, a] = [1, 2]\nfresh = 3\n");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(stdout_lines(&out), vec!["a = 2", "fresh = 3"]);

    let out = run(&["-f"], "fresh = 3\n");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn bad_option_prints_usage() {
    let out = run(&["-z"], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage: destructure"));
}
