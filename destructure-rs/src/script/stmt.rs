//! Script statements and the line-level parser.
//!
//! A script is a sequence of lines, one statement per line.  Blank lines and
//! lines starting with `;` or `//` are skipped; a trailing `;` is allowed.

use super::expr::{Expr, Parser, Token};
use super::ScriptError;
use crate::bind::Signature;
use crate::pattern::{Limits, Pattern};

/// How a declaration introduces its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    /// May redeclare an existing name.
    Var,
}

/// A parsed statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `let PATTERN = VALUE`
    Declare {
        kind: DeclKind,
        pattern: Pattern,
        value: Expr,
    },
    /// `PATTERN = VALUE` against existing names.
    Assign { pattern: Pattern, value: Expr },
    /// `fn NAME(PARAMS)`
    Function { name: String, signature: Signature },
    /// `NAME(ARGS)`
    Call { name: String, args: Vec<Expr> },
    /// `echo VALUE`
    Echo(Expr),
}

/// Parse a whole script, returning each statement with its 1-based line number.
///
/// The first syntax error aborts parsing; nothing is returned for the lines
/// before it.
pub fn parse_script(src: &str) -> Result<Vec<(usize, Stmt)>, ScriptError> {
    parse_script_with(src, Limits::default().max_depth)
}

/// [`parse_script`] with a custom bound on bracket nesting.
pub fn parse_script_with(src: &str, max_depth: usize) -> Result<Vec<(usize, Stmt)>, ScriptError> {
    let mut stmts = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with("//") {
            continue;
        }
        let stmt = parse_stmt_with(line, max_depth).map_err(|message| ScriptError {
            line: i + 1,
            message,
        })?;
        stmts.push((i + 1, stmt));
    }
    Ok(stmts)
}

/// Parse a single statement.
pub fn parse_stmt(src: &str) -> Result<Stmt, String> {
    parse_stmt_with(src, Limits::default().max_depth)
}

pub fn parse_stmt_with(src: &str, max_depth: usize) -> Result<Stmt, String> {
    let mut p = Parser::with_max_depth(src, max_depth)?;

    let keyword = match p.peek() {
        Token::Ident(word) => Some(word.clone()),
        _ => None,
    };

    let stmt = match keyword.as_deref() {
        Some(kw @ ("let" | "const" | "var")) => {
            let kind = match kw {
                "let" => DeclKind::Let,
                "const" => DeclKind::Const,
                _ => DeclKind::Var,
            };
            p.advance();
            parse_declaration(&mut p, kind)?
        }
        Some("fn" | "function") if matches!(p.peek_at(1), Token::Ident(_)) => {
            p.advance();
            let name = p.ident()?;
            p.expect(&Token::LParen)?;
            let signature = p.params()?;
            Stmt::Function { name, signature }
        }
        Some("echo") if !matches!(p.peek_at(1), Token::Assign | Token::LParen) => {
            p.advance();
            Stmt::Echo(p.expr()?)
        }
        Some(_) if matches!(p.peek_at(1), Token::LParen) => {
            let name = p.ident()?;
            p.advance();
            let args = p.args()?;
            Stmt::Call { name, args }
        }
        _ => {
            let pattern = p.target()?;
            p.expect(&Token::Assign)?;
            let value = p.expr()?;
            Stmt::Assign { pattern, value }
        }
    };

    p.finish()?;
    Ok(stmt)
}

fn parse_declaration(p: &mut Parser, kind: DeclKind) -> Result<Stmt, String> {
    let pattern = p.target()?;
    let value = if p.at_end() {
        // `let x;` declares `x` as undefined.
        match (&pattern, kind) {
            (Pattern::Array(_) | Pattern::Object(_), _) => {
                return Err("missing initializer in destructuring declaration".to_owned())
            }
            (_, DeclKind::Const) => {
                return Err("missing initializer in const declaration".to_owned())
            }
            _ => Expr::Literal(crate::value::Value::Unset),
        }
    } else {
        p.expect(&Token::Assign)?;
        p.expr()?
    };
    Ok(Stmt::Declare {
        kind,
        pattern,
        value,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
