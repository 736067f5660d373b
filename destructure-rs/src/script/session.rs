//! Script session: runs statements against a table of names.
//!
//! The [`Session`] keeps declared names, defined parameter lists, and the
//! output lines produced so far.  Every binding a statement makes is echoed
//! as a `name = value` line.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::expr::Expr;
use super::stmt::{parse_script_with, parse_stmt_with, DeclKind, Stmt};
use super::ScriptError;
use crate::bind::{assign, bind_call, evaluate, Bindings, Environment, Signature};
use crate::config::Config;
use crate::error::DefaultError;
use crate::pattern::{Limits, Pattern};
use crate::value::Value;

/// What reassigning a name that was never declared does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Undeclared {
    #[default]
    Error,
    /// Declare it on the spot.
    Declare,
}

#[derive(Debug, Default)]
pub struct Session {
    vars: Bindings,
    consts: HashSet<String>,
    functions: HashMap<String, Signature>,
    limits: Limits,
    undeclared: Undeclared,
    /// Lines produced by executed statements.
    pub output: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &Config) -> Self {
        Session {
            limits: config.limits,
            undeclared: config.undeclared,
            ..Self::default()
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Declare (or overwrite) a mutable name from the host side.
    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.consts.remove(&name);
        self.vars.insert(name, value);
    }

    pub fn vars(&self) -> &Bindings {
        &self.vars
    }

    pub fn function(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    /// Parse and run a whole script.  Stops at the first failing statement.
    pub fn exec_script(&mut self, src: &str) -> Result<(), ScriptError> {
        for (line, stmt) in parse_script_with(src, self.limits.max_depth)? {
            debug!("line {line}: {stmt:?}");
            self.exec(stmt)
                .map_err(|message| ScriptError { line, message })?;
        }
        Ok(())
    }

    /// Parse and run one statement.
    pub fn exec_line(&mut self, src: &str) -> Result<(), String> {
        let stmt = parse_stmt_with(src, self.limits.max_depth)?;
        self.exec(stmt)
    }

    pub fn exec(&mut self, stmt: Stmt) -> Result<(), String> {
        match stmt {
            Stmt::Declare {
                kind,
                pattern,
                value,
            } => self.declare(kind, &pattern, &value),
            Stmt::Assign { pattern, value } => self.reassign(&pattern, &value),
            Stmt::Function { name, signature } => {
                signature.check(&self.limits).map_err(|e| e.to_string())?;
                self.functions.insert(name, signature);
                Ok(())
            }
            Stmt::Call { name, args } => self.call(&name, &args),
            Stmt::Echo(expr) => {
                let v = self.eval(&expr)?;
                self.output.push(v.to_string());
                Ok(())
            }
        }
    }

    // ── Statements ───────────────────────────────────────────────────────────

    fn declare(&mut self, kind: DeclKind, pattern: &Pattern, value: &Expr) -> Result<(), String> {
        pattern.check(&self.limits).map_err(|e| e.to_string())?;
        if kind != DeclKind::Var {
            if let Some(name) = pattern.names().into_iter().find(|n| self.vars.contains(n)) {
                return Err(format!("identifier '{name}' has already been declared"));
            }
        }
        let value = self.eval(value)?;
        let bindings = evaluate(pattern, value, &self.vars).map_err(|e| e.to_string())?;
        for (name, v) in bindings.iter() {
            if kind == DeclKind::Const {
                self.consts.insert(name.to_owned());
            } else {
                self.consts.remove(name);
            }
            self.vars.insert(name, v.clone());
        }
        self.output.extend(bindings.to_lines());
        Ok(())
    }

    fn reassign(&mut self, pattern: &Pattern, value: &Expr) -> Result<(), String> {
        pattern.check(&self.limits).map_err(|e| e.to_string())?;
        for name in pattern.names() {
            if self.consts.contains(name) {
                return Err(format!("assignment to constant variable '{name}'"));
            }
            if !self.vars.contains(name) && self.undeclared == Undeclared::Error {
                return Err(format!("{name} is not defined"));
            }
        }
        let value = self.eval(value)?;
        let bindings = assign(pattern, value, &mut self.vars).map_err(|e| e.to_string())?;
        self.output.extend(bindings.to_lines());
        Ok(())
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<(), String> {
        let args = args
            .iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = self
            .functions
            .get(name)
            .ok_or_else(|| format!("{name} is not a function"))?;
        let bindings = bind_call(signature, args, &self.vars).map_err(|e| e.to_string())?;
        self.output.extend(bindings.to_lines());
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Value, String> {
        expr.eval(&|name: &str| {
            self.vars
                .lookup(name)
                .ok_or_else(|| DefaultError::Unbound(name.to_owned()))
        })
        .map_err(|e| e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
