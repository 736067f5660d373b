//! Lexer, literal expressions, and the pattern parser.
//!
//! The notation is the familiar destructuring syntax:
//!
//! ```text
//! value    := int | float | string | true | false | null | undefined
//!           | name | '[' (value? ',')* ']' | '{' (key ':' value | name),* '}'
//! pattern  := target ('=' value)?
//! target   := name | '[' (pattern? ',')* ('...' name)? ']'
//!           | '{' (key ':' pattern | name ('=' value)?),* (',' '...' name)? '}'
//! params   := '(' pattern,* (',' '...' name)? ')'
//! ```
//!
//! Expressions are literals and name references only; nothing here computes.

use std::fmt;

use crate::bind::{DefaultExpr, Signature};
use crate::error::DefaultError;
use crate::pattern::{is_identifier, ArraySlot, Limits, ObjectSlot, Pattern};
use crate::value::{Mapping, Value};

/// Names that read as literals and so cannot be bound.
const LITERAL_WORDS: &[&str] = &["true", "false", "null", "undefined"];

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
    Assign,
    Ellipsis, // ...
    Minus,

    /// Unrecognised input character, reported by the parser.
    Unknown(char),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Ident(s) => write!(f, "'{s}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Colon => f.write_str("':'"),
            Token::Semicolon => f.write_str("';'"),
            Token::Assign => f.write_str("'='"),
            Token::Ellipsis => f.write_str("'...'"),
            Token::Minus => f.write_str("'-'"),
            Token::Unknown(c) => write!(f, "'{c}'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, String> {
        let mut s = String::from(first);
        let mut is_float = false;
        while let Some(c @ ('0'..='9' | '_')) = self.peek() {
            if c != '_' {
                s.push(c);
            }
            self.pos += 1;
        }
        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            s.push('.');
            self.pos += 1;
            while let Some(c @ '0'..='9') = self.peek() {
                s.push(c);
                self.pos += 1;
            }
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            is_float = true;
            s.push(e);
            self.pos += 1;
            if let Some(sign @ ('+' | '-')) = self.peek() {
                s.push(sign);
                self.pos += 1;
            }
            while let Some(c @ '0'..='9') = self.peek() {
                s.push(c);
                self.pos += 1;
            }
        }
        if is_float {
            s.parse()
                .map(Token::Float)
                .map_err(|_| format!("invalid number '{s}'"))
        } else {
            s.parse()
                .map(Token::Int)
                .map_err(|_| format!("integer '{s}' out of range"))
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, String> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Err("unterminated string literal".to_owned()),
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err("unterminated string literal".to_owned()),
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Ok(Token::Str(s))
    }

    fn read_ident(&mut self, first: char) -> Token {
        let mut s = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                s.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Result<Token, String> {
        self.skip_ws();
        let ch = match self.advance() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        Ok(match ch {
            '0'..='9' => return self.read_number(ch),
            '"' | '\'' => return self.read_string(ch),
            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_ident(c),
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '=' => Token::Assign,
            '-' => Token::Minus,
            '.' => {
                if self.eat('.') && self.eat('.') {
                    Token::Ellipsis
                } else {
                    Token::Unknown('.')
                }
            }
            // `//` comments run to the end of the input.
            '/' if self.peek() == Some('/') => {
                self.pos = self.src.len();
                Token::Eof
            }
            c => Token::Unknown(c),
        })
    }

    fn tokenize(mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = matches!(t, Token::Eof);
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

/// A literal value, possibly referring to names.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    /// Holes in the source are `Literal(Value::Unset)` elements.
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

impl Expr {
    /// Build the value, resolving names through `lookup`.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Result<Value, DefaultError>) -> Result<Value, DefaultError> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) => lookup(name),
            Expr::Array(items) => items
                .iter()
                .map(|e| e.eval(lookup))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq),
            Expr::Object(entries) => {
                let mut map = Mapping::new();
                for (key, e) in entries {
                    map.insert(key.as_str(), e.eval(lookup)?);
                }
                Ok(Value::Map(map))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Name(name) => f.write_str(name),
            Expr::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Expr::Object(entries) => {
                if entries.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_identifier(key) {
                        write!(f, "{key}: {value}")?;
                    } else {
                        write!(f, "{key:?}: {value}")?;
                    }
                }
                f.write_str(" }")
            }
        }
    }
}

/// Turn a parsed default into a thunk over the default scope.
fn default_expr(expr: Expr) -> DefaultExpr {
    match expr {
        Expr::Literal(v) => DefaultExpr::value(v),
        expr => {
            let label = expr.to_string();
            DefaultExpr::new(move |scope| expr.eval(&|name: &str| scope.lookup(name))).labeled(label)
        }
    }
}

// ── Parser ────────────────────────────────────────────────────────────────────

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open brackets and braces around the current position.
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub(crate) fn new(src: &str) -> Result<Self, String> {
        Self::with_max_depth(src, Limits::default().max_depth)
    }

    /// A parser that rejects values and patterns nested deeper than `max_depth`.
    pub(crate) fn with_max_depth(src: &str, max_depth: usize) -> Result<Self, String> {
        Ok(Parser {
            tokens: Lexer::new(src).tokenize()?,
            pos: 0,
            depth: 0,
            max_depth,
        })
    }

    /// Run `f` one nesting level down.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, String>) -> Result<T, String> {
        if self.depth >= self.max_depth {
            return Err(format!("nesting too deep (limit {})", self.max_depth));
        }
        self.depth += 1;
        let r = f(self);
        self.depth -= 1;
        r
    }

    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&Token::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn eat(&mut self, t: &Token) -> bool {
        if self.peek() == t {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, t: &Token) -> Result<(), String> {
        let got = self.advance();
        if &got == t {
            Ok(())
        } else {
            Err(format!("expected {t}, found {got}"))
        }
    }

    /// True when only an optional `;` remains.
    pub(crate) fn at_end(&self) -> bool {
        match self.peek() {
            Token::Eof => true,
            Token::Semicolon => matches!(self.peek_at(1), Token::Eof),
            _ => false,
        }
    }

    pub(crate) fn finish(&mut self) -> Result<(), String> {
        self.eat(&Token::Semicolon);
        match self.advance() {
            Token::Eof => Ok(()),
            t => Err(format!("unexpected {t}")),
        }
    }

    pub(crate) fn ident(&mut self) -> Result<String, String> {
        match self.advance() {
            Token::Ident(s) if LITERAL_WORDS.contains(&s.as_str()) => {
                Err(format!("'{s}' cannot be used as a name"))
            }
            Token::Ident(s) => Ok(s),
            t => Err(format!("expected a name, found {t}")),
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    pub(crate) fn expr(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Minus => match self.advance() {
                Token::Int(n) => Ok(Expr::Literal(Value::Int(-n))),
                Token::Float(x) => Ok(Expr::Literal(Value::Float(-x))),
                t => Err(format!("expected a number after '-', found {t}")),
            },
            Token::Ident(s) => Ok(match s.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Unset),
                _ => Expr::Name(s),
            }),
            Token::LBracket => self.nested(Self::array_literal),
            Token::LBrace => self.nested(Self::object_literal),
            t => Err(format!("expected a value, found {t}")),
        }
    }

    fn array_literal(&mut self) -> Result<Expr, String> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Token::RBracket => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    items.push(Expr::Literal(Value::Unset));
                }
                _ => {
                    items.push(self.expr()?);
                    match self.advance() {
                        Token::Comma => {}
                        Token::RBracket => break,
                        t => return Err(format!("expected ',' or ']' in array, found {t}")),
                    }
                }
            }
        }
        Ok(Expr::Array(items))
    }

    fn object_literal(&mut self) -> Result<Expr, String> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                break;
            }
            let key = self.property_key()?;
            let value = if self.eat(&Token::Colon) {
                self.expr()?
            } else if is_identifier(&key) {
                Expr::Name(key.clone())
            } else {
                return Err(format!("expected ':' after key {key:?}"));
            };
            entries.push((key, value));
            match self.advance() {
                Token::Comma => {}
                Token::RBrace => break,
                t => return Err(format!("expected ',' or '}}' in object, found {t}")),
            }
        }
        Ok(Expr::Object(entries))
    }

    fn property_key(&mut self) -> Result<String, String> {
        match self.advance() {
            Token::Ident(s) | Token::Str(s) => Ok(s),
            Token::Int(n) => Ok(n.to_string()),
            t => Err(format!("expected a property key, found {t}")),
        }
    }

    /// Comma-separated call arguments; the opening `(` is already consumed.
    pub(crate) fn args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.advance() {
                Token::Comma => {}
                Token::RParen => break,
                t => return Err(format!("expected ',' or ')' in arguments, found {t}")),
            }
        }
        Ok(args)
    }

    // ── Patterns ─────────────────────────────────────────────────────────────

    /// A target with an optional `= default`.
    pub(crate) fn pattern(&mut self) -> Result<Pattern, String> {
        let target = self.target()?;
        if self.eat(&Token::Assign) {
            let dflt = self.expr()?;
            Ok(target.default_to(default_expr(dflt)))
        } else {
            Ok(target)
        }
    }

    /// A bare name or a structural pattern, without a default.
    pub(crate) fn target(&mut self) -> Result<Pattern, String> {
        match self.peek() {
            Token::LBracket => {
                self.advance();
                self.nested(Self::array_pattern)
            }
            Token::LBrace => {
                self.advance();
                self.nested(Self::object_pattern)
            }
            _ => Ok(Pattern::Binding(self.ident()?)),
        }
    }

    fn array_pattern(&mut self) -> Result<Pattern, String> {
        let mut slots = Vec::new();
        let mut rest = None;
        loop {
            match self.peek() {
                Token::RBracket => {
                    self.advance();
                    break;
                }
                Token::Comma => {
                    self.advance();
                    slots.push(ArraySlot::Skip);
                }
                Token::Ellipsis => {
                    self.advance();
                    rest = Some(self.ident()?);
                    self.expect(&Token::RBracket)
                        .map_err(|_| "rest element must be last".to_owned())?;
                    break;
                }
                _ => {
                    slots.push(ArraySlot::Bind(self.pattern()?));
                    match self.advance() {
                        Token::Comma => {}
                        Token::RBracket => break,
                        t => return Err(format!("expected ',' or ']' in pattern, found {t}")),
                    }
                }
            }
        }
        let pattern = Pattern::array(slots);
        Ok(match rest {
            Some(name) => pattern.with_rest(name),
            None => pattern,
        })
    }

    fn object_pattern(&mut self) -> Result<Pattern, String> {
        let mut slots = Vec::new();
        let mut rest = None;
        loop {
            if self.eat(&Token::RBrace) {
                break;
            }
            if self.eat(&Token::Ellipsis) {
                rest = Some(self.ident()?);
                self.expect(&Token::RBrace)
                    .map_err(|_| "rest element must be last".to_owned())?;
                break;
            }
            let key = self.property_key()?;
            let slot = if self.eat(&Token::Colon) {
                let p = self.pattern()?;
                ObjectSlot::new(key.clone(), rename(p, &key))
            } else {
                if !is_identifier(&key) || LITERAL_WORDS.contains(&key.as_str()) {
                    return Err(format!("expected ':' after key {key:?}"));
                }
                let mut p = Pattern::Binding(key.clone());
                if self.eat(&Token::Assign) {
                    p = p.default_to(default_expr(self.expr()?));
                }
                ObjectSlot::new(key, p)
            };
            slots.push(slot);
            match self.advance() {
                Token::Comma => {}
                Token::RBrace => break,
                t => return Err(format!("expected ',' or '}}' in pattern, found {t}")),
            }
        }
        let pattern = Pattern::object(slots);
        Ok(match rest {
            Some(name) => pattern.with_rest(name),
            None => pattern,
        })
    }

    /// Parameter list; the opening `(` is already consumed.
    pub(crate) fn params(&mut self) -> Result<Signature, String> {
        let mut params = Vec::new();
        let mut rest = None;
        loop {
            if self.eat(&Token::RParen) {
                break;
            }
            if self.eat(&Token::Ellipsis) {
                rest = Some(self.ident()?);
                self.expect(&Token::RParen)
                    .map_err(|_| "rest parameter must be last".to_owned())?;
                break;
            }
            params.push(self.pattern()?);
            match self.advance() {
                Token::Comma => {}
                Token::RParen => break,
                t => return Err(format!("expected ',' or ')' in parameters, found {t}")),
            }
        }
        let sig = Signature::new(params);
        Ok(match rest {
            Some(name) => sig.with_rest(name),
            None => sig,
        })
    }
}

/// `{ key: name }` binds `name` from `key`; record that as a rename.
fn rename(p: Pattern, key: &str) -> Pattern {
    match p {
        Pattern::Binding(name) if name != key => Pattern::Renamed {
            name,
            key: key.to_owned(),
        },
        Pattern::Defaulted(inner, expr) => Pattern::Defaulted(Box::new(rename(*inner, key)), expr),
        other => other,
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Parse a complete pattern such as `{ a, b: [c, ...d] = [] }`.
pub fn parse_pattern(src: &str) -> Result<Pattern, String> {
    let mut p = Parser::new(src)?;
    let pattern = p.pattern()?;
    p.finish()?;
    Ok(pattern)
}

/// Parse a parameter list such as `(a, { b } = {}, ...rest)`.
pub fn parse_signature(src: &str) -> Result<Signature, String> {
    let mut p = Parser::new(src)?;
    p.expect(&Token::LParen)?;
    let sig = p.params()?;
    p.finish()?;
    Ok(sig)
}

pub fn parse_expr(src: &str) -> Result<Expr, String> {
    let mut p = Parser::new(src)?;
    let e = p.expr()?;
    p.finish()?;
    Ok(e)
}

/// Parse a value that refers to no names.
pub fn parse_value(src: &str) -> Result<Value, String> {
    parse_expr(src)?
        .eval(&|name: &str| Err(DefaultError::Unbound(name.to_owned())))
        .map_err(|e| e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
