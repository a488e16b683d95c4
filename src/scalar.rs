//! Scalar token codec for frontmatter values.
//!
//! A bare `[]` always reads as an empty list. The two-character string `[]`
//! only survives a round trip in its quoted form (`"[]"`).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{Scalar, Value};

static INT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static FLOAT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").unwrap());

/// A value shape that has no token form.
#[derive(Debug, Error, PartialEq)]
pub enum DumpError {
    #[error("cannot serialize non-finite number {0}")]
    NonFiniteFloat(f64),

    #[error("cannot serialize string with a line break: {0:?}")]
    MultilineString(String),
}

/// Parse one header token. Never fails: anything unrecognized is a bare
/// string.
pub fn parse_scalar(token: &str) -> Value {
    let text = token.trim();
    match text {
        "null" => return Value::null(),
        "[]" => return Value::List(Vec::new()),
        "true" => return Value::Scalar(Scalar::Bool(true)),
        "false" => return Value::Scalar(Scalar::Bool(false)),
        _ => {}
    }

    if INT_TOKEN.is_match(text) {
        // Out-of-range integers stay as text
        if let Ok(i) = text.parse::<i64>() {
            return Value::Scalar(Scalar::Int(i));
        }
    } else if FLOAT_TOKEN.is_match(text) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Scalar(Scalar::Float(f));
        }
    }

    if let Some(inner) = strip_quotes(text, '"') {
        return Value::string(unescape(inner, '"'));
    }
    if let Some(inner) = strip_quotes(text, '\'') {
        return Value::string(unescape(inner, '\''));
    }

    Value::string(text)
}

/// Parse a list item token. Items are flat, so a bare `[]` becomes the
/// string `[]`.
pub fn parse_item(token: &str) -> Scalar {
    match parse_scalar(token) {
        Value::Scalar(s) => s,
        Value::List(_) => Scalar::Str("[]".to_string()),
    }
}

fn strip_quotes(text: &str, quote: char) -> Option<&str> {
    if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Undo `\\` and `\<quote>` escapes. Any other backslash is literal.
fn unescape(inner: &str, quote: char) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == quote {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Render a scalar as a header token.
pub fn dump_scalar(value: &Scalar) -> Result<String, DumpError> {
    let token = match value {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(true) => "true".to_string(),
        Scalar::Bool(false) => "false".to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => dump_float(*f)?,
        Scalar::Str(s) if s.contains(['\n', '\r']) => return Err(DumpError::MultilineString(s.clone())),
        Scalar::Str(s) => quote(s),
    };
    Ok(token)
}

fn dump_float(f: f64) -> Result<String, DumpError> {
    if !f.is_finite() {
        return Err(DumpError::NonFiniteFloat(f));
    }
    if f == 0.0 {
        return Ok("0".to_string());
    }
    // Integral floats read back as integers, so only drop the decimal point
    // when the value fits one.
    if f.fract() == 0.0 {
        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Ok(format!("{:.0}", f));
        }
        return Ok(format!("{:.1}", f));
    }
    Ok(f.to_string())
}

/// Double-quote a string, escaping backslashes and double quotes.
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
