//! Textual scalar schema grammar:
//! `name ["(" param-list ")"] ["[" default-list "]"] ["{" charset "}"]`.
//!
//! Lists are comma separated; commas inside matching quotes do not split. Each
//! element is unquoted and coerced to a typed literal with [coerce_literal].

use crate::{errors::SchemaError, value::Value};

/// The sections of a textual scalar schema, before type validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarText<'a> {
    pub name: &'a str,
    pub param: Option<Vec<Value>>,
    pub default: Option<Vec<Value>>,
    pub charset: Option<String>,
}

fn syntax(text: &str, reason: &'static str) -> SchemaError {
    SchemaError::Syntax {
        text: text.to_string(),
        reason,
    }
}

/// Splits `text` into its name, parameter, default and charset sections.
pub fn parse_scalar(text: &str) -> Result<ScalarText<'_>, SchemaError> {
    let trimmed = text.trim();
    let name_end = trimmed
        .find(|c| matches!(c, '(' | '[' | '{' | ')' | ']' | '}'))
        .unwrap_or(trimmed.len());

    let name = trimmed[..name_end].trim();
    if name.is_empty() {
        return Err(syntax(text, "missing type name"));
    }

    let mut rest = &trimmed[name_end..];
    let mut param = None;
    let mut default = None;
    let mut charset = None;

    if rest.starts_with('(') {
        let (inner, tail) = enclosed(text, rest, ')')?;
        param = split_list(inner);
        rest = tail.trim_start();
    }

    if rest.starts_with('[') {
        let (inner, tail) = enclosed(text, rest, ']')?;
        default = split_list(inner);
        rest = tail.trim_start();
    }

    if rest.starts_with('{') {
        if !rest.ends_with('}') || rest.len() < 2 {
            return Err(syntax(text, "unterminated charset"));
        }

        charset = Some(rest[1..rest.len() - 1].to_string());
        rest = "";
    }

    if !rest.is_empty() {
        return Err(syntax(text, "unexpected characters after type"));
    }

    Ok(ScalarText {
        name,
        param,
        default,
        charset,
    })
}

/// Returns the contents between the opening bracket at `rest[0]` and its `close`,
/// skipping quoted runs, plus the remainder after `close`.
fn enclosed<'a>(
    text: &str,
    rest: &'a str,
    close: char,
) -> Result<(&'a str, &'a str), SchemaError> {
    let mut quote: Option<char> = None;

    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == close => return Ok((&rest[1..i], &rest[i + 1..])),
            None => {}
        }
    }

    Err(syntax(text, "unterminated parameter or default list"))
}

/// Splits a list on commas outside quotes and coerces each element. An empty list is `None`.
pub fn split_list(inner: &str) -> Option<Vec<Value>> {
    if inner.trim().is_empty() {
        return None;
    }

    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ',' => {
                items.push(coerce_literal(unquote(inner[start..i].trim())));
                start = i + 1;
            }
            None => {}
        }
    }

    items.push(coerce_literal(unquote(inner[start..].trim())));
    Some(items)
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Turns literal text into a typed value: `null`, `true`, `false`, integers and floats
/// become their typed values, anything else stays a string.
pub fn coerce_literal(s: &str) -> Value {
    match s {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(v) = s.parse::<i64>() {
        return Value::integer(v);
    }

    if let Ok(v) = s.parse::<u64>() {
        return Value::UInt(v);
    }

    match crate::value::parse_float_text(s) {
        Some(v) => Value::Float(v),
        None => Value::String(s.to_string()),
    }
}
