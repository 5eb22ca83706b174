//! Typed scalars produced from free-text parameter tokens.
//!
//! Model output is plain text, so every parameter arrives as a string (or, when the
//! model emitted JSON, as an already-typed JSON scalar). `coerce` maps any token onto
//! the closed [`Value`] sum type; it is total and never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Plain JSON rendering, used to feed typed parameter structs.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Coerce a raw text token. First matching rule wins:
/// trimmed and unquoted text that reads `true`/`false` is a boolean, a signed digit run
/// is an integer, a signed decimal with a single `.` is a float, anything else is text.
pub fn coerce(raw: &str) -> Value {
    let cleaned = unquote(raw.trim());

    if cleaned.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if cleaned.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if is_integer_literal(cleaned) {
        // Too wide for i64: saturate so range clamping still applies downstream.
        let i = cleaned.parse::<i64>().unwrap_or(if cleaned.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        });
        return Value::Integer(i);
    }

    if is_decimal_literal(cleaned) {
        if let Ok(f) = cleaned.parse::<f64>() {
            return Value::Float(f.clamp(f64::MIN, f64::MAX));
        }
    }

    Value::Text(cleaned.to_string())
}

/// Coerce an already-decoded JSON value. Strings go through [`coerce`]; typed scalars
/// pass through. `null` carries no value and yields `None`. Arrays and objects have no
/// scalar form and are kept as their compact JSON text.
pub fn coerce_json(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        serde_json::Value::String(s) => Some(coerce(s)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Some(Value::Text(value.to_string()))
        }
    }
}

/// Strip one layer of matching `"` or `'` quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            if let Some(inner) = s.get(1..s.len() - 1) {
                return inner;
            }
        }
    }
    s
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn is_integer_literal(s: &str) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `digits '.' digits` with an optional sign; either side of the point may be empty
/// but not both.
fn is_decimal_literal(s: &str) -> bool {
    let body = strip_sign(s);
    let Some((int_part, frac_part)) = body.split_once('.') else {
        return false;
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    (!int_part.is_empty() || !frac_part.is_empty()) && all_digits(int_part) && all_digits(frac_part)
}
