//! Parameter block parsing: the text between a call's braces (or parens) becomes a
//! name → [`Value`] map.
//!
//! Three formats are tried in order and the cascade never fails:
//! 1. escape-wrapped `name:<escape>value<escape>` pairs (whenever the marker is present),
//! 2. a JSON object, auto-wrapped in `{}` when the braces were stripped,
//! 3. naive `name: value, name: value` splitting.

use std::sync::LazyLock;

use regex::Regex;

use crate::value::{coerce, coerce_json};

use super::ParameterMap;

/// Delimiter the generator wraps literal parameter values in.
pub const ESCAPE_MARKER: &str = "<escape>";

#[allow(clippy::expect_used)] // literal pattern
static ESCAPED_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+):<escape>([^<]*)<escape>").expect("escaped parameter pattern compiles")
});

/// Parse one parameter block. Empty or whitespace-only input yields an empty map.
pub fn parse_parameters(raw: &str) -> ParameterMap {
    let text = raw.trim();
    if text.is_empty() {
        return ParameterMap::new();
    }

    if text.contains(ESCAPE_MARKER) {
        return parse_escaped(text);
    }

    if let Some(params) = parse_json_object(text) {
        return params;
    }

    parse_naive(text)
}

/// Coerce every entry of an already-decoded JSON object. `null` entries are dropped.
pub fn params_from_json(object: &serde_json::Map<String, serde_json::Value>) -> ParameterMap {
    object
        .iter()
        .filter_map(|(key, value)| coerce_json(value).map(|v| (key.clone(), v)))
        .collect()
}

fn parse_escaped(text: &str) -> ParameterMap {
    ESCAPED_PARAM_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            Some((name.to_string(), coerce(value)))
        })
        .collect()
}

fn parse_json_object(text: &str) -> Option<ParameterMap> {
    let wrapped;
    let json_text = if text.starts_with('{') && text.ends_with('}') {
        text
    } else {
        wrapped = format!("{{{text}}}");
        &wrapped
    };

    match serde_json::from_str::<serde_json::Value>(json_text) {
        Ok(serde_json::Value::Object(object)) => Some(params_from_json(&object)),
        _ => None,
    }
}

fn parse_naive(text: &str) -> ParameterMap {
    text.split(',')
        .filter_map(|chunk| {
            let (name, value) = chunk.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), coerce(value)))
        })
        .collect()
}
