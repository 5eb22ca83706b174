//! JSON-shaped function calls, e.g. OpenAI-style
//! `{"function": {"name": "...", "arguments": "{\"volume\": 150}"}}`.

use serde_json::{Map, Value as Json};

use super::params::params_from_json;
use super::FunctionCall;

/// Decode `text` as one JSON function-call object. Returns `None` when the text is not a
/// JSON object or carries no usable name.
pub fn parse_json_call(text: &str) -> Option<FunctionCall> {
    let payload: Json = serde_json::from_str(text).ok()?;
    call_from_json(&payload)
}

/// Read a function call out of a decoded JSON payload.
///
/// A `function_call` wrapper is descended into first. A nested `function` object holds
/// `name` and `arguments`/`parameters`; otherwise `name`/`function_name` and
/// `arguments`/`parameters` are read from the top level. String-encoded arguments are
/// decoded once more; anything that is not an object becomes an empty map.
pub fn call_from_json(payload: &Json) -> Option<FunctionCall> {
    let mut object = payload.as_object()?;

    if let Some(inner) = object.get("function_call").and_then(Json::as_object) {
        object = inner;
    }

    let (name, arguments) = match object.get("function").and_then(Json::as_object) {
        Some(function) => (string_field(function, &["name"]), arguments_field(function)),
        None => (
            string_field(object, &["name", "function_name"]),
            arguments_field(object),
        ),
    };

    let name = name?;
    let arguments = decode_arguments(arguments);

    Some(FunctionCall::new(name, params_from_json(&arguments)))
}

/// First non-empty string among `keys`.
fn string_field(object: &Map<String, Json>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Json::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// `arguments` takes precedence over `parameters` whenever the key is present.
fn arguments_field(object: &Map<String, Json>) -> Option<&Json> {
    object.get("arguments").or_else(|| object.get("parameters"))
}

fn decode_arguments(arguments: Option<&Json>) -> Map<String, Json> {
    match arguments {
        Some(Json::Object(map)) => map.clone(),
        Some(Json::String(encoded)) => match serde_json::from_str::<Json>(encoded) {
            Ok(Json::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn nested_function_with_string_arguments() {
        let call =
            parse_json_call(r#"{"function":{"name":"tv_set_volume","arguments":"{\"volume\": 150}"}}"#)
                .unwrap();
        assert_eq!(call.name, "tv_set_volume");
        assert_eq!(call.parameters.get("volume"), Some(&Value::Integer(150)));
    }

    #[test]
    fn function_call_wrapper_is_descended() {
        let call = parse_json_call(
            r#"{"function_call":{"name":"set_mode","arguments":{"mode":"heating"}}}"#,
        )
        .unwrap();
        assert_eq!(call.name, "set_mode");
        assert_eq!(call.parameters.get("mode"), Some(&Value::Text("heating".into())));
    }

    #[test]
    fn top_level_function_name_and_parameters() {
        let call = parse_json_call(
            r#"{"function_name":"light_set_brightness","parameters":{"brightness":"70"}}"#,
        )
        .unwrap();
        assert_eq!(call.name, "light_set_brightness");
        assert_eq!(call.parameters.get("brightness"), Some(&Value::Integer(70)));
    }

    #[test]
    fn bad_arguments_become_empty() {
        let call = parse_json_call(r#"{"name":"power_on","arguments":"not json"}"#).unwrap();
        assert!(call.parameters.is_empty());
        let call = parse_json_call(r#"{"name":"power_on","arguments":[1,2]}"#).unwrap();
        assert!(call.parameters.is_empty());
        let call = parse_json_call(r#"{"name":"power_on","arguments":null,"parameters":{"x":1}}"#)
            .unwrap();
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn missing_name_is_no_call() {
        assert!(parse_json_call(r#"{"arguments":{"volume":3}}"#).is_none());
        assert!(parse_json_call(r#"{"name":"","arguments":{}}"#).is_none());
        assert!(parse_json_call("[1,2,3]").is_none());
        assert!(parse_json_call("{not json").is_none());
    }
}
