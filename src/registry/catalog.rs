#![allow(clippy::needless_pass_by_value)]

use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::parse::ParameterMap;

use super::{CommandInfo, CommandSet, DeviceKind};

/// A catalog entry: metadata + JSON schema for the params.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub device: DeviceKind,
    pub query: bool,
    pub temperature: bool,
    pub llm_hidden: bool,
    pub param_schema: Value,
}

pub(super) fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

pub(super) fn schema_value<T: schemars::JsonSchema>() -> Value {
    let root = schema_for!(T);
    serde_json::to_value(root).unwrap_or(empty_object_schema())
}

pub(super) fn entry(info: CommandInfo, param_schema: Value) -> CatalogEntry {
    CatalogEntry {
        name: info.name,
        description: info.description,
        device: info.device,
        query: info.query,
        temperature: info.temperature,
        llm_hidden: info.llm_hidden,
        param_schema,
    }
}

/// Decode a parameter map into a typed params struct. Failures name the operation.
pub(super) fn de<T: serde::de::DeserializeOwned>(
    operation: &str,
    params: &ParameterMap,
) -> Result<T, AppError> {
    let object: serde_json::Map<String, Value> = params
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();
    serde_json::from_value(Value::Object(object)).map_err(|e| AppError::InvalidParameters {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

/// The capability catalog of one device set: every operation its controller accepts.
/// Built once from the command table and never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn of<C: CommandSet>() -> Self {
        Self {
            entries: C::catalog_entries(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries the model may call.
    pub fn model_facing(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| !e.llm_hidden)
    }

    /// Whether the model may call `name`. Hidden operations are dispatchable but not
    /// part of this set.
    pub fn allows(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| !e.llm_hidden)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.model_facing().map(|e| e.name).collect()
    }

    /// Tool list in the function-calling shape the generator is prompted with.
    pub fn to_tool_schemas(&self) -> Value {
        Value::Array(
            self.model_facing()
                .map(|e| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": e.name,
                            "description": e.description,
                            "parameters": tool_parameters(&e.param_schema),
                        }
                    })
                })
                .collect(),
        )
    }

    /// Full catalog including hidden entries and flags (REST / CLI listing).
    pub fn to_json_schema(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name,
                        "description": e.description,
                        "device": e.device,
                        "query": e.query,
                        "llm_hidden": e.llm_hidden,
                        "inputSchema": e.param_schema,
                    })
                })
                .collect(),
        )
    }

    /// One line per device with its model-facing operations, for help output.
    pub fn help_text(&self) -> String {
        let mut lines = Vec::new();
        for device in DeviceKind::all() {
            let names: Vec<&str> = self
                .model_facing()
                .filter(|e| e.device == *device)
                .map(|e| e.name)
                .collect();
            if !names.is_empty() {
                lines.push(format!("{} ({}): {}", device.slug(), device.description(), names.join(", ")));
            }
        }
        lines.join("\n")
    }
}

/// Strip schemars metadata down to `{type, properties, required}` with `$ref`s to enum
/// definitions inlined, which is what small function-calling models are trained on.
fn tool_parameters(schema: &Value) -> Value {
    let definitions = schema.get("definitions").and_then(Value::as_object);
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), inline_ref(prop, definitions)))
                .collect::<serde_json::Map<_, _>>()
        })
        .unwrap_or_default();
    let required = schema.get("required").cloned().unwrap_or_else(|| Value::Array(vec![]));

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn inline_ref(prop: &Value, definitions: Option<&serde_json::Map<String, Value>>) -> Value {
    let reference = prop
        .get("$ref")
        .or_else(|| {
            prop.get("allOf")
                .and_then(Value::as_array)
                .and_then(|all| all.first())
                .and_then(|first| first.get("$ref"))
        })
        .and_then(Value::as_str);

    let Some(target) = reference
        .and_then(|r| r.rsplit('/').next())
        .and_then(|name| definitions.and_then(|defs| defs.get(name)))
    else {
        return prop.clone();
    };

    let mut inlined = target.clone();
    if let (Some(obj), Some(desc)) = (inlined.as_object_mut(), prop.get("description")) {
        obj.insert("description".into(), desc.clone());
    }
    inlined
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::registry::{ClimateCommand, HomeCommand};

    #[test]
    fn home_catalog_has_every_operation() {
        let catalog = Catalog::of::<HomeCommand>();
        assert_eq!(catalog.entries().len(), 37);
        assert!(catalog.allows("tv_launch_app"));
        assert!(!catalog.allows("set_temperature"));
    }

    #[test]
    fn hidden_operations_are_not_model_facing() {
        let catalog = Catalog::of::<ClimateCommand>();
        assert!(catalog.get("update_environment").is_some());
        assert!(!catalog.allows("update_environment"));
        assert!(!catalog.names().contains(&"update_environment"));
        assert_eq!(catalog.names().len(), 7);
    }

    #[test]
    fn tool_schemas_inline_enum_vocabulary() {
        let catalog = Catalog::of::<HomeCommand>();
        let tools = catalog.to_tool_schemas();
        let tool = tools
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["function"]["name"] == "vacuum_clean_zone")
            .unwrap();
        let zone = &tool["function"]["parameters"]["properties"]["zone"];
        assert_eq!(zone["enum"], serde_json::json!(["living_room", "bedroom", "kitchen", "bathroom"]));
    }

    #[test]
    fn required_parameters_are_listed() {
        let catalog = Catalog::of::<HomeCommand>();
        let tools = catalog.to_tool_schemas();
        let tool = tools
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["function"]["name"] == "tv_launch_app")
            .unwrap();
        assert_eq!(tool["function"]["parameters"]["required"], serde_json::json!(["app_name"]));
    }

    #[test]
    fn help_groups_by_device() {
        let help = Catalog::of::<HomeCommand>().help_text();
        assert!(help.lines().any(|l| l.starts_with("vacuum") && l.contains("vacuum_pause")));
    }
}
