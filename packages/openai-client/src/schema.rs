//! Strict JSON schemas for `json_schema` structured outputs.
//!
//! OpenAI strict mode wants every object closed (`additionalProperties: false`),
//! every property listed in `required`, and no `$ref` indirection. `schemars`
//! emits none of that by default, so [`StructuredOutput::strict_schema`]
//! rewrites its output.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types usable as a structured-output target.
///
/// Blanket-implemented for everything that is `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Strict-mode schema for this type.
    fn strict_schema() -> Value {
        let mut root = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = match &mut root {
            Value::Object(map) => {
                map.remove("$schema");
                map.remove("definitions")
            }
            _ => None,
        };

        if let Some(defs) = definitions {
            resolve_refs(&mut root, &defs);
        }
        close_objects(&mut root);
        root
    }

    /// Name used for the `json_schema.name` field.
    fn schema_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                let required = required_keys(map);
                map.insert("additionalProperties".into(), Value::Bool(false));
                map.insert("required".into(), Value::Array(required));
            }
            map.values_mut().for_each(close_objects);
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn required_keys(map: &Map<String, Value>) -> Vec<Value> {
    map.get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().map(Value::String).collect())
        .unwrap_or_default()
}

fn resolve_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut inlined) = target {
                resolve_refs(&mut inlined, definitions);
                *value = inlined;
                return;
            }
            map.values_mut()
                .for_each(|v| resolve_refs(v, definitions));
        }
        Value::Array(items) => items.iter_mut().for_each(|v| resolve_refs(v, definitions)),
        _ => {}
    }
}
