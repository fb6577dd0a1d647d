//! Type-safe schema generation for schema-constrained generation.
//!
//! Uses the `schemars` crate to derive JSON schemas from Rust types, then
//! reshapes them for each provider's dialect:
//!
//! - OpenAI strict mode wants `additionalProperties: false` on every object,
//!   every property in `required`, and no `$ref`s.
//! - Gemini `responseSchema` is an OpenAPI subset: upper-case type names,
//!   `nullable` instead of `["T", "null"]`, and only a handful of keywords.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use llm_client::{StructuredOutput, StructuredSchema};
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Digest {
//!     /// One-line headline
//!     title: String,
//! }
//!
//! let schema = StructuredSchema::of::<Digest>();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Keywords Gemini's `responseSchema` understands. Everything else is dropped.
const GEMINI_KEYWORDS: &[&str] = &[
    "type",
    "format",
    "description",
    "nullable",
    "enum",
    "properties",
    "required",
    "items",
    "minItems",
    "maxItems",
];

/// Trait for types that can be requested as schema-constrained output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate an OpenAI strict-mode compatible JSON schema for this type.
    fn openai_schema() -> Value {
        let mut value = root_schema::<Self>();

        fix_object_schemas(&mut value);
        inline_refs(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    /// Generate a Gemini `responseSchema` for this type.
    fn gemini_schema() -> Value {
        let mut value = root_schema::<Self>();
        inline_refs(&mut value);
        to_gemini_dialect(&value)
    }

    /// Get the schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// A schema prepared for every supported provider.
///
/// Built once per output type and handed to
/// [`TextGenerator::generate_json`](crate::TextGenerator::generate_json).
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    /// Schema name sent to providers that require one (OpenAI).
    pub name: String,

    /// OpenAI strict-mode schema.
    pub openai: Value,

    /// Gemini response schema.
    pub gemini: Value,
}

impl StructuredSchema {
    /// Build the provider schemas for `T`.
    pub fn of<T: StructuredOutput>() -> Self {
        Self {
            name: schema_name_for(&T::type_name()),
            openai: T::openai_schema(),
            gemini: T::gemini_schema(),
        }
    }
}

fn root_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_default()
}

/// OpenAI schema names must match `^[a-zA-Z0-9_-]{1,64}$`.
fn schema_name_for(type_name: &str) -> String {
    let name: String = type_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(64)
        .collect();
    if name.is_empty() {
        "structured_response".to_string()
    } else {
        name
    }
}

/// Add `additionalProperties: false` and list every property in `required`.
fn fix_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<Value> =
                        props.keys().map(|k| Value::String(k.clone())).collect();
                    map.insert("required".to_string(), Value::Array(all_keys));
                }
            }

            for (_, v) in map.iter_mut() {
                fix_object_schemas(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                fix_object_schemas(item);
            }
        }
        _ => {}
    }
}

/// Replace every `$ref` with the schema it points at.
fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Rewrite a (ref-free) JSON schema into Gemini's OpenAPI subset.
fn to_gemini_dialect(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    let mut out = Map::new();

    for (key, v) in map {
        if !GEMINI_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        match key.as_str() {
            "type" => match v {
                Value::String(t) => {
                    out.insert("type".to_string(), Value::String(t.to_uppercase()));
                }
                // `Option<T>` derives as `["T", "null"]`
                Value::Array(types) => {
                    let mut concrete = types.iter().filter_map(Value::as_str).filter(|t| *t != "null");
                    if let Some(t) = concrete.next() {
                        out.insert("type".to_string(), Value::String(t.to_uppercase()));
                    }
                    if types.iter().any(|t| t.as_str() == Some("null")) {
                        out.insert("nullable".to_string(), Value::Bool(true));
                    }
                }
                _ => {}
            },
            "properties" => {
                if let Value::Object(props) = v {
                    let converted: Map<String, Value> = props
                        .iter()
                        .map(|(name, schema)| (name.clone(), to_gemini_dialect(schema)))
                        .collect();
                    out.insert("properties".to_string(), Value::Object(converted));
                }
            }
            "items" => {
                out.insert("items".to_string(), to_gemini_dialect(v));
            }
            _ => {
                out.insert(key.clone(), v.clone());
            }
        }
    }

    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Digest {
        /// Short headline
        title: String,
        /// A few sentences
        body: String,
        note: Option<String>,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Shelf {
        digests: Vec<Digest>,
    }

    fn required_of(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .expect("required array")
            .iter()
            .filter_map(|v| v.as_str())
            .collect()
    }

    #[test]
    fn test_openai_schema_is_strict() {
        let schema = Digest::openai_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("$schema"));
        assert_eq!(obj.get("additionalProperties"), Some(&Value::Bool(false)));

        let required = required_of(&schema);
        assert!(required.contains(&"title"));
        assert!(required.contains(&"body"));
        // strict mode lists optional fields too
        assert!(required.contains(&"note"));
    }

    #[test]
    fn test_openai_schema_keeps_descriptions() {
        let schema = Digest::openai_schema();
        assert_eq!(schema["properties"]["title"]["description"], "Short headline");
        assert_eq!(schema["properties"]["body"]["type"], "string");
    }

    #[test]
    fn test_nested_struct_inlined() {
        let schema = Shelf::openai_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("definitions"));

        let items = &schema["properties"]["digests"]["items"];
        assert!(items.get("$ref").is_none(), "nested type should be inlined");
        assert_eq!(items["type"], "object");
        assert_eq!(items["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_gemini_schema_dialect() {
        let schema = Digest::gemini_schema();
        let obj = schema.as_object().unwrap();

        assert_eq!(obj.get("type"), Some(&Value::String("OBJECT".into())));
        assert!(!obj.contains_key("$schema"));
        assert!(!obj.contains_key("title"));
        assert!(!obj.contains_key("additionalProperties"));

        assert_eq!(schema["properties"]["title"]["type"], "STRING");
        assert_eq!(schema["properties"]["title"]["description"], "Short headline");
        assert_eq!(schema["properties"]["note"]["type"], "STRING");
        assert_eq!(schema["properties"]["note"]["nullable"], Value::Bool(true));

        // only non-optional fields are required for Gemini
        let required = required_of(&schema);
        assert!(required.contains(&"title"));
        assert!(!required.contains(&"note"));
    }

    #[test]
    fn test_gemini_schema_nested_inlined() {
        let schema = Shelf::gemini_schema();
        assert_eq!(schema["properties"]["digests"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["digests"]["items"]["type"], "OBJECT");
        assert!(schema.get("definitions").is_none());
    }

    #[test]
    fn test_structured_schema_name() {
        let schema = StructuredSchema::of::<Digest>();
        assert_eq!(schema.name, "Digest");
        assert_eq!(schema_name_for("Vec<Digest>"), "Vec_Digest_");
        assert_eq!(schema_name_for(""), "structured_response");
    }
}
