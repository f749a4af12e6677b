//! OpenAPI schema fragments generated from the descriptor registry.
//!
//! `describe` renders one type id recursively; repeated types inside a
//! single fragment collapse to a `$ref` on their wire type name so
//! cyclic tables cannot recurse forever.

use crate::descriptor::{FieldKind, Model, OpenApiType};
use crate::error::ParseError;
use crate::registry;
use crate::TypeId;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

pub fn describe(type_id: TypeId) -> Result<Value, ParseError> {
    let mut in_progress = HashSet::new();
    describe_inner(type_id, &mut in_progress)
}

fn base_schema(openapi: OpenApiType) -> Value {
    match openapi {
        OpenApiType::Invalid => json!({}),
        OpenApiType::Object => json!({"type": "object"}),
        OpenApiType::Array => json!({"type": "array"}),
        OpenApiType::String => json!({"type": "string"}),
        OpenApiType::Int32 => json!({"type": "integer", "format": "int32"}),
        OpenApiType::Int64 => json!({"type": "integer", "format": "int64"}),
        OpenApiType::Double => json!({"type": "number", "format": "double"}),
        OpenApiType::Bool => json!({"type": "boolean"}),
        OpenApiType::Number => json!({"type": "number"}),
    }
}

fn describe_inner(type_id: TypeId, in_progress: &mut HashSet<TypeId>) -> Result<Value, ParseError> {
    let desc = registry::find(type_id)?;
    if !in_progress.insert(type_id) {
        return Ok(json!({ "$ref": desc.type_name }));
    }

    let mut schema = base_schema(desc.openapi);
    if !desc.description.is_empty() {
        schema["description"] = Value::String(desc.description.to_string());
    }

    match desc.model {
        Model::Simple | Model::Complex => {
            // Tri-state numerics expose the canonical object layout.
            if desc.openapi == OpenApiType::Object && desc.type_name.ends_with("_NO_VAL") {
                schema["properties"] = json!({
                    "set": {"type": "boolean"},
                    "infinite": {"type": "boolean"},
                    "number": {"type": "number"},
                });
            }
        }
        Model::Composite { fields } => {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for field in fields {
                match field.kind {
                    FieldKind::Skip => {}
                    FieldKind::Removed { since } => {
                        properties.insert(
                            field.key.to_string(),
                            json!({
                                "deprecated": true,
                                "description": format!("removed in {since}; accepted and ignored"),
                            }),
                        );
                    }
                    FieldKind::Linked { type_id: child } => {
                        let mut child_schema = describe_inner(child, in_progress)?;
                        if field.deprecated.is_some() {
                            child_schema["deprecated"] = Value::Bool(true);
                        }
                        if !field.description.is_empty() {
                            child_schema["description"] =
                                Value::String(field.description.to_string());
                        }
                        properties.insert(field.key.to_string(), child_schema);
                        if field.required {
                            required.push(Value::String(field.key.to_string()));
                        }
                    }
                }
            }
            schema["properties"] = Value::Object(properties);
            if !required.is_empty() {
                schema["required"] = Value::Array(required);
            }
        }
        Model::FlagArray {
            bits, single_flag, ..
        } => {
            let names: Vec<Value> = bits
                .iter()
                .filter(|b| !b.hidden)
                .map(|b| Value::String(b.name.to_string()))
                .collect();
            if single_flag {
                schema["enum"] = Value::Array(names);
            } else {
                schema["items"] = json!({"type": "string", "enum": names});
            }
        }
        Model::List { element } | Model::NtArray { element } | Model::NtPtrArray { element } => {
            schema["items"] = describe_inner(element, in_progress)?;
        }
        Model::Ptr { target, allow_null } => {
            let mut target_schema = describe_inner(target, in_progress)?;
            if allow_null {
                target_schema["nullable"] = Value::Bool(true);
            }
            if !desc.description.is_empty() {
                target_schema["description"] = Value::String(desc.description.to_string());
            }
            schema = target_schema;
        }
    }

    in_progress.remove(&type_id);
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_schema() {
        assert_eq!(
            describe(TypeId::UInt16).unwrap(),
            json!({"type": "integer", "format": "int32"})
        );
        assert_eq!(describe(TypeId::Bool).unwrap(), json!({"type": "boolean"}));
    }

    #[test]
    fn test_tri_state_schema_has_canonical_properties() {
        let schema = describe(TypeId::UInt32NoVal).unwrap();
        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["properties"]["infinite"], json!({"type": "boolean"}));
    }

    #[test]
    fn test_flag_array_schema() {
        let schema = describe(TypeId::NodeStates).unwrap();
        assert_eq!(schema["type"], json!("array"));
        let tokens = schema["items"]["enum"].as_array().unwrap();
        assert!(tokens.contains(&json!("MIXED")));
        assert!(tokens.contains(&json!("PERFCTRS")));
        // Hidden entries stay out of the schema.
        assert!(!tokens.contains(&json!("CLOUD")));
    }

    #[test]
    fn test_single_flag_schema_is_string_enum() {
        let schema = describe(TypeId::JobShared).unwrap();
        assert_eq!(schema["type"], json!("string"));
        assert!(schema["enum"].as_array().unwrap().contains(&json!("mcs")));
    }

    #[test]
    fn test_composite_schema() {
        let schema = describe(TypeId::JobDescription).unwrap();
        assert_eq!(schema["type"], json!("object"));
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("nice"));
        assert!(props.contains_key("required"));
        // Removed fields document themselves as deprecated.
        assert_eq!(props["power_flags"]["deprecated"], json!(true));
        // Nested projection carries the overloaded memory keys.
        assert!(props["required"]["properties"]
            .as_object()
            .unwrap()
            .contains_key("memory_per_cpu"));
    }

    #[test]
    fn test_required_fields_listed() {
        let schema = describe(TypeId::Qos).unwrap();
        assert_eq!(schema["required"], json!(["name"]));
    }

    #[test]
    fn test_list_and_ptr_schema() {
        let schema = describe(TypeId::QosList).unwrap();
        assert_eq!(schema["type"], json!("array"));
        assert_eq!(schema["items"]["type"], json!("object"));

        let ptr = describe(TypeId::AssocShortPtr).unwrap();
        assert_eq!(ptr["nullable"], json!(true));
    }

    #[test]
    fn test_invalid_rejected() {
        assert!(describe(TypeId::Invalid).is_err());
    }
}
