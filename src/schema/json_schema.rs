// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON Schema (Draft 7) output describing the JSON projection of a type.

use serde_json::{json, Map, Value};

use super::ast::{FieldType, PrimitiveType, TypeNode, UNBOUNDED};
use super::graph::TypeGraph;
use crate::core::{CodecError, Result};

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Build the schema document for `root`.
///
/// Every named type reachable from `root` gets an entry in `definitions`.
/// Types for which `is_string_type` returns true are described as plain
/// strings, matching their custom string projection.
pub fn json_schema(
    graph: &TypeGraph,
    root: &str,
    is_string_type: impl Fn(&str) -> bool,
) -> Result<Value> {
    let root_def = graph
        .get(root)
        .ok_or_else(|| CodecError::type_not_found(root))?;

    let mut definitions = Map::new();
    for name in graph.reachable_from(&root_def.name) {
        let node = graph.node(name)?;
        let mut schema = if is_string_type(name) {
            json!({ "type": "string" })
        } else {
            node_schema(node)
        };
        let doc = graph.get(name).and_then(|def| def.doc.as_deref());
        if let (Some(doc), Some(obj)) = (doc, schema.as_object_mut()) {
            obj.insert("description".to_string(), Value::String(doc.to_string()));
        }
        definitions.insert(name.to_string(), schema);
    }

    Ok(json!({
        "$schema": DRAFT_07,
        "title": root,
        "$ref": definition_ref(root),
        "definitions": definitions,
    }))
}

fn definition_ref(name: &str) -> String {
    format!("#/definitions/{name}")
}

fn node_schema(node: &TypeNode) -> Value {
    match node {
        TypeNode::Struct { fields } => {
            let mut properties = Map::new();
            for field in fields {
                properties.insert(field.name.clone(), field_schema(&field.field_type));
            }
            let required: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            })
        }
        TypeNode::Enum { members } => {
            let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
            json!({ "type": "string", "enum": names })
        }
        TypeNode::Union { arms, .. } => {
            let one_of: Vec<Value> = arms
                .iter()
                .map(|arm| {
                    let label = arm.label();
                    match &arm.payload {
                        None => json!({ "type": "string", "enum": [label] }),
                        Some(payload) => {
                            let mut properties = Map::new();
                            properties.insert(label.clone(), field_schema(payload));
                            json!({
                                "type": "object",
                                "properties": properties,
                                "required": [label],
                                "additionalProperties": false,
                            })
                        }
                    }
                })
                .collect();
            json!({ "oneOf": one_of })
        }
        TypeNode::Typedef { underlying } => field_schema(underlying),
    }
}

fn field_schema(field_type: &FieldType) -> Value {
    match field_type {
        FieldType::Primitive(PrimitiveType::Bool) => json!({ "type": "boolean" }),
        FieldType::Primitive(PrimitiveType::Int) => json!({
            "type": "integer",
            "minimum": i32::MIN,
            "maximum": i32::MAX,
        }),
        FieldType::Primitive(PrimitiveType::UnsignedInt) => json!({
            "type": "integer",
            "minimum": 0,
            "maximum": u32::MAX,
        }),
        FieldType::Primitive(PrimitiveType::Hyper) => {
            json!({ "type": "string", "pattern": "^-?[0-9]+$" })
        }
        FieldType::Primitive(PrimitiveType::UnsignedHyper) => {
            json!({ "type": "string", "pattern": "^[0-9]+$" })
        }
        FieldType::OpaqueFixed(size) => {
            let chars = u64::from(*size) * 2;
            json!({
                "type": "string",
                "pattern": "^[0-9a-fA-F]*$",
                "minLength": chars,
                "maxLength": chars,
            })
        }
        FieldType::Opaque { max } => {
            let mut schema = json!({ "type": "string", "pattern": "^[0-9a-fA-F]*$" });
            if *max != UNBOUNDED {
                schema["maxLength"] = json!(u64::from(*max) * 2);
            }
            schema
        }
        FieldType::String { max } => {
            let mut schema = json!({ "type": "string" });
            if *max != UNBOUNDED {
                schema["maxLength"] = json!(max);
            }
            schema
        }
        FieldType::Named(name) => json!({ "$ref": definition_ref(name) }),
        FieldType::Array { element, size } => json!({
            "type": "array",
            "items": field_schema(element),
            "minItems": size,
            "maxItems": size,
        }),
        FieldType::VarArray { element, max } => {
            let mut schema = json!({ "type": "array", "items": field_schema(element) });
            if *max != UNBOUNDED {
                schema["maxItems"] = json!(max);
            }
            schema
        }
        FieldType::Optional(inner) => json!({
            "oneOf": [ { "type": "null" }, field_schema(inner) ]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{load_schema_str, LoadOptions, SchemaFormat};

    fn graph() -> TypeGraph {
        load_schema_str(
            r#"{ "types": [
                { "kind": "enum", "name": "Kind",
                  "members": [ { "name": "NONE", "value": 0 }, { "name": "ID", "value": 1 } ] },
                { "kind": "union", "name": "Ref", "discriminant": { "ref": "Kind" },
                  "arms": [ { "cases": ["NONE"] }, { "cases": ["ID"], "type": "unsigned_hyper" } ] },
                { "kind": "struct", "name": "Item", "doc": "An item",
                  "fields": [
                    { "name": "id", "type": { "ref": "Ref" } },
                    { "name": "hash", "type": { "opaque_fixed": 4 } },
                    { "name": "note", "type": { "optional": { "string": { "max": 10 } } } }
                  ] },
                { "kind": "typedef", "name": "Unused", "type": "int" }
            ] }"#,
            SchemaFormat::Json,
            LoadOptions::default(),
        )
        .unwrap()
        .graph
    }

    #[test]
    fn test_document_header() {
        let doc = json_schema(&graph(), "Item", |_| false).unwrap();
        assert_eq!(doc["$schema"], DRAFT_07);
        assert_eq!(doc["title"], "Item");
        assert_eq!(doc["$ref"], "#/definitions/Item");
    }

    #[test]
    fn test_definitions_are_reachable_only() {
        let doc = json_schema(&graph(), "Item", |_| false).unwrap();
        let defs = doc["definitions"].as_object().unwrap();
        assert!(defs.contains_key("Item"));
        assert!(defs.contains_key("Ref"));
        assert!(defs.contains_key("Kind"));
        assert!(!defs.contains_key("Unused"));
        assert_eq!(defs["Item"]["description"], "An item");
    }

    #[test]
    fn test_field_shapes() {
        let doc = json_schema(&graph(), "Item", |_| false).unwrap();
        let item = &doc["definitions"]["Item"]["properties"];
        assert_eq!(item["hash"]["minLength"], 8);
        assert_eq!(item["note"]["oneOf"][0]["type"], "null");
        assert_eq!(item["note"]["oneOf"][1]["maxLength"], 10);

        let union = &doc["definitions"]["Ref"]["oneOf"];
        assert_eq!(union[0]["enum"][0], "NONE");
        assert_eq!(union[1]["required"][0], "ID");
    }

    #[test]
    fn test_string_types_override() {
        let doc = json_schema(&graph(), "Item", |name| name == "Ref").unwrap();
        assert_eq!(doc["definitions"]["Ref"], json!({ "type": "string" }));
    }

    #[test]
    fn test_unknown_root() {
        assert!(json_schema(&graph(), "Nope", |_| false).is_err());
    }
}
