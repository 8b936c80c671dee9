// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON to XDR value.
//!
//! Parsing is strict: unknown struct keys, missing fields, out-of-range
//! integers and undeclared enum members are all rejected. Length bounds are
//! left to the XDR encoder.

use serde_json::{Map, Value};

use super::StrRepr;
use crate::core::{CodecError, HookRegistry, Result as CoreResult, XdrValue};
use crate::schema::{FieldType, PrimitiveType, TypeGraph, TypeNode};

/// Type-guided JSON decoder.
pub struct JsonDecoder<'g> {
    graph: &'g TypeGraph,
    string_reprs: &'g HookRegistry<dyn StrRepr>,
}

impl<'g> JsonDecoder<'g> {
    /// Create a decoder.
    pub fn new(graph: &'g TypeGraph, string_reprs: &'g HookRegistry<dyn StrRepr>) -> Self {
        Self {
            graph,
            string_reprs,
        }
    }

    /// Parse a value of the named type.
    pub fn named_from_json(&self, name: &str, json: &Value) -> CoreResult<XdrValue> {
        if let Some(repr) = self.string_reprs.get(name) {
            let text = json
                .as_str()
                .ok_or_else(|| CodecError::json(format!("'{name}' expects a string")))?;
            return repr.from_str(text);
        }
        match self.graph.node(name)? {
            TypeNode::Struct { fields } => {
                let object = expect_object(name, json)?;
                if let Some(unknown) = object
                    .keys()
                    .find(|k| !fields.iter().any(|f| &f.name == *k))
                {
                    return Err(CodecError::json(format!(
                        "unknown field '{unknown}' in '{name}'"
                    )));
                }
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    let member = object.get(&field.name).ok_or_else(|| {
                        CodecError::json(format!("missing field '{}' in '{name}'", field.name))
                    })?;
                    values.push((
                        field.name.clone(),
                        self.field_from_json(&field.field_type, member)?,
                    ));
                }
                Ok(XdrValue::Struct(values))
            }
            TypeNode::Enum { members } => {
                let label = json
                    .as_str()
                    .ok_or_else(|| CodecError::json(format!("'{name}' expects a member name")))?;
                members
                    .iter()
                    .find(|m| m.name == label)
                    .map(|m| XdrValue::Enum {
                        name: m.name.clone(),
                        value: m.value,
                    })
                    .ok_or_else(|| {
                        CodecError::json(format!("'{label}' is not a member of '{name}'"))
                    })
            }
            TypeNode::Union { arms, .. } => {
                let (label, inner) = match json {
                    Value::String(label) => (label.as_str(), None),
                    Value::Object(object) if object.len() == 1 => {
                        let (label, inner) = object
                            .iter()
                            .next()
                            .ok_or_else(|| CodecError::json("empty union object"))?;
                        (label.as_str(), Some(inner))
                    }
                    _ => {
                        return Err(CodecError::json(format!(
                            "'{name}' expects a case label or a single-key object"
                        )))
                    }
                };
                let arm = arms
                    .iter()
                    .find(|a| a.label() == label)
                    .ok_or_else(|| CodecError::json(format!("'{label}' is not a case of '{name}'")))?;
                let payload = match (&arm.payload, inner) {
                    (Some(field_type), Some(inner)) => {
                        Some(Box::new(self.field_from_json(field_type, inner)?))
                    }
                    (None, None) => None,
                    (Some(_), None) => {
                        return Err(CodecError::json(format!("case '{label}' needs a payload")))
                    }
                    (None, Some(_)) => {
                        return Err(CodecError::json(format!("case '{label}' has no payload")))
                    }
                };
                Ok(XdrValue::Union {
                    case: arm.label(),
                    discriminant: arm.value,
                    payload,
                })
            }
            TypeNode::Typedef { underlying } => self.field_from_json(underlying, json),
        }
    }

    /// Parse a value of an inline field type.
    pub fn field_from_json(&self, field_type: &FieldType, json: &Value) -> CoreResult<XdrValue> {
        match field_type {
            FieldType::Primitive(p) => primitive_from_json(*p, json),
            FieldType::OpaqueFixed(size) => {
                let bytes = hex_from_json(json)?;
                if bytes.len() != *size as usize {
                    return Err(CodecError::invalid_hex(json.as_str().unwrap_or_default()));
                }
                Ok(XdrValue::Opaque(bytes))
            }
            FieldType::Opaque { .. } => hex_from_json(json).map(XdrValue::Opaque),
            FieldType::String { .. } => json
                .as_str()
                .map(|s| XdrValue::String(s.to_string()))
                .ok_or_else(|| CodecError::json("expected a string")),
            FieldType::Named(name) => self.named_from_json(name, json),
            FieldType::Array { element, size } => {
                let items = expect_array(json)?;
                if items.len() != *size as usize {
                    return Err(CodecError::json(format!(
                        "expected {size} elements, found {}",
                        items.len()
                    )));
                }
                self.items_from_json(element, items)
            }
            FieldType::VarArray { element, .. } => {
                self.items_from_json(element, expect_array(json)?)
            }
            FieldType::Optional(inner) => match json {
                Value::Null => Ok(XdrValue::Optional(None)),
                other => Ok(XdrValue::Optional(Some(Box::new(
                    self.field_from_json(inner, other)?,
                )))),
            },
        }
    }

    fn items_from_json(&self, element: &FieldType, items: &[Value]) -> CoreResult<XdrValue> {
        items
            .iter()
            .map(|item| self.field_from_json(element, item))
            .collect::<CoreResult<Vec<_>>>()
            .map(XdrValue::Array)
    }
}

fn expect_object<'v>(name: &str, json: &'v Value) -> CoreResult<&'v Map<String, Value>> {
    json.as_object()
        .ok_or_else(|| CodecError::json(format!("'{name}' expects an object")))
}

fn expect_array(json: &Value) -> CoreResult<&[Value]> {
    json.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| CodecError::json("expected an array"))
}

fn hex_from_json(json: &Value) -> CoreResult<Vec<u8>> {
    let text = json
        .as_str()
        .ok_or_else(|| CodecError::json("expected a hex string"))?;
    hex::decode(text).map_err(|_| CodecError::invalid_hex(text))
}

/// Parse a 64-bit integer given as a JSON number or a decimal string.
fn wide_from_json<T: std::str::FromStr>(json: &Value, from_number: Option<T>) -> CoreResult<T> {
    match json {
        Value::Number(_) => from_number.ok_or_else(|| CodecError::json(format!("{json} is out of range"))),
        Value::String(text) => text
            .parse()
            .map_err(|_| CodecError::json(format!("'{text}' is not an integer"))),
        _ => Err(CodecError::json("expected an integer")),
    }
}

fn primitive_from_json(primitive: PrimitiveType, json: &Value) -> CoreResult<XdrValue> {
    let out_of_range = || CodecError::json(format!("{json} is not a valid {}", primitive.as_str()));
    match primitive {
        PrimitiveType::Bool => json.as_bool().map(XdrValue::Bool).ok_or_else(out_of_range),
        PrimitiveType::Int => json
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(XdrValue::Int)
            .ok_or_else(out_of_range),
        PrimitiveType::UnsignedInt => json
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(XdrValue::UInt)
            .ok_or_else(out_of_range),
        PrimitiveType::Hyper => wide_from_json(json, json.as_i64()).map(XdrValue::Hyper),
        PrimitiveType::UnsignedHyper => wide_from_json(json, json.as_u64()).map(XdrValue::UHyper),
    }
}
