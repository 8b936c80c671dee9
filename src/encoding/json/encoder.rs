// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR value to JSON.

use serde_json::{Map, Value};

use super::StrRepr;
use crate::core::{CodecError, HookRegistry, Result as CoreResult, XdrValue};
use crate::schema::{FieldType, TypeGraph, TypeNode};

/// Type-guided JSON encoder.
///
/// Walks the type alongside the value so that named types with a custom
/// string representation are rendered through it, at any depth.
pub struct JsonEncoder<'g> {
    graph: &'g TypeGraph,
    string_reprs: &'g HookRegistry<dyn StrRepr>,
}

impl<'g> JsonEncoder<'g> {
    /// Create an encoder.
    pub fn new(graph: &'g TypeGraph, string_reprs: &'g HookRegistry<dyn StrRepr>) -> Self {
        Self {
            graph,
            string_reprs,
        }
    }

    /// Project a value of the named type.
    pub fn named_to_json(&self, name: &str, value: &XdrValue) -> CoreResult<Value> {
        if let Some(repr) = self.string_reprs.get(name) {
            return Ok(Value::String(repr.to_str(value)?));
        }
        match (self.graph.node(name)?, value) {
            (TypeNode::Struct { fields }, XdrValue::Struct(_)) => {
                let mut object = Map::new();
                for field in fields {
                    let member = value.field(&field.name).ok_or_else(|| {
                        CodecError::json(format!("missing field '{}' of '{name}'", field.name))
                    })?;
                    object.insert(
                        field.name.clone(),
                        self.field_to_json(&field.field_type, member)?,
                    );
                }
                Ok(Value::Object(object))
            }
            (TypeNode::Union { arms, .. }, XdrValue::Union { case, payload, .. }) => {
                let arm = arms
                    .iter()
                    .find(|a| &a.label() == case)
                    .ok_or_else(|| CodecError::json(format!("'{case}' is not a case of '{name}'")))?;
                match (&arm.payload, payload) {
                    (Some(field_type), Some(inner)) => {
                        let mut object = Map::new();
                        object.insert(case.clone(), self.field_to_json(field_type, inner)?);
                        Ok(Value::Object(object))
                    }
                    _ => Ok(Value::String(case.clone())),
                }
            }
            (TypeNode::Typedef { underlying }, value) => self.field_to_json(underlying, value),
            (_, value) => Ok(value_to_json(value)),
        }
    }

    /// Project a value of an inline field type.
    pub fn field_to_json(&self, field_type: &FieldType, value: &XdrValue) -> CoreResult<Value> {
        match (field_type, value) {
            (FieldType::Named(name), value) => self.named_to_json(name, value),
            (FieldType::Array { element, .. } | FieldType::VarArray { element, .. }, XdrValue::Array(items)) => {
                items
                    .iter()
                    .map(|item| self.field_to_json(element, item))
                    .collect::<CoreResult<Vec<_>>>()
                    .map(Value::Array)
            }
            (FieldType::Optional(inner), XdrValue::Optional(present)) => match present {
                Some(item) => self.field_to_json(inner, item),
                None => Ok(Value::Null),
            },
            (_, value) => Ok(value_to_json(value)),
        }
    }
}

/// Project a value without type guidance.
///
/// Used for sparse values, whose retained members are self-describing.
pub fn value_to_json(value: &XdrValue) -> Value {
    match value {
        XdrValue::Bool(v) => Value::Bool(*v),
        XdrValue::Int(v) => Value::from(*v),
        XdrValue::UInt(v) => Value::from(*v),
        XdrValue::Hyper(v) => Value::String(v.to_string()),
        XdrValue::UHyper(v) => Value::String(v.to_string()),
        XdrValue::Opaque(bytes) => Value::String(hex::encode(bytes)),
        XdrValue::String(text) => Value::String(text.clone()),
        XdrValue::Enum { name, .. } => Value::String(name.clone()),
        XdrValue::Struct(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), value_to_json(v)))
                .collect(),
        ),
        XdrValue::Union { case, payload, .. } => match payload {
            Some(inner) => {
                let mut object = Map::new();
                object.insert(case.clone(), value_to_json(inner));
                Value::Object(object)
            }
            None => Value::String(case.clone()),
        },
        XdrValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
        XdrValue::Optional(None) => Value::Null,
        XdrValue::Optional(Some(inner)) => value_to_json(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_json_scalars() {
        assert_eq!(value_to_json(&XdrValue::Bool(true)), json!(true));
        assert_eq!(value_to_json(&XdrValue::Int(-3)), json!(-3));
        assert_eq!(value_to_json(&XdrValue::Hyper(-3)), json!("-3"));
        assert_eq!(
            value_to_json(&XdrValue::UHyper(u64::MAX)),
            json!("18446744073709551615")
        );
        assert_eq!(
            value_to_json(&XdrValue::Opaque(vec![0xde, 0xad])),
            json!("dead")
        );
        assert_eq!(value_to_json(&XdrValue::Optional(None)), json!(null));
    }

    #[test]
    fn test_value_to_json_union_and_struct_order() {
        let value = XdrValue::Struct(vec![
            ("zeta".into(), XdrValue::Int(1)),
            (
                "alpha".into(),
                XdrValue::Union {
                    case: "SOME".into(),
                    discriminant: 1,
                    payload: Some(Box::new(XdrValue::UInt(2))),
                },
            ),
            (
                "void".into(),
                XdrValue::Union {
                    case: "NONE".into(),
                    discriminant: 0,
                    payload: None,
                },
            ),
        ]);
        let json = value_to_json(&value);
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "void"]);
        assert_eq!(json["alpha"], json!({ "SOME": 2 }));
        assert_eq!(json["void"], json!("NONE"));
    }
}
