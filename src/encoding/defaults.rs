// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Default value construction for full types.
//!
//! Defaults are zeros, empty containers, absent optionals, the first enum
//! member and the first union arm. Types with a registered
//! [`DefaultProvider`] take their default from it instead.

use std::collections::HashSet;

use crate::core::{CodecError, HookRegistry, Result, XdrValue};
use crate::schema::{FieldType, PrimitiveType, TypeGraph, TypeNode};

use super::xdr::Limits;

/// Custom default for a type.
pub trait DefaultProvider: Send + Sync {
    /// Produce the default value.
    fn default_value(&self) -> XdrValue;
}

impl<F> DefaultProvider for F
where
    F: Fn() -> XdrValue + Send + Sync,
{
    fn default_value(&self) -> XdrValue {
        self()
    }
}

/// Builds default values by walking the type graph.
pub struct DefaultBuilder<'g> {
    graph: &'g TypeGraph,
    providers: &'g HookRegistry<dyn DefaultProvider>,
    in_progress: HashSet<&'g str>,
    /// Bytes of fixed opaque data still allowed
    budget: usize,
}

impl<'g> DefaultBuilder<'g> {
    /// Create a builder using `providers` for custom defaults.
    pub fn new(graph: &'g TypeGraph, providers: &'g HookRegistry<dyn DefaultProvider>) -> Self {
        Self {
            graph,
            providers,
            in_progress: HashSet::new(),
            budget: usize::MAX,
        }
    }

    /// Charge fixed opaque data, arrays of it included, against `limits.len`.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.budget = limits.len;
        self
    }

    fn charge(&mut self, bytes: usize) -> Result<()> {
        self.budget = self
            .budget
            .checked_sub(bytes)
            .ok_or(CodecError::LengthLimitExceeded)?;
        Ok(())
    }

    /// Default value of the named type.
    ///
    /// A type whose default would have to contain itself (through fields
    /// that are neither optional nor variable-length) has no finite default
    /// and fails with `UnsupportedFeature`.
    pub fn default_named(&mut self, name: &str) -> Result<XdrValue> {
        let def = self
            .graph
            .get(name)
            .ok_or_else(|| CodecError::type_not_found(name))?;
        if let Some(provider) = self.providers.get(name) {
            return Ok(provider.default_value());
        }
        let name: &'g str = &def.name;
        if !self.in_progress.insert(name) {
            return Err(CodecError::unsupported(format!(
                "'{name}' has no finite default value"
            )));
        }
        let result = self.default_node(&def.node);
        self.in_progress.remove(name);
        result
    }

    fn default_node(&mut self, node: &'g TypeNode) -> Result<XdrValue> {
        match node {
            TypeNode::Struct { fields } => fields
                .iter()
                .map(|f| Ok((f.name.clone(), self.default_field(&f.field_type)?)))
                .collect::<Result<Vec<_>>>()
                .map(XdrValue::Struct),
            TypeNode::Enum { members } => members
                .first()
                .map(|m| XdrValue::Enum {
                    name: m.name.clone(),
                    value: m.value,
                })
                .ok_or_else(|| CodecError::unsupported("default of an enum with no members")),
            TypeNode::Union { arms, .. } => {
                let arm = arms
                    .first()
                    .ok_or_else(|| CodecError::unsupported("default of a union with no arms"))?;
                let payload = match &arm.payload {
                    Some(field_type) => Some(Box::new(self.default_field(field_type)?)),
                    None => None,
                };
                Ok(XdrValue::Union {
                    case: arm.label(),
                    discriminant: arm.value,
                    payload,
                })
            }
            TypeNode::Typedef { underlying } => self.default_field(underlying),
        }
    }

    /// Default value of an inline field type.
    pub fn default_field(&mut self, field_type: &'g FieldType) -> Result<XdrValue> {
        Ok(match field_type {
            FieldType::Primitive(PrimitiveType::Bool) => XdrValue::Bool(false),
            FieldType::Primitive(PrimitiveType::Int) => XdrValue::Int(0),
            FieldType::Primitive(PrimitiveType::UnsignedInt) => XdrValue::UInt(0),
            FieldType::Primitive(PrimitiveType::Hyper) => XdrValue::Hyper(0),
            FieldType::Primitive(PrimitiveType::UnsignedHyper) => XdrValue::UHyper(0),
            FieldType::OpaqueFixed(size) => {
                self.charge(*size as usize)?;
                XdrValue::Opaque(vec![0; *size as usize])
            }
            FieldType::Opaque { .. } => XdrValue::Opaque(Vec::new()),
            FieldType::String { .. } => XdrValue::String(String::new()),
            FieldType::Named(name) => self.default_named(name)?,
            FieldType::Array { element, size } => {
                let before = self.budget;
                let item = self.default_field(element)?;
                let per_item = before - self.budget;
                self.budget = before;
                self.charge(per_item.saturating_mul(*size as usize))?;
                XdrValue::Array(vec![item; *size as usize])
            }
            FieldType::VarArray { .. } => XdrValue::Array(Vec::new()),
            FieldType::Optional(_) => XdrValue::Optional(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{load_schema_str, LoadOptions, SchemaFormat};
    use std::sync::Arc;

    fn graph() -> TypeGraph {
        load_schema_str(
            r#"{ "types": [
                { "kind": "enum", "name": "Level",
                  "members": [ { "name": "LOW", "value": 3 }, { "name": "HIGH", "value": 4 } ] },
                { "kind": "union", "name": "Opt", "discriminant": "bool",
                  "arms": [ { "cases": ["FALSE"] }, { "cases": ["TRUE"], "type": "hyper" } ] },
                { "kind": "struct", "name": "Config",
                  "fields": [
                    { "name": "level", "type": { "ref": "Level" } },
                    { "name": "key", "type": { "opaque_fixed": 2 } },
                    { "name": "pair", "type": { "array": { "element": "int", "size": 2 } } },
                    { "name": "opt", "type": { "ref": "Opt" } },
                    { "name": "parent", "type": { "optional": { "ref": "Config" } } }
                  ] },
                { "kind": "struct", "name": "Loop",
                  "fields": [ { "name": "inner", "type": { "ref": "Loop" } } ] }
            ] }"#,
            SchemaFormat::Json,
            LoadOptions::default(),
        )
        .unwrap()
        .graph
    }

    #[test]
    fn test_struct_default() {
        let graph = graph();
        let providers = HookRegistry::new();
        let value = DefaultBuilder::new(&graph, &providers)
            .default_named("Config")
            .unwrap();
        assert_eq!(
            value.field("level"),
            Some(&XdrValue::Enum {
                name: "LOW".into(),
                value: 3
            })
        );
        assert_eq!(value.field("key"), Some(&XdrValue::Opaque(vec![0, 0])));
        assert_eq!(
            value.field("pair"),
            Some(&XdrValue::Array(vec![XdrValue::Int(0), XdrValue::Int(0)]))
        );
        assert_eq!(value.field("opt").unwrap().union_case(), Some("FALSE"));
        assert!(value.field("parent").unwrap().is_none());
    }

    #[test]
    fn test_self_containing_type_has_no_default() {
        let graph = graph();
        let providers = HookRegistry::new();
        let err = DefaultBuilder::new(&graph, &providers)
            .default_named("Loop")
            .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_fixed_opaque_charged_against_len_limit() {
        let graph = load_schema_str(
            r#"{ "types": [
                { "kind": "typedef", "name": "Huge", "type": { "opaque_fixed": 4294967295 } },
                { "kind": "typedef", "name": "Keys",
                  "type": { "array": { "element": { "opaque_fixed": 8 }, "size": 200 } } }
            ] }"#,
            SchemaFormat::Json,
            LoadOptions::default(),
        )
        .unwrap()
        .graph;
        let providers = HookRegistry::new();
        for name in ["Huge", "Keys"] {
            let err = DefaultBuilder::new(&graph, &providers)
                .with_limits(Limits::len(1024))
                .default_named(name)
                .unwrap_err();
            assert_eq!(err, CodecError::LengthLimitExceeded, "{name}");
        }
        let keys = DefaultBuilder::new(&graph, &providers)
            .with_limits(Limits::len(1600))
            .default_named("Keys")
            .unwrap();
        assert_eq!(keys.as_array().map(|items| items.len()), Some(200));
    }

    #[test]
    fn test_custom_provider_wins() {
        let graph = graph();
        let providers: HookRegistry<dyn DefaultProvider> = HookRegistry::new();
        providers.register(
            "Level",
            Arc::new(|| XdrValue::Enum {
                name: "HIGH".into(),
                value: 4,
            }),
        );
        let value = DefaultBuilder::new(&graph, &providers)
            .default_named("Config")
            .unwrap();
        assert_eq!(value.field("level").unwrap().as_str(), Some("HIGH"));
    }
}
