// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema document loader.
//!
//! Reads the already-parsed type graph produced by the IDL front-end from a
//! JSON or TOML document and turns it into a validated [`TypeGraph`].
//!
//! Document shape:
//!
//! ```json
//! {
//!   "consts": { "MAX_SIGNERS": 20 },
//!   "types": [
//!     { "kind": "typedef", "name": "Hash", "type": { "opaque_fixed": 32 } },
//!     { "kind": "enum", "name": "MemoType",
//!       "members": [ { "name": "MEMO_NONE", "value": 0 } ] },
//!     { "kind": "struct", "name": "Signer",
//!       "fields": [ { "name": "key", "type": { "ref": "Hash" } } ] },
//!     { "kind": "union", "name": "Memo", "discriminant": { "ref": "MemoType" },
//!       "arms": [ { "cases": ["MEMO_NONE"] } ] }
//!   ]
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::warn;

use super::ast::{
    CaseLabel, EnumMember, Field, FieldType, PrimitiveType, TypeDefinition, TypeNode, UnionArm,
    UNBOUNDED,
};
use super::graph::TypeGraph;
use super::SchemaFormat;
use crate::core::{CodecError, Diagnostic, DiagnosticKind, Result};

/// Options controlling how strictly a schema is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail on duplicate definitions instead of keeping the first one.
    pub strict: bool,
}

/// A loaded graph plus the findings reported while loading it.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// Validated type graph
    pub graph: TypeGraph,
    /// Recoverable findings (dropped duplicates)
    pub diagnostics: Vec<Diagnostic>,
}

/// Load a schema from a file, picking the format from its extension.
pub fn load_schema_file(path: impl AsRef<Path>, options: LoadOptions) -> Result<LoadedSchema> {
    let path = path.as_ref();
    let format = SchemaFormat::from_path(path).ok_or_else(|| {
        CodecError::invalid_schema(
            path.display().to_string(),
            "unknown schema extension, expected .json or .toml",
        )
    })?;
    let text = std::fs::read_to_string(path)?;
    load_schema_str(&text, format, options)
}

/// Load a schema from text.
pub fn load_schema_str(
    text: &str,
    format: SchemaFormat,
    options: LoadOptions,
) -> Result<LoadedSchema> {
    let raw: RawSchema = match format {
        SchemaFormat::Json => serde_json::from_str(text)
            .map_err(|e| CodecError::invalid_schema("<json>", e.to_string()))?,
        SchemaFormat::Toml => {
            toml::from_str(text).map_err(|e| CodecError::invalid_schema("<toml>", e.to_string()))?
        }
    };
    build_graph(raw, options)
}

// =============================================================================
// Raw document model
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    consts: BTreeMap<String, i64>,
    #[serde(default)]
    types: Vec<RawDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawDefinition {
    Struct {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        fields: Vec<RawField>,
    },
    Enum {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        members: Vec<RawMember>,
    },
    Union {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        discriminant: RawType,
        arms: Vec<RawArm>,
        #[serde(default)]
        default: Option<IgnoredAny>,
    },
    Typedef {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        #[serde(rename = "type")]
        underlying: RawType,
    },
}

impl RawDefinition {
    fn name(&self) -> &str {
        match self {
            RawDefinition::Struct { name, .. }
            | RawDefinition::Enum { name, .. }
            | RawDefinition::Union { name, .. }
            | RawDefinition::Typedef { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: RawType,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    value: RawNumber,
}

#[derive(Debug, Deserialize)]
struct RawArm {
    cases: Vec<RawCase>,
    #[serde(default, rename = "type")]
    payload: Option<RawType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawType {
    Bool,
    Int,
    UnsignedInt,
    Hyper,
    UnsignedHyper,
    Float,
    Double,
    Quadruple,
    OpaqueFixed(RawNumber),
    Opaque {
        #[serde(default)]
        max: Option<RawNumber>,
    },
    String {
        #[serde(default)]
        max: Option<RawNumber>,
    },
    Ref(String),
    Array {
        element: Box<RawType>,
        size: RawNumber,
    },
    VarArray {
        element: Box<RawType>,
        #[serde(default)]
        max: Option<RawNumber>,
    },
    Optional(Box<RawType>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Literal(i64),
    Const(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCase {
    Int(i64),
    Ident(String),
}

// =============================================================================
// Conversion
// =============================================================================

/// Resolution context shared by every definition of one document.
struct Resolver<'a> {
    consts: &'a BTreeMap<String, i64>,
    enums: HashMap<&'a str, &'a [RawMember]>,
    typedefs: HashMap<&'a str, &'a RawType>,
}

impl<'a> Resolver<'a> {
    fn number(&self, owner: &str, number: &RawNumber) -> Result<i64> {
        match number {
            RawNumber::Literal(n) => Ok(*n),
            RawNumber::Const(name) => self.consts.get(name).copied().ok_or_else(|| {
                CodecError::invalid_schema(owner, format!("unknown constant '{name}'"))
            }),
        }
    }

    fn bound(&self, owner: &str, number: &RawNumber) -> Result<u32> {
        let n = self.number(owner, number)?;
        u32::try_from(n)
            .map_err(|_| CodecError::invalid_schema(owner, format!("bound {n} out of range")))
    }

    fn optional_bound(&self, owner: &str, number: Option<&RawNumber>) -> Result<u32> {
        number.map_or(Ok(UNBOUNDED), |n| self.bound(owner, n))
    }

    fn field_type(&self, owner: &str, raw: &RawType) -> Result<FieldType> {
        Ok(match raw {
            RawType::Bool => FieldType::Primitive(PrimitiveType::Bool),
            RawType::Int => FieldType::Primitive(PrimitiveType::Int),
            RawType::UnsignedInt => FieldType::Primitive(PrimitiveType::UnsignedInt),
            RawType::Hyper => FieldType::Primitive(PrimitiveType::Hyper),
            RawType::UnsignedHyper => FieldType::Primitive(PrimitiveType::UnsignedHyper),
            RawType::Float | RawType::Double | RawType::Quadruple => {
                return Err(CodecError::unsupported(format!(
                    "floating-point type in '{owner}'"
                )))
            }
            RawType::OpaqueFixed(size) => FieldType::OpaqueFixed(self.bound(owner, size)?),
            RawType::Opaque { max } => FieldType::Opaque {
                max: self.optional_bound(owner, max.as_ref())?,
            },
            RawType::String { max } => FieldType::String {
                max: self.optional_bound(owner, max.as_ref())?,
            },
            RawType::Ref(name) => FieldType::Named(name.clone()),
            RawType::Array { element, size } => FieldType::Array {
                element: Box::new(self.field_type(owner, element)?),
                size: self.bound(owner, size)?,
            },
            RawType::VarArray { element, max } => FieldType::VarArray {
                element: Box::new(self.field_type(owner, element)?),
                max: self.optional_bound(owner, max.as_ref())?,
            },
            RawType::Optional(inner) => FieldType::Optional(Box::new(self.field_type(owner, inner)?)),
        })
    }

    /// Enum members of the discriminant, following typedef references.
    fn discriminant_members(&self, raw: &RawType) -> Option<&'a [RawMember]> {
        let mut current = raw;
        for _ in 0..=self.typedefs.len() {
            let RawType::Ref(name) = current else {
                return None;
            };
            if let Some(members) = self.enums.get(name.as_str()).copied() {
                return Some(members);
            }
            current = *self.typedefs.get(name.as_str())?;
        }
        None
    }

    fn case_value(
        &self,
        owner: &str,
        members: Option<&[RawMember]>,
        is_bool: bool,
        case: &RawCase,
    ) -> Result<(CaseLabel, i64)> {
        match case {
            RawCase::Int(n) => Ok((CaseLabel::Int(*n), *n)),
            RawCase::Ident(ident) => {
                let value = if let Some(members) = members {
                    match members.iter().find(|m| &m.name == ident) {
                        Some(member) => Some(self.number(owner, &member.value)?),
                        None => None,
                    }
                } else if is_bool {
                    match ident.as_str() {
                        "TRUE" => Some(1),
                        "FALSE" => Some(0),
                        _ => None,
                    }
                } else {
                    self.consts.get(ident).copied()
                };
                value
                    .map(|v| (CaseLabel::Ident(ident.clone()), v))
                    .ok_or_else(|| {
                        CodecError::invalid_schema(owner, format!("unknown case label '{ident}'"))
                    })
            }
        }
    }

    fn definition(&self, raw: &RawDefinition) -> Result<TypeDefinition> {
        let (name, doc, node) = match raw {
            RawDefinition::Struct { name, doc, fields } => {
                let fields = fields
                    .iter()
                    .map(|f| Ok(Field::new(&f.name, self.field_type(name, &f.field_type)?)))
                    .collect::<Result<Vec<_>>>()?;
                (name, doc, TypeNode::Struct { fields })
            }
            RawDefinition::Enum { name, doc, members } => {
                let members = members
                    .iter()
                    .map(|m| {
                        let value = self.number(name, &m.value)?;
                        let value = i32::try_from(value).map_err(|_| {
                            CodecError::invalid_schema(
                                name,
                                format!("enum value {value} of '{}' out of range", m.name),
                            )
                        })?;
                        Ok(EnumMember {
                            name: m.name.clone(),
                            value,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                (name, doc, TypeNode::Enum { members })
            }
            RawDefinition::Union {
                name,
                doc,
                discriminant,
                arms,
                default,
            } => {
                if default.is_some() {
                    return Err(CodecError::unsupported(format!(
                        "default arm in union '{name}'"
                    )));
                }
                let members = self.discriminant_members(discriminant);
                let is_bool = matches!(discriminant, RawType::Bool);
                let mut resolved = Vec::new();
                for arm in arms {
                    let payload = arm
                        .payload
                        .as_ref()
                        .map(|p| self.field_type(name, p))
                        .transpose()?;
                    for case in &arm.cases {
                        let (case, value) = self.case_value(name, members, is_bool, case)?;
                        resolved.push(UnionArm {
                            case,
                            value,
                            payload: payload.clone(),
                        });
                    }
                }
                let node = TypeNode::Union {
                    discriminant: self.field_type(name, discriminant)?,
                    arms: resolved,
                };
                (name, doc, node)
            }
            RawDefinition::Typedef {
                name,
                doc,
                underlying,
            } => {
                let underlying = self.field_type(name, underlying)?;
                (name, doc, TypeNode::Typedef { underlying })
            }
        };
        Ok(TypeDefinition {
            name: name.clone(),
            doc: doc.clone(),
            node,
        })
    }
}

fn build_graph(raw: RawSchema, options: LoadOptions) -> Result<LoadedSchema> {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(raw.types.len());

    for def in &raw.types {
        if seen.insert(def.name()) {
            kept.push(def);
            continue;
        }
        if options.strict {
            return Err(CodecError::DuplicateDefinition {
                name: def.name().to_string(),
            });
        }
        warn!(
            context = "schema_load",
            type_name = def.name(),
            "Duplicate type definition dropped, keeping the first"
        );
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::DuplicateDefinition,
            def.name(),
            "second definition dropped, first one kept",
        ));
    }

    let mut enums = HashMap::new();
    let mut typedefs = HashMap::new();
    for def in &kept {
        match def {
            RawDefinition::Enum { name, members, .. } => {
                enums.insert(name.as_str(), members.as_slice());
            }
            RawDefinition::Typedef {
                name, underlying, ..
            } => {
                typedefs.insert(name.as_str(), underlying);
            }
            _ => {}
        }
    }

    let resolver = Resolver {
        consts: &raw.consts,
        enums,
        typedefs,
    };
    let definitions = kept
        .iter()
        .map(|def| resolver.definition(def))
        .collect::<Result<Vec<_>>>()?;

    Ok(LoadedSchema {
        graph: TypeGraph::new(definitions)?,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(json: &str) -> Result<LoadedSchema> {
        load_schema_str(json, SchemaFormat::Json, LoadOptions::default())
    }

    #[test]
    fn test_load_basic_document() {
        let loaded = load(
            r#"{
                "consts": { "MAX": 3 },
                "types": [
                    { "kind": "typedef", "name": "Hash", "type": { "opaque_fixed": 32 } },
                    { "kind": "enum", "name": "Color",
                      "members": [ { "name": "RED", "value": 0 }, { "name": "GREEN", "value": 1 } ] },
                    { "kind": "struct", "name": "Pixel", "doc": "a pixel",
                      "fields": [
                        { "name": "color", "type": { "ref": "Color" } },
                        { "name": "tags", "type": { "var_array": { "element": { "string": {} }, "max": "MAX" } } }
                      ] },
                    { "kind": "union", "name": "Shade", "discriminant": { "ref": "Color" },
                      "arms": [ { "cases": ["RED"], "type": "int" }, { "cases": ["GREEN"] } ] }
                ]
            }"#,
        )
        .unwrap();
        let graph = loaded.graph;
        assert_eq!(graph.len(), 4);
        assert!(loaded.diagnostics.is_empty());

        let pixel = graph.get("Pixel").unwrap();
        assert_eq!(pixel.doc.as_deref(), Some("a pixel"));
        let tags = pixel.node.field("tags").unwrap();
        assert_eq!(
            tags.field_type,
            FieldType::VarArray {
                element: Box::new(FieldType::String { max: UNBOUNDED }),
                max: 3
            }
        );

        let green = graph.node("Shade").unwrap().arm("GREEN").unwrap();
        assert_eq!(green.value, 1);
        assert!(green.payload.is_none());
    }

    #[test]
    fn test_multi_case_arm_expands() {
        let loaded = load(
            r#"{ "types": [
                { "kind": "union", "name": "U", "discriminant": "int",
                  "arms": [ { "cases": [0, 1], "type": "hyper" } ] }
            ] }"#,
        )
        .unwrap();
        let node = loaded.graph.node("U").unwrap();
        assert!(node.arm("V0").is_some());
        assert!(node.arm("V1").is_some());
    }

    #[test]
    fn test_duplicate_kept_first_with_diagnostic() {
        let loaded = load(
            r#"{ "types": [
                { "kind": "typedef", "name": "A", "type": "int" },
                { "kind": "typedef", "name": "A", "type": "hyper" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(loaded.graph.len(), 1);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(
            loaded.diagnostics[0].kind,
            DiagnosticKind::DuplicateDefinition
        );
        assert_eq!(
            loaded.graph.node("A").unwrap(),
            &TypeNode::Typedef {
                underlying: FieldType::Primitive(PrimitiveType::Int)
            }
        );
    }

    #[test]
    fn test_duplicate_strict_fails() {
        let err = load_schema_str(
            r#"{ "types": [
                { "kind": "typedef", "name": "A", "type": "int" },
                { "kind": "typedef", "name": "A", "type": "int" }
            ] }"#,
            SchemaFormat::Json,
            LoadOptions { strict: true },
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateDefinition { .. }));
    }

    #[test]
    fn test_float_unsupported() {
        let err = load(r#"{ "types": [ { "kind": "typedef", "name": "F", "type": "float" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_default_arm_unsupported() {
        let err = load(
            r#"{ "types": [
                { "kind": "union", "name": "U", "discriminant": "int",
                  "arms": [ { "cases": [0] } ], "default": { "type": "int" } }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_unknown_constant_and_negative_bound() {
        let err = load(
            r#"{ "types": [ { "kind": "typedef", "name": "B", "type": { "opaque": { "max": "NOPE" } } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::InvalidSchema { .. }));

        let err = load(
            r#"{ "types": [ { "kind": "typedef", "name": "B", "type": { "opaque_fixed": -1 } } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::InvalidSchema { .. }));
    }

    #[test]
    fn test_unresolved_reference_fatal() {
        let err = load(r#"{ "types": [ { "kind": "typedef", "name": "A", "type": { "ref": "Nope" } } ] }"#)
            .unwrap_err();
        assert_eq!(err, CodecError::type_not_found("Nope"));
    }

    #[test]
    fn test_load_toml() {
        let loaded = load_schema_str(
            r#"
[[types]]
kind = "struct"
name = "Point"
fields = [
  { name = "x", type = "int" },
  { name = "y", type = "int" },
]

[[types]]
kind = "union"
name = "Flag"
discriminant = "bool"
arms = [ { cases = ["TRUE"], type = { ref = "Point" } }, { cases = ["FALSE"] } ]
"#,
            SchemaFormat::Toml,
            LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(loaded.graph.len(), 2);
        assert_eq!(loaded.graph.node("Flag").unwrap().arm("TRUE").unwrap().value, 1);
    }
}
