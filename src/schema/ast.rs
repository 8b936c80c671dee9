// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for XDR type graphs.
//!
//! These are the resolved forms handed over by the schema front-end: every
//! bound is a literal and every union arm knows its discriminant value.

use std::collections::BTreeSet;
use std::fmt;

/// Bound used for `opaque<>`, `string<>` and `T<>` without an explicit maximum.
pub const UNBOUNDED: u32 = u32::MAX;

/// Primitive XDR types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// 4-byte boolean
    Bool,
    /// 32-bit signed integer
    Int,
    /// 32-bit unsigned integer
    UnsignedInt,
    /// 64-bit signed integer
    Hyper,
    /// 64-bit unsigned integer
    UnsignedHyper,
}

impl PrimitiveType {
    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveType::Bool | PrimitiveType::Int | PrimitiveType::UnsignedInt => 4,
            PrimitiveType::Hyper | PrimitiveType::UnsignedHyper => 8,
        }
    }

    /// Parse a primitive type from its schema spelling.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(PrimitiveType::Bool),
            "int" => Some(PrimitiveType::Int),
            "unsigned_int" | "unsigned int" => Some(PrimitiveType::UnsignedInt),
            "hyper" => Some(PrimitiveType::Hyper),
            "unsigned_hyper" | "unsigned hyper" => Some(PrimitiveType::UnsignedHyper),
            _ => None,
        }
    }

    /// Convert to XDR spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::UnsignedInt => "unsigned int",
            PrimitiveType::Hyper => "hyper",
            PrimitiveType::UnsignedHyper => "unsigned hyper",
        }
    }
}

/// Field type - primitive, opaque/string, named reference, array or optional.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// `opaque[N]`
    OpaqueFixed(u32),
    /// `opaque<N>`
    Opaque {
        /// Maximum byte count
        max: u32,
    },
    /// `string<N>`
    String {
        /// Maximum byte count
        max: u32,
    },
    /// Reference to a named type
    Named(String),
    /// `T[N]`
    Array {
        /// Element type
        element: Box<FieldType>,
        /// Exact element count
        size: u32,
    },
    /// `T<N>`
    VarArray {
        /// Element type
        element: Box<FieldType>,
        /// Maximum element count
        max: u32,
    },
    /// `T*`
    Optional(Box<FieldType>),
}

impl FieldType {
    /// Shorthand for a named reference.
    pub fn named(name: impl Into<String>) -> Self {
        FieldType::Named(name.into())
    }

    /// Name of the type referenced directly or through arrays/optionals.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            FieldType::Named(name) => Some(name),
            FieldType::Array { element, .. } | FieldType::VarArray { element, .. } => {
                element.base_name()
            }
            FieldType::Optional(inner) => inner.base_name(),
            _ => None,
        }
    }

    /// Add every referenced type name to `out`.
    pub fn collect_names(&self, out: &mut BTreeSet<String>) {
        if let Some(name) = self.base_name() {
            out.insert(name.to_string());
        }
    }

    /// Whether the field has no nested named structure.
    pub fn is_leaf_type(&self) -> bool {
        self.base_name().is_none()
    }

    /// Whether this is an array of either kind.
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array { .. } | FieldType::VarArray { .. })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(max: u32) -> String {
            if max == UNBOUNDED {
                String::new()
            } else {
                max.to_string()
            }
        }
        match self {
            FieldType::Primitive(p) => write!(f, "{}", p.as_str()),
            FieldType::OpaqueFixed(n) => write!(f, "opaque[{n}]"),
            FieldType::Opaque { max } => write!(f, "opaque<{}>", bound(*max)),
            FieldType::String { max } => write!(f, "string<{}>", bound(*max)),
            FieldType::Named(name) => write!(f, "{name}"),
            FieldType::Array { element, size } => write!(f, "{element}[{size}]"),
            FieldType::VarArray { element, max } => write!(f, "{element}<{}>", bound(*max)),
            FieldType::Optional(inner) => write!(f, "{inner}*"),
        }
    }
}

/// A struct member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub field_type: FieldType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// An enum member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    /// Member identifier
    pub name: String,
    /// Wire value
    pub value: i32,
}

/// Union case label as written in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaseLabel {
    /// Enum member or TRUE/FALSE
    Ident(String),
    /// Integer literal
    Int(i64),
}

impl CaseLabel {
    /// Name used for the arm in values and JSON.
    pub fn label(&self) -> String {
        match self {
            CaseLabel::Ident(name) => name.clone(),
            CaseLabel::Int(n) => format!("V{n}"),
        }
    }
}

/// A single union arm (one case label).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnionArm {
    /// Case label
    pub case: CaseLabel,
    /// Resolved discriminant value
    pub value: i64,
    /// Payload type, `None` for void arms
    pub payload: Option<FieldType>,
}

impl UnionArm {
    /// Name of the arm.
    pub fn label(&self) -> String {
        self.case.label()
    }
}

/// Structural shape of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    /// Struct with ordered fields
    Struct {
        /// Fields in declaration order
        fields: Vec<Field>,
    },
    /// Enum with ordered members
    Enum {
        /// Members in declaration order
        members: Vec<EnumMember>,
    },
    /// Discriminated union
    Union {
        /// Discriminant type
        discriminant: FieldType,
        /// Arms in declaration order
        arms: Vec<UnionArm>,
    },
    /// Alias of another field type
    Typedef {
        /// Aliased type
        underlying: FieldType,
    },
}

impl TypeNode {
    /// Kind name for messages and schema output.
    pub fn kind_str(&self) -> &'static str {
        match self {
            TypeNode::Struct { .. } => "struct",
            TypeNode::Enum { .. } => "enum",
            TypeNode::Union { .. } => "union",
            TypeNode::Typedef { .. } => "typedef",
        }
    }

    /// Names of all types referenced directly by this node.
    pub fn referenced_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match self {
            TypeNode::Struct { fields } => {
                for field in fields {
                    field.field_type.collect_names(&mut out);
                }
            }
            TypeNode::Enum { .. } => {}
            TypeNode::Union { discriminant, arms } => {
                discriminant.collect_names(&mut out);
                for arm in arms {
                    if let Some(payload) = &arm.payload {
                        payload.collect_names(&mut out);
                    }
                }
            }
            TypeNode::Typedef { underlying } => underlying.collect_names(&mut out),
        }
        out
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        match self {
            TypeNode::Struct { fields } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// Look up a union arm by label.
    pub fn arm(&self, label: &str) -> Option<&UnionArm> {
        match self {
            TypeNode::Union { arms, .. } => arms.iter().find(|a| a.label() == label),
            _ => None,
        }
    }
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Unique, case-sensitive name
    pub name: String,
    /// Doc text from the source; not part of the shape
    pub doc: Option<String>,
    /// Structural shape
    pub node: TypeNode,
}

impl TypeDefinition {
    /// Create a definition without doc text.
    pub fn new(name: impl Into<String>, node: TypeNode) -> Self {
        Self {
            name: name.into(),
            doc: None,
            node,
        }
    }

    /// Whether two definitions have the same name and shape, ignoring docs.
    pub fn same_shape(&self, other: &TypeDefinition) -> bool {
        self.name == other.name && self.node == other.node
    }
}
