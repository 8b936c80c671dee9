// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sparse decode plans.
//!
//! A plan is the set of [`SparseTypeDescriptor`]s synthesized for one
//! sparse-type request. Every descriptor keeps the original layout of the
//! type it projects and records, per field or arm, whether the bytes are
//! extracted, decoded through a nested descriptor, or skipped.

use std::collections::HashMap;
use std::fmt;

use crate::core::{CodecError, Diagnostic, Result};
use crate::schema::{FieldType, UnionArm};

/// How a nested descriptor is reached from a field's wire type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// The field is the nested type itself.
    Direct,
    /// Presence flag, then the inner traversal.
    Optional(Box<Traversal>),
    /// Exactly `size` elements.
    FixedArray {
        /// Element count
        size: u32,
        /// Per-element traversal
        element: Box<Traversal>,
    },
    /// Length prefix bounded by `max`, then that many elements.
    VarArray {
        /// Declared bound
        max: u32,
        /// Per-element traversal
        element: Box<Traversal>,
    },
}

impl Traversal {
    /// Whether any level walks array elements.
    pub fn is_array(&self) -> bool {
        match self {
            Traversal::Direct => false,
            Traversal::Optional(inner) => inner.is_array(),
            Traversal::FixedArray { .. } | Traversal::VarArray { .. } => true,
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Direct => write!(f, "direct"),
            Traversal::Optional(inner) => write!(f, "optional {inner}"),
            Traversal::FixedArray { size, element } => write!(f, "[{size}] {element}"),
            Traversal::VarArray { max, element } => write!(f, "<{max}> {element}"),
        }
    }
}

/// What the decoder does with one struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    /// Decode with the field's full codec and keep the value.
    Extract,
    /// Decode through a nested descriptor and keep the projection.
    Recurse {
        /// Nested descriptor name
        target: String,
        /// Path from the field type to the nested type
        traversal: Traversal,
    },
    /// Consume the bytes without materializing anything.
    Skip,
}

impl FieldAction {
    /// Whether the field appears in the sparse value.
    pub fn is_retained(&self) -> bool {
        !matches!(self, FieldAction::Skip)
    }
}

/// One field of a sparse struct, in original declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseField {
    /// Field name
    pub name: String,
    /// Original wire type
    pub field_type: FieldType,
    /// Decode action
    pub action: FieldAction,
}

/// What the decoder does with one union arm's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmAction {
    /// Decode the full payload.
    Extract,
    /// Decode the payload through a nested descriptor.
    Recurse {
        /// Nested descriptor name
        target: String,
        /// Path from the payload type to the nested type
        traversal: Traversal,
    },
    /// Consume the payload; the value is a placeholder.
    Skip,
    /// Void arm; nothing follows the discriminant.
    Void,
}

/// One arm of a sparse union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseArm {
    /// Original arm (label, discriminant value, payload type)
    pub arm: UnionArm,
    /// Decode action
    pub action: ArmAction,
}

/// Layout of a sparse descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparseShape {
    /// Struct projection: every original field, each with an action.
    Struct {
        /// Fields in declaration order
        fields: Vec<SparseField>,
    },
    /// Union projection: the discriminant is always decoded.
    Union {
        /// Discriminant type
        discriminant: FieldType,
        /// Arms in declaration order
        arms: Vec<SparseArm>,
    },
    /// Alias whose underlying type has no members of its own to select,
    /// such as a typedef of a primitive or of an array of structs.
    Alias {
        /// Underlying wire type
        underlying: FieldType,
        /// `Extract` or `Recurse`
        action: FieldAction,
    },
}

/// A synthesized decode-only projection of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseTypeDescriptor {
    /// Descriptor name
    pub name: String,
    /// Name of the type it projects
    pub origin: String,
    /// Layout and actions
    pub shape: SparseShape,
}

impl SparseTypeDescriptor {
    /// Names of nested descriptors this one decodes through.
    pub fn targets(&self) -> Vec<&str> {
        match &self.shape {
            SparseShape::Struct { fields } => fields
                .iter()
                .filter_map(|f| match &f.action {
                    FieldAction::Recurse { target, .. } => Some(target.as_str()),
                    _ => None,
                })
                .collect(),
            SparseShape::Union { arms, .. } => arms
                .iter()
                .filter_map(|a| match &a.action {
                    ArmAction::Recurse { target, .. } => Some(target.as_str()),
                    _ => None,
                })
                .collect(),
            SparseShape::Alias { action, .. } => match action {
                FieldAction::Recurse { target, .. } => vec![target.as_str()],
                _ => Vec::new(),
            },
        }
    }
}

/// All descriptors of one sparse-type request.
#[derive(Debug, Clone)]
pub struct SparsePlan {
    /// Request name; also the root descriptor name
    pub name: String,
    /// Base type the request projects
    pub base: String,
    /// Descriptors, nested ones before the types that use them
    pub descriptors: Vec<SparseTypeDescriptor>,
    /// Findings reported during synthesis
    pub diagnostics: Vec<Diagnostic>,
    index: HashMap<String, usize>,
}

impl SparsePlan {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
            descriptors: Vec::new(),
            diagnostics: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a descriptor; names must be unique within the plan.
    pub fn add(&mut self, descriptor: SparseTypeDescriptor) -> Result<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(CodecError::DuplicateDefinition {
                name: descriptor.name,
            });
        }
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Look up a descriptor.
    pub fn get(&self, name: &str) -> Option<&SparseTypeDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Look up a descriptor, failing with `TypeNotFound`.
    pub fn descriptor(&self, name: &str) -> Result<&SparseTypeDescriptor> {
        self.get(name)
            .ok_or_else(|| CodecError::type_not_found(name))
    }

    /// Root descriptor.
    pub fn root(&self) -> Result<&SparseTypeDescriptor> {
        self.descriptor(&self.name)
    }

    /// Descriptor names in synthesis order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the plan has no descriptors.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl fmt::Display for SparsePlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "SparsePlan '{}' for '{}':", self.name, self.base)?;
        for descriptor in &self.descriptors {
            writeln!(f, "  {} ({}):", descriptor.name, descriptor.origin)?;
            match &descriptor.shape {
                SparseShape::Struct { fields } => {
                    for field in fields {
                        match &field.action {
                            FieldAction::Extract => writeln!(f, "    extract {}", field.name)?,
                            FieldAction::Recurse { target, traversal } => writeln!(
                                f,
                                "    recurse {} -> {target} ({traversal})",
                                field.name
                            )?,
                            FieldAction::Skip => writeln!(f, "    skip    {}", field.name)?,
                        }
                    }
                }
                SparseShape::Union { arms, .. } => {
                    for arm in arms {
                        let label = arm.arm.label();
                        match &arm.action {
                            ArmAction::Extract => writeln!(f, "    case {label}: extract")?,
                            ArmAction::Recurse { target, traversal } => {
                                writeln!(f, "    case {label}: recurse -> {target} ({traversal})")?
                            }
                            ArmAction::Skip => writeln!(f, "    case {label}: skip")?,
                            ArmAction::Void => writeln!(f, "    case {label}: void")?,
                        }
                    }
                }
                SparseShape::Alias { underlying, action } => match action {
                    FieldAction::Recurse { target, traversal } => {
                        writeln!(f, "    alias {underlying} -> {target} ({traversal})")?
                    }
                    _ => writeln!(f, "    alias {underlying}")?,
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveType;

    fn leaf_descriptor(name: &str) -> SparseTypeDescriptor {
        SparseTypeDescriptor {
            name: name.to_string(),
            origin: "Header".to_string(),
            shape: SparseShape::Struct {
                fields: vec![
                    SparseField {
                        name: "seq".into(),
                        field_type: FieldType::Primitive(PrimitiveType::UnsignedInt),
                        action: FieldAction::Extract,
                    },
                    SparseField {
                        name: "pad".into(),
                        field_type: FieldType::Opaque { max: 16 },
                        action: FieldAction::Skip,
                    },
                ],
            },
        }
    }

    #[test]
    fn test_plan_add_and_lookup() {
        let mut plan = SparsePlan::new("Req", "Header");
        plan.add(leaf_descriptor("Req")).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.root().unwrap().origin, "Header");
        assert!(plan.get("Other").is_none());
        assert_eq!(
            plan.add(leaf_descriptor("Req")).unwrap_err(),
            CodecError::DuplicateDefinition { name: "Req".into() }
        );
    }

    #[test]
    fn test_traversal_is_array() {
        assert!(!Traversal::Direct.is_array());
        assert!(Traversal::Optional(Box::new(Traversal::VarArray {
            max: 4,
            element: Box::new(Traversal::Direct),
        }))
        .is_array());
    }

    #[test]
    fn test_display_lists_actions() {
        let mut plan = SparsePlan::new("Req", "Header");
        plan.add(leaf_descriptor("Req")).unwrap();
        let text = plan.to_string();
        assert!(text.starts_with("SparsePlan 'Req' for 'Header':"));
        assert!(text.contains("extract seq"));
        assert!(text.contains("skip    pad"));
    }
}
