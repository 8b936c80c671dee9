// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Full XDR decoder and skipper driven by the type graph.
//!
//! `read_*` materializes a complete [`XdrValue`]; `skip_*` walks the same
//! layout and discards it. Both take one level of depth around every named
//! type, so the depth guard behaves identically on either path.

use crate::core::{CodecError, Result as CoreResult, XdrValue};
use crate::schema::{DiscriminantKind, FieldType, PrimitiveType, TypeGraph, TypeNode, UnionArm};

use super::cursor::{padding_len, SkipMode, XdrCursor};

/// Schema-driven XDR decoder.
///
/// Stateless apart from the borrowed graph, so one decoder can serve many
/// cursors concurrently.
#[derive(Clone, Copy)]
pub struct XdrDecoder<'g> {
    graph: &'g TypeGraph,
}

impl<'g> XdrDecoder<'g> {
    /// Create a decoder over `graph`.
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph }
    }

    /// Get the graph this decoder reads.
    pub fn graph(&self) -> &'g TypeGraph {
        self.graph
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Read a value of the named type.
    pub fn read_named(&self, cursor: &mut XdrCursor<'_>, name: &str) -> CoreResult<XdrValue> {
        let node = self.graph.node(name)?;
        cursor.with_limited_depth(|c| self.read_node(c, node))
    }

    fn read_node(&self, cursor: &mut XdrCursor<'_>, node: &TypeNode) -> CoreResult<XdrValue> {
        match node {
            TypeNode::Struct { fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((field.name.clone(), self.read_field(cursor, &field.field_type)?));
                }
                Ok(XdrValue::Struct(values))
            }
            TypeNode::Enum { members } => {
                let value = cursor.read_i32()?;
                members
                    .iter()
                    .find(|m| m.value == value)
                    .map(|m| XdrValue::Enum {
                        name: m.name.clone(),
                        value,
                    })
                    .ok_or_else(|| CodecError::invalid(format!("enum value {value} not declared")))
            }
            TypeNode::Union { discriminant, arms } => {
                let (arm, value) = self.read_arm(cursor, discriminant, arms)?;
                let payload = match &arm.payload {
                    Some(payload) => Some(Box::new(self.read_field(cursor, payload)?)),
                    None => None,
                };
                Ok(XdrValue::Union {
                    case: arm.label(),
                    discriminant: value,
                    payload,
                })
            }
            TypeNode::Typedef { underlying } => self.read_field(cursor, underlying),
        }
    }

    /// Read a value of an inline field type.
    pub fn read_field(
        &self,
        cursor: &mut XdrCursor<'_>,
        field_type: &FieldType,
    ) -> CoreResult<XdrValue> {
        match field_type {
            FieldType::Primitive(p) => read_primitive(cursor, *p),
            FieldType::OpaqueFixed(size) => {
                Ok(XdrValue::Opaque(cursor.read_padded(*size as usize)?.to_vec()))
            }
            FieldType::Opaque { max } => {
                let len = cursor.read_len(*max)?;
                Ok(XdrValue::Opaque(cursor.read_padded(len)?.to_vec()))
            }
            FieldType::String { max } => {
                let len = cursor.read_len(*max)?;
                let bytes = cursor.read_padded(len)?;
                let text = std::str::from_utf8(bytes).map_err(|_| CodecError::Utf8)?;
                Ok(XdrValue::String(text.to_string()))
            }
            FieldType::Named(name) => self.read_named(cursor, name),
            FieldType::Array { element, size } => {
                let items = (0..*size)
                    .map(|_| self.read_field(cursor, element))
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(XdrValue::Array(items))
            }
            FieldType::VarArray { element, max } => {
                let len = cursor.read_len(*max)?;
                let mut items = Vec::with_capacity(len.min(cursor.remaining() / 4));
                for _ in 0..len {
                    items.push(self.read_field(cursor, element)?);
                }
                Ok(XdrValue::Array(items))
            }
            FieldType::Optional(inner) => {
                if cursor.read_bool()? {
                    Ok(XdrValue::Optional(Some(Box::new(
                        self.read_field(cursor, inner)?,
                    ))))
                } else {
                    Ok(XdrValue::Optional(None))
                }
            }
        }
    }

    /// Read a union discriminant and select its arm.
    ///
    /// A value with no matching arm is invalid; there is no default arm.
    pub fn read_arm<'n>(
        &self,
        cursor: &mut XdrCursor<'_>,
        discriminant: &FieldType,
        arms: &'n [UnionArm],
    ) -> CoreResult<(&'n UnionArm, i64)> {
        let value = self.read_discriminant(cursor, discriminant)?;
        arms.iter()
            .find(|arm| arm.value == value)
            .map(|arm| (arm, value))
            .ok_or_else(|| CodecError::invalid(format!("no union arm for discriminant {value}")))
    }

    /// Read a union discriminant, checking enum membership.
    pub fn read_discriminant(
        &self,
        cursor: &mut XdrCursor<'_>,
        discriminant: &FieldType,
    ) -> CoreResult<i64> {
        match self.graph.discriminant_kind(discriminant)? {
            DiscriminantKind::Int => Ok(i64::from(cursor.read_i32()?)),
            DiscriminantKind::UnsignedInt => Ok(i64::from(cursor.read_u32()?)),
            DiscriminantKind::Bool => Ok(i64::from(cursor.read_bool()?)),
            DiscriminantKind::Enum(name) => {
                let value = cursor.read_i32()?;
                match self.graph.node(&name)? {
                    TypeNode::Enum { members } if members.iter().any(|m| m.value == value) => {
                        Ok(i64::from(value))
                    }
                    _ => Err(CodecError::invalid(format!(
                        "discriminant {value} is not a member of '{name}'"
                    ))),
                }
            }
        }
    }

    // ========================================================================
    // Skip
    // ========================================================================

    /// Skip a value of the named type.
    pub fn skip_named(
        &self,
        cursor: &mut XdrCursor<'_>,
        name: &str,
        mode: SkipMode,
    ) -> CoreResult<()> {
        let node = self.graph.node(name)?;
        cursor.with_limited_depth(|c| self.skip_node(c, node, mode))
    }

    fn skip_node(&self, cursor: &mut XdrCursor<'_>, node: &TypeNode, mode: SkipMode) -> CoreResult<()> {
        match node {
            TypeNode::Struct { fields } => {
                for field in fields {
                    self.skip_field(cursor, &field.field_type, mode)?;
                }
                Ok(())
            }
            TypeNode::Enum { .. } => cursor.skip(4, mode),
            TypeNode::Union { discriminant, arms } => {
                let (arm, _) = self.read_arm(cursor, discriminant, arms)?;
                match &arm.payload {
                    Some(payload) => self.skip_field(cursor, payload, mode),
                    None => Ok(()),
                }
            }
            TypeNode::Typedef { underlying } => self.skip_field(cursor, underlying, mode),
        }
    }

    /// Skip a value of an inline field type.
    ///
    /// Only what positioning depends on is validated: length prefixes and
    /// their bounds, optional flags and union discriminants.
    pub fn skip_field(
        &self,
        cursor: &mut XdrCursor<'_>,
        field_type: &FieldType,
        mode: SkipMode,
    ) -> CoreResult<()> {
        if let Some(size) = fixed_size(field_type) {
            return cursor.skip(size, mode);
        }
        match field_type {
            FieldType::Opaque { max } | FieldType::String { max } => {
                let len = cursor.read_len(*max)?;
                cursor.skip(len + padding_len(len), mode)
            }
            FieldType::Named(name) => self.skip_named(cursor, name, mode),
            FieldType::Array { element, size } => {
                for _ in 0..*size {
                    self.skip_field(cursor, element, mode)?;
                }
                Ok(())
            }
            FieldType::VarArray { element, max } => {
                let len = cursor.read_len(*max)?;
                match fixed_size(element).and_then(|s| s.checked_mul(len)) {
                    Some(total) => cursor.skip(total, mode),
                    None => {
                        for _ in 0..len {
                            self.skip_field(cursor, element, mode)?;
                        }
                        Ok(())
                    }
                }
            }
            FieldType::Optional(inner) => {
                if cursor.read_bool()? {
                    self.skip_field(cursor, inner, mode)
                } else {
                    Ok(())
                }
            }
            FieldType::Primitive(_) | FieldType::OpaqueFixed(_) => Ok(()),
        }
    }
}

/// Read a primitive value.
pub fn read_primitive(cursor: &mut XdrCursor<'_>, primitive: PrimitiveType) -> CoreResult<XdrValue> {
    Ok(match primitive {
        PrimitiveType::Bool => XdrValue::Bool(cursor.read_bool()?),
        PrimitiveType::Int => XdrValue::Int(cursor.read_i32()?),
        PrimitiveType::UnsignedInt => XdrValue::UInt(cursor.read_u32()?),
        PrimitiveType::Hyper => XdrValue::Hyper(cursor.read_i64()?),
        PrimitiveType::UnsignedHyper => XdrValue::UHyper(cursor.read_u64()?),
    })
}

/// Encoded size of field types whose size does not depend on the data.
///
/// Named types are not sized, since skipping them must still take depth.
pub fn fixed_size(field_type: &FieldType) -> Option<usize> {
    match field_type {
        FieldType::Primitive(p) => Some(p.size()),
        FieldType::OpaqueFixed(n) => {
            let n = *n as usize;
            n.checked_add(padding_len(n))
        }
        FieldType::Array { element, size } => {
            fixed_size(element).and_then(|s| s.checked_mul(*size as usize))
        }
        _ => None,
    }
}
