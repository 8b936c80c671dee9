// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sparse decoding.
//!
//! Executes a [`SparsePlan`]: every original field is visited in order and
//! either extracted, decoded through a nested descriptor, or skipped. Only
//! materialization differs from the full decoder; byte consumption and
//! validation of what is read are identical.

use crate::core::{CodecError, Result as CoreResult, XdrValue};
use crate::encoding::xdr::{Limits, SkipMode, XdrCursor, XdrDecoder};
use crate::schema::TypeGraph;

use super::plan::{ArmAction, FieldAction, SparsePlan, SparseShape, Traversal};

/// Decoder for the descriptors of one plan.
///
/// Depth is taken once per descriptor. Typedef hops folded into a
/// descriptor's traversal cost nothing here, while the full decoder takes a
/// level for each named type, so a sparse decode never needs more depth
/// than the full decode of the same bytes.
#[derive(Clone, Copy)]
pub struct SparseDecoder<'a> {
    decoder: XdrDecoder<'a>,
    plan: &'a SparsePlan,
    mode: SkipMode,
}

impl<'a> SparseDecoder<'a> {
    /// Create a decoder that skips by consuming bytes.
    pub fn new(graph: &'a TypeGraph, plan: &'a SparsePlan) -> Self {
        Self {
            decoder: XdrDecoder::new(graph),
            plan,
            mode: SkipMode::Consume,
        }
    }

    /// Use `mode` for skipped fields.
    pub fn with_mode(mut self, mode: SkipMode) -> Self {
        self.mode = mode;
        self
    }

    /// Get the plan being executed.
    pub fn plan(&self) -> &'a SparsePlan {
        self.plan
    }

    /// Decode the root descriptor.
    pub fn read(&self, cursor: &mut XdrCursor<'_>) -> CoreResult<XdrValue> {
        self.read_descriptor(cursor, &self.plan.name)
    }

    /// Decode a value that must occupy the whole buffer.
    pub fn read_to_end(&self, name: &str, data: &[u8], limits: Limits) -> CoreResult<XdrValue> {
        let mut cursor = XdrCursor::new(data, limits);
        let value = self.read_descriptor(&mut cursor, name)?;
        cursor.ensure_at_end()?;
        Ok(value)
    }

    /// Decode one value from the front of the buffer.
    ///
    /// Returns the projection and the number of bytes consumed.
    pub fn read_prefix(
        &self,
        name: &str,
        data: &[u8],
        limits: Limits,
    ) -> CoreResult<(XdrValue, usize)> {
        let mut cursor = XdrCursor::new(data, limits);
        let value = self.read_descriptor(&mut cursor, name)?;
        Ok((value, cursor.position()))
    }

    /// Decode a named descriptor, taking one level of depth.
    pub fn read_descriptor(&self, cursor: &mut XdrCursor<'_>, name: &str) -> CoreResult<XdrValue> {
        let descriptor = self.plan.descriptor(name)?;
        cursor.with_limited_depth(|c| self.read_shape(c, &descriptor.shape))
    }

    fn read_shape(&self, cursor: &mut XdrCursor<'_>, shape: &SparseShape) -> CoreResult<XdrValue> {
        match shape {
            SparseShape::Struct { fields } => {
                let mut values = Vec::new();
                for field in fields {
                    match &field.action {
                        FieldAction::Extract => values.push((
                            field.name.clone(),
                            self.decoder.read_field(cursor, &field.field_type)?,
                        )),
                        FieldAction::Recurse { target, traversal } => values.push((
                            field.name.clone(),
                            self.read_traversal(cursor, traversal, target)?,
                        )),
                        FieldAction::Skip => {
                            self.decoder
                                .skip_field(cursor, &field.field_type, self.mode)?
                        }
                    }
                }
                Ok(XdrValue::Struct(values))
            }
            SparseShape::Union { discriminant, arms } => {
                let value = self.decoder.read_discriminant(cursor, discriminant)?;
                let sparse_arm = arms
                    .iter()
                    .find(|a| a.arm.value == value)
                    .ok_or_else(|| {
                        CodecError::invalid(format!("no union arm for discriminant {value}"))
                    })?;
                let payload = match (&sparse_arm.action, &sparse_arm.arm.payload) {
                    (ArmAction::Extract, Some(payload)) => {
                        Some(Box::new(self.decoder.read_field(cursor, payload)?))
                    }
                    (ArmAction::Recurse { target, traversal }, Some(_)) => {
                        Some(Box::new(self.read_traversal(cursor, traversal, target)?))
                    }
                    (ArmAction::Skip, Some(payload)) => {
                        self.decoder.skip_field(cursor, payload, self.mode)?;
                        None
                    }
                    (_, None) => None,
                    (ArmAction::Void, Some(payload)) => {
                        return Err(CodecError::invalid(format!(
                            "arm '{}' carries a payload of type '{payload}'",
                            sparse_arm.arm.label()
                        )))
                    }
                };
                Ok(XdrValue::Union {
                    case: sparse_arm.arm.label(),
                    discriminant: value,
                    payload,
                })
            }
            SparseShape::Alias { underlying, action } => match action {
                FieldAction::Recurse { target, traversal } => {
                    self.read_traversal(cursor, traversal, target)
                }
                FieldAction::Extract => self.decoder.read_field(cursor, underlying),
                FieldAction::Skip => Err(CodecError::invalid(format!(
                    "alias of '{underlying}' has nothing to extract"
                ))),
            },
        }
    }

    fn read_traversal(
        &self,
        cursor: &mut XdrCursor<'_>,
        traversal: &Traversal,
        target: &str,
    ) -> CoreResult<XdrValue> {
        match traversal {
            Traversal::Direct => self.read_descriptor(cursor, target),
            Traversal::Optional(inner) => {
                if cursor.read_bool()? {
                    Ok(XdrValue::Optional(Some(Box::new(
                        self.read_traversal(cursor, inner, target)?,
                    ))))
                } else {
                    Ok(XdrValue::Optional(None))
                }
            }
            Traversal::FixedArray { size, element } => (0..*size)
                .map(|_| self.read_traversal(cursor, element, target))
                .collect::<CoreResult<Vec<_>>>()
                .map(XdrValue::Array),
            Traversal::VarArray { max, element } => {
                let len = cursor.read_len(*max)?;
                let mut items = Vec::with_capacity(len.min(cursor.remaining() / 4));
                for _ in 0..len {
                    items.push(self.read_traversal(cursor, element, target)?);
                }
                Ok(XdrValue::Array(items))
            }
        }
    }
}
