// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR writer and schema-driven value encoder.

use byteorder::{BigEndian, WriteBytesExt};

use crate::core::{CodecError, Result as CoreResult, XdrValue};
use crate::schema::{FieldType, PrimitiveType, TypeGraph, TypeNode};

use super::cursor::{padding_len, Limits};

/// Default initial capacity for the writer buffer.
const DEFAULT_CAPACITY: usize = 64;

/// XDR writer producing big-endian, zero-padded output under limits.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use xdrcodec::encoding::xdr::cursor::Limits;
/// use xdrcodec::encoding::xdr::encoder::XdrWriter;
///
/// let mut writer = XdrWriter::new(Limits::none());
/// writer.write_u32(42)?.write_padded(b"hi")?;
/// assert_eq!(writer.finish(), vec![0, 0, 0, 42, b'h', b'i', 0, 0]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct XdrWriter {
    /// Output buffer
    buffer: Vec<u8>,
    /// Live budgets
    limits: Limits,
}

impl XdrWriter {
    /// Create a writer with the given limits.
    pub fn new(limits: Limits) -> Self {
        Self {
            buffer: Vec::with_capacity(DEFAULT_CAPACITY),
            limits,
        }
    }

    /// Get the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the live limits.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    fn consume_len(&mut self, len: usize) -> CoreResult<()> {
        match self.limits.len.checked_sub(len) {
            Some(rest) => {
                self.limits.len = rest;
                Ok(())
            }
            None => Err(CodecError::LengthLimitExceeded),
        }
    }

    /// Run `f` with one level of depth taken from the budget.
    pub fn with_limited_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> CoreResult<T>,
    ) -> CoreResult<T> {
        if self.limits.depth == 0 {
            return Err(CodecError::DepthExceeded);
        }
        self.limits.depth -= 1;
        let result = f(self);
        self.limits.depth = self.limits.depth.saturating_add(1);
        result
    }

    /// Write a u32 value.
    pub fn write_u32(&mut self, value: u32) -> CoreResult<&mut Self> {
        self.consume_len(4)?;
        self.buffer.write_u32::<BigEndian>(value)?;
        Ok(self)
    }

    /// Write an i32 value.
    pub fn write_i32(&mut self, value: i32) -> CoreResult<&mut Self> {
        self.consume_len(4)?;
        self.buffer.write_i32::<BigEndian>(value)?;
        Ok(self)
    }

    /// Write a u64 value.
    pub fn write_u64(&mut self, value: u64) -> CoreResult<&mut Self> {
        self.consume_len(8)?;
        self.buffer.write_u64::<BigEndian>(value)?;
        Ok(self)
    }

    /// Write an i64 value.
    pub fn write_i64(&mut self, value: i64) -> CoreResult<&mut Self> {
        self.consume_len(8)?;
        self.buffer.write_i64::<BigEndian>(value)?;
        Ok(self)
    }

    /// Write a 4-byte boolean.
    pub fn write_bool(&mut self, value: bool) -> CoreResult<&mut Self> {
        self.write_u32(u32::from(value))
    }

    /// Write a length prefix, checking it against `max`.
    pub fn write_len(&mut self, len: usize, max: u32) -> CoreResult<&mut Self> {
        match u32::try_from(len) {
            Ok(n) if n <= max => self.write_u32(n),
            _ => Err(CodecError::length_exceeds_max(len as u64, max)),
        }
    }

    /// Write data followed by zero padding to a 4-byte boundary.
    pub fn write_padded(&mut self, data: &[u8]) -> CoreResult<&mut Self> {
        let padding = padding_len(data.len());
        self.consume_len(data.len() + padding)?;
        self.buffer.extend_from_slice(data);
        self.buffer.extend(std::iter::repeat(0u8).take(padding));
        Ok(self)
    }

    /// Consume the writer and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Schema-driven XDR encoder.
#[derive(Clone, Copy)]
pub struct XdrEncoder<'g> {
    graph: &'g TypeGraph,
}

impl<'g> XdrEncoder<'g> {
    /// Create an encoder over `graph`.
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph }
    }

    /// Write a value of the named type.
    pub fn write_named(
        &self,
        writer: &mut XdrWriter,
        name: &str,
        value: &XdrValue,
    ) -> CoreResult<()> {
        let node = self.graph.node(name)?;
        writer.with_limited_depth(|w| self.write_node(w, name, node, value))
    }

    fn write_node(
        &self,
        writer: &mut XdrWriter,
        name: &str,
        node: &TypeNode,
        value: &XdrValue,
    ) -> CoreResult<()> {
        match (node, value) {
            (TypeNode::Struct { fields }, XdrValue::Struct(values)) => {
                if values.len() != fields.len() {
                    return Err(CodecError::invalid(format!(
                        "'{name}' has {} fields, value has {}",
                        fields.len(),
                        values.len()
                    )));
                }
                for field in fields {
                    let member = value.field(&field.name).ok_or_else(|| {
                        CodecError::invalid(format!("missing field '{}' of '{name}'", field.name))
                    })?;
                    self.write_field(writer, &field.field_type, member)?;
                }
                Ok(())
            }
            (TypeNode::Enum { members }, XdrValue::Enum { name: member, .. }) => {
                let found = members.iter().find(|m| &m.name == member).ok_or_else(|| {
                    CodecError::invalid(format!("'{member}' is not a member of '{name}'"))
                })?;
                writer.write_i32(found.value)?;
                Ok(())
            }
            (TypeNode::Union { arms, .. }, XdrValue::Union { case, payload, .. }) => {
                let arm = arms.iter().find(|a| &a.label() == case).ok_or_else(|| {
                    CodecError::invalid(format!("'{case}' is not a case of '{name}'"))
                })?;
                // Discriminants are 32-bit on the wire; u32 values above i32::MAX
                // keep their bit pattern.
                writer.write_u32(arm.value as u32)?;
                match (&arm.payload, payload) {
                    (Some(field_type), Some(inner)) => self.write_field(writer, field_type, inner),
                    (None, None) => Ok(()),
                    (Some(_), None) => Err(CodecError::invalid(format!(
                        "case '{case}' of '{name}' needs a payload"
                    ))),
                    (None, Some(_)) => Err(CodecError::invalid(format!(
                        "case '{case}' of '{name}' is void"
                    ))),
                }
            }
            (TypeNode::Typedef { underlying }, value) => self.write_field(writer, underlying, value),
            (node, value) => Err(mismatch(node.kind_str(), value)),
        }
    }

    /// Write a value of an inline field type.
    pub fn write_field(
        &self,
        writer: &mut XdrWriter,
        field_type: &FieldType,
        value: &XdrValue,
    ) -> CoreResult<()> {
        match (field_type, value) {
            (FieldType::Primitive(PrimitiveType::Bool), XdrValue::Bool(v)) => {
                writer.write_bool(*v)?;
            }
            (FieldType::Primitive(PrimitiveType::Int), XdrValue::Int(v)) => {
                writer.write_i32(*v)?;
            }
            (FieldType::Primitive(PrimitiveType::UnsignedInt), XdrValue::UInt(v)) => {
                writer.write_u32(*v)?;
            }
            (FieldType::Primitive(PrimitiveType::Hyper), XdrValue::Hyper(v)) => {
                writer.write_i64(*v)?;
            }
            (FieldType::Primitive(PrimitiveType::UnsignedHyper), XdrValue::UHyper(v)) => {
                writer.write_u64(*v)?;
            }
            (FieldType::OpaqueFixed(size), XdrValue::Opaque(bytes)) => {
                if bytes.len() != *size as usize {
                    return Err(CodecError::invalid(format!(
                        "opaque[{size}] given {} bytes",
                        bytes.len()
                    )));
                }
                writer.write_padded(bytes)?;
            }
            (FieldType::Opaque { max }, XdrValue::Opaque(bytes)) => {
                writer.write_len(bytes.len(), *max)?.write_padded(bytes)?;
            }
            (FieldType::String { max }, XdrValue::String(text)) => {
                writer
                    .write_len(text.len(), *max)?
                    .write_padded(text.as_bytes())?;
            }
            (FieldType::Named(name), value) => self.write_named(writer, name, value)?,
            (FieldType::Array { element, size }, XdrValue::Array(items)) => {
                if items.len() != *size as usize {
                    return Err(CodecError::invalid(format!(
                        "array of {size} given {} elements",
                        items.len()
                    )));
                }
                for item in items {
                    self.write_field(writer, element, item)?;
                }
            }
            (FieldType::VarArray { element, max }, XdrValue::Array(items)) => {
                writer.write_len(items.len(), *max)?;
                for item in items {
                    self.write_field(writer, element, item)?;
                }
            }
            (FieldType::Optional(inner), XdrValue::Optional(present)) => match present {
                Some(item) => {
                    writer.write_bool(true)?;
                    self.write_field(writer, inner, item)?;
                }
                None => {
                    writer.write_bool(false)?;
                }
            },
            (field_type, value) => return Err(mismatch(&field_type.to_string(), value)),
        }
        Ok(())
    }
}

fn mismatch(expected: &str, value: &XdrValue) -> CodecError {
    CodecError::invalid(format!(
        "expected {expected}, found {} value",
        value.type_name()
    ))
}
