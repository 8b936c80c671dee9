// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR (RFC 4506) wire format: cursor, writer, full decoder/encoder and
//! stream iteration.

pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod stream;

pub use cursor::{Limits, SkipMode, XdrCursor, DEFAULT_DEPTH_LIMIT};
pub use decoder::XdrDecoder;
pub use encoder::{XdrEncoder, XdrWriter};
pub use stream::{frame_record, FramedIter, StreamIter};

use crate::core::{Result, XdrValue};
use crate::schema::TypeGraph;

/// Full codec for every type of one graph.
///
/// Pairs the decoder and encoder with the limits applied to each call.
#[derive(Clone, Copy)]
pub struct XdrCodec<'g> {
    graph: &'g TypeGraph,
    limits: Limits,
}

impl<'g> XdrCodec<'g> {
    /// Create a codec with the given limits.
    pub fn new(graph: &'g TypeGraph, limits: Limits) -> Self {
        Self { graph, limits }
    }

    /// Get the limits applied to each call.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Get the decoder.
    pub fn decoder(&self) -> XdrDecoder<'g> {
        XdrDecoder::new(self.graph)
    }

    /// Get the encoder.
    pub fn encoder(&self) -> XdrEncoder<'g> {
        XdrEncoder::new(self.graph)
    }

    /// Decode a value that must occupy the whole buffer.
    pub fn read_to_end(&self, type_name: &str, data: &[u8]) -> Result<XdrValue> {
        let mut cursor = XdrCursor::new(data, self.limits);
        let value = self.decoder().read_named(&mut cursor, type_name)?;
        cursor.ensure_at_end()?;
        Ok(value)
    }

    /// Decode one value from the front of the buffer.
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn read_prefix(&self, type_name: &str, data: &[u8]) -> Result<(XdrValue, usize)> {
        let mut cursor = XdrCursor::new(data, self.limits);
        let value = self.decoder().read_named(&mut cursor, type_name)?;
        Ok((value, cursor.position()))
    }

    /// Skip one value from the front of the buffer, returning its size.
    pub fn skip_prefix(&self, type_name: &str, data: &[u8], mode: SkipMode) -> Result<usize> {
        let mut cursor = XdrCursor::new(data, self.limits);
        self.decoder().skip_named(&mut cursor, type_name, mode)?;
        Ok(cursor.position())
    }

    /// Encode a value.
    pub fn write(&self, type_name: &str, value: &XdrValue) -> Result<Vec<u8>> {
        let mut writer = XdrWriter::new(self.limits);
        self.encoder().write_named(&mut writer, type_name, value)?;
        Ok(writer.finish())
    }

    /// Iterate over values written back to back.
    pub fn iter_stream<'a>(&self, type_name: &str, data: &'a [u8]) -> StreamIter<'g, 'a> {
        StreamIter::new(self.decoder(), type_name, data, self.limits)
    }

    /// Iterate over record-marked values.
    pub fn iter_framed<'a>(&self, type_name: &str, data: &'a [u8]) -> FramedIter<'g, 'a> {
        FramedIter::new(self.decoder(), type_name, data, self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodecError;
    use crate::schema::{Field, FieldType, PrimitiveType, TypeDefinition, TypeNode};

    fn graph() -> TypeGraph {
        TypeGraph::new(vec![
            TypeDefinition::new(
                "Count",
                TypeNode::Typedef {
                    underlying: FieldType::Primitive(PrimitiveType::UnsignedInt),
                },
            ),
            TypeDefinition::new(
                "Blob",
                TypeNode::Struct {
                    fields: vec![Field::new("data", FieldType::Opaque { max: 8 })],
                },
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_read_to_end_rejects_trailing() {
        let graph = graph();
        let codec = XdrCodec::new(&graph, Limits::default());
        assert_eq!(
            codec.read_to_end("Count", &[0, 0, 0, 7]).unwrap(),
            XdrValue::UInt(7)
        );
        assert_eq!(
            codec.read_to_end("Count", &[0, 0, 0, 7, 0]).unwrap_err(),
            CodecError::TrailingData
        );
    }

    #[test]
    fn test_write_then_read() {
        let graph = graph();
        let codec = XdrCodec::new(&graph, Limits::default());
        let value = XdrValue::Struct(vec![("data".into(), XdrValue::Opaque(vec![9; 5]))]);
        let bytes = codec.write("Blob", &value).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(codec.read_to_end("Blob", &bytes).unwrap(), value);
    }

    #[test]
    fn test_prefix_sizes_agree() {
        let graph = graph();
        let codec = XdrCodec::new(&graph, Limits::default());
        let mut data = vec![0, 0, 0, 3, 1, 2, 3, 0];
        data.extend_from_slice(&[0xaa; 4]);
        let (_, read) = codec.read_prefix("Blob", &data).unwrap();
        let skipped = codec.skip_prefix("Blob", &data, SkipMode::Seek).unwrap();
        assert_eq!(read, 8);
        assert_eq!(skipped, 8);
    }

    #[test]
    fn test_unknown_type() {
        let graph = graph();
        let codec = XdrCodec::new(&graph, Limits::default());
        assert_eq!(
            codec.read_to_end("Nope", &[]).unwrap_err(),
            CodecError::type_not_found("Nope")
        );
    }
}
