// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Iteration over sequences of encoded values.
//!
//! Two layouts are supported:
//! - Plain streams: values written back to back with nothing in between
//! - Framed streams: RFC 5531 record marking, where each record is one or
//!   more fragments with a 4-byte header (high bit = last fragment, low 31
//!   bits = fragment length) and each record holds exactly one value
//!
//! Iteration stops after the first error. A plain stream of a type that
//! encodes to zero bytes fails on its first value instead of repeating it.

use byteorder::{BigEndian, ByteOrder};

use crate::core::{CodecError, Result as CoreResult, XdrValue};

use super::cursor::{Limits, XdrCursor};
use super::decoder::XdrDecoder;

const LAST_FRAGMENT: u32 = 0x8000_0000;
const FRAGMENT_LEN_MASK: u32 = 0x7fff_ffff;

/// Iterator over values written back to back.
pub struct StreamIter<'g, 'a> {
    decoder: XdrDecoder<'g>,
    type_name: String,
    cursor: XdrCursor<'a>,
    done: bool,
}

impl<'g, 'a> StreamIter<'g, 'a> {
    /// Create an iterator decoding `type_name` values from `data`.
    ///
    /// The byte budget is shared across all values; depth applies per value.
    pub fn new(
        decoder: XdrDecoder<'g>,
        type_name: impl Into<String>,
        data: &'a [u8],
        limits: Limits,
    ) -> Self {
        Self {
            decoder,
            type_name: type_name.into(),
            cursor: XdrCursor::new(data, limits),
            done: false,
        }
    }
}

impl Iterator for StreamIter<'_, '_> {
    type Item = CoreResult<XdrValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor.is_at_end() {
            return None;
        }
        let start = self.cursor.position();
        let result = self
            .decoder
            .read_named(&mut self.cursor, &self.type_name)
            .and_then(|value| {
                if self.cursor.position() == start {
                    Err(CodecError::invalid(format!(
                        "'{}' encodes to zero bytes and cannot be streamed",
                        self.type_name
                    )))
                } else {
                    Ok(value)
                }
            });
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Iterator over RFC 5531 record-marked values.
pub struct FramedIter<'g, 'a> {
    decoder: XdrDecoder<'g>,
    type_name: String,
    data: &'a [u8],
    offset: usize,
    limits: Limits,
    done: bool,
}

impl<'g, 'a> FramedIter<'g, 'a> {
    /// Create an iterator decoding one `type_name` value per record.
    pub fn new(
        decoder: XdrDecoder<'g>,
        type_name: impl Into<String>,
        data: &'a [u8],
        limits: Limits,
    ) -> Self {
        Self {
            decoder,
            type_name: type_name.into(),
            data,
            offset: 0,
            limits,
            done: false,
        }
    }

    /// Reassemble the next record from its fragments.
    fn next_record(&mut self) -> CoreResult<Vec<u8>> {
        let mut record = Vec::new();
        loop {
            let header_end = self.offset + 4;
            if header_end > self.data.len() {
                return Err(CodecError::buffer_too_short(4, self.offset as u64));
            }
            let header = BigEndian::read_u32(&self.data[self.offset..header_end]);
            let len = (header & FRAGMENT_LEN_MASK) as usize;
            let end = header_end
                .checked_add(len)
                .filter(|&e| e <= self.data.len())
                .ok_or_else(|| CodecError::buffer_too_short(len as u64, header_end as u64))?;
            if record.len().saturating_add(len) > self.limits.len {
                return Err(CodecError::LengthLimitExceeded);
            }
            record.extend_from_slice(&self.data[header_end..end]);
            self.offset = end;
            if header & LAST_FRAGMENT != 0 {
                return Ok(record);
            }
        }
    }
}

impl Iterator for FramedIter<'_, '_> {
    type Item = CoreResult<XdrValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }
        let result = self.next_record().and_then(|record| {
            let mut cursor = XdrCursor::new(&record, self.limits);
            let value = self.decoder.read_named(&mut cursor, &self.type_name)?;
            cursor.ensure_at_end()?;
            Ok(value)
        });
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Wrap `payload` as a single-fragment record.
pub fn frame_record(payload: &[u8]) -> CoreResult<Vec<u8>> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|&n| n <= FRAGMENT_LEN_MASK)
        .ok_or_else(|| CodecError::length_exceeds_max(payload.len() as u64, FRAGMENT_LEN_MASK))?;
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.extend_from_slice(&(len | LAST_FRAGMENT).to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}
