// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! XDR cursor for reading big-endian, 4-byte aligned data under limits.
//!
//! The cursor carries two live budgets: the remaining bytes it may consume
//! and the remaining nesting depth. Every read, skip and seek takes from the
//! byte budget; [`XdrCursor::with_limited_depth`] takes one level of depth for
//! the duration of a nested decode and gives it back afterwards.

use byteorder::{BigEndian, ByteOrder};

use crate::core::{CodecError, Result as CoreResult};

/// Default recursion depth when none is configured.
pub const DEFAULT_DEPTH_LIMIT: u32 = 500;

/// Read/write budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Remaining nesting depth
    pub depth: u32,
    /// Remaining byte budget
    pub len: usize,
}

impl Limits {
    /// No effective limits.
    pub fn none() -> Self {
        Self {
            depth: u32::MAX,
            len: usize::MAX,
        }
    }

    /// Limit depth only.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth,
            ..Self::none()
        }
    }

    /// Limit length only.
    pub fn len(len: usize) -> Self {
        Self {
            len,
            ..Self::none()
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::depth(DEFAULT_DEPTH_LIMIT)
    }
}

/// How a cursor discards bytes that are not materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipMode {
    /// Consume the bytes as if reading them
    #[default]
    Consume,
    /// Jump forward relative to the current position, bounded by the
    /// stream end recorded when the cursor was created
    Seek,
}

/// Number of zero bytes that follow `len` data bytes.
pub const fn padding_len(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// XDR cursor over an in-memory buffer.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use xdrcodec::encoding::xdr::cursor::{Limits, XdrCursor};
///
/// let data = [0x00, 0x00, 0x00, 0x2A];
/// let mut cursor = XdrCursor::new(&data, Limits::none());
/// assert_eq!(cursor.read_u32()?, 42);
/// assert!(cursor.is_at_end());
/// # Ok(())
/// # }
/// ```
pub struct XdrCursor<'a> {
    /// The data buffer
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Stream end recorded at construction, bounds seeking
    end: usize,
    /// Live budgets
    limits: Limits,
}

impl<'a> XdrCursor<'a> {
    /// Create a cursor over `data`.
    pub fn new(data: &'a [u8], limits: Limits) -> Self {
        Self {
            data,
            offset: 0,
            end: data.len(),
            limits,
        }
    }

    /// Get the current position.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    /// Check if the cursor is at the end of the buffer.
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.end
    }

    /// Get the live limits.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Take `len` bytes from the byte budget.
    pub fn consume_len(&mut self, len: usize) -> CoreResult<()> {
        match self.limits.len.checked_sub(len) {
            Some(rest) => {
                self.limits.len = rest;
                Ok(())
            }
            None => Err(CodecError::LengthLimitExceeded),
        }
    }

    /// Run `f` with one level of depth taken from the budget.
    ///
    /// Fails with `DepthExceeded` before `f` runs when the budget is spent.
    /// The level is returned whether `f` succeeds or not.
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

    /// Read a byte slice.
    pub fn read_bytes(&mut self, count: usize) -> CoreResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(CodecError::buffer_too_short(
                count as u64,
                self.offset as u64,
            ));
        }
        self.consume_len(count)?;
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a u32 value.
    pub fn read_u32(&mut self) -> CoreResult<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self) -> CoreResult<i32> {
        Ok(BigEndian::read_i32(self.read_bytes(4)?))
    }

    /// Read a u64 value.
    pub fn read_u64(&mut self) -> CoreResult<u64> {
        Ok(BigEndian::read_u64(self.read_bytes(8)?))
    }

    /// Read an i64 value.
    pub fn read_i64(&mut self) -> CoreResult<i64> {
        Ok(BigEndian::read_i64(self.read_bytes(8)?))
    }

    /// Read a 4-byte boolean; anything but 0 or 1 is invalid.
    pub fn read_bool(&mut self) -> CoreResult<bool> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::invalid(format!("bool value {other}"))),
        }
    }

    /// Read a length prefix and check it against `max` before anything else.
    pub fn read_len(&mut self, max: u32) -> CoreResult<usize> {
        let len = self.read_u32()?;
        if len > max {
            return Err(CodecError::length_exceeds_max(u64::from(len), max));
        }
        Ok(len as usize)
    }

    /// Read `len` data bytes followed by zero padding.
    pub fn read_padded(&mut self, len: usize) -> CoreResult<&'a [u8]> {
        let data = self.read_bytes(len)?;
        let padding = self.read_bytes(padding_len(len))?;
        if padding.iter().any(|&b| b != 0) {
            return Err(CodecError::NonZeroPadding);
        }
        Ok(data)
    }

    /// Discard `count` bytes using the given mode.
    pub fn skip(&mut self, count: usize, mode: SkipMode) -> CoreResult<()> {
        match mode {
            SkipMode::Consume => self.read_bytes(count).map(|_| ()),
            SkipMode::Seek => self.seek_relative(count),
        }
    }

    /// Move forward without touching the skipped bytes.
    pub fn seek_relative(&mut self, count: usize) -> CoreResult<()> {
        let target = self
            .offset
            .checked_add(count)
            .filter(|&t| t <= self.end)
            .ok_or_else(|| CodecError::buffer_too_short(count as u64, self.offset as u64))?;
        self.consume_len(count)?;
        self.offset = target;
        Ok(())
    }

    /// Probe for one more byte; succeeds only at end of input.
    ///
    /// The probe does not consume from the byte budget.
    pub fn ensure_at_end(&self) -> CoreResult<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(CodecError::TrailingData)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let data = [0u8; 8];
        let cursor = XdrCursor::new(&data, Limits::none());
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.remaining(), 8);
        assert!(!cursor.is_at_end());
    }

    #[test]
    fn test_read_integers_big_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&42u32.to_be_bytes());
        data.extend_from_slice(&(-2i32).to_be_bytes());
        data.extend_from_slice(&0x0102030405060708u64.to_be_bytes());
        data.extend_from_slice(&(-9i64).to_be_bytes());
        let mut cursor = XdrCursor::new(&data, Limits::none());
        assert_eq!(cursor.read_u32().unwrap(), 42);
        assert_eq!(cursor.read_i32().unwrap(), -2);
        assert_eq!(cursor.read_u64().unwrap(), 0x0102030405060708);
        assert_eq!(cursor.read_i64().unwrap(), -9);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_read_bool_rejects_other_values() {
        let data = [0, 0, 0, 1, 0, 0, 0, 2];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        assert!(cursor.read_bool().unwrap());
        assert!(matches!(cursor.read_bool(), Err(CodecError::Invalid { .. })));
    }

    #[test]
    fn test_buffer_too_short() {
        let data = [0, 0, 1];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        assert_eq!(
            cursor.read_u32().unwrap_err(),
            CodecError::buffer_too_short(4, 0)
        );
    }

    #[test]
    fn test_read_len_checks_bound_first() {
        let data = [0, 0, 0, 9];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        assert_eq!(
            cursor.read_len(8).unwrap_err(),
            CodecError::length_exceeds_max(9, 8)
        );
    }

    #[test]
    fn test_read_padded() {
        let data = [b'a', b'b', 0, 0];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        assert_eq!(cursor.read_padded(2).unwrap(), b"ab");
        assert!(cursor.is_at_end());

        let bad = [b'a', b'b', 0, 1];
        let mut cursor = XdrCursor::new(&bad, Limits::none());
        assert_eq!(
            cursor.read_padded(2).unwrap_err(),
            CodecError::NonZeroPadding
        );
    }

    #[test]
    fn test_padding_len() {
        assert_eq!(padding_len(0), 0);
        assert_eq!(padding_len(1), 3);
        assert_eq!(padding_len(4), 0);
        assert_eq!(padding_len(7), 1);
    }

    #[test]
    fn test_len_limit() {
        let data = [0u8; 8];
        let mut cursor = XdrCursor::new(&data, Limits::len(6));
        cursor.read_u32().unwrap();
        assert_eq!(
            cursor.read_u32().unwrap_err(),
            CodecError::LengthLimitExceeded
        );
    }

    #[test]
    fn test_depth_is_restored() {
        let data = [0u8; 4];
        let mut cursor = XdrCursor::new(&data, Limits::depth(1));
        cursor
            .with_limited_depth(|c| {
                assert_eq!(c.limits().depth, 0);
                let nested = c.with_limited_depth(|_| Ok(()));
                assert_eq!(nested.unwrap_err(), CodecError::DepthExceeded);
                Ok(())
            })
            .unwrap();
        assert_eq!(cursor.limits().depth, 1);

        let failed: CoreResult<()> =
            cursor.with_limited_depth(|_| Err(CodecError::invalid("boom")));
        assert!(failed.is_err());
        assert_eq!(cursor.limits().depth, 1);
    }

    #[test]
    fn test_seek_bounded_by_stream_end() {
        let data = [0u8; 8];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        cursor.skip(4, SkipMode::Seek).unwrap();
        assert_eq!(cursor.position(), 4);
        assert!(cursor.skip(8, SkipMode::Seek).is_err());
        assert_eq!(cursor.position(), 4);
        cursor.skip(4, SkipMode::Consume).unwrap();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_ensure_at_end() {
        let data = [0u8; 5];
        let mut cursor = XdrCursor::new(&data, Limits::none());
        cursor.read_u32().unwrap();
        assert_eq!(cursor.ensure_at_end().unwrap_err(), CodecError::TrailingData);
        assert_eq!(cursor.position(), 4);
    }
}
