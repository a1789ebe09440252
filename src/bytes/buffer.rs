//! Owned byte buffer backing all binary codecs.

use crate::bytes::cursor::{Cursor, CursorError, CursorMut, Endianness};

/// A contiguous, growable byte region.
///
/// A `Buffer` is only ever mutated through a [`CursorMut`]; read access goes
/// through a [`Cursor`]. File and network loading live outside this crate:
/// callers hand in already-materialized bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    pub(crate) data: Vec<u8>,
}

impl Buffer {
    /// Create a buffer that owns the given bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { data: bytes.into() }
    }

    /// Create a zero-filled buffer of length `size`.
    pub fn with_size(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Create an empty buffer with room reserved for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Borrow a sub-region as a read-only view. None if the range crosses
    /// the buffer length.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Option<&[u8]> {
        self.data.get(range)
    }

    /// Read-only cursor over the whole buffer.
    pub fn cursor(&self, endianness: Endianness) -> Cursor<'_> {
        Cursor::new(&self.data, endianness)
    }

    /// Read-only cursor over the first `size` bytes (a sub-region view of a
    /// larger container). Fails if `size` exceeds the buffer length.
    pub fn cursor_with_size(
        &self,
        endianness: Endianness,
        size: usize,
    ) -> Result<Cursor<'_>, CursorError> {
        if size > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos: 0,
                len: size,
                size: self.data.len(),
            });
        }
        Ok(Cursor::new(&self.data[..size], endianness))
    }

    /// Writable cursor; writes past the current length grow the buffer.
    pub fn cursor_mut(&mut self, endianness: Endianness) -> CursorMut<'_> {
        CursorMut::new(&mut self.data, endianness, None)
    }

    /// Writable cursor that will never grow the buffer past `limit` bytes.
    pub fn cursor_mut_limited(&mut self, endianness: Endianness, limit: usize) -> CursorMut<'_> {
        CursorMut::new(&mut self.data, endianness, Some(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let buf = Buffer::from_bytes(vec![1, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_with_size_zero_filled() {
        let buf = Buffer::with_size(4);
        assert_eq!(buf.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_slice() {
        let buf = Buffer::from_bytes(vec![1, 2, 3, 4]);
        assert_eq!(buf.slice(1..3), Some(&[2, 3][..]));
        assert_eq!(buf.slice(2..5), None);
    }

    #[test]
    fn test_cursor_with_size_bounds() {
        let buf = Buffer::from_bytes(vec![1, 2, 3]);
        assert!(buf.cursor_with_size(Endianness::Little, 2).is_ok());
        assert!(buf.cursor_with_size(Endianness::Little, 4).is_err());
    }
}
