//! Position-tracked, bounds-checked views over a byte buffer.
//!
//! Every file-format decoder in the application reads through [`Cursor`] and
//! writes through [`CursorMut`]. Scalar accesses honor the configured
//! endianness and advance the position by the type's byte width; any access
//! that would cross the logical size fails instead of truncating.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

/// Byte order for scalar reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("access of {len} bytes at position {pos} is out of bounds for size {size}")]
    OutOfBounds { pos: usize, len: usize, size: usize },
    #[error("unterminated string at position {pos}")]
    UnterminatedString { pos: usize },
    #[error("unencodable string at position {pos}")]
    UnencodableString { pos: usize },
}

/// Read-only cursor. Invariant: `position <= size` at all times.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            pos: 0,
            endianness,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn has_bytes_left(&self) -> bool {
        self.pos < self.data.len()
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), CursorError> {
        if pos > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn seek_relative(&mut self, delta: i64) -> Result<(), CursorError> {
        let target = self.pos as i64 + delta;
        if target < 0 || target as usize > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos: target.max(0) as usize,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = target as usize;
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CursorError> {
        let end = self.pos.checked_add(len).ok_or(CursorError::OutOfBounds {
            pos: self.pos,
            len,
            size: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos: self.pos,
                len,
                size: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Bulk read of `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], CursorError> {
        self.take(len)
    }

    pub fn u8(&mut self) -> Result<u8, CursorError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, CursorError> {
        let b = self.take(2)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(b),
            Endianness::Big => BigEndian::read_u16(b),
        })
    }

    pub fn u32(&mut self) -> Result<u32, CursorError> {
        let b = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u32(b),
            Endianness::Big => BigEndian::read_u32(b),
        })
    }

    pub fn i32(&mut self) -> Result<i32, CursorError> {
        let b = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_i32(b),
            Endianness::Big => BigEndian::read_i32(b),
        })
    }

    pub fn f32(&mut self) -> Result<f32, CursorError> {
        let b = self.take(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_f32(b),
            Endianness::Big => BigEndian::read_f32(b),
        })
    }

    /// NUL-terminated string, one char per byte. Consumes the terminator.
    pub fn cstr(&mut self) -> Result<String, CursorError> {
        let start = self.pos;
        match self.data[self.pos..].iter().position(|&b| b == 0) {
            Some(n) => {
                let s = self.data[start..start + n]
                    .iter()
                    .map(|&b| b as char)
                    .collect();
                self.pos = start + n + 1;
                Ok(s)
            }
            None => Err(CursorError::UnterminatedString { pos: start }),
        }
    }
}

/// Writable cursor. Writes past the buffer's current length grow it in
/// place, preserving prior content; an optional `limit` caps growth.
#[derive(Debug)]
pub struct CursorMut<'a> {
    data: &'a mut Vec<u8>,
    pos: usize,
    endianness: Endianness,
    limit: Option<usize>,
}

impl<'a> CursorMut<'a> {
    pub fn new(data: &'a mut Vec<u8>, endianness: Endianness, limit: Option<usize>) -> Self {
        Self {
            data,
            pos: 0,
            endianness,
            limit,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), CursorError> {
        if pos > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn seek_relative(&mut self, delta: i64) -> Result<(), CursorError> {
        let target = self.pos as i64 + delta;
        if target < 0 || target as usize > self.data.len() {
            return Err(CursorError::OutOfBounds {
                pos: target.max(0) as usize,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = target as usize;
        Ok(())
    }

    fn reserve(&mut self, len: usize) -> Result<usize, CursorError> {
        let end = self.pos.checked_add(len).ok_or(CursorError::OutOfBounds {
            pos: self.pos,
            len,
            size: self.data.len(),
        })?;
        if let Some(limit) = self.limit {
            if end > limit {
                return Err(CursorError::OutOfBounds {
                    pos: self.pos,
                    len,
                    size: limit,
                });
            }
        }
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        Ok(end)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CursorError> {
        let end = self.reserve(bytes.len())?;
        self.data[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), CursorError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), CursorError> {
        let mut b = [0u8; 2];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u16(&mut b, value),
            Endianness::Big => BigEndian::write_u16(&mut b, value),
        }
        self.write_bytes(&b)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), CursorError> {
        let mut b = [0u8; 4];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u32(&mut b, value),
            Endianness::Big => BigEndian::write_u32(&mut b, value),
        }
        self.write_bytes(&b)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), CursorError> {
        let mut b = [0u8; 4];
        match self.endianness {
            Endianness::Little => LittleEndian::write_i32(&mut b, value),
            Endianness::Big => BigEndian::write_i32(&mut b, value),
        }
        self.write_bytes(&b)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CursorError> {
        let mut b = [0u8; 4];
        match self.endianness {
            Endianness::Little => LittleEndian::write_f32(&mut b, value),
            Endianness::Big => BigEndian::write_f32(&mut b, value),
        }
        self.write_bytes(&b)
    }

    /// NUL-terminated string, one byte per char, terminator included. Chars
    /// above U+00FF and embedded NULs have no wire form and fail without
    /// writing anything.
    pub fn write_cstr(&mut self, value: &str) -> Result<(), CursorError> {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        for c in value.chars() {
            let b = u32::from(c);
            if b == 0 || b > 0xFF {
                return Err(CursorError::UnencodableString { pos: self.pos });
            }
            bytes.push(b as u8);
        }
        bytes.push(0);
        self.write_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::Buffer;

    #[test]
    fn test_scalar_roundtrip_both_endiannesses() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let mut buf = Buffer::with_capacity(32);
            let mut cur = buf.cursor_mut(endianness);
            cur.write_u8(0xAB).unwrap();
            cur.write_u16(0xBEEF).unwrap();
            cur.write_u32(0xDEADBEEF).unwrap();
            cur.write_i32(-123456).unwrap();
            cur.write_f32(808.9).unwrap();

            let mut cur = buf.cursor(endianness);
            assert_eq!(cur.u8().unwrap(), 0xAB);
            assert_eq!(cur.u16().unwrap(), 0xBEEF);
            assert_eq!(cur.u32().unwrap(), 0xDEADBEEF);
            assert_eq!(cur.i32().unwrap(), -123456);
            assert_eq!(cur.f32().unwrap(), 808.9);
            assert!(!cur.has_bytes_left());
        }
    }

    #[test]
    fn test_endianness_byte_order() {
        let mut buf = Buffer::with_capacity(2);
        buf.cursor_mut(Endianness::Little).write_u16(0x0102).unwrap();
        assert_eq!(buf.as_bytes(), &[0x02, 0x01]);

        let mut buf = Buffer::with_capacity(2);
        buf.cursor_mut(Endianness::Big).write_u16(0x0102).unwrap();
        assert_eq!(buf.as_bytes(), &[0x01, 0x02]);
    }

    #[test]
    fn test_read_out_of_bounds() {
        let buf = Buffer::from_bytes(vec![1, 2, 3]);
        let mut cur = buf.cursor(Endianness::Little);
        assert_eq!(cur.u16().unwrap(), 0x0201);
        assert_eq!(
            cur.u16(),
            Err(CursorError::OutOfBounds {
                pos: 2,
                len: 2,
                size: 3
            })
        );
        // Position is untouched by the failed read.
        assert_eq!(cur.position(), 2);
        assert_eq!(cur.u8().unwrap(), 3);
    }

    #[test]
    fn test_seek_bounds() {
        let buf = Buffer::from_bytes(vec![0; 8]);
        let mut cur = buf.cursor(Endianness::Little);
        cur.seek(8).unwrap();
        assert!(!cur.has_bytes_left());
        assert!(cur.seek(9).is_err());
        cur.seek_relative(-8).unwrap();
        assert_eq!(cur.position(), 0);
        assert!(cur.seek_relative(-1).is_err());
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn test_size_override_restricts_reads() {
        let buf = Buffer::from_bytes(vec![1, 2, 3, 4]);
        let mut cur = buf.cursor_with_size(Endianness::Little, 2).unwrap();
        assert_eq!(cur.size(), 2);
        assert_eq!(cur.u16().unwrap(), 0x0201);
        assert!(cur.u8().is_err());
    }

    #[test]
    fn test_write_grows_buffer() {
        let mut buf = Buffer::from_bytes(vec![9, 9]);
        let mut cur = buf.cursor_mut(Endianness::Little);
        cur.seek(2).unwrap();
        cur.write_u32(0x04030201).unwrap();
        assert_eq!(buf.as_bytes(), &[9, 9, 1, 2, 3, 4]);
    }

    #[test]
    fn test_write_limit_enforced() {
        let mut buf = Buffer::with_capacity(8);
        let mut cur = buf.cursor_mut_limited(Endianness::Little, 3);
        cur.write_u16(1).unwrap();
        assert!(matches!(
            cur.write_u16(2),
            Err(CursorError::OutOfBounds { .. })
        ));
        cur.write_u8(7).unwrap();
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_overwrite_preserves_surrounding_content() {
        let mut buf = Buffer::from_bytes(vec![1, 2, 3, 4]);
        let mut cur = buf.cursor_mut(Endianness::Little);
        cur.seek(1).unwrap();
        cur.write_u8(0xFF).unwrap();
        assert_eq!(buf.as_bytes(), &[1, 0xFF, 3, 4]);
    }

    #[test]
    fn test_cstr_roundtrip() {
        let mut buf = Buffer::with_capacity(16);
        buf.cursor_mut(Endianness::Little)
            .write_cstr("quest")
            .unwrap();
        assert_eq!(buf.len(), 6);
        let mut cur = buf.cursor(Endianness::Little);
        assert_eq!(cur.cstr().unwrap(), "quest");
        assert!(!cur.has_bytes_left());
    }

    #[test]
    fn test_cstr_rejects_unencodable_chars() {
        let mut buf = Buffer::with_capacity(8);
        let mut cur = buf.cursor_mut(Endianness::Little);
        assert_eq!(
            cur.write_cstr("a\0b"),
            Err(CursorError::UnencodableString { pos: 0 })
        );
        assert_eq!(
            cur.write_cstr("\u{0100}"),
            Err(CursorError::UnencodableString { pos: 0 })
        );
        // Nothing was written by the failed calls.
        assert!(buf.is_empty());
    }

    #[test]
    fn test_cstr_unterminated() {
        let buf = Buffer::from_bytes(vec![b'a', b'b']);
        let mut cur = buf.cursor(Endianness::Little);
        assert_eq!(cur.cstr(), Err(CursorError::UnterminatedString { pos: 0 }));
    }

    #[test]
    fn test_bulk_bytes() {
        let buf = Buffer::from_bytes(vec![1, 2, 3, 4]);
        let mut cur = buf.cursor(Endianness::Little);
        assert_eq!(cur.bytes(3).unwrap(), &[1, 2, 3]);
        assert_eq!(cur.remaining(), 1);
        assert!(cur.bytes(2).is_err());
    }
}
