//! Binary data parsing utilities shared across formats.
//!
//! [`BinaryCursor`] is the forward-only cursor every record decoder reads
//! through, in EMF+ streams as well as in the EMF and WMF containers.

use crate::common::error::{Error, Result};
use zerocopy::{F32, FromBytes, I16, I32, LE, U16, U32};

#[inline]
fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    match offset.checked_add(len) {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(Error::OutOfData {
            offset,
            needed: len,
            available: data.len().saturating_sub(offset),
            record: None,
        }),
    }
}

/// Parse a UTF-16LE string of `char_count` code units.
///
/// Unpaired surrogates are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use emfplus::common::binary::parse_utf16le_string_len;
/// let data = vec![0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00];
/// assert_eq!(parse_utf16le_string_len(&data, 0, 5), "Hello");
/// assert_eq!(parse_utf16le_string_len(&data, 0, 3), "Hel");
/// ```
pub fn parse_utf16le_string_len(data: &[u8], offset: usize, char_count: usize) -> String {
    let Ok(bytes) = slice_at(data, offset, char_count.saturating_mul(2)) else {
        return String::new();
    };

    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Forward-only, position-tracked view over a byte buffer.
///
/// All multi-byte reads are little-endian. [`position`](Self::position) is
/// absolute: a cursor created with [`sub_cursor`](Self::sub_cursor) keeps
/// reporting offsets in terms of the outermost buffer, so size checks and
/// error offsets stay comparable across nesting levels.
#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> BinaryCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Create a cursor whose first byte sits at absolute offset `base`.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Absolute offset of the next byte to be read.
    #[inline]
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes left before the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `n` raw bytes, borrowing them from the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::OutOfData {
                offset: self.position(),
                needed: n,
                available: self.remaining(),
                record: None,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Consume `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Split off a cursor over the next `n` bytes and advance past them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<BinaryCursor<'a>> {
        let base = self.position();
        let bytes = self.read_bytes(n)?;
        Ok(BinaryCursor::with_base(bytes, base))
    }

    /// Read a fixed-layout structure.
    ///
    /// `T` is expected to use zerocopy's little-endian field types so that
    /// the result does not depend on host byte order.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let offset = self.position();
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::OutOfData {
            offset,
            needed: size,
            available: bytes.len(),
            record: None,
        })
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_struct::<U16<LE>>()?.get())
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_struct::<I16<LE>>()?.get())
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_struct::<U32<LE>>()?.get())
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_struct::<I32<LE>>()?.get())
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.read_struct::<F32<LE>>()?.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utf16le() {
        let data = [0x41, 0x00, 0x72, 0x00, 0x69, 0x00, 0x61, 0x00, 0x6C, 0x00];
        assert_eq!(parse_utf16le_string_len(&data, 0, 5), "Arial");
        assert_eq!(parse_utf16le_string_len(&data, 0, 6), "");
    }

    #[test]
    fn test_cursor_tracks_position() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x4035u16.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        data.extend_from_slice(&2.5f32.to_le_bytes());

        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x4035);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.read_i32().unwrap(), -7);
        assert_eq!(cursor.read_f32().unwrap(), 2.5);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_cursor_out_of_data() {
        let data = [1u8, 2, 3];
        let mut cursor = BinaryCursor::new(&data);
        cursor.skip(2).unwrap();
        assert_eq!(
            cursor.read_u16(),
            Err(Error::OutOfData {
                offset: 2,
                needed: 2,
                available: 1,
                record: None
            })
        );
        // A failed read does not move the cursor
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_sub_cursor_keeps_absolute_offsets() {
        let data = [0u8; 16];
        let mut cursor = BinaryCursor::new(&data);
        cursor.skip(4).unwrap();
        let mut inner = cursor.sub_cursor(8).unwrap();
        assert_eq!(cursor.position(), 12);
        assert_eq!(inner.position(), 4);
        inner.skip(6).unwrap();
        match inner.read_u32() {
            Err(Error::OutOfData { offset, .. }) => assert_eq!(offset, 10),
            other => panic!("unexpected {other:?}"),
        }
    }
}
