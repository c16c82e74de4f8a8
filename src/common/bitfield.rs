//! Least-significant-first bit-group extraction from packed flag words.
//!
//! EMF+ packs several sub-fields into 16-bit record flags and a few 32-bit
//! words (graphics version, path point flags). A flags decoder wraps the raw
//! word in a [`BitField16`] or [`BitField32`], reads its named sub-fields in
//! order starting from bit 0, and finishes with
//! [`read_remaining_bits`](BitField::read_remaining_bits) for the reserved
//! tail, so that the word is consumed exactly once.

use crate::common::error::{Error, Result};

/// A fixed-width unsigned word being dispensed in bit groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField<const W: u32> {
    value: u32,
    consumed: u32,
}

/// Bit reader over a 16-bit flags word.
pub type BitField16 = BitField<16>;

/// Bit reader over a 32-bit packed value.
pub type BitField32 = BitField<32>;

impl BitField<16> {
    pub fn new(value: u16) -> Self {
        Self {
            value: u32::from(value),
            consumed: 0,
        }
    }
}

impl BitField<32> {
    pub fn new(value: u32) -> Self {
        Self { value, consumed: 0 }
    }
}

impl<const W: u32> BitField<W> {
    /// Width of the wrapped word in bits.
    pub const WIDTH: u32 = W;

    /// Bits not yet read.
    #[inline]
    pub fn remaining(&self) -> u32 {
        W - self.consumed
    }

    /// Bits read so far.
    #[inline]
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.consumed == W
    }

    /// Return the next `n` bits as an unsigned value.
    ///
    /// # Examples
    ///
    /// ```
    /// use emfplus::common::bitfield::BitField16;
    /// let mut bits = BitField16::new(0b1010_0011_0000_0101);
    /// assert_eq!(bits.read_bits(8).unwrap(), 0b0000_0101);
    /// assert_eq!(bits.read_bits(4).unwrap(), 0b0011);
    /// assert!(bits.read_bits(5).is_err());
    /// assert_eq!(bits.read_remaining_bits(), 0b1010);
    /// ```
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::BitFieldExhausted {
                requested: n,
                remaining,
                record: None,
            });
        }
        if n == 0 {
            return Ok(0);
        }

        let mask = if n == 32 { u32::MAX } else { (1u32 << n) - 1 };
        let bits = (self.value >> self.consumed) & mask;
        self.consumed += n;
        Ok(bits)
    }

    /// Read a single bit as a boolean.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Drain whatever is left (reserved or padding bits). Never fails.
    pub fn read_remaining_bits(&mut self) -> u32 {
        let remaining = self.remaining();
        if remaining == 0 {
            return 0;
        }
        let bits = self.value >> self.consumed;
        self.consumed = W;
        bits
    }
}

/// A record flags word decoded into named sub-fields.
///
/// Implementations read their fields from `bits` and end with
/// [`BitField::read_remaining_bits`]; `offset` is the absolute position of
/// the flags word and is used for error reporting only.
pub trait DecodeFlags: Sized {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self>;

    /// Decode a raw flags word.
    fn parse(raw: u16, offset: usize) -> Result<Self> {
        let mut bits = BitField16::new(raw);
        let flags = Self::from_bits(&mut bits, offset)?;
        debug_assert!(bits.is_exhausted(), "flags decoder left bits unread");
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fields_are_lsb_first() {
        let mut bits = BitField16::new(0x8A03);
        assert_eq!(bits.read_bits(8).unwrap(), 0x03);
        assert_eq!(bits.read_bits(7).unwrap(), 0x0A);
        assert!(bits.read_bit().unwrap());
        assert!(bits.is_exhausted());
    }

    #[test]
    fn test_full_width_reads() {
        let mut bits = BitField32::new(0xDBC0_1002);
        assert_eq!(bits.read_bits(32).unwrap(), 0xDBC0_1002);
        assert_eq!(bits.remaining(), 0);
        assert_eq!(bits.read_remaining_bits(), 0);
        assert_eq!(
            bits.read_bits(1),
            Err(Error::BitFieldExhausted {
                requested: 1,
                remaining: 0,
                record: None
            })
        );
    }

    #[test]
    fn test_exhaustion_does_not_consume() {
        let mut bits = BitField16::new(0xFFFF);
        bits.read_bits(10).unwrap();
        assert!(bits.read_bits(7).is_err());
        assert_eq!(bits.consumed(), 10);
        assert_eq!(bits.read_bits(6).unwrap(), 0x3F);
    }

    proptest! {
        #[test]
        fn prop_split_reads_reassemble_word(value in any::<u32>(), widths in prop::collection::vec(0u32..=6, 0..6)) {
            let mut bits = BitField32::new(value);
            let mut rebuilt = 0u64;
            let mut shift = 0u32;
            for width in widths {
                let part = bits.read_bits(width).unwrap();
                rebuilt |= u64::from(part) << shift;
                shift += width;
            }
            rebuilt |= u64::from(bits.read_remaining_bits()) << shift;
            prop_assert!(bits.is_exhausted());
            prop_assert_eq!(rebuilt, u64::from(value));
        }
    }
}
