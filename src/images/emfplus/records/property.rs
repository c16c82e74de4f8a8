//! Rendering property records.
//!
//! Apart from SetRenderingOrigin, these records carry their value in the
//! flags word and have no payload.

use super::{RecordBody, decode_empty, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use serde::Serialize;

wire_enum! {
    pub enum SmoothingMode: u8 {
        Default = 0,
        HighSpeed = 1,
        HighQuality = 2,
        None = 3,
        AntiAlias8x4 = 4,
        AntiAlias8x8 = 5,
    }
}

wire_enum! {
    pub enum TextRenderingHint: u8 {
        SystemDefault = 0,
        SingleBitPerPixelGridFit = 1,
        SingleBitPerPixel = 2,
        AntialiasGridFit = 3,
        Antialias = 4,
        ClearTypeGridFit = 5,
    }
}

wire_enum! {
    pub enum InterpolationMode: u8 {
        Default = 0,
        LowQuality = 1,
        HighQuality = 2,
        Bilinear = 3,
        Bicubic = 4,
        NearestNeighbor = 5,
        HighQualityBilinear = 6,
        HighQualityBicubic = 7,
    }
}

wire_enum! {
    pub enum PixelOffsetMode: u8 {
        Default = 0,
        HighSpeed = 1,
        HighQuality = 2,
        None = 3,
        Half = 4,
    }
}

wire_enum! {
    pub enum CompositingMode: u8 {
        SourceOver = 0,
        SourceCopy = 1,
    }
}

wire_enum! {
    pub enum CompositingQuality: u8 {
        Default = 1,
        HighSpeed = 2,
        HighQuality = 3,
        GammaCorrected = 4,
        AssumeLinear = 5,
    }
}

/// SetAntiAliasMode flags: anti-alias (1), SmoothingMode (7), reserved (8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AntiAliasFlags {
    pub anti_alias: bool,
    pub smoothing_mode: SmoothingMode,
}

impl DecodeFlags for AntiAliasFlags {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self> {
        let anti_alias = bits.read_bit()?;
        let smoothing_mode = SmoothingMode::parse("SmoothingMode", bits.read_bits(7)? as u8, offset)?;
        bits.read_remaining_bits();
        Ok(Self {
            anti_alias,
            smoothing_mode,
        })
    }
}

/// A flags word holding one 8-bit enumerated value, reserved (8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteFlags(u8);

impl DecodeFlags for ByteFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        let value = bits.read_bits(8)? as u8;
        bits.read_remaining_bits();
        Ok(Self(value))
    }
}

/// SetTextContrast flags: TextContrast (12), reserved (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextContrastFlags {
    pub contrast: u16,
}

impl DecodeFlags for TextContrastFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        let contrast = bits.read_bits(12)? as u16;
        bits.read_remaining_bits();
        Ok(Self { contrast })
    }
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let raw_flags = frame.header().flags;
    let offset = frame.flags_offset();
    let byte = || ByteFlags::parse(raw_flags, offset).map(|ByteFlags(value)| value);

    let body = match frame.record_type() {
        RecordType::SetRenderingOrigin => {
            return frame.decode_payload(cursor, SizeRule::fixed(0x08), |payload| {
                Ok(RecordBody::SetRenderingOrigin {
                    x: payload.read_i32()?,
                    y: payload.read_i32()?,
                })
            });
        },
        RecordType::SetAntiAliasMode => {
            let flags = AntiAliasFlags::parse(raw_flags, offset)?;
            RecordBody::SetAntiAliasMode {
                anti_alias: flags.anti_alias,
                smoothing_mode: flags.smoothing_mode,
            }
        },
        RecordType::SetTextRenderingHint => RecordBody::SetTextRenderingHint(
            TextRenderingHint::parse("TextRenderingHint", byte()?, offset)?,
        ),
        RecordType::SetTextContrast => {
            RecordBody::SetTextContrast(TextContrastFlags::parse(raw_flags, offset)?.contrast)
        },
        RecordType::SetInterpolationMode => RecordBody::SetInterpolationMode(
            InterpolationMode::parse("InterpolationMode", byte()?, offset)?,
        ),
        RecordType::SetPixelOffsetMode => RecordBody::SetPixelOffsetMode(
            PixelOffsetMode::parse("PixelOffsetMode", byte()?, offset)?,
        ),
        RecordType::SetCompositingMode => RecordBody::SetCompositingMode(
            CompositingMode::parse("CompositingMode", byte()?, offset)?,
        ),
        RecordType::SetCompositingQuality => RecordBody::SetCompositingQuality(
            CompositingQuality::parse("CompositingQuality", byte()?, offset)?,
        ),
        _ => return Err(misrouted(frame)),
    };
    decode_empty(frame, cursor, body)
}
