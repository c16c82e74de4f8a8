//! Terminal server records: SetTSGraphics and SetTSClip.

use super::property::{
    CompositingMode, CompositingQuality, InterpolationMode, PixelOffsetMode, SmoothingMode,
    TextRenderingHint,
};
use super::{RecordBody, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::types::{Decode, Palette, RawTransformMatrix, RectL, TransformMatrix};
use serde::Serialize;
use std::mem::size_of;
use zerocopy::{I16, LE, U16};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

/// SetTSGraphics flags: HasPalette (1), BasicVgaColors (1), reserved (14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TsGraphicsFlags {
    pub has_palette: bool,
    pub basic_vga_colors: bool,
}

impl DecodeFlags for TsGraphicsFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        let has_palette = bits.read_bit()?;
        let basic_vga_colors = bits.read_bit()?;
        bits.read_remaining_bits();
        Ok(Self {
            has_palette,
            basic_vga_colors,
        })
    }
}

/// Full graphics state snapshot sent by a terminal server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TsGraphics {
    pub basic_vga_colors: bool,
    pub smoothing_mode: SmoothingMode,
    pub text_rendering_hint: TextRenderingHint,
    pub compositing_mode: CompositingMode,
    pub compositing_quality: CompositingQuality,
    pub render_origin_x: i16,
    pub render_origin_y: i16,
    pub text_contrast: u16,
    pub filter: InterpolationMode,
    pub pixel_offset_mode: PixelOffsetMode,
    pub world_to_device: TransformMatrix,
    pub palette: Option<Palette>,
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawTsGraphics {
    anti_alias_mode: u8,
    text_render_hint: u8,
    compositing_mode: u8,
    compositing_quality: u8,
    render_origin_x: I16<LE>,
    render_origin_y: I16<LE>,
    text_contrast: U16<LE>,
    filter_type: u8,
    pixel_offset: u8,
    world_to_device: RawTransformMatrix,
}

const TS_GRAPHICS_FIXED_SIZE: u32 = size_of::<RawTsGraphics>() as u32;

/// SetTSClip flags: NumRects (15), Compressed (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TsClipFlags {
    pub num_rects: u16,
    pub compressed: bool,
}

impl DecodeFlags for TsClipFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        let num_rects = bits.read_bits(15)? as u16;
        let compressed = bits.read_bit()?;
        Ok(Self {
            num_rects,
            compressed,
        })
    }
}

/// Clip rectangles in device coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TsClip {
    /// Whether the rectangles were stored as byte deltas
    pub compressed: bool,
    pub rects: Vec<RectL>,
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    match frame.record_type() {
        RecordType::SetTsGraphics => decode_ts_graphics(frame, cursor),
        RecordType::SetTsClip => decode_ts_clip(frame, cursor),
        _ => Err(misrouted(frame)),
    }
}

fn decode_ts_graphics(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let flags = TsGraphicsFlags::parse(frame.header().flags, frame.flags_offset())?;
    let data_size = frame.header().data_size;
    if !flags.has_palette && data_size != TS_GRAPHICS_FIXED_SIZE {
        return Err(frame.violation(format!(
            "DataSize {data_size:#x} without palette, expected {TS_GRAPHICS_FIXED_SIZE:#x}"
        )));
    }

    frame.decode_payload(cursor, SizeRule::Variable, |payload| {
        let base = payload.position();
        let raw: RawTsGraphics = payload.read_struct()?;
        let at = |field: usize| base + field;

        let palette = if flags.has_palette {
            let palette = Palette::decode(payload)
                .map_err(|e| e.into_size_violation(RecordType::SetTsGraphics, "palette"))?;
            let expected = TS_GRAPHICS_FIXED_SIZE as usize + palette.byte_len();
            if expected != data_size as usize {
                return Err(frame.violation(format!(
                    "DataSize {data_size:#x} does not match palette, expected {expected:#x}"
                )));
            }
            Some(palette)
        } else {
            None
        };

        Ok(RecordBody::SetTsGraphics(Box::new(TsGraphics {
            basic_vga_colors: flags.basic_vga_colors,
            smoothing_mode: SmoothingMode::parse("AntiAliasMode", raw.anti_alias_mode, at(0))?,
            text_rendering_hint: TextRenderingHint::parse(
                "TextRenderHint",
                raw.text_render_hint,
                at(1),
            )?,
            compositing_mode: CompositingMode::parse(
                "CompositingMode",
                raw.compositing_mode,
                at(2),
            )?,
            compositing_quality: CompositingQuality::parse(
                "CompositingQuality",
                raw.compositing_quality,
                at(3),
            )?,
            render_origin_x: raw.render_origin_x.get(),
            render_origin_y: raw.render_origin_y.get(),
            text_contrast: raw.text_contrast.get(),
            filter: InterpolationMode::parse("FilterType", raw.filter_type, at(10))?,
            pixel_offset_mode: PixelOffsetMode::parse("PixelOffset", raw.pixel_offset, at(11))?,
            world_to_device: raw.world_to_device.into(),
            palette,
        })))
    })
}

fn decode_ts_clip(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let flags = TsClipFlags::parse(frame.header().flags, frame.flags_offset())?;
    let rect_size: u32 = if flags.compressed { 4 } else { 8 };
    let rule = SizeRule::fixed(u32::from(flags.num_rects) * rect_size);

    frame.decode_payload(cursor, rule, |payload| {
        let mut rects = Vec::with_capacity(flags.num_rects as usize);
        let mut previous = RectL::default();
        for _ in 0..flags.num_rects {
            let rect = if flags.compressed {
                RectL {
                    left: previous.left + i32::from(payload.read_i8()?),
                    top: previous.top + i32::from(payload.read_i8()?),
                    right: previous.right + i32::from(payload.read_i8()?),
                    bottom: previous.bottom + i32::from(payload.read_i8()?),
                }
            } else {
                RectL {
                    left: i32::from(payload.read_u16()?),
                    top: i32::from(payload.read_u16()?),
                    right: i32::from(payload.read_u16()?),
                    bottom: i32::from(payload.read_u16()?),
                }
            };
            rects.push(rect);
            previous = rect;
        }
        Ok(RecordBody::SetTsClip(TsClip {
            compressed: flags.compressed,
            rects,
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::images::emfplus::records::decode_record;
    use crate::images::emfplus::test_support::{record, record_with_sizes};
    use crate::images::emfplus::types::Argb;

    fn ts_graphics_payload() -> Vec<u8> {
        let mut payload = vec![2u8, 4, 1, 3];
        payload.extend_from_slice(&(-5i16).to_le_bytes());
        payload.extend_from_slice(&7i16.to_le_bytes());
        payload.extend_from_slice(&1200u16.to_le_bytes());
        payload.extend_from_slice(&[7, 4]);
        for v in [2.0f32, 0.0, 0.0, 2.0, 10.0, 20.0] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload
    }

    #[test]
    fn test_ts_graphics_without_palette() {
        let payload = ts_graphics_payload();
        assert_eq!(payload.len(), 0x24);
        let data = record(0x4039, 0x0002, &payload);
        assert_eq!(data.len(), 0x30);

        let RecordBody::SetTsGraphics(graphics) =
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body
        else {
            panic!("expected SetTsGraphics");
        };
        assert!(graphics.basic_vga_colors);
        assert_eq!(graphics.smoothing_mode, SmoothingMode::HighQuality);
        assert_eq!(graphics.text_rendering_hint, TextRenderingHint::Antialias);
        assert_eq!(graphics.compositing_mode, CompositingMode::SourceCopy);
        assert_eq!(graphics.compositing_quality, CompositingQuality::HighQuality);
        assert_eq!(graphics.render_origin_x, -5);
        assert_eq!(graphics.text_contrast, 1200);
        assert_eq!(graphics.filter, InterpolationMode::HighQualityBicubic);
        assert_eq!(graphics.pixel_offset_mode, PixelOffsetMode::Half);
        assert_eq!(graphics.world_to_device.dy, 20.0);
        assert!(graphics.palette.is_none());
    }

    #[test]
    fn test_ts_graphics_with_palette() {
        let mut payload = ts_graphics_payload();
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&0xFF00_0000u32.to_le_bytes());
        payload.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        let data = record(0x4039, 0x0001, &payload);
        assert_eq!(data.len(), 0x30 + 16);

        let RecordBody::SetTsGraphics(graphics) =
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body
        else {
            panic!("expected SetTsGraphics");
        };
        let palette = graphics.palette.unwrap();
        assert_eq!(palette.entries, vec![Argb(0xFF00_0000), Argb(0xFFFF_FFFF)]);
    }

    #[test]
    fn test_ts_graphics_size_must_match_palette() {
        let data = record(0x4039, 0, &[ts_graphics_payload(), vec![0; 8]].concat());
        assert!(matches!(
            decode_record(&mut BinaryCursor::new(&data)),
            Err(Error::SizeInvariantViolation {
                record: RecordType::SetTsGraphics,
                ..
            })
        ));

        // Palette claims three entries, record carries two.
        let mut payload = ts_graphics_payload();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(&[0; 8]);
        let data = record(0x4039, 0x0001, &payload);
        assert!(matches!(
            decode_record(&mut BinaryCursor::new(&data)),
            Err(Error::SizeInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_ts_graphics_enum_offsets() {
        let mut payload = ts_graphics_payload();
        payload[10] = 9;
        let data = record(0x4039, 0, &payload);
        assert!(matches!(
            decode_record(&mut BinaryCursor::new(&data)),
            Err(Error::InvalidEnumValue {
                field: "FilterType",
                value: 9,
                offset: 22,
                record: Some(RecordType::SetTsGraphics)
            })
        ));
    }

    #[test]
    fn test_ts_clip_compressed_deltas_accumulate() {
        let payload = [10u8, 20, 30, 40, 1, 0xFF, 2, 0xFE];
        let data = record(0x403A, 0x8002, &payload);
        let RecordBody::SetTsClip(clip) =
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body
        else {
            panic!("expected SetTsClip");
        };
        assert!(clip.compressed);
        assert_eq!(
            clip.rects,
            vec![
                RectL {
                    left: 10,
                    top: 20,
                    right: 30,
                    bottom: 40
                },
                RectL {
                    left: 11,
                    top: 19,
                    right: 32,
                    bottom: 38
                },
            ]
        );
    }

    #[test]
    fn test_ts_clip_uncompressed() {
        let payload: Vec<u8> = [0u16, 0, 640, 480].iter().flat_map(|v| v.to_le_bytes()).collect();
        let data = record(0x403A, 0x0001, &payload);
        let RecordBody::SetTsClip(clip) =
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body
        else {
            panic!("expected SetTsClip");
        };
        assert!(!clip.compressed);
        assert_eq!(clip.rects[0].right, 640);
        assert_eq!(clip.rects[0].bottom, 480);
    }

    #[test]
    fn test_ts_clip_size_follows_flags() {
        // Two uncompressed rects declared, 8 bytes of data.
        let data = record_with_sizes(0x403A, 0x0002, 0x14, 0x08, &[0; 8]);
        assert!(matches!(
            decode_record(&mut BinaryCursor::new(&data)),
            Err(Error::SizeInvariantViolation {
                record: RecordType::SetTsClip,
                ..
            })
        ));
    }
}
