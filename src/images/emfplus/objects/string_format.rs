//! String format objects.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use crate::images::emfplus::types::{Decode, GraphicsVersion, ensure_elements};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct StringFormatFlags: u32 {
        const DIRECTION_RIGHT_TO_LEFT = 0x0000_0001;
        const DIRECTION_VERTICAL = 0x0000_0002;
        const NO_FIT_BLACK_BOX = 0x0000_0004;
        const DISPLAY_FORMAT_CONTROL = 0x0000_0020;
        const NO_FONT_FALLBACK = 0x0000_0400;
        const MEASURE_TRAILING_SPACES = 0x0000_0800;
        const NO_WRAP = 0x0000_1000;
        const LINE_LIMIT = 0x0000_2000;
        const NO_CLIP = 0x0000_4000;
        const BYPASS_GDI = 0x8000_0000;
    }
}

wire_enum! {
    pub enum StringAlignment: u32 {
        Near = 0,
        Center = 1,
        Far = 2,
    }
}

wire_enum! {
    pub enum StringDigitSubstitution: u32 {
        User = 0,
        None = 1,
        National = 2,
        Traditional = 3,
    }
}

wire_enum! {
    pub enum HotkeyPrefix: u32 {
        None = 0,
        Show = 1,
        Hide = 2,
    }
}

wire_enum! {
    pub enum StringTrimming: u32 {
        None = 0,
        Character = 1,
        Word = 2,
        EllipsisCharacter = 3,
        EllipsisWord = 4,
        EllipsisPath = 5,
    }
}

/// A run of characters, as `(first, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterRange {
    pub first: i32,
    pub length: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringFormatObject {
    pub version: GraphicsVersion,
    pub flags: StringFormatFlags,
    pub language: u32,
    pub alignment: StringAlignment,
    pub line_alignment: StringAlignment,
    pub digit_substitution: StringDigitSubstitution,
    pub digit_language: u32,
    pub first_tab_offset: f32,
    pub hotkey_prefix: HotkeyPrefix,
    pub leading_margin: f32,
    pub trailing_margin: f32,
    pub tracking: f32,
    pub trimming: StringTrimming,
    pub tab_stops: Vec<f32>,
    pub char_ranges: Vec<CharacterRange>,
}

fn read_u32_enum<T>(
    cursor: &mut BinaryCursor<'_>,
    field: &'static str,
    parse: fn(&'static str, u32, usize) -> Result<T>,
) -> Result<T> {
    let offset = cursor.position();
    parse(field, cursor.read_u32()?, offset)
}

fn read_count(cursor: &mut BinaryCursor<'_>, what: &str) -> Result<usize> {
    let offset = cursor.position();
    let count = cursor.read_i32()?;
    usize::try_from(count).map_err(|_| Error::SizeInvariantViolation {
        offset,
        record: RecordType::Object,
        detail: format!("negative {what} {count}"),
    })
}

impl StringFormatObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let flags = StringFormatFlags::from_bits_retain(cursor.read_u32()?);
        let language = cursor.read_u32()?;
        let alignment = read_u32_enum(cursor, "StringAlignment", StringAlignment::parse)?;
        let line_alignment = read_u32_enum(cursor, "LineAlign", StringAlignment::parse)?;
        let digit_substitution = read_u32_enum(
            cursor,
            "DigitSubstitution",
            StringDigitSubstitution::parse,
        )?;
        let digit_language = cursor.read_u32()?;
        let first_tab_offset = cursor.read_f32()?;
        let hotkey_prefix = read_u32_enum(cursor, "HotkeyPrefix", HotkeyPrefix::parse)?;
        let leading_margin = cursor.read_f32()?;
        let trailing_margin = cursor.read_f32()?;
        let tracking = cursor.read_f32()?;
        let trimming = read_u32_enum(cursor, "Trimming", StringTrimming::parse)?;
        let tab_stop_count = read_count(cursor, "TabStopCount")?;
        let range_count = read_count(cursor, "RangeCount")?;

        ensure_elements(cursor, tab_stop_count, 4)?;
        let tab_stops = (0..tab_stop_count)
            .map(|_| cursor.read_f32())
            .collect::<Result<Vec<_>>>()?;
        ensure_elements(cursor, range_count, 8)?;
        let char_ranges = (0..range_count)
            .map(|_| {
                Ok(CharacterRange {
                    first: cursor.read_i32()?,
                    length: cursor.read_i32()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version,
            flags,
            language,
            alignment,
            line_alignment,
            digit_substitution,
            digit_language,
            first_tab_offset,
            hotkey_prefix,
            leading_margin,
            trailing_margin,
            tracking,
            trimming,
            tab_stops,
            char_ranges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::objects::{ObjectKind, ObjectType, decode_object};
    use crate::images::emfplus::test_support::graphics_version;

    fn string_format(tab_stops: &[f32], ranges: &[(i32, i32)], trimming: u32) -> Vec<u8> {
        let mut data = graphics_version().to_le_bytes().to_vec();
        let mut push = |v: u32| data.extend_from_slice(&v.to_le_bytes());
        push(StringFormatFlags::NO_WRAP.bits());
        push(0x0409);
        push(1);
        push(2);
        push(1);
        push(0);
        push(0.0f32.to_bits());
        push(1);
        push(0.0f32.to_bits());
        push(0.0f32.to_bits());
        push(1.03f32.to_bits());
        push(trimming);
        push(tab_stops.len() as u32);
        push(ranges.len() as u32);
        for stop in tab_stops {
            push(stop.to_bits());
        }
        for &(first, length) in ranges {
            push(first as u32);
            push(length as u32);
        }
        data
    }

    #[test]
    fn test_string_format_with_tabs_and_ranges() {
        let data = string_format(&[8.0, 16.0], &[(0, 4)], 1);
        let ObjectKind::StringFormat(format) =
            decode_object(ObjectType::StringFormat, &data, 0).unwrap()
        else {
            panic!("expected string format");
        };
        assert_eq!(format.alignment, StringAlignment::Center);
        assert_eq!(format.line_alignment, StringAlignment::Far);
        assert_eq!(format.hotkey_prefix, HotkeyPrefix::Show);
        assert_eq!(format.tab_stops, vec![8.0, 16.0]);
        assert_eq!(
            format.char_ranges,
            vec![CharacterRange {
                first: 0,
                length: 4
            }]
        );
    }

    #[test]
    fn test_undefined_trimming() {
        let data = string_format(&[], &[], 6);
        assert!(matches!(
            decode_object(ObjectType::StringFormat, &data, 0),
            Err(Error::InvalidEnumValue {
                field: "Trimming",
                ..
            })
        ));
    }
}
