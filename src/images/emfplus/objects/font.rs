//! Font objects.

use crate::common::binary::{BinaryCursor, parse_utf16le_string_len};
use crate::common::error::Result;
use crate::images::emfplus::objects::skip_padding;
use crate::images::emfplus::types::{Decode, GraphicsVersion, UnitType, ensure_elements};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct FontStyle: u32 {
        const BOLD = 0x0000_0001;
        const ITALIC = 0x0000_0002;
        const UNDERLINE = 0x0000_0004;
        const STRIKEOUT = 0x0000_0008;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontObject {
    pub version: GraphicsVersion,
    pub em_size: f32,
    pub size_unit: UnitType,
    pub style: FontStyle,
    pub family_name: String,
}

impl FontObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let em_size = cursor.read_f32()?;
        let offset = cursor.position();
        let size_unit = UnitType::parse("SizeUnit", cursor.read_u32()?, offset)?;
        let style = FontStyle::from_bits_retain(cursor.read_u32()?);
        let _reserved = cursor.read_u32()?;

        let length = cursor.read_u32()? as usize;
        ensure_elements(cursor, length, 2)?;
        let name = cursor.read_bytes(length * 2)?;
        let family_name = parse_utf16le_string_len(name, 0, length);

        skip_padding(cursor)?;
        Ok(Self {
            version,
            em_size,
            size_unit,
            style,
            family_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::images::emfplus::objects::{ObjectKind, ObjectType, decode_object};
    use crate::images::emfplus::test_support::graphics_version;

    fn font(name: &str, declared_len: Option<u32>) -> Vec<u8> {
        let units: Vec<u16> = name.encode_utf16().collect();
        let mut data = graphics_version().to_le_bytes().to_vec();
        data.extend_from_slice(&12.0f32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&(FontStyle::BOLD | FontStyle::ITALIC).bits().to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&declared_len.unwrap_or(units.len() as u32).to_le_bytes());
        for unit in units {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        while data.len() % 4 != 0 {
            data.push(0);
        }
        data
    }

    #[test]
    fn test_font_family_name() {
        let data = font("Arial", None);
        let ObjectKind::Font(font) = decode_object(ObjectType::Font, &data, 0).unwrap() else {
            panic!("expected font");
        };
        assert_eq!(font.family_name, "Arial");
        assert_eq!(font.size_unit, UnitType::Point);
        assert!(font.style.contains(FontStyle::ITALIC));
        assert!(!font.style.contains(FontStyle::UNDERLINE));
    }

    #[test]
    fn test_font_length_past_end() {
        let data = font("Arial", Some(40));
        assert!(matches!(
            decode_object(ObjectType::Font, &data, 0),
            Err(Error::SizeInvariantViolation { .. })
        ));
    }
}
