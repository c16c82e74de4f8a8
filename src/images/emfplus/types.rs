//! Value structures shared by EMF+ records and objects.
//!
//! Fixed-layout structures are read through little-endian zerocopy mirrors
//! (`Raw*`) and converted into plain host-order structs for the public API.

use crate::common::binary::BinaryCursor;
use crate::common::bitfield::BitField32;
use crate::common::error::{Error, Result};
use bitflags::bitflags;
use serde::Serialize;
use std::fmt;
use zerocopy::{F32, I16, LE, U16, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

/// Decode a value from the current cursor position.
pub trait Decode: Sized {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self>;
}

/// Ensure `count` elements of `elem_size` bytes can still be read, before
/// anything is allocated for them.
pub(crate) fn ensure_elements(
    cursor: &BinaryCursor<'_>,
    count: usize,
    elem_size: usize,
) -> Result<()> {
    match count.checked_mul(elem_size) {
        Some(needed) if needed <= cursor.remaining() => Ok(()),
        needed => Err(Error::OutOfData {
            offset: cursor.position(),
            needed: needed.unwrap_or(usize::MAX),
            available: cursor.remaining(),
            record: None,
        }),
    }
}

/// A colour stored as Blue, Green, Red, Alpha bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Argb(pub u32);

impl Argb {
    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl Decode for Argb {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        cursor.read_u32().map(Argb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl Decode for PointF {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawPointF = cursor.read_struct()?;
        Ok(Self {
            x: raw.x.get(),
            y: raw.y.get(),
        })
    }
}

/// Point with 16-bit signed coordinates (compressed path data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Decode for Point {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawPoint = cursor.read_struct()?;
        Ok(Self {
            x: raw.x.get(),
            y: raw.y.get(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Decode for RectF {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawRectF = cursor.read_struct()?;
        Ok(Self {
            x: raw.x.get(),
            y: raw.y.get(),
            width: raw.width.get(),
            height: raw.height.get(),
        })
    }
}

/// Rectangle with 16-bit signed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

impl Decode for Rect {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawRect = cursor.read_struct()?;
        Ok(Self {
            x: raw.x.get(),
            y: raw.y.get(),
            width: raw.width.get(),
            height: raw.height.get(),
        })
    }
}

/// Edge-based rectangle with 32-bit signed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RectL {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// 2x3 affine matrix, row vector convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformMatrix {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl TransformMatrix {
    pub const IDENTITY: TransformMatrix = TransformMatrix {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    /// Apply the matrix to a point.
    pub fn transform(&self, point: PointF) -> PointF {
        PointF {
            x: point.x * self.m11 + point.y * self.m21 + self.dx,
            y: point.x * self.m12 + point.y * self.m22 + self.dy,
        }
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Decode for TransformMatrix {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawTransformMatrix = cursor.read_struct()?;
        Ok(raw.into())
    }
}

// Wire mirrors

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawPointF {
    x: F32<LE>,
    y: F32<LE>,
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawPoint {
    x: I16<LE>,
    y: I16<LE>,
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawRectF {
    x: F32<LE>,
    y: F32<LE>,
    width: F32<LE>,
    height: F32<LE>,
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawRect {
    x: I16<LE>,
    y: I16<LE>,
    width: I16<LE>,
    height: I16<LE>,
}

/// Six little-endian floats, as embedded in several records.
#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub(crate) struct RawTransformMatrix {
    m11: F32<LE>,
    m12: F32<LE>,
    m21: F32<LE>,
    m22: F32<LE>,
    dx: F32<LE>,
    dy: F32<LE>,
}

impl From<RawTransformMatrix> for TransformMatrix {
    fn from(raw: RawTransformMatrix) -> Self {
        Self {
            m11: raw.m11.get(),
            m12: raw.m12.get(),
            m21: raw.m21.get(),
            m22: raw.m22.get(),
            dx: raw.dx.get(),
            dy: raw.dy.get(),
        }
    }
}

bitflags! {
    /// Palette style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct PaletteStyleFlags: u32 {
        const HAS_ALPHA = 0x0000_0001;
        const GRAYSCALE = 0x0000_0002;
        const HALFTONE = 0x0000_0004;
    }
}

/// Colour palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub style_flags: PaletteStyleFlags,
    pub entries: Vec<Argb>,
}

impl Palette {
    /// Encoded length in bytes.
    pub fn byte_len(&self) -> usize {
        8 + 4 * self.entries.len()
    }
}

impl Decode for Palette {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let style_flags = PaletteStyleFlags::from_bits_retain(cursor.read_u32()?);
        let count = cursor.read_u32()? as usize;
        ensure_elements(cursor, count, 4)?;
        let entries = (0..count)
            .map(|_| Argb::decode(cursor))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            style_flags,
            entries,
        })
    }
}

/// A 128-bit GUID in its mixed-endian wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawGuid {
    data1: U32<LE>,
    data2: U16<LE>,
    data3: U16<LE>,
    data4: [u8; 8],
}

impl Decode for Guid {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawGuid = cursor.read_struct()?;
        Ok(Self::new(
            raw.data1.get(),
            raw.data2.get(),
            raw.data3.get(),
            raw.data4,
        ))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

wire_enum! {
    /// GDI+ version that produced the metafile.
    pub enum GraphicsVersionCode: u32 {
        V1_0 = 1,
        V1_1 = 2,
    }
}

/// Signature carried in the high 20 bits of every graphics version.
pub const METAFILE_SIGNATURE: u32 = 0xDBC01;

/// Packed graphics version: GraphicsVersion(12), MetafileSignature(20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphicsVersion {
    pub version: GraphicsVersionCode,
}

impl Decode for GraphicsVersion {
    fn decode(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let mut bits = BitField32::new(cursor.read_u32()?);
        let version = bits.read_bits(12)?;
        let signature = bits.read_bits(20)?;
        if signature != METAFILE_SIGNATURE {
            return Err(Error::InvalidEnumValue {
                offset,
                field: "MetafileSignature",
                value: signature,
                record: None,
            });
        }
        Ok(Self {
            version: GraphicsVersionCode::parse("GraphicsVersion", version, offset)?,
        })
    }
}

wire_enum! {
    /// Unit of measure for page, pen and font sizes.
    pub enum UnitType: u32 {
        World = 0,
        Display = 1,
        Pixel = 2,
        Point = 3,
        Inch = 4,
        Document = 5,
        Millimeter = 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_channels() {
        let color = Argb(u32::from_le_bytes([0x10, 0x20, 0x30, 0x40]));
        assert_eq!(color.blue(), 0x10);
        assert_eq!(color.green(), 0x20);
        assert_eq!(color.red(), 0x30);
        assert_eq!(color.alpha(), 0x40);
    }

    #[test]
    fn test_graphics_version() {
        let data = ((METAFILE_SIGNATURE << 12) | 2).to_le_bytes();
        let version = GraphicsVersion::decode(&mut BinaryCursor::new(&data)).unwrap();
        assert_eq!(version.version, GraphicsVersionCode::V1_1);

        let data = ((METAFILE_SIGNATURE << 12) | 3).to_le_bytes();
        assert!(matches!(
            GraphicsVersion::decode(&mut BinaryCursor::new(&data)),
            Err(Error::InvalidEnumValue {
                field: "GraphicsVersion",
                value: 3,
                ..
            })
        ));

        let data = ((0xABCDEu32 << 12) | 1).to_le_bytes();
        assert!(matches!(
            GraphicsVersion::decode(&mut BinaryCursor::new(&data)),
            Err(Error::InvalidEnumValue {
                field: "MetafileSignature",
                ..
            })
        ));
    }

    #[test]
    fn test_guid_display() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x633C_80A4u32.to_le_bytes());
        data.extend_from_slice(&0x1843u16.to_le_bytes());
        data.extend_from_slice(&0x482Bu16.to_le_bytes());
        data.extend_from_slice(&[0x9E, 0xF2, 0xBE, 0x28, 0x34, 0xC5, 0xFD, 0xD4]);
        let guid = Guid::decode(&mut BinaryCursor::new(&data)).unwrap();
        assert_eq!(guid.to_string(), "633C80A4-1843-482B-9EF2-BE2834C5FDD4");
    }

    #[test]
    fn test_palette_count_is_bounded() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&0x4000_0000u32.to_le_bytes());
        data.extend_from_slice(&0xFF00_00FFu32.to_le_bytes());
        assert!(matches!(
            Palette::decode(&mut BinaryCursor::new(&data)),
            Err(Error::OutOfData { offset: 8, .. })
        ));
    }

    #[test]
    fn test_transform_matrix() {
        let data: Vec<u8> = [2.0f32, 0.0, 0.0, 3.0, 10.0, 20.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let matrix = TransformMatrix::decode(&mut BinaryCursor::new(&data)).unwrap();
        assert_eq!(
            matrix.transform(PointF { x: 1.0, y: 1.0 }),
            PointF { x: 12.0, y: 23.0 }
        );
    }
}
