//! Brush objects.

use crate::common::binary::BinaryCursor;
use crate::common::error::Result;
use crate::images::emfplus::types::{Argb, Decode, GraphicsVersion};
use serde::Serialize;

wire_enum! {
    pub enum BrushType: u32 {
        SolidColor = 0,
        HatchFill = 1,
        TextureFill = 2,
        PathGradient = 3,
        LinearGradient = 4,
    }
}

wire_enum! {
    /// Hatch patterns of a hatch brush.
    pub enum HatchStyle: u32 {
        Horizontal = 0,
        Vertical = 1,
        ForwardDiagonal = 2,
        BackwardDiagonal = 3,
        LargeGrid = 4,
        DiagonalCross = 5,
        Percent05 = 6,
        Percent10 = 7,
        Percent20 = 8,
        Percent25 = 9,
        Percent30 = 10,
        Percent40 = 11,
        Percent50 = 12,
        Percent60 = 13,
        Percent70 = 14,
        Percent75 = 15,
        Percent80 = 16,
        Percent90 = 17,
        LightDownwardDiagonal = 18,
        LightUpwardDiagonal = 19,
        DarkDownwardDiagonal = 20,
        DarkUpwardDiagonal = 21,
        WideDownwardDiagonal = 22,
        WideUpwardDiagonal = 23,
        LightVertical = 24,
        LightHorizontal = 25,
        NarrowVertical = 26,
        NarrowHorizontal = 27,
        DarkVertical = 28,
        DarkHorizontal = 29,
        DashedDownwardDiagonal = 30,
        DashedUpwardDiagonal = 31,
        DashedHorizontal = 32,
        DashedVertical = 33,
        SmallConfetti = 34,
        LargeConfetti = 35,
        ZigZag = 36,
        Wave = 37,
        DiagonalBrick = 38,
        HorizontalBrick = 39,
        Weave = 40,
        Plaid = 41,
        Divot = 42,
        DottedGrid = 43,
        DottedDiamond = 44,
        Shingle = 45,
        Trellis = 46,
        Sphere = 47,
        SmallGrid = 48,
        SmallCheckerBoard = 49,
        LargeCheckerBoard = 50,
        OutlinedDiamond = 51,
        SolidDiamond = 52,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrushObject {
    pub version: GraphicsVersion,
    pub data: BrushData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BrushData {
    SolidColor(Argb),
    HatchFill {
        style: HatchStyle,
        fore_color: Argb,
        back_color: Argb,
    },
    /// Texture and gradient brushes, kept as their raw brush data
    Raw {
        brush_type: BrushType,
        data: Vec<u8>,
    },
}

impl BrushObject {
    pub fn brush_type(&self) -> BrushType {
        match &self.data {
            BrushData::SolidColor(_) => BrushType::SolidColor,
            BrushData::HatchFill { .. } => BrushType::HatchFill,
            BrushData::Raw { brush_type, .. } => *brush_type,
        }
    }

    /// Decode a brush that extends to the end of `cursor`.
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let offset = cursor.position();
        let brush_type = BrushType::parse("BrushType", cursor.read_u32()?, offset)?;

        let data = match brush_type {
            BrushType::SolidColor => BrushData::SolidColor(Argb::decode(cursor)?),
            BrushType::HatchFill => {
                let offset = cursor.position();
                let style = HatchStyle::parse("HatchStyle", cursor.read_u32()?, offset)?;
                BrushData::HatchFill {
                    style,
                    fore_color: Argb::decode(cursor)?,
                    back_color: Argb::decode(cursor)?,
                }
            },
            brush_type => BrushData::Raw {
                brush_type,
                data: cursor.read_bytes(cursor.remaining())?.to_vec(),
            },
        };
        Ok(Self { version, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::images::emfplus::objects::{ObjectKind, ObjectType, decode_object};
    use crate::images::emfplus::test_support::graphics_version;

    fn brush(brush_type: u32, rest: &[u32]) -> Vec<u8> {
        let mut data = graphics_version().to_le_bytes().to_vec();
        data.extend_from_slice(&brush_type.to_le_bytes());
        for value in rest {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_solid_brush() {
        let data = brush(0, &[0x80FF_0000]);
        let ObjectKind::Brush(brush) = decode_object(ObjectType::Brush, &data, 0).unwrap() else {
            panic!("expected brush");
        };
        assert_eq!(brush.data, BrushData::SolidColor(Argb(0x80FF_0000)));
        assert_eq!(brush.brush_type(), BrushType::SolidColor);
    }

    #[test]
    fn test_hatch_brush() {
        let data = brush(1, &[36, 0xFF00_0000, 0xFFFF_FFFF]);
        assert_eq!(data.len(), 20);
        let ObjectKind::Brush(hatch) = decode_object(ObjectType::Brush, &data, 0).unwrap() else {
            panic!("expected brush");
        };
        assert_eq!(
            hatch.data,
            BrushData::HatchFill {
                style: HatchStyle::ZigZag,
                fore_color: Argb(0xFF00_0000),
                back_color: Argb(0xFFFF_FFFF),
            }
        );

        let data = brush(1, &[53, 0, 0]);
        assert!(matches!(
            decode_object(ObjectType::Brush, &data, 0),
            Err(Error::InvalidEnumValue {
                field: "HatchStyle",
                value: 53,
                offset: 8,
                ..
            })
        ));
    }

    #[test]
    fn test_gradient_brush_keeps_raw_data() {
        let data = brush(4, &[1, 2, 3]);
        let ObjectKind::Brush(brush) = decode_object(ObjectType::Brush, &data, 0).unwrap() else {
            panic!("expected brush");
        };
        match brush.data {
            BrushData::Raw { brush_type, data } => {
                assert_eq!(brush_type, BrushType::LinearGradient);
                assert_eq!(data.len(), 12);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_brush_type() {
        let data = brush(9, &[]);
        assert!(matches!(
            decode_object(ObjectType::Brush, &data, 0),
            Err(Error::InvalidEnumValue {
                field: "BrushType",
                ..
            })
        ));
    }
}
