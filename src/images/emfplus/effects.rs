//! Image effect parameter blocks carried by SerializableObject records.
//!
//! The effect is selected by GUID. Each known effect has a fixed parameter
//! block size, except red-eye correction whose size depends on its area
//! count. A buffer of the wrong size is rejected, with one exception: some
//! producers write colour lookup table effects with a 12-byte buffer, and
//! those are kept as raw bytes.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use crate::images::emfplus::types::{Guid, RectL, ensure_elements};
use serde::Serialize;
use tracing::warn;

pub const BLUR_EFFECT_GUID: Guid = Guid::new(
    0x633C_80A4,
    0x1843,
    0x482B,
    [0x9E, 0xF2, 0xBE, 0x28, 0x34, 0xC5, 0xFD, 0xD4],
);
pub const BRIGHTNESS_CONTRAST_EFFECT_GUID: Guid = Guid::new(
    0xD3A1_DBE1,
    0x8EC4,
    0x4C17,
    [0x9F, 0x4C, 0xEA, 0x97, 0xAD, 0x1C, 0x34, 0x3D],
);
pub const COLOR_BALANCE_EFFECT_GUID: Guid = Guid::new(
    0x537E_597D,
    0x251E,
    0x48DA,
    [0x96, 0x64, 0x29, 0xCA, 0x49, 0x6B, 0x70, 0xF8],
);
pub const COLOR_CURVE_EFFECT_GUID: Guid = Guid::new(
    0xDD6A_0022,
    0x58E4,
    0x4A67,
    [0x9D, 0x9B, 0xD4, 0x8E, 0xB8, 0x81, 0xA5, 0x3D],
);
pub const COLOR_LOOKUP_TABLE_EFFECT_GUID: Guid = Guid::new(
    0xA7CE_72A9,
    0x0F7F,
    0x40D7,
    [0xB3, 0xCC, 0xD0, 0xC0, 0x2D, 0x5C, 0x32, 0x12],
);
pub const COLOR_MATRIX_EFFECT_GUID: Guid = Guid::new(
    0x718F_2615,
    0x7933,
    0x40E3,
    [0xA5, 0x11, 0x5F, 0x68, 0xFE, 0x14, 0xDD, 0x74],
);
pub const HUE_SATURATION_LIGHTNESS_EFFECT_GUID: Guid = Guid::new(
    0x8B2D_D6C3,
    0xEB07,
    0x4D87,
    [0xA5, 0xF0, 0x71, 0x08, 0xE2, 0x6A, 0x9C, 0x5F],
);
pub const LEVELS_EFFECT_GUID: Guid = Guid::new(
    0x99C3_54EC,
    0x2A31,
    0x4F3A,
    [0x8C, 0x34, 0x17, 0xA8, 0x03, 0xB3, 0x3A, 0x25],
);
pub const RED_EYE_CORRECTION_EFFECT_GUID: Guid = Guid::new(
    0x74D2_9D05,
    0x69A4,
    0x4266,
    [0x95, 0x49, 0x3C, 0xC5, 0x28, 0x36, 0xB6, 0x32],
);
pub const SHARPEN_EFFECT_GUID: Guid = Guid::new(
    0x63CB_F3EE,
    0xC526,
    0x402C,
    [0x8F, 0x71, 0x62, 0xC5, 0x40, 0xBF, 0x51, 0x42],
);
pub const TINT_EFFECT_GUID: Guid = Guid::new(
    0x1077_AF00,
    0x2848,
    0x4441,
    [0x94, 0x89, 0x44, 0xAD, 0x4C, 0x2D, 0x7A, 0x2C],
);

wire_enum! {
    pub enum CurveAdjustment: u32 {
        Exposure = 0,
        Density = 1,
        Contrast = 2,
        Highlight = 3,
        Shadow = 4,
        Midtone = 5,
        WhiteSaturation = 6,
        BlackSaturation = 7,
    }
}

wire_enum! {
    pub enum CurveChannel: u32 {
        All = 0,
        Red = 1,
        Green = 2,
        Blue = 3,
    }
}

/// Per-channel 256-entry lookup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorLookupTable {
    pub blue: Vec<u8>,
    pub green: Vec<u8>,
    pub red: Vec<u8>,
    pub alpha: Vec<u8>,
}

/// A decoded image effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImageEffect {
    Blur {
        radius: f32,
        expand_edge: bool,
    },
    BrightnessContrast {
        brightness: i32,
        contrast: i32,
    },
    ColorBalance {
        cyan_red: i32,
        magenta_green: i32,
        yellow_blue: i32,
    },
    ColorCurve {
        adjustment: CurveAdjustment,
        channel: CurveChannel,
        intensity: i32,
    },
    ColorLookupTable(ColorLookupTable),
    /// 5x5 matrix applied to (R, G, B, A, 1) row vectors
    ColorMatrix([[f32; 5]; 5]),
    HueSaturationLightness {
        hue: i32,
        saturation: i32,
        lightness: i32,
    },
    Levels {
        highlight: i32,
        midtone: i32,
        shadow: i32,
    },
    RedEyeCorrection {
        areas: Vec<RectL>,
    },
    Sharpen {
        radius: f32,
        amount: f32,
    },
    Tint {
        hue: i32,
        amount: i32,
    },
    /// Unrecognised GUID, or a buffer kept verbatim
    Unknown {
        raw: Vec<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectKind {
    Blur,
    BrightnessContrast,
    ColorBalance,
    ColorCurve,
    ColorLookupTable,
    ColorMatrix,
    HueSaturationLightness,
    Levels,
    RedEyeCorrection,
    Sharpen,
    Tint,
}

const EFFECTS: [(Guid, EffectKind); 11] = [
    (BLUR_EFFECT_GUID, EffectKind::Blur),
    (BRIGHTNESS_CONTRAST_EFFECT_GUID, EffectKind::BrightnessContrast),
    (COLOR_BALANCE_EFFECT_GUID, EffectKind::ColorBalance),
    (COLOR_CURVE_EFFECT_GUID, EffectKind::ColorCurve),
    (COLOR_LOOKUP_TABLE_EFFECT_GUID, EffectKind::ColorLookupTable),
    (COLOR_MATRIX_EFFECT_GUID, EffectKind::ColorMatrix),
    (HUE_SATURATION_LIGHTNESS_EFFECT_GUID, EffectKind::HueSaturationLightness),
    (LEVELS_EFFECT_GUID, EffectKind::Levels),
    (RED_EYE_CORRECTION_EFFECT_GUID, EffectKind::RedEyeCorrection),
    (SHARPEN_EFFECT_GUID, EffectKind::Sharpen),
    (TINT_EFFECT_GUID, EffectKind::Tint),
];

impl EffectKind {
    fn from_guid(guid: &Guid) -> Option<Self> {
        EFFECTS
            .iter()
            .find(|(known, _)| known == guid)
            .map(|&(_, kind)| kind)
    }

    /// Parameter block size, `None` when it depends on the content.
    fn block_size(self) -> Option<usize> {
        match self {
            EffectKind::Blur
            | EffectKind::BrightnessContrast
            | EffectKind::Sharpen
            | EffectKind::Tint => Some(8),
            EffectKind::ColorBalance
            | EffectKind::ColorCurve
            | EffectKind::HueSaturationLightness
            | EffectKind::Levels => Some(12),
            EffectKind::ColorLookupTable => Some(4 * 256),
            EffectKind::ColorMatrix => Some(25 * 4),
            EffectKind::RedEyeCorrection => None,
        }
    }
}

/// Buffer size written for colour lookup tables by some producers.
const SHORT_LOOKUP_TABLE_SIZE: usize = 0x0C;

fn size_violation(offset: usize, detail: String) -> Error {
    Error::SizeInvariantViolation {
        offset,
        record: RecordType::SerializableObject,
        detail,
    }
}

impl ImageEffect {
    /// Decode the effect parameter block `buffer`, which starts at absolute
    /// offset `offset`.
    pub fn decode(guid: &Guid, buffer: &[u8], offset: usize) -> Result<ImageEffect> {
        let Some(kind) = EffectKind::from_guid(guid) else {
            return Ok(ImageEffect::Unknown {
                raw: buffer.to_vec(),
            });
        };

        if kind == EffectKind::ColorLookupTable && buffer.len() == SHORT_LOOKUP_TABLE_SIZE {
            warn!(
                offset,
                "colour lookup table effect with a {SHORT_LOOKUP_TABLE_SIZE}-byte buffer, kept as raw bytes"
            );
            return Ok(ImageEffect::Unknown {
                raw: buffer.to_vec(),
            });
        }

        if let Some(expected) = kind.block_size()
            && expected != buffer.len()
        {
            return Err(size_violation(
                offset,
                format!("{kind:?} effect needs {expected} bytes, buffer has {}", buffer.len()),
            ));
        }

        let mut cursor = BinaryCursor::with_base(buffer, offset);
        let effect = decode_params(kind, &mut cursor)
            .map_err(|e| e.into_size_violation(RecordType::SerializableObject, "effect"))?;
        if !cursor.is_empty() {
            return Err(size_violation(
                cursor.position(),
                format!("{} bytes left after {kind:?} effect", cursor.remaining()),
            ));
        }
        Ok(effect)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ImageEffect::Unknown { .. })
    }
}

fn decode_params(kind: EffectKind, cursor: &mut BinaryCursor<'_>) -> Result<ImageEffect> {
    let effect = match kind {
        EffectKind::Blur => ImageEffect::Blur {
            radius: cursor.read_f32()?,
            expand_edge: cursor.read_u32()? != 0,
        },
        EffectKind::BrightnessContrast => ImageEffect::BrightnessContrast {
            brightness: cursor.read_i32()?,
            contrast: cursor.read_i32()?,
        },
        EffectKind::ColorBalance => ImageEffect::ColorBalance {
            cyan_red: cursor.read_i32()?,
            magenta_green: cursor.read_i32()?,
            yellow_blue: cursor.read_i32()?,
        },
        EffectKind::ColorCurve => {
            let at = cursor.position();
            let adjustment = CurveAdjustment::parse("CurveAdjustment", cursor.read_u32()?, at)?;
            let channel = CurveChannel::parse("CurveChannel", cursor.read_u32()?, at + 4)?;
            ImageEffect::ColorCurve {
                adjustment,
                channel,
                intensity: cursor.read_i32()?,
            }
        },
        EffectKind::ColorLookupTable => {
            let mut table = || cursor.read_bytes(256).map(<[u8]>::to_vec);
            ImageEffect::ColorLookupTable(ColorLookupTable {
                blue: table()?,
                green: table()?,
                red: table()?,
                alpha: table()?,
            })
        },
        EffectKind::ColorMatrix => {
            let mut matrix = [[0.0f32; 5]; 5];
            for row in &mut matrix {
                for value in row.iter_mut() {
                    *value = cursor.read_f32()?;
                }
            }
            ImageEffect::ColorMatrix(matrix)
        },
        EffectKind::HueSaturationLightness => ImageEffect::HueSaturationLightness {
            hue: cursor.read_i32()?,
            saturation: cursor.read_i32()?,
            lightness: cursor.read_i32()?,
        },
        EffectKind::Levels => ImageEffect::Levels {
            highlight: cursor.read_i32()?,
            midtone: cursor.read_i32()?,
            shadow: cursor.read_i32()?,
        },
        EffectKind::RedEyeCorrection => {
            let at = cursor.position();
            let count = cursor.read_i32()?;
            let count = usize::try_from(count)
                .map_err(|_| size_violation(at, format!("negative area count {count}")))?;
            ensure_elements(cursor, count, 16)?;
            let areas = (0..count)
                .map(|_| {
                    Ok(RectL {
                        left: cursor.read_i32()?,
                        top: cursor.read_i32()?,
                        right: cursor.read_i32()?,
                        bottom: cursor.read_i32()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ImageEffect::RedEyeCorrection { areas }
        },
        EffectKind::Sharpen => ImageEffect::Sharpen {
            radius: cursor.read_f32()?,
            amount: cursor.read_f32()?,
        },
        EffectKind::Tint => ImageEffect::Tint {
            hue: cursor.read_i32()?,
            amount: cursor.read_i32()?,
        },
    };
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::records::{RecordBody, decode_record};
    use crate::images::emfplus::test_support::{guid_bytes, record};

    fn serializable_object(guid: &Guid, buffer: &[u8]) -> Vec<u8> {
        let mut payload = guid_bytes(guid);
        payload.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
        payload.extend_from_slice(buffer);
        record(0x4038, 0, &payload)
    }

    fn decode_effect(data: &[u8]) -> Result<ImageEffect> {
        match decode_record(&mut BinaryCursor::new(data))?.body {
            RecordBody::SerializableObject(object) => Ok(object.effect),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_short_color_lookup_table_is_kept_raw() {
        let buffer: Vec<u8> = (1..=12).collect();
        let data = serializable_object(&COLOR_LOOKUP_TABLE_EFFECT_GUID, &buffer);
        assert_eq!(data.len(), 0x2C);
        assert_eq!(
            decode_effect(&data).unwrap(),
            ImageEffect::Unknown { raw: buffer }
        );
    }

    #[test]
    fn test_color_lookup_table() {
        let buffer: Vec<u8> = (0..4).flat_map(|table| [table as u8; 256]).collect();
        let data = serializable_object(&COLOR_LOOKUP_TABLE_EFFECT_GUID, &buffer);
        let ImageEffect::ColorLookupTable(table) = decode_effect(&data).unwrap() else {
            panic!("expected lookup table");
        };
        assert_eq!(table.blue, vec![0; 256]);
        assert_eq!(table.alpha, vec![3; 256]);
    }

    #[test]
    fn test_blur() {
        let mut buffer = 2.5f32.to_le_bytes().to_vec();
        buffer.extend_from_slice(&1u32.to_le_bytes());
        let data = serializable_object(&BLUR_EFFECT_GUID, &buffer);
        assert_eq!(
            decode_effect(&data).unwrap(),
            ImageEffect::Blur {
                radius: 2.5,
                expand_edge: true
            }
        );
    }

    #[test]
    fn test_wrong_block_size() {
        let data = serializable_object(&TINT_EFFECT_GUID, &[0; 12]);
        assert!(matches!(
            decode_effect(&data),
            Err(Error::SizeInvariantViolation {
                record: RecordType::SerializableObject,
                offset: 0x20,
                ..
            })
        ));
    }

    #[test]
    fn test_color_curve_enums() {
        let buffer: Vec<u8> = [5u32, 2, 0xFFFF_FFF6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let data = serializable_object(&COLOR_CURVE_EFFECT_GUID, &buffer);
        assert_eq!(
            decode_effect(&data).unwrap(),
            ImageEffect::ColorCurve {
                adjustment: CurveAdjustment::Midtone,
                channel: CurveChannel::Green,
                intensity: -10
            }
        );

        let buffer: Vec<u8> = [0u32, 4, 0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let data = serializable_object(&COLOR_CURVE_EFFECT_GUID, &buffer);
        assert!(matches!(
            decode_effect(&data),
            Err(Error::InvalidEnumValue {
                field: "CurveChannel",
                value: 4,
                offset: 0x24,
                record: Some(RecordType::SerializableObject)
            })
        ));
    }

    #[test]
    fn test_red_eye_areas() {
        let mut buffer = 2i32.to_le_bytes().to_vec();
        for v in [0i32, 0, 10, 10, 20, 20, 30, 30] {
            buffer.extend_from_slice(&v.to_le_bytes());
        }
        let data = serializable_object(&RED_EYE_CORRECTION_EFFECT_GUID, &buffer);
        let ImageEffect::RedEyeCorrection { areas } = decode_effect(&data).unwrap() else {
            panic!("expected red-eye correction");
        };
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[1].left, 20);

        // Count says three areas, buffer holds two.
        buffer[0] = 3;
        let data = serializable_object(&RED_EYE_CORRECTION_EFFECT_GUID, &buffer);
        assert!(matches!(
            decode_effect(&data),
            Err(Error::SizeInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_unknown_guid() {
        let guid = Guid::new(1, 2, 3, [4; 8]);
        let data = serializable_object(&guid, &[9; 8]);
        let effect = decode_effect(&data).unwrap();
        assert!(effect.is_unknown());
    }

    #[test]
    fn test_buffer_size_must_match_record() {
        let mut data = serializable_object(&TINT_EFFECT_GUID, &[0; 8]);
        // BufferSize field sits after the 12-byte header and 16-byte GUID.
        data[28] = 4;
        assert!(matches!(
            decode_effect(&data),
            Err(Error::SizeInvariantViolation {
                record: RecordType::SerializableObject,
                offset: 0,
                ..
            })
        ));
    }
}
