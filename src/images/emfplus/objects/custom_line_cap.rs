//! Custom line cap objects.

use crate::common::binary::BinaryCursor;
use crate::common::error::Result;
use crate::images::emfplus::types::{Decode, GraphicsVersion, PointF};
use serde::Serialize;
use zerocopy::{F32, LE, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

wire_enum! {
    pub enum CustomLineCapType: u32 {
        Default = 0,
        AdjustableArrow = 1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomLineCapObject {
    pub version: GraphicsVersion,
    pub data: CustomLineCapData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CustomLineCapData {
    /// Path-based cap, kept as raw cap data
    Default(Vec<u8>),
    AdjustableArrow(AdjustableArrowCap),
}

/// Arrow cap parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustableArrowCap {
    pub width: f32,
    pub height: f32,
    pub middle_inset: f32,
    pub fill_state: bool,
    pub line_start_cap: u32,
    pub line_end_cap: u32,
    pub line_join: u32,
    pub line_miter_limit: f32,
    pub width_scale: f32,
    pub fill_hot_spot: PointF,
    pub line_hot_spot: PointF,
}

#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawAdjustableArrowCap {
    width: F32<LE>,
    height: F32<LE>,
    middle_inset: F32<LE>,
    fill_state: U32<LE>,
    line_start_cap: U32<LE>,
    line_end_cap: U32<LE>,
    line_join: U32<LE>,
    line_miter_limit: F32<LE>,
    width_scale: F32<LE>,
    fill_hot_spot: [F32<LE>; 2],
    line_hot_spot: [F32<LE>; 2],
}

impl From<RawAdjustableArrowCap> for AdjustableArrowCap {
    fn from(raw: RawAdjustableArrowCap) -> Self {
        let point = |p: [F32<LE>; 2]| PointF {
            x: p[0].get(),
            y: p[1].get(),
        };
        Self {
            width: raw.width.get(),
            height: raw.height.get(),
            middle_inset: raw.middle_inset.get(),
            fill_state: raw.fill_state.get() != 0,
            line_start_cap: raw.line_start_cap.get(),
            line_end_cap: raw.line_end_cap.get(),
            line_join: raw.line_join.get(),
            line_miter_limit: raw.line_miter_limit.get(),
            width_scale: raw.width_scale.get(),
            fill_hot_spot: point(raw.fill_hot_spot),
            line_hot_spot: point(raw.line_hot_spot),
        }
    }
}

impl CustomLineCapObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let offset = cursor.position();
        let cap_type = CustomLineCapType::parse("CustomLineCapType", cursor.read_u32()?, offset)?;
        let data = match cap_type {
            CustomLineCapType::Default => {
                CustomLineCapData::Default(cursor.read_bytes(cursor.remaining())?.to_vec())
            },
            CustomLineCapType::AdjustableArrow => CustomLineCapData::AdjustableArrow(
                cursor.read_struct::<RawAdjustableArrowCap>()?.into(),
            ),
        };
        Ok(Self { version, data })
    }
}
