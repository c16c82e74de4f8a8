//! Image attributes objects.

use crate::common::binary::BinaryCursor;
use crate::common::error::Result;
use crate::images::emfplus::types::{Argb, Decode, GraphicsVersion};
use serde::Serialize;
use zerocopy::{I32, LE, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

wire_enum! {
    pub enum WrapMode: u32 {
        Tile = 0,
        TileFlipX = 1,
        TileFlipY = 2,
        TileFlipXY = 3,
        Clamp = 4,
    }
}

wire_enum! {
    pub enum ObjectClamp: u32 {
        Rect = 0,
        Bitmap = 1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAttributesObject {
    pub version: GraphicsVersion,
    pub wrap_mode: WrapMode,
    pub clamp_color: Argb,
    pub object_clamp: ObjectClamp,
}

/// Fields after the version, 20 bytes.
#[derive(Debug, Clone, Copy, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawImageAttributes {
    reserved1: U32<LE>,
    wrap_mode: U32<LE>,
    clamp_color: U32<LE>,
    object_clamp: I32<LE>,
    reserved2: U32<LE>,
}

impl ImageAttributesObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let offset = cursor.position();
        let raw: RawImageAttributes = cursor.read_struct()?;
        Ok(Self {
            version,
            wrap_mode: WrapMode::parse("WrapMode", raw.wrap_mode.get(), offset + 4)?,
            clamp_color: Argb(raw.clamp_color.get()),
            object_clamp: ObjectClamp::parse(
                "ObjectClamp",
                raw.object_clamp.get() as u32,
                offset + 12,
            )?,
        })
    }
}
