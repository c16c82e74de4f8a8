//! Image objects, including the metafiles they may embed.

use crate::common::binary::BinaryCursor;
use crate::common::error::Result;
use crate::images::emfplus::objects::skip_padding;
use crate::images::emfplus::types::{Decode, GraphicsVersion};
use serde::Serialize;

wire_enum! {
    pub enum ImageDataType: u32 {
        Unknown = 0,
        Bitmap = 1,
        Metafile = 2,
    }
}

wire_enum! {
    pub enum BitmapType: u32 {
        Pixel = 0,
        Compressed = 1,
    }
}

wire_enum! {
    /// Format of an embedded metafile.
    pub enum MetafileDataType: u32 {
        Wmf = 1,
        WmfPlaceable = 2,
        Emf = 3,
        EmfPlusOnly = 4,
        EmfPlusDual = 5,
    }
}

impl MetafileDataType {
    pub fn is_wmf(self) -> bool {
        matches!(self, MetafileDataType::Wmf | MetafileDataType::WmfPlaceable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageObject {
    pub version: GraphicsVersion,
    pub data: ImageData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImageData {
    Unknown(Vec<u8>),
    Bitmap(BitmapData),
    Metafile(EmbeddedMetafile),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitmapData {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub pixel_format: u32,
    pub bitmap_type: BitmapType,
    /// Pixel rows, or a PNG/JPEG/GIF/... stream for compressed bitmaps
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// A complete WMF or EMF file carried inside an image object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedMetafile {
    pub kind: MetafileDataType,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ImageObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let offset = cursor.position();
        let data = match ImageDataType::parse("ImageDataType", cursor.read_u32()?, offset)? {
            ImageDataType::Unknown => ImageData::Unknown(cursor.read_bytes(cursor.remaining())?.to_vec()),
            ImageDataType::Bitmap => ImageData::Bitmap(decode_bitmap(cursor)?),
            ImageDataType::Metafile => ImageData::Metafile(decode_metafile(cursor)?),
        };
        Ok(Self { version, data })
    }
}

fn decode_bitmap(cursor: &mut BinaryCursor<'_>) -> Result<BitmapData> {
    let width = cursor.read_i32()?;
    let height = cursor.read_i32()?;
    let stride = cursor.read_i32()?;
    let pixel_format = cursor.read_u32()?;
    let offset = cursor.position();
    let bitmap_type = BitmapType::parse("BitmapType", cursor.read_u32()?, offset)?;
    Ok(BitmapData {
        width,
        height,
        stride,
        pixel_format,
        bitmap_type,
        data: cursor.read_bytes(cursor.remaining())?.to_vec(),
    })
}

fn decode_metafile(cursor: &mut BinaryCursor<'_>) -> Result<EmbeddedMetafile> {
    let offset = cursor.position();
    let kind = MetafileDataType::parse("MetafileDataType", cursor.read_u32()?, offset)?;
    let size = cursor.read_u32()? as usize;
    let data = cursor.read_bytes(size)?.to_vec();
    skip_padding(cursor)?;
    Ok(EmbeddedMetafile { kind, data })
}
