//! Graphics objects carried by EMF+ Object records.
//!
//! Every object kind is decoded from one contiguous buffer: the payload of a
//! single Object record, or the reassembled payload of a continuation chain.
//! Decoders read exactly the layout their kind defines; a buffer that is too
//! short or too long is a [`SizeInvariantViolation`](Error::SizeInvariantViolation)
//! of the Object record.

pub mod brush;
pub mod custom_line_cap;
pub mod font;
pub mod image;
pub mod image_attributes;
pub mod path;
pub mod pen;
pub mod region;
pub mod string_format;

pub use brush::{BrushData, BrushObject, BrushType, HatchStyle};
pub use custom_line_cap::{AdjustableArrowCap, CustomLineCapData, CustomLineCapObject};
pub use font::{FontObject, FontStyle};
pub use image::{
    BitmapData, BitmapType, EmbeddedMetafile, ImageData, ImageObject, MetafileDataType,
};
pub use image_attributes::{ImageAttributesObject, WrapMode};
pub use path::{PathObject, PathPointFlags, PathPointType, PathPoints};
pub use pen::{LineCapType, LineJoinType, PenDataFlags, PenObject, PenOptionalData};
pub use region::{RegionNode, RegionNodeType, RegionObject};
pub use string_format::{StringFormatFlags, StringFormatObject};

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use serde::Serialize;

/// Highest object ID a metafile may use.
pub const MAX_OBJECT_ID: u8 = 63;

wire_enum! {
    /// Kind of graphics object held by an Object record.
    pub enum ObjectType: u8 {
        Brush = 1,
        Pen = 2,
        Path = 3,
        Region = 4,
        Image = 5,
        Font = 6,
        StringFormat = 7,
        ImageAttributes = 8,
        CustomLineCap = 9,
    }
}

/// A completed graphics object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphicsObject {
    pub object_id: u8,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectKind {
    Brush(BrushObject),
    Pen(PenObject),
    Path(PathObject),
    Region(RegionObject),
    Image(ImageObject),
    Font(FontObject),
    StringFormat(StringFormatObject),
    ImageAttributes(ImageAttributesObject),
    CustomLineCap(CustomLineCapObject),
}

impl ObjectKind {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKind::Brush(_) => ObjectType::Brush,
            ObjectKind::Pen(_) => ObjectType::Pen,
            ObjectKind::Path(_) => ObjectType::Path,
            ObjectKind::Region(_) => ObjectType::Region,
            ObjectKind::Image(_) => ObjectType::Image,
            ObjectKind::Font(_) => ObjectType::Font,
            ObjectKind::StringFormat(_) => ObjectType::StringFormat,
            ObjectKind::ImageAttributes(_) => ObjectType::ImageAttributes,
            ObjectKind::CustomLineCap(_) => ObjectType::CustomLineCap,
        }
    }

    /// Embedded metafile, when this is an image object carrying one.
    pub fn embedded_metafile(&self) -> Option<&EmbeddedMetafile> {
        match self {
            ObjectKind::Image(ImageObject {
                data: ImageData::Metafile(metafile),
                ..
            }) => Some(metafile),
            _ => None,
        }
    }
}

/// Decode an object of `object_type` from `data`.
///
/// `base` is the absolute offset of `data[0]` and only affects error offsets.
pub fn decode_object(object_type: ObjectType, data: &[u8], base: usize) -> Result<ObjectKind> {
    let mut cursor = BinaryCursor::with_base(data, base);
    let kind = decode_kind(object_type, &mut cursor)
        .map_err(|err| err.into_size_violation(RecordType::Object, object_label(object_type)))?;

    if !cursor.is_empty() {
        return Err(Error::SizeInvariantViolation {
            offset: cursor.position(),
            record: RecordType::Object,
            detail: format!(
                "{} object leaves {} of {} bytes unread",
                object_label(object_type),
                cursor.remaining(),
                data.len()
            ),
        });
    }
    Ok(kind)
}

fn decode_kind(object_type: ObjectType, cursor: &mut BinaryCursor<'_>) -> Result<ObjectKind> {
    Ok(match object_type {
        ObjectType::Brush => ObjectKind::Brush(BrushObject::decode_from(cursor)?),
        ObjectType::Pen => ObjectKind::Pen(PenObject::decode_from(cursor)?),
        ObjectType::Path => ObjectKind::Path(PathObject::decode_from(cursor)?),
        ObjectType::Region => ObjectKind::Region(RegionObject::decode_from(cursor)?),
        ObjectType::Image => ObjectKind::Image(ImageObject::decode_from(cursor)?),
        ObjectType::Font => ObjectKind::Font(FontObject::decode_from(cursor)?),
        ObjectType::StringFormat => {
            ObjectKind::StringFormat(StringFormatObject::decode_from(cursor)?)
        },
        ObjectType::ImageAttributes => {
            ObjectKind::ImageAttributes(ImageAttributesObject::decode_from(cursor)?)
        },
        ObjectType::CustomLineCap => {
            ObjectKind::CustomLineCap(CustomLineCapObject::decode_from(cursor)?)
        },
    })
}

fn object_label(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Brush => "Brush",
        ObjectType::Pen => "Pen",
        ObjectType::Path => "Path",
        ObjectType::Region => "Region",
        ObjectType::Image => "Image",
        ObjectType::Font => "Font",
        ObjectType::StringFormat => "StringFormat",
        ObjectType::ImageAttributes => "ImageAttributes",
        ObjectType::CustomLineCap => "CustomLineCap",
    }
}

/// Consume up to three trailing padding bytes that align a variable-length
/// array to four bytes.
pub(crate) fn skip_padding(cursor: &mut BinaryCursor<'_>) -> Result<()> {
    let remaining = cursor.remaining();
    if remaining > 3 {
        return Err(Error::SizeInvariantViolation {
            offset: cursor.position(),
            record: RecordType::Object,
            detail: format!("{remaining} trailing bytes exceed alignment padding"),
        });
    }
    cursor.skip(remaining)
}
