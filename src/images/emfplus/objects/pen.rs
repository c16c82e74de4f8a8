//! Pen objects.
//!
//! A pen is a fixed prefix (type, flags, unit, width), a run of optional
//! fields selected by [`PenDataFlags`] in flag-bit order, and the brush that
//! fills the stroke.

use super::brush::BrushObject;
use super::custom_line_cap::CustomLineCapObject;
use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use crate::images::emfplus::types::{
    Decode, GraphicsVersion, TransformMatrix, UnitType, ensure_elements,
};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Which optional pen fields are present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct PenDataFlags: u32 {
        const TRANSFORM = 0x0000_0001;
        const START_CAP = 0x0000_0002;
        const END_CAP = 0x0000_0004;
        const JOIN = 0x0000_0008;
        const MITER_LIMIT = 0x0000_0010;
        const LINE_STYLE = 0x0000_0020;
        const DASHED_LINE_CAP = 0x0000_0040;
        const DASHED_LINE_OFFSET = 0x0000_0080;
        const DASHED_LINE = 0x0000_0100;
        const NON_CENTER = 0x0000_0200;
        const COMPOUND_LINE = 0x0000_0400;
        const CUSTOM_START_CAP = 0x0000_0800;
        const CUSTOM_END_CAP = 0x0000_1000;
    }
}

wire_enum! {
    pub enum LineCapType: u32 {
        Flat = 0x00,
        Square = 0x01,
        Round = 0x02,
        Triangle = 0x03,
        NoAnchor = 0x10,
        SquareAnchor = 0x11,
        RoundAnchor = 0x12,
        DiamondAnchor = 0x13,
        ArrowAnchor = 0x14,
        AnchorMask = 0xF0,
        Custom = 0xFF,
    }
}

wire_enum! {
    pub enum LineJoinType: u32 {
        Miter = 0,
        Bevel = 1,
        Round = 2,
        MiterClipped = 3,
    }
}

wire_enum! {
    pub enum LineStyle: u32 {
        Solid = 0,
        Dash = 1,
        Dot = 2,
        DashDot = 3,
        DashDotDot = 4,
        Custom = 5,
    }
}

wire_enum! {
    pub enum DashedLineCapType: u32 {
        Flat = 0,
        Round = 2,
        Triangle = 3,
    }
}

wire_enum! {
    pub enum PenAlignment: u32 {
        Center = 0,
        Inset = 1,
        Left = 2,
        Outset = 3,
        Right = 4,
    }
}

/// Optional pen fields; `None` where the matching flag is clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PenOptionalData {
    pub transform: Option<TransformMatrix>,
    pub start_cap: Option<LineCapType>,
    pub end_cap: Option<LineCapType>,
    pub join: Option<LineJoinType>,
    pub miter_limit: Option<f32>,
    pub line_style: Option<LineStyle>,
    pub dashed_line_cap: Option<DashedLineCapType>,
    pub dashed_line_offset: Option<f32>,
    pub dashed_line: Option<Vec<f32>>,
    pub alignment: Option<PenAlignment>,
    pub compound_line: Option<Vec<f32>>,
    pub custom_start_cap: Option<Box<CustomLineCapObject>>,
    pub custom_end_cap: Option<Box<CustomLineCapObject>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenObject {
    pub version: GraphicsVersion,
    pub flags: PenDataFlags,
    pub unit: UnitType,
    pub width: f32,
    pub optional: PenOptionalData,
    pub brush: BrushObject,
}

impl PenObject {
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;

        let offset = cursor.position();
        let pen_type = cursor.read_u32()?;
        if pen_type != 0 {
            return Err(Error::InvalidEnumValue {
                offset,
                field: "PenType",
                value: pen_type,
                record: None,
            });
        }

        let flags = PenDataFlags::from_bits_retain(cursor.read_u32()?);
        let offset = cursor.position();
        let unit = UnitType::parse("PenUnit", cursor.read_u32()?, offset)?;
        let width = cursor.read_f32()?;
        let optional = decode_optional(cursor, flags)?;
        let brush = BrushObject::decode_from(cursor)?;

        Ok(Self {
            version,
            flags,
            unit,
            width,
            optional,
            brush,
        })
    }
}

fn decode_optional(cursor: &mut BinaryCursor<'_>, flags: PenDataFlags) -> Result<PenOptionalData> {
    let mut data = PenOptionalData::default();

    if flags.contains(PenDataFlags::TRANSFORM) {
        data.transform = Some(TransformMatrix::decode(cursor)?);
    }
    if flags.contains(PenDataFlags::START_CAP) {
        data.start_cap = Some(read_enum(cursor, "StartCap", LineCapType::parse)?);
    }
    if flags.contains(PenDataFlags::END_CAP) {
        data.end_cap = Some(read_enum(cursor, "EndCap", LineCapType::parse)?);
    }
    if flags.contains(PenDataFlags::JOIN) {
        data.join = Some(read_enum(cursor, "Join", LineJoinType::parse)?);
    }
    if flags.contains(PenDataFlags::MITER_LIMIT) {
        data.miter_limit = Some(cursor.read_f32()?);
    }
    if flags.contains(PenDataFlags::LINE_STYLE) {
        data.line_style = Some(read_enum(cursor, "LineStyle", LineStyle::parse)?);
    }
    if flags.contains(PenDataFlags::DASHED_LINE_CAP) {
        data.dashed_line_cap = Some(read_enum(
            cursor,
            "DashedLineCapType",
            DashedLineCapType::parse,
        )?);
    }
    if flags.contains(PenDataFlags::DASHED_LINE_OFFSET) {
        data.dashed_line_offset = Some(cursor.read_f32()?);
    }
    if flags.contains(PenDataFlags::DASHED_LINE) {
        data.dashed_line = Some(read_f32_array(cursor)?);
    }
    if flags.contains(PenDataFlags::NON_CENTER) {
        data.alignment = Some(read_enum(cursor, "PenAlignment", PenAlignment::parse)?);
    }
    if flags.contains(PenDataFlags::COMPOUND_LINE) {
        data.compound_line = Some(read_f32_array(cursor)?);
    }
    if flags.contains(PenDataFlags::CUSTOM_START_CAP) {
        data.custom_start_cap = Some(Box::new(read_custom_cap(cursor)?));
    }
    if flags.contains(PenDataFlags::CUSTOM_END_CAP) {
        data.custom_end_cap = Some(Box::new(read_custom_cap(cursor)?));
    }
    Ok(data)
}

fn read_enum<T>(
    cursor: &mut BinaryCursor<'_>,
    field: &'static str,
    parse: fn(&'static str, u32, usize) -> Result<T>,
) -> Result<T> {
    let offset = cursor.position();
    parse(field, cursor.read_u32()?, offset)
}

fn read_f32_array(cursor: &mut BinaryCursor<'_>) -> Result<Vec<f32>> {
    let count = cursor.read_u32()? as usize;
    ensure_elements(cursor, count, 4)?;
    (0..count).map(|_| cursor.read_f32()).collect()
}

fn read_custom_cap(cursor: &mut BinaryCursor<'_>) -> Result<CustomLineCapObject> {
    let size = cursor.read_u32()? as usize;
    let mut cap = cursor.sub_cursor(size)?;
    let decoded = CustomLineCapObject::decode_from(&mut cap)?;
    if !cap.is_empty() {
        return Err(Error::SizeInvariantViolation {
            offset: cap.position(),
            record: RecordType::Object,
            detail: format!("custom line cap leaves {} bytes unread", cap.remaining()),
        });
    }
    Ok(decoded)
}
