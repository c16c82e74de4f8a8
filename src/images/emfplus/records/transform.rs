//! World and page transform records.

use super::{RecordBody, decode_empty, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::types::{Decode, TransformMatrix, UnitType};
use serde::Serialize;

/// Which side the new matrix is multiplied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatrixOrder {
    /// New matrix on the left of the current world transform
    Prepend,
    /// New matrix on the right
    Append,
}

/// Flags of the multiply/translate/scale/rotate records: reserved (13),
/// post-multiply (1), reserved (2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixOrderFlags {
    pub order: MatrixOrder,
}

impl DecodeFlags for MatrixOrderFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        bits.read_bits(13)?;
        let order = if bits.read_bit()? {
            MatrixOrder::Append
        } else {
            MatrixOrder::Prepend
        };
        bits.read_remaining_bits();
        Ok(Self { order })
    }
}

/// Page unit flags shared by SetPageTransform and BeginContainer:
/// PageUnit (8), reserved (8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageUnitFlags {
    pub unit: UnitType,
}

impl DecodeFlags for PageUnitFlags {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self> {
        let unit = UnitType::parse("PageUnit", bits.read_bits(8)?, offset)?;
        bits.read_remaining_bits();
        Ok(Self { unit })
    }
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let raw_flags = frame.header().flags;
    let flags_offset = frame.flags_offset();
    let order = || MatrixOrderFlags::parse(raw_flags, flags_offset).map(|flags| flags.order);

    match frame.record_type() {
        RecordType::SetWorldTransform => {
            frame.decode_payload(cursor, SizeRule::fixed(0x18), |payload| {
                Ok(RecordBody::SetWorldTransform(TransformMatrix::decode(payload)?))
            })
        },
        RecordType::ResetWorldTransform => {
            decode_empty(frame, cursor, RecordBody::ResetWorldTransform)
        },
        RecordType::MultiplyWorldTransform => {
            let order = order()?;
            frame.decode_payload(cursor, SizeRule::fixed(0x18), |payload| {
                Ok(RecordBody::MultiplyWorldTransform {
                    order,
                    matrix: TransformMatrix::decode(payload)?,
                })
            })
        },
        RecordType::TranslateWorldTransform => {
            let order = order()?;
            frame.decode_payload(cursor, SizeRule::fixed(0x08), |payload| {
                Ok(RecordBody::TranslateWorldTransform {
                    order,
                    dx: payload.read_f32()?,
                    dy: payload.read_f32()?,
                })
            })
        },
        RecordType::ScaleWorldTransform => {
            let order = order()?;
            frame.decode_payload(cursor, SizeRule::fixed(0x08), |payload| {
                Ok(RecordBody::ScaleWorldTransform {
                    order,
                    sx: payload.read_f32()?,
                    sy: payload.read_f32()?,
                })
            })
        },
        RecordType::RotateWorldTransform => {
            let order = order()?;
            frame.decode_payload(cursor, SizeRule::fixed(0x04), |payload| {
                Ok(RecordBody::RotateWorldTransform {
                    order,
                    angle: payload.read_f32()?,
                })
            })
        },
        RecordType::SetPageTransform => {
            let PageUnitFlags { unit } = PageUnitFlags::parse(raw_flags, flags_offset)?;
            frame.decode_payload(cursor, SizeRule::fixed(0x04), |payload| {
                Ok(RecordBody::SetPageTransform {
                    unit,
                    scale: payload.read_f32()?,
                })
            })
        },
        _ => Err(misrouted(frame)),
    }
}
