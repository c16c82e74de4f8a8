//! Clipping records.

use super::object::read_object_id;
use super::{RecordBody, decode_empty, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::types::{Decode, RectF};
use serde::Serialize;

wire_enum! {
    /// How a new clip combines with the current one.
    pub enum CombineMode: u8 {
        Replace = 0,
        Intersect = 1,
        Union = 2,
        Xor = 3,
        Exclude = 4,
    }
}

fn read_combine_mode(bits: &mut BitField16, offset: usize) -> Result<CombineMode> {
    CombineMode::parse("CombineMode", bits.read_bits(4)? as u8, offset)
}

/// SetClipRect flags: reserved (8), CombineMode (4), reserved (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClipRectFlags {
    pub combine_mode: CombineMode,
}

impl DecodeFlags for ClipRectFlags {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self> {
        bits.read_bits(8)?;
        let combine_mode = read_combine_mode(bits, offset)?;
        bits.read_remaining_bits();
        Ok(Self { combine_mode })
    }
}

/// SetClipPath/SetClipRegion flags: ObjectID (8), CombineMode (4),
/// reserved (4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClipObject {
    pub object_id: u8,
    pub combine_mode: CombineMode,
}

impl DecodeFlags for ClipObject {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self> {
        let object_id = read_object_id(bits, offset)?;
        let combine_mode = read_combine_mode(bits, offset)?;
        bits.read_remaining_bits();
        Ok(Self {
            object_id,
            combine_mode,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SetClipRect {
    pub combine_mode: CombineMode,
    pub rect: RectF,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetClip {
    pub dx: f32,
    pub dy: f32,
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let raw_flags = frame.header().flags;
    let flags_offset = frame.flags_offset();
    match frame.record_type() {
        RecordType::ResetClip => decode_empty(frame, cursor, RecordBody::ResetClip),
        RecordType::SetClipRect => {
            let flags = ClipRectFlags::parse(raw_flags, flags_offset)?;
            frame.decode_payload(cursor, SizeRule::fixed(0x10), |payload| {
                Ok(RecordBody::SetClipRect(SetClipRect {
                    combine_mode: flags.combine_mode,
                    rect: RectF::decode(payload)?,
                }))
            })
        },
        RecordType::SetClipPath => {
            let clip = ClipObject::parse(raw_flags, flags_offset)?;
            decode_empty(frame, cursor, RecordBody::SetClipPath(clip))
        },
        RecordType::SetClipRegion => {
            let clip = ClipObject::parse(raw_flags, flags_offset)?;
            decode_empty(frame, cursor, RecordBody::SetClipRegion(clip))
        },
        RecordType::OffsetClip => frame.decode_payload(cursor, SizeRule::fixed(0x08), |payload| {
            Ok(RecordBody::OffsetClip(OffsetClip {
                dx: payload.read_f32()?,
                dy: payload.read_f32()?,
            }))
        }),
        _ => Err(misrouted(frame)),
    }
}
