//! Control records: Header, EndOfFile, GetDC.

use super::{RecordBody, decode_empty, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::types::{Decode, GraphicsVersion};
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// `EmfPlusFlags` word of the header record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct EmfPlusFlags: u32 {
        /// Metafile was recorded against a video display context
        const VIDEO_DISPLAY = 0x0000_0001;
    }
}

/// Header record flags: `D` (1 bit), reserved (15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderFlags {
    /// `D` bit: dual-mode metafile, EMF records follow the EMF+ records
    pub dual: bool,
}

impl DecodeFlags for HeaderFlags {
    fn from_bits(bits: &mut BitField16, _offset: usize) -> Result<Self> {
        let dual = bits.read_bit()?;
        bits.read_remaining_bits();
        Ok(Self { dual })
    }
}

/// The first record of every EMF+ stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderRecord {
    pub flags: HeaderFlags,
    pub version: GraphicsVersion,
    pub emf_plus_flags: EmfPlusFlags,
    pub logical_dpi_x: u32,
    pub logical_dpi_y: u32,
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    match frame.record_type() {
        RecordType::Header => decode_header(frame, cursor),
        RecordType::EndOfFile => decode_empty(frame, cursor, RecordBody::EndOfFile),
        RecordType::GetDc => decode_empty(frame, cursor, RecordBody::GetDc),
        _ => Err(misrouted(frame)),
    }
}

fn decode_header(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let flags = HeaderFlags::parse(frame.header().flags, frame.flags_offset())?;
    frame.decode_payload(cursor, SizeRule::fixed(0x10), |payload| {
        Ok(RecordBody::Header(HeaderRecord {
            flags,
            version: GraphicsVersion::decode(payload)?,
            emf_plus_flags: EmfPlusFlags::from_bits_retain(payload.read_u32()?),
            logical_dpi_x: payload.read_u32()?,
            logical_dpi_y: payload.read_u32()?,
        }))
    })
}
