//! The EMF+ record catalog.
//!
//! [`decode_record`] reads one record of any type; the family modules decode
//! payloads and flags for the record types they own. Drawing records and the
//! reserved multi-format records are kept as opaque payload bytes.

pub mod clipping;
pub mod comment;
pub mod control;
pub mod object;
pub mod property;
pub mod state;
pub mod terminal_server;
pub mod transform;

pub use clipping::{ClipObject, CombineMode, OffsetClip, SetClipRect};
pub use comment::CommentRecord;
pub use control::{EmfPlusFlags, HeaderRecord};
pub use object::{ObjectFlags, ObjectFragment, ObjectRecord, SerializableObjectRecord};
pub use property::{
    CompositingMode, CompositingQuality, InterpolationMode, PixelOffsetMode, SmoothingMode,
    TextRenderingHint,
};
pub use state::BeginContainer;
pub use terminal_server::{TsClip, TsGraphics};
pub use transform::MatrixOrder;

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::continuation::ContinuationReassembler;
use crate::images::emfplus::header::{
    RecordFamily, RecordFrame, RecordHeader, RecordType, SizeRule,
};
use crate::images::emfplus::types::{TransformMatrix, UnitType};
use serde::Serialize;

/// One decoded EMF+ record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub header: RecordHeader,
    pub body: RecordBody,
}

impl Record {
    #[inline]
    pub fn record_type(&self) -> RecordType {
        self.header.record_type
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.header.size
    }
}

/// Decoded payload of a record, one variant per record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordBody {
    // Control
    Header(HeaderRecord),
    EndOfFile,
    GetDc,

    Comment(CommentRecord),

    // Clipping
    ResetClip,
    SetClipRect(SetClipRect),
    SetClipPath(ClipObject),
    SetClipRegion(ClipObject),
    OffsetClip(OffsetClip),

    // Objects
    Object(ObjectRecord),
    SerializableObject(SerializableObjectRecord),

    // State
    Save { stack_index: u32 },
    Restore { stack_index: u32 },
    BeginContainer(BeginContainer),
    BeginContainerNoParams { stack_index: u32 },
    EndContainer { stack_index: u32 },

    // Terminal server
    SetTsGraphics(Box<TsGraphics>),
    SetTsClip(TsClip),

    // Transform
    SetWorldTransform(TransformMatrix),
    ResetWorldTransform,
    MultiplyWorldTransform {
        order: MatrixOrder,
        matrix: TransformMatrix,
    },
    TranslateWorldTransform {
        order: MatrixOrder,
        dx: f32,
        dy: f32,
    },
    ScaleWorldTransform {
        order: MatrixOrder,
        sx: f32,
        sy: f32,
    },
    RotateWorldTransform {
        order: MatrixOrder,
        angle: f32,
    },
    SetPageTransform {
        unit: UnitType,
        scale: f32,
    },

    // Properties
    SetRenderingOrigin {
        x: i32,
        y: i32,
    },
    SetAntiAliasMode {
        anti_alias: bool,
        smoothing_mode: SmoothingMode,
    },
    SetTextRenderingHint(TextRenderingHint),
    SetTextContrast(u16),
    SetInterpolationMode(InterpolationMode),
    SetPixelOffsetMode(PixelOffsetMode),
    SetCompositingMode(CompositingMode),
    SetCompositingQuality(CompositingQuality),

    /// Drawing and multi-format records, payload kept verbatim
    Opaque(Vec<u8>),
}

/// Decode the record at the cursor.
///
/// Object records are decoded without continuation context: a continuing
/// record opens a fresh chain and comes back as a fragment, so the closing
/// record of a multi-record object cannot be decoded in isolation. Use the
/// enumerator, or [`decode_record_with`], for whole streams.
pub fn decode_record(cursor: &mut BinaryCursor<'_>) -> Result<Record> {
    decode_record_with(cursor, &mut ContinuationReassembler::new())
}

/// Decode the record at the cursor, which must be of type `expected`.
pub fn decode_record_of(cursor: &mut BinaryCursor<'_>, expected: RecordType) -> Result<Record> {
    let frame = RecordFrame::expect(cursor, expected)?;
    decode_framed(&frame, cursor, &mut ContinuationReassembler::new())
}

/// Decode the record at the cursor, feeding Object records through `chains`.
pub fn decode_record_with(
    cursor: &mut BinaryCursor<'_>,
    chains: &mut ContinuationReassembler,
) -> Result<Record> {
    let frame = RecordFrame::read(cursor)?;
    decode_framed(&frame, cursor, chains)
}

fn decode_framed(
    frame: &RecordFrame,
    cursor: &mut BinaryCursor<'_>,
    chains: &mut ContinuationReassembler,
) -> Result<Record> {
    let body = match frame.record_type().family() {
        RecordFamily::Control => control::decode(frame, cursor),
        RecordFamily::Comment => comment::decode(frame, cursor),
        RecordFamily::Clipping => clipping::decode(frame, cursor),
        RecordFamily::Object => object::decode(frame, cursor, chains),
        RecordFamily::State => state::decode(frame, cursor),
        RecordFamily::TerminalServer => terminal_server::decode(frame, cursor),
        RecordFamily::Transform => transform::decode(frame, cursor),
        RecordFamily::Property => property::decode(frame, cursor),
        RecordFamily::Drawing | RecordFamily::MultiFormat => {
            frame.decode_payload(cursor, SizeRule::Variable, |payload| {
                Ok(RecordBody::Opaque(payload.read_bytes(payload.remaining())?.to_vec()))
            })
        },
    }
    .map_err(|err| err.in_record(frame.record_type()))?;
    Ok(Record {
        header: *frame.header(),
        body,
    })
}

/// Decode a header-only record.
pub(crate) fn decode_empty(
    frame: &RecordFrame,
    cursor: &mut BinaryCursor<'_>,
    body: RecordBody,
) -> Result<RecordBody> {
    frame.decode_payload(cursor, SizeRule::EMPTY, |_| Ok(body))
}

/// Error for a record routed to a family decoder that does not own it.
pub(crate) fn misrouted(frame: &RecordFrame) -> Error {
    Error::UnexpectedRecordType {
        offset: frame.start(),
        found: frame.record_type().raw(),
        expected: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::test_support::record;
    use proptest::prelude::*;

    #[test]
    fn test_drawing_record_is_preserved() {
        let data = record(0x400A, 0x8001, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut cursor = BinaryCursor::new(&data);
        let record = decode_record(&mut cursor).unwrap();
        assert_eq!(record.record_type(), RecordType::FillRects);
        assert_eq!(record.header.flags, 0x8001);
        assert_eq!(record.body, RecordBody::Opaque(vec![1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(cursor.position(), data.len());
    }

    #[test]
    fn test_decode_record_of_checks_tag() {
        let data = record(0x4031, 0, &[]);
        let record = decode_record_of(&mut BinaryCursor::new(&data), RecordType::ResetClip);
        assert_eq!(record.unwrap().body, RecordBody::ResetClip);

        assert!(matches!(
            decode_record_of(&mut BinaryCursor::new(&data), RecordType::EndOfFile),
            Err(Error::UnexpectedRecordType { .. })
        ));
    }

    /// Every record type with a fixed size rejects any other Size value.
    #[test]
    fn test_fixed_sizes_are_enforced() {
        let fixed: &[(u16, usize)] = &[
            (0x4002, 0),
            (0x4004, 0),
            (0x4025, 4),
            (0x4027, 0x24),
            (0x402A, 0x18),
            (0x4030, 4),
            (0x4031, 0),
            (0x4032, 0x10),
            (0x4035, 8),
            (0x401D, 8),
            (0x4024, 0),
        ];
        for &(tag, data_size) in fixed {
            // SetCompositingQuality has no valid zero flags value
            let flags = if tag == 0x4024 { 0x0001 } else { 0 };
            let data = record(tag, flags, &vec![0u8; data_size + 4]);
            assert!(
                matches!(
                    decode_record(&mut BinaryCursor::new(&data)),
                    Err(Error::SizeInvariantViolation { .. })
                ),
                "tag {tag:#x}"
            );
        }
    }

    #[test]
    fn test_flag_errors_carry_record_type() {
        let data = record(0x4033, 0x0F00, &[]);
        let err = decode_record(&mut BinaryCursor::new(&data)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEnumValue {
                offset: 2,
                field: "CombineMode",
                value: 15,
                record: Some(RecordType::SetClipPath)
            }
        );
        assert_eq!(err.record_type(), Some(RecordType::SetClipPath));
        assert!(err.to_string().contains("SetClipPath"));
    }

    #[test]
    fn test_truncated_stream_carries_record_type() {
        let mut data = record(0x4035, 0, &[0; 8]);
        data.truncate(16);
        let err = decode_record(&mut BinaryCursor::new(&data)).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfData {
                offset: 12,
                record: Some(RecordType::OffsetClip),
                ..
            }
        ));
    }

    proptest! {
        /// Decoding never panics and never consumes a byte count other than
        /// the declared size.
        #[test]
        fn prop_decoded_records_consume_declared_size(
            tag in 0x4001u16..=0x403A,
            flags in any::<u16>(),
            payload in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut payload = payload;
            payload.truncate(payload.len() / 4 * 4);
            let data = record(tag, flags, &payload);
            let mut cursor = BinaryCursor::new(&data);
            if let Ok(record) = decode_record(&mut cursor) {
                prop_assert_eq!(cursor.position(), record.size() as usize);
                prop_assert_eq!(record.size(), record.header.data_size + 12);
            }
        }
    }
}
