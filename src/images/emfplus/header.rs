//! EMF+ record header and size-invariant checking.
//!
//! Every EMF+ record starts with the same 12-byte header:
//!
//! | offset | field    | width |
//! |--------|----------|-------|
//! | 0      | Type     | u16   |
//! | 2      | Flags    | u16   |
//! | 4      | Size     | u32   |
//! | 8      | DataSize | u32   |
//!
//! [`RecordFrame`] runs the shared decode protocol once for all record
//! kinds: read the header, validate `Size`/`DataSize` against a [`SizeRule`],
//! hand a bounded payload cursor to the record-specific decoder, and finally
//! reconcile the number of bytes consumed with what was declared.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use serde::Serialize;

/// Length of the common EMF+ record header.
pub const RECORD_HEADER_SIZE: u32 = 12;

wire_enum! {
    /// EMF+ record type tags ([MS-EMFPLUS] 2.1.1.1).
    pub enum RecordType: u16 {
        Header = 0x4001,
        EndOfFile = 0x4002,
        Comment = 0x4003,
        GetDc = 0x4004,
        MultiFormatStart = 0x4005,
        MultiFormatSection = 0x4006,
        MultiFormatEnd = 0x4007,
        Object = 0x4008,
        Clear = 0x4009,
        FillRects = 0x400A,
        DrawRects = 0x400B,
        FillPolygon = 0x400C,
        DrawLines = 0x400D,
        FillEllipse = 0x400E,
        DrawEllipse = 0x400F,
        FillPie = 0x4010,
        DrawPie = 0x4011,
        DrawArc = 0x4012,
        FillRegion = 0x4013,
        FillPath = 0x4014,
        DrawPath = 0x4015,
        FillClosedCurve = 0x4016,
        DrawClosedCurve = 0x4017,
        DrawCurve = 0x4018,
        DrawBeziers = 0x4019,
        DrawImage = 0x401A,
        DrawImagePoints = 0x401B,
        DrawString = 0x401C,
        SetRenderingOrigin = 0x401D,
        SetAntiAliasMode = 0x401E,
        SetTextRenderingHint = 0x401F,
        SetTextContrast = 0x4020,
        SetInterpolationMode = 0x4021,
        SetPixelOffsetMode = 0x4022,
        SetCompositingMode = 0x4023,
        SetCompositingQuality = 0x4024,
        Save = 0x4025,
        Restore = 0x4026,
        BeginContainer = 0x4027,
        BeginContainerNoParams = 0x4028,
        EndContainer = 0x4029,
        SetWorldTransform = 0x402A,
        ResetWorldTransform = 0x402B,
        MultiplyWorldTransform = 0x402C,
        TranslateWorldTransform = 0x402D,
        ScaleWorldTransform = 0x402E,
        RotateWorldTransform = 0x402F,
        SetPageTransform = 0x4030,
        ResetClip = 0x4031,
        SetClipRect = 0x4032,
        SetClipPath = 0x4033,
        SetClipRegion = 0x4034,
        OffsetClip = 0x4035,
        DrawDriverString = 0x4036,
        StrokeFillPath = 0x4037,
        SerializableObject = 0x4038,
        SetTsGraphics = 0x4039,
        SetTsClip = 0x403A,
    }
}

/// Record families, used to route a header to its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordFamily {
    Control,
    Comment,
    Clipping,
    Object,
    State,
    TerminalServer,
    Transform,
    Property,
    Drawing,
    MultiFormat,
}

impl RecordType {
    /// Family this record type belongs to.
    pub const fn family(self) -> RecordFamily {
        use RecordType::*;
        match self {
            Header | EndOfFile | GetDc => RecordFamily::Control,
            Comment => RecordFamily::Comment,
            ResetClip | SetClipRect | SetClipPath | SetClipRegion | OffsetClip => {
                RecordFamily::Clipping
            },
            Object | SerializableObject => RecordFamily::Object,
            Save | Restore | BeginContainer | BeginContainerNoParams | EndContainer => {
                RecordFamily::State
            },
            SetTsGraphics | SetTsClip => RecordFamily::TerminalServer,
            SetWorldTransform | ResetWorldTransform | MultiplyWorldTransform
            | TranslateWorldTransform | ScaleWorldTransform | RotateWorldTransform
            | SetPageTransform => RecordFamily::Transform,
            SetRenderingOrigin | SetAntiAliasMode | SetTextRenderingHint | SetTextContrast
            | SetInterpolationMode | SetPixelOffsetMode | SetCompositingMode
            | SetCompositingQuality => RecordFamily::Property,
            MultiFormatStart | MultiFormatSection | MultiFormatEnd => RecordFamily::MultiFormat,
            Clear | FillRects | DrawRects | FillPolygon | DrawLines | FillEllipse
            | DrawEllipse | FillPie | DrawPie | DrawArc | FillRegion | FillPath | DrawPath
            | FillClosedCurve | DrawClosedCurve | DrawCurve | DrawBeziers | DrawImage
            | DrawImagePoints | DrawString | DrawDriverString | StrokeFillPath => {
                RecordFamily::Drawing
            },
        }
    }
}

/// The common header of one EMF+ record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordHeader {
    pub record_type: RecordType,
    /// Raw flags word; records with packed flags also expose a decoded form
    pub flags: u16,
    /// Whole record length in bytes, header included
    pub size: u32,
    /// Payload length in bytes
    pub data_size: u32,
}

/// How a record's `Size`/`DataSize` pair is validated before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Both fields must equal these constants
    Fixed { size: u32, data_size: u32 },
    /// `size == data_size + 12` with a 4-byte aligned `data_size`; the record
    /// checks its own payload formula
    Variable,
}

impl SizeRule {
    /// Fixed rule for a record whose payload is `data_size` bytes.
    pub const fn fixed(data_size: u32) -> Self {
        SizeRule::Fixed {
            size: data_size + RECORD_HEADER_SIZE,
            data_size,
        }
    }

    /// Fixed rule for a header-only record.
    pub const EMPTY: SizeRule = SizeRule::fixed(0);
}

/// A record header in the middle of being decoded.
#[derive(Debug, Clone, Copy)]
pub struct RecordFrame {
    header: RecordHeader,
    start: usize,
    data_start: usize,
}

impl RecordFrame {
    /// Read the header of a record of any defined type.
    pub fn read(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let start = cursor.position();
        let tag = cursor.read_u16()?;
        let record_type = RecordType::from_raw(tag).ok_or(Error::UnexpectedRecordType {
            offset: start,
            found: tag,
            expected: None,
        })?;
        Self::read_rest(cursor, start, record_type)
    }

    /// Read the header of a record that must be of type `expected`.
    pub fn expect(cursor: &mut BinaryCursor<'_>, expected: RecordType) -> Result<Self> {
        let start = cursor.position();
        let tag = cursor.read_u16()?;
        if tag != expected.raw() {
            return Err(Error::UnexpectedRecordType {
                offset: start,
                found: tag,
                expected: Some(expected),
            });
        }
        Self::read_rest(cursor, start, expected)
    }

    fn read_rest(
        cursor: &mut BinaryCursor<'_>,
        start: usize,
        record_type: RecordType,
    ) -> Result<Self> {
        let flags = cursor.read_u16()?;
        let size = cursor.read_u32()?;
        let data_size = cursor.read_u32()?;
        Ok(Self {
            header: RecordHeader {
                record_type,
                flags,
                size,
                data_size,
            },
            start,
            data_start: cursor.position(),
        })
    }

    #[inline]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    #[inline]
    pub fn record_type(&self) -> RecordType {
        self.header.record_type
    }

    /// Absolute offset of the record's first byte.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute offset of the flags word.
    #[inline]
    pub fn flags_offset(&self) -> usize {
        self.start + 2
    }

    /// Absolute offset of the first payload byte.
    #[inline]
    pub fn data_start(&self) -> usize {
        self.data_start
    }

    /// Build a size invariant error for this record.
    pub fn violation(&self, detail: impl Into<String>) -> Error {
        Error::SizeInvariantViolation {
            offset: self.start,
            record: self.header.record_type,
            detail: detail.into(),
        }
    }

    /// Validate `Size`/`DataSize` against `rule`.
    pub fn check(&self, rule: SizeRule) -> Result<()> {
        let RecordHeader {
            size, data_size, ..
        } = self.header;
        match rule {
            SizeRule::Fixed {
                size: expected_size,
                data_size: expected_data,
            } => {
                if size != expected_size || data_size != expected_data {
                    return Err(self.violation(format!(
                        "Size {size:#x}/DataSize {data_size:#x}, expected {expected_size:#x}/{expected_data:#x}"
                    )));
                }
            },
            SizeRule::Variable => {
                if data_size.checked_add(RECORD_HEADER_SIZE) != Some(size) {
                    return Err(self.violation(format!(
                        "Size {size:#x} is not DataSize {data_size:#x} + {RECORD_HEADER_SIZE:#x}"
                    )));
                }
                if data_size % 4 != 0 {
                    return Err(self.violation(format!(
                        "DataSize {data_size:#x} is not a multiple of 4"
                    )));
                }
            },
        }
        Ok(())
    }

    /// Run the payload decoder on exactly `DataSize` bytes.
    ///
    /// `rule` is checked first. The decoder receives a cursor bounded to the
    /// payload; reading past it is reported as a [`Error::TrailingDataMismatch`]
    /// overrun, and leaving bytes unread as an underrun.
    pub fn decode_payload<'a, T>(
        &self,
        cursor: &mut BinaryCursor<'a>,
        rule: SizeRule,
        decode: impl FnOnce(&mut BinaryCursor<'a>) -> Result<T>,
    ) -> Result<T> {
        self.check(rule)?;
        let mut payload = cursor.sub_cursor(self.header.data_size as usize)?;
        let value = decode(&mut payload).map_err(|err| self.overrun(err))?;
        self.finish(&payload, cursor)?;
        Ok(value)
    }

    fn overrun(&self, err: Error) -> Error {
        match err {
            Error::OutOfData { offset, needed, .. } => Error::TrailingDataMismatch {
                offset: self.start,
                record: self.header.record_type,
                declared: self.header.data_size as usize,
                consumed: offset + needed - self.data_start,
            },
            other => other,
        }
    }

    /// Reconcile consumed byte counts with the declared sizes.
    pub fn finish(&self, payload: &BinaryCursor<'_>, cursor: &BinaryCursor<'_>) -> Result<()> {
        let consumed = payload.position() - self.data_start;
        if consumed != self.header.data_size as usize {
            return Err(Error::TrailingDataMismatch {
                offset: self.start,
                record: self.header.record_type,
                declared: self.header.data_size as usize,
                consumed,
            });
        }

        let total = cursor.position() - self.start;
        if total != self.header.size as usize {
            return Err(Error::TrailingDataMismatch {
                offset: self.start,
                record: self.header.record_type,
                declared: self.header.size as usize,
                consumed: total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::test_support::record_with_sizes;

    #[test]
    fn test_every_tag_round_trips() {
        for tag in 0x4001u16..=0x403A {
            let record_type = RecordType::from_raw(tag).expect("defined tag");
            assert_eq!(record_type.raw(), tag);
        }
        assert!(RecordType::from_raw(0x4000).is_none());
        assert!(RecordType::from_raw(0x403B).is_none());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let data = record_with_sizes(0x4100, 0, 0x0C, 0, &[]);
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(
            RecordFrame::read(&mut cursor).unwrap_err(),
            Error::UnexpectedRecordType {
                offset: 0,
                found: 0x4100,
                expected: None
            }
        );
    }

    #[test]
    fn test_expect_rejects_other_tag() {
        let data = record_with_sizes(0x4031, 0, 0x0C, 0, &[]);
        let mut cursor = BinaryCursor::new(&data);
        let err = RecordFrame::expect(&mut cursor, RecordType::OffsetClip).unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedRecordType {
                offset: 0,
                found: 0x4031,
                expected: Some(RecordType::OffsetClip)
            }
        );
    }

    #[test]
    fn test_variable_rule() {
        let data = record_with_sizes(0x4003, 0, 0x14, 0x08, &[0; 8]);
        let frame = RecordFrame::read(&mut BinaryCursor::new(&data)).unwrap();
        assert!(frame.check(SizeRule::Variable).is_ok());

        let data = record_with_sizes(0x4003, 0, 0x12, 0x06, &[0; 6]);
        let frame = RecordFrame::read(&mut BinaryCursor::new(&data)).unwrap();
        assert!(matches!(
            frame.check(SizeRule::Variable),
            Err(Error::SizeInvariantViolation { .. })
        ));

        let data = record_with_sizes(0x4003, 0, 0x18, 0x08, &[0; 12]);
        let frame = RecordFrame::read(&mut BinaryCursor::new(&data)).unwrap();
        assert!(frame.check(SizeRule::Variable).is_err());
    }

    #[test]
    fn test_payload_underrun_and_overrun() {
        let data = record_with_sizes(0x4025, 0, 0x10, 0x04, &[1, 0, 0, 0]);

        let mut cursor = BinaryCursor::new(&data);
        let frame = RecordFrame::read(&mut cursor).unwrap();
        let err = frame
            .decode_payload(&mut cursor, SizeRule::fixed(4), |p| p.read_u16())
            .unwrap_err();
        assert_eq!(
            err,
            Error::TrailingDataMismatch {
                offset: 0,
                record: RecordType::Save,
                declared: 4,
                consumed: 2
            }
        );

        let mut cursor = BinaryCursor::new(&data);
        let frame = RecordFrame::read(&mut cursor).unwrap();
        let err = frame
            .decode_payload(&mut cursor, SizeRule::fixed(4), |p| {
                p.read_u32()?;
                p.read_u32()
            })
            .unwrap_err();
        assert_eq!(
            err,
            Error::TrailingDataMismatch {
                offset: 0,
                record: RecordType::Save,
                declared: 4,
                consumed: 8
            }
        );
    }

    #[test]
    fn test_truncated_buffer_is_out_of_data() {
        let mut data = record_with_sizes(0x4025, 0, 0x10, 0x04, &[1, 0, 0, 0]);
        data.truncate(14);
        let mut cursor = BinaryCursor::new(&data);
        let frame = RecordFrame::read(&mut cursor).unwrap();
        let err = frame
            .decode_payload(&mut cursor, SizeRule::fixed(4), |p| p.read_u32())
            .unwrap_err();
        assert!(matches!(err, Error::OutOfData { offset: 12, .. }));
    }
}
