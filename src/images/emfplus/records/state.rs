//! Graphics state records: Save, Restore and containers.

use super::transform::PageUnitFlags;
use super::{RecordBody, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::DecodeFlags;
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::types::{Decode, RectF, UnitType};
use serde::Serialize;

/// BeginContainer: a new state block mapping `src_rect` onto `dest_rect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeginContainer {
    pub page_unit: UnitType,
    pub dest_rect: RectF,
    pub src_rect: RectF,
    pub stack_index: u32,
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let build: fn(u32) -> RecordBody = match frame.record_type() {
        RecordType::BeginContainer => return decode_begin_container(frame, cursor),
        RecordType::Save => |stack_index| RecordBody::Save { stack_index },
        RecordType::Restore => |stack_index| RecordBody::Restore { stack_index },
        RecordType::BeginContainerNoParams => {
            |stack_index| RecordBody::BeginContainerNoParams { stack_index }
        },
        RecordType::EndContainer => |stack_index| RecordBody::EndContainer { stack_index },
        _ => return Err(misrouted(frame)),
    };
    frame.decode_payload(cursor, SizeRule::fixed(0x04), |payload| {
        Ok(build(payload.read_u32()?))
    })
}

fn decode_begin_container(
    frame: &RecordFrame,
    cursor: &mut BinaryCursor<'_>,
) -> Result<RecordBody> {
    let flags = PageUnitFlags::parse(frame.header().flags, frame.flags_offset())?;
    frame.decode_payload(cursor, SizeRule::fixed(0x24), |payload| {
        Ok(RecordBody::BeginContainer(BeginContainer {
            page_unit: flags.unit,
            dest_rect: RectF::decode(payload)?,
            src_rect: RectF::decode(payload)?,
            stack_index: payload.read_u32()?,
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::records::decode_record;
    use crate::images::emfplus::test_support::record;

    #[test]
    fn test_save_and_restore() {
        let data = record(0x4025, 0, &7u32.to_le_bytes());
        assert_eq!(
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body,
            RecordBody::Save { stack_index: 7 }
        );
        let data = record(0x4029, 0, &9u32.to_le_bytes());
        assert_eq!(
            decode_record(&mut BinaryCursor::new(&data)).unwrap().body,
            RecordBody::EndContainer { stack_index: 9 }
        );
    }

    #[test]
    fn test_begin_container() {
        let mut payload = Vec::new();
        for v in [0.0f32, 0.0, 100.0, 50.0, 0.0, 0.0, 200.0, 100.0] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload.extend_from_slice(&3u32.to_le_bytes());
        let data = record(0x4027, 0x0002, &payload);
        assert_eq!(data.len(), 0x30);

        let mut cursor = BinaryCursor::new(&data);
        let RecordBody::BeginContainer(container) = decode_record(&mut cursor).unwrap().body else {
            panic!("expected BeginContainer");
        };
        assert_eq!(container.page_unit, UnitType::Pixel);
        assert_eq!(container.src_rect.width, 200.0);
        assert_eq!(container.stack_index, 3);
        assert_eq!(cursor.position(), 0x30);
    }
}
