//! Object and SerializableObject records.

use super::{RecordBody, misrouted};
use crate::common::binary::BinaryCursor;
use crate::common::bitfield::{BitField16, DecodeFlags};
use crate::common::error::{Error, Result};
use crate::images::emfplus::continuation::ContinuationReassembler;
use crate::images::emfplus::effects::ImageEffect;
use crate::images::emfplus::header::{RECORD_HEADER_SIZE, RecordFrame, RecordType, SizeRule};
use crate::images::emfplus::objects::{GraphicsObject, MAX_OBJECT_ID, ObjectType, decode_object};
use crate::images::emfplus::types::{Decode, Guid};
use serde::Serialize;
use tracing::trace;

/// Read an 8-bit object ID and check it is in the object table range.
pub(crate) fn read_object_id(bits: &mut BitField16, offset: usize) -> Result<u8> {
    let object_id = bits.read_bits(8)?;
    if object_id > u32::from(MAX_OBJECT_ID) {
        return Err(Error::InvalidEnumValue {
            offset,
            field: "ObjectID",
            value: object_id,
            record: None,
        });
    }
    Ok(object_id as u8)
}

/// Object record flags: ObjectID (8), ObjectType (7), Continue (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectFlags {
    pub object_id: u8,
    pub object_type: ObjectType,
    pub continues: bool,
}

impl DecodeFlags for ObjectFlags {
    fn from_bits(bits: &mut BitField16, offset: usize) -> Result<Self> {
        let object_id = read_object_id(bits, offset)?;
        let object_type = ObjectType::parse("ObjectType", bits.read_bits(7)? as u8, offset)?;
        let continues = bits.read_bit()?;
        bits.read_remaining_bits();
        Ok(Self {
            object_id,
            object_type,
            continues,
        })
    }
}

/// One piece of an object spread over several records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectFragment {
    pub object_id: u8,
    pub object_type: ObjectType,
    /// Announced by the record that opens the chain
    pub total_object_size: Option<u32>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Decoded payload of an Object record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectRecord {
    /// A stand-alone object, or the object completed by this record
    Complete(GraphicsObject),
    /// A record with the Continue flag set
    Fragment(ObjectFragment),
}

impl ObjectRecord {
    pub fn object_id(&self) -> u8 {
        match self {
            ObjectRecord::Complete(object) => object.object_id,
            ObjectRecord::Fragment(fragment) => fragment.object_id,
        }
    }
}

pub(super) fn decode(
    frame: &RecordFrame,
    cursor: &mut BinaryCursor<'_>,
    chains: &mut ContinuationReassembler,
) -> Result<RecordBody> {
    match frame.record_type() {
        RecordType::Object => decode_object_record(frame, cursor, chains),
        RecordType::SerializableObject => decode_serializable(frame, cursor),
        _ => Err(misrouted(frame)),
    }
}

fn decode_object_record(
    frame: &RecordFrame,
    cursor: &mut BinaryCursor<'_>,
    chains: &mut ContinuationReassembler,
) -> Result<RecordBody> {
    let flags = ObjectFlags::parse(frame.header().flags, frame.flags_offset())?;
    let ObjectFlags {
        object_id,
        object_type,
        continues,
    } = flags;
    let start = frame.start();

    let object = frame.decode_payload(cursor, SizeRule::Variable, |payload| {
        if continues {
            if chains.has_chain_for(object_id) {
                let data = payload.read_bytes(payload.remaining())?;
                chains.extend(object_id, data, start)?;
                trace!(object_id, fragment = data.len(), "object fragment");
                return Ok(ObjectRecord::Fragment(ObjectFragment {
                    object_id,
                    object_type,
                    total_object_size: None,
                    data: data.to_vec(),
                }));
            }

            if payload.remaining() < 4 {
                return Err(frame.violation(format!(
                    "DataSize {:#x} leaves no room for TotalObjectSize",
                    frame.header().data_size
                )));
            }
            let total = payload.read_u32()?;
            let data_offset = payload.position();
            let data = payload.read_bytes(payload.remaining())?;
            chains.start(object_id, total, data, data_offset, start)?;
            return Ok(ObjectRecord::Fragment(ObjectFragment {
                object_id,
                object_type,
                total_object_size: Some(total),
                data: data.to_vec(),
            }));
        }

        let data_offset = payload.position();
        let data = payload.read_bytes(payload.remaining())?;
        let kind = match chains.close(object_id, data, start)? {
            Some(object) => decode_object(object_type, &object.data, object.data_offset)?,
            None => decode_object(object_type, data, data_offset)?,
        };
        Ok(ObjectRecord::Complete(GraphicsObject { object_id, kind }))
    })?;
    Ok(RecordBody::Object(object))
}

/// SerializableObject: an image effect identified by GUID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializableObjectRecord {
    pub guid: Guid,
    pub effect: ImageEffect,
}

/// `Size == BufferSize + 0x20`, `DataSize == BufferSize + 0x14`.
const SERIALIZABLE_PREFIX: u32 = 0x14;

fn decode_serializable(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    let header = *frame.header();
    frame.decode_payload(cursor, SizeRule::Variable, |payload| {
        let guid = Guid::decode(payload)?;
        let buffer_size = payload.read_u32()?;

        let expected_data = buffer_size.checked_add(SERIALIZABLE_PREFIX);
        let expected_size = expected_data.and_then(|d| d.checked_add(RECORD_HEADER_SIZE));
        if expected_data != Some(header.data_size) || expected_size != Some(header.size) {
            return Err(frame.violation(format!(
                "BufferSize {buffer_size:#x} does not match Size {:#x}/DataSize {:#x}",
                header.size, header.data_size
            )));
        }

        let buffer_offset = payload.position();
        let buffer = payload.read_bytes(buffer_size as usize)?;
        let effect = ImageEffect::decode(&guid, buffer, buffer_offset)?;
        Ok(RecordBody::SerializableObject(SerializableObjectRecord {
            guid,
            effect,
        }))
    })
}
