//! Byte builders shared by the unit tests.

use crate::images::emf::parser::{EMF_PLUS_COMMENT_ID, EMF_SIGNATURE, EMR_COMMENT, EMR_EOF, EMR_HEADER};
use crate::images::emfplus::objects::ObjectType;
use crate::images::emfplus::types::{Guid, METAFILE_SIGNATURE};

fn push_u32(data: &mut Vec<u8>, value: u32) {
    data.extend_from_slice(&value.to_le_bytes());
}

fn pad4(data: &mut Vec<u8>) {
    data.resize(data.len().next_multiple_of(4), 0);
}

/// Record with explicit Size and DataSize fields.
pub(crate) fn record_with_sizes(
    tag: u16,
    flags: u16,
    size: u32,
    data_size: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(12 + payload.len());
    data.extend_from_slice(&tag.to_le_bytes());
    data.extend_from_slice(&flags.to_le_bytes());
    push_u32(&mut data, size);
    push_u32(&mut data, data_size);
    data.extend_from_slice(payload);
    data
}

/// Well-formed record around `payload`.
pub(crate) fn record(tag: u16, flags: u16, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    record_with_sizes(tag, flags, len + 12, len, payload)
}

/// Graphics version word for GDI+ 1.1.
pub(crate) fn graphics_version() -> u32 {
    (METAFILE_SIGNATURE << 12) | 2
}

/// EMF+ Header record at 96 dpi for a video display.
pub(crate) fn header_record(dual: bool) -> Vec<u8> {
    let mut payload = Vec::with_capacity(16);
    push_u32(&mut payload, graphics_version());
    push_u32(&mut payload, 1);
    push_u32(&mut payload, 96);
    push_u32(&mut payload, 96);
    record(0x4001, u16::from(dual), &payload)
}

/// Hatch brush object: DiagonalCross, black on white.
pub(crate) fn hatch_brush() -> Vec<u8> {
    let mut data = Vec::with_capacity(20);
    push_u32(&mut data, graphics_version());
    push_u32(&mut data, 1);
    push_u32(&mut data, 5);
    push_u32(&mut data, 0xFF00_0000);
    push_u32(&mut data, 0xFFFF_FFFF);
    data
}

/// Object record with the given ID, type and continuation bit.
pub(crate) fn object_record(
    id: u8,
    object_type: ObjectType,
    continues: bool,
    payload: &[u8],
) -> Vec<u8> {
    let flags = u16::from(id) | (u16::from(object_type.raw()) << 8) | (u16::from(continues) << 15);
    record(0x4008, flags, payload)
}

/// Image object carrying metafile bytes of type `metafile_type`.
pub(crate) fn image_object(metafile_type: u32, bytes: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(16 + bytes.len());
    push_u32(&mut data, graphics_version());
    push_u32(&mut data, 2);
    push_u32(&mut data, metafile_type);
    push_u32(&mut data, bytes.len() as u32);
    data.extend_from_slice(bytes);
    pad4(&mut data);
    data
}

/// GUID in its wire form.
pub(crate) fn guid_bytes(guid: &Guid) -> Vec<u8> {
    let mut data = guid.data1.to_le_bytes().to_vec();
    data.extend_from_slice(&guid.data2.to_le_bytes());
    data.extend_from_slice(&guid.data3.to_le_bytes());
    data.extend_from_slice(&guid.data4);
    data
}

/// Minimal EMF file with one EMF+ comment record per stream.
pub(crate) fn emf_file(streams: &[&[u8]]) -> Vec<u8> {
    let mut body = Vec::new();
    for stream in streams {
        let mut comment = Vec::new();
        push_u32(&mut comment, EMR_COMMENT);
        push_u32(&mut comment, 0);
        push_u32(&mut comment, stream.len() as u32 + 4);
        push_u32(&mut comment, EMF_PLUS_COMMENT_ID);
        comment.extend_from_slice(stream);
        pad4(&mut comment);
        let size = comment.len() as u32;
        comment[4..8].copy_from_slice(&size.to_le_bytes());
        body.extend(comment);
    }
    push_u32(&mut body, EMR_EOF);
    push_u32(&mut body, 20);
    push_u32(&mut body, 0);
    push_u32(&mut body, 16);
    push_u32(&mut body, 20);

    let total = 88 + body.len() as u32;
    let mut data = Vec::with_capacity(total as usize);
    push_u32(&mut data, EMR_HEADER);
    push_u32(&mut data, 88);
    for v in [0u32, 0, 100, 100, 0, 0, 2646, 2646] {
        push_u32(&mut data, v);
    }
    push_u32(&mut data, EMF_SIGNATURE);
    push_u32(&mut data, 0x0001_0000);
    push_u32(&mut data, total);
    push_u32(&mut data, streams.len() as u32 + 2);
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    for v in [0u32, 0, 0, 1024, 768, 320, 240] {
        push_u32(&mut data, v);
    }
    data.extend(body);
    data
}
