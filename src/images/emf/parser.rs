// EMF file parser
//
// Walks Enhanced Metafile records and collects the EMF+ command stream carried
// in EMR_COMMENT records.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::types::RectL;
use zerocopy::{I32, LE, U16, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

/// EMR_HEADER record type
pub const EMR_HEADER: u32 = 0x0000_0001;
/// EMR_EOF record type
pub const EMR_EOF: u32 = 0x0000_000E;
/// EMR_COMMENT record type
pub const EMR_COMMENT: u32 = 0x0000_0046;

/// " EMF" signature of the header record
pub const EMF_SIGNATURE: u32 = 0x464D_4520;
/// "EMF+" comment identifier
pub const EMF_PLUS_COMMENT_ID: u32 = 0x2B46_4D45;

/// Smallest EMR_HEADER record (no description, pixel format or OpenGL fields)
const MIN_HEADER_SIZE: usize = 88;

/// EMF header information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmfHeader {
    /// Bounds of the metafile in device units
    pub bounds: RectL,
    /// Frame rectangle in .01 millimeter units
    pub frame: RectL,
    pub version: u32,
    /// Size of the file in bytes
    pub size: u32,
    /// Number of records, header and EOF included
    pub num_records: u32,
    pub num_handles: u16,
    /// Size of the header record itself
    pub record_size: u32,
}

/// Raw EMF header structure (88 bytes)
#[derive(Debug, Clone, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
#[allow(dead_code)]
struct RawEmfHeader {
    record_type: U32<LE>,
    record_size: U32<LE>,
    bounds: [I32<LE>; 4],
    frame: [I32<LE>; 4],
    signature: U32<LE>,
    version: U32<LE>,
    size: U32<LE>,
    num_records: U32<LE>,
    num_handles: U16<LE>,
    reserved: U16<LE>,
    description_size: U32<LE>,
    description_offset: U32<LE>,
    num_palette: U32<LE>,
    device: [I32<LE>; 2],
    millimeters: [I32<LE>; 2],
}

fn rect(raw: &[I32<LE>; 4]) -> RectL {
    RectL {
        left: raw[0].get(),
        top: raw[1].get(),
        right: raw[2].get(),
        bottom: raw[3].get(),
    }
}

fn invalid(detail: impl Into<String>) -> Error {
    Error::InvalidMetafile(format!("EMF: {}", detail.into()))
}

impl EmfHeader {
    /// Parse the EMR_HEADER record at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_HEADER_SIZE {
            return Err(invalid(format!("{} bytes is too short for a header", data.len())));
        }
        let raw: RawEmfHeader = BinaryCursor::new(data).read_struct()?;

        if raw.record_type.get() != EMR_HEADER {
            return Err(invalid(format!(
                "first record has type 0x{:08X}, not EMR_HEADER",
                raw.record_type.get()
            )));
        }
        if raw.signature.get() != EMF_SIGNATURE {
            return Err(invalid(format!("bad signature 0x{:08X}", raw.signature.get())));
        }

        let record_size = raw.record_size.get();
        if (record_size as usize) < MIN_HEADER_SIZE
            || record_size as usize > data.len()
            || record_size % 4 != 0
        {
            return Err(invalid(format!("bad header record size {record_size}")));
        }

        Ok(Self {
            bounds: rect(&raw.bounds),
            frame: rect(&raw.frame),
            version: raw.version.get(),
            size: raw.size.get(),
            num_records: raw.num_records.get(),
            num_handles: raw.num_handles.get(),
            record_size,
        })
    }

    /// Width of the bounds in device units
    pub fn width(&self) -> i32 {
        self.bounds.right - self.bounds.left
    }

    /// Height of the bounds in device units
    pub fn height(&self) -> i32 {
        self.bounds.bottom - self.bounds.top
    }
}

/// EMF record borrowed from the metafile buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmfRecord<'a> {
    pub record_type: u32,
    /// Offset of the record within the metafile
    pub offset: usize,
    /// Record data (excluding type and size)
    pub data: &'a [u8],
}

impl<'a> EmfRecord<'a> {
    /// Parse the record at `offset`. Returns the record and its size.
    pub fn parse(data: &'a [u8], offset: usize) -> Result<(Self, usize)> {
        let mut cursor = BinaryCursor::with_base(data.get(offset..).unwrap_or_default(), offset);
        let (record_type, size) = match (cursor.read_u32(), cursor.read_u32()) {
            (Ok(record_type), Ok(size)) => (record_type, size as usize),
            _ => return Err(invalid(format!("truncated record header at offset {offset}"))),
        };
        if size < 8 || size % 4 != 0 || size - 8 > cursor.remaining() {
            return Err(invalid(format!(
                "record 0x{record_type:08X} at offset {offset} has bad size {size}"
            )));
        }
        let record_data = cursor.read_bytes(size - 8)?;
        Ok((
            Self {
                record_type,
                offset,
                data: record_data,
            },
            size,
        ))
    }

    /// EMF+ payload of an EMR_COMMENT record carrying the EMF+ identifier.
    pub fn emf_plus_payload(&self) -> Result<Option<&'a [u8]>> {
        if self.record_type != EMR_COMMENT || self.data.len() < 8 {
            return Ok(None);
        }
        let mut cursor = BinaryCursor::with_base(self.data, self.offset + 8);
        let data_size = cursor.read_u32()? as usize;
        if cursor.read_u32()? != EMF_PLUS_COMMENT_ID {
            return Ok(None);
        }
        // DataSize counts the identifier.
        let len = data_size
            .checked_sub(4)
            .filter(|&len| len <= cursor.remaining())
            .ok_or_else(|| {
                invalid(format!(
                    "EMF+ comment at offset {} declares {data_size} bytes",
                    self.offset
                ))
            })?;
        Ok(Some(cursor.read_bytes(len)?))
    }
}

/// EMF file parser
///
/// Construction validates the header and the whole record chain up to
/// EMR_EOF, so a successfully created parser always holds a well-formed
/// record list.
#[derive(Debug, Clone)]
pub struct EmfParser<'a> {
    pub header: EmfHeader,
    /// All records after the header, EMR_EOF included
    pub records: Vec<EmfRecord<'a>>,
}

impl<'a> EmfParser<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let header = EmfHeader::parse(data)?;
        let mut records = Vec::new();
        let mut offset = header.record_size as usize;

        loop {
            if offset >= data.len() {
                return Err(invalid("record chain ends without EMR_EOF"));
            }
            let (record, consumed) = EmfRecord::parse(data, offset)?;
            offset += consumed;
            let is_eof = record.record_type == EMR_EOF;
            records.push(record);
            if is_eof {
                break;
            }
        }

        Ok(Self { header, records })
    }

    /// Concatenated payloads of every EMF+ comment record, in file order.
    pub fn emf_plus_stream(&self) -> Result<Vec<u8>> {
        let mut stream = Vec::new();
        for record in &self.records {
            if let Some(payload) = record.emf_plus_payload()? {
                stream.extend_from_slice(payload);
            }
        }
        Ok(stream)
    }

    /// Whether any record carries EMF+ commands.
    pub fn has_emf_plus(&self) -> bool {
        self.records
            .iter()
            .any(|record| matches!(record.emf_plus_payload(), Ok(Some(_))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::emfplus::test_support::{emf_file, record};

    #[test]
    fn test_emf_signature() {
        // " EMF" in little-endian
        assert_eq!(EMF_SIGNATURE.to_le_bytes(), [0x20, 0x45, 0x4D, 0x46]);
        assert_eq!(&EMF_PLUS_COMMENT_ID.to_le_bytes(), b"EMF+");
    }

    #[test]
    fn test_emf_plus_comments_are_concatenated() {
        let first = record(0x4031, 0, &[]);
        let second = record(0x4002, 0, &[]);
        let data = emf_file(&[first.as_slice(), second.as_slice()]);

        let parser = EmfParser::new(&data).unwrap();
        assert_eq!(parser.records.len(), 3);
        assert_eq!(parser.records.last().map(|r| r.record_type), Some(EMR_EOF));
        assert!(parser.has_emf_plus());
        assert_eq!(parser.emf_plus_stream().unwrap(), [first, second].concat());
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut data = emf_file(&[]);
        data[40] = 0;
        assert!(matches!(
            EmfParser::new(&data),
            Err(Error::InvalidMetafile(_))
        ));
    }

    #[test]
    fn test_rejects_missing_eof() {
        let data = emf_file(&[]);
        let truncated = &data[..data.len() - 20];
        assert!(matches!(
            EmfParser::new(truncated),
            Err(Error::InvalidMetafile(_))
        ));
    }

    #[test]
    fn test_rejects_overlong_record() {
        let comment = record(0x4031, 0, &[]);
        let mut data = emf_file(&[comment.as_slice()]);
        // Size field of the comment record, which follows the 88-byte header
        data[92] = 0xF0;
        assert!(matches!(
            EmfParser::new(&data),
            Err(Error::InvalidMetafile(_))
        ));
    }
}
