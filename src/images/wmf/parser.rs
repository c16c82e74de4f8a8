// WMF file parser
//
// Validates Windows Metafile headers and the record chain.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use zerocopy::{I16, LE, U16, U32};
use zerocopy_derive::{FromBytes as DeriveFromBytes, Immutable, KnownLayout};

/// META_EOF function code
pub const META_EOF: u16 = 0x0000;

fn invalid(detail: impl Into<String>) -> Error {
    Error::InvalidMetafile(format!("WMF: {}", detail.into()))
}

/// WMF file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmfFileType {
    /// Memory metafile
    Memory = 1,
    /// Disk metafile
    Disk = 2,
}

/// Placeable metafile header (22 bytes), optionally preceding the standard
/// header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmfPlaceableHeader {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
    /// Logical units per inch
    pub inch: u16,
    pub checksum: u16,
}

#[derive(Debug, Clone, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawPlaceableHeader {
    key: U32<LE>,
    handle: U16<LE>,
    bounds: [I16<LE>; 4],
    inch: U16<LE>,
    reserved: U32<LE>,
    checksum: U16<LE>,
}

impl WmfPlaceableHeader {
    pub const KEY: u32 = 0x9AC6_CDD7;
    pub const SIZE: usize = 22;

    /// Check if data starts with a placeable header
    pub fn is_placeable(data: &[u8]) -> bool {
        data.get(..4) == Some(Self::KEY.to_le_bytes().as_slice())
    }

    pub fn parse(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawPlaceableHeader = cursor
            .read_struct()
            .map_err(|_| invalid("placeable header too short"))?;
        if raw.key.get() != Self::KEY {
            return Err(invalid(format!("bad placeable key 0x{:08X}", raw.key.get())));
        }
        if raw.handle.get() != 0 || raw.reserved.get() != 0 {
            return Err(invalid("placeable header reserved fields are not zero"));
        }
        Ok(Self {
            left: raw.bounds[0].get(),
            top: raw.bounds[1].get(),
            right: raw.bounds[2].get(),
            bottom: raw.bounds[3].get(),
            inch: raw.inch.get(),
            checksum: raw.checksum.get(),
        })
    }

    pub fn width(&self) -> i16 {
        self.right.wrapping_sub(self.left)
    }

    pub fn height(&self) -> i16 {
        self.bottom.wrapping_sub(self.top)
    }
}

/// WMF standard header (18 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmfHeader {
    pub file_type: WmfFileType,
    pub version: u16,
    /// Size of file in 16-bit words
    pub file_size: u32,
    pub num_objects: u16,
    /// Size of largest record in 16-bit words
    pub max_record: u32,
}

#[derive(Debug, Clone, DeriveFromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawWmfHeader {
    file_type: U16<LE>,
    header_size: U16<LE>,
    version: U16<LE>,
    file_size: [U16<LE>; 2],
    num_objects: U16<LE>,
    max_record: [U16<LE>; 2],
    num_members: U16<LE>,
}

fn words(pair: &[U16<LE>; 2]) -> u32 {
    u32::from(pair[0].get()) | (u32::from(pair[1].get()) << 16)
}

impl WmfHeader {
    pub const SIZE: usize = 18;

    pub fn parse(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let raw: RawWmfHeader = cursor
            .read_struct()
            .map_err(|_| invalid("header too short"))?;
        let file_type = match raw.file_type.get() {
            1 => WmfFileType::Memory,
            2 => WmfFileType::Disk,
            other => return Err(invalid(format!("unknown file type {other}"))),
        };
        if raw.header_size.get() != 9 {
            return Err(invalid(format!("header size {} words, expected 9", raw.header_size.get())));
        }
        let version = raw.version.get();
        if version != 0x0100 && version != 0x0300 {
            return Err(invalid(format!("unknown version 0x{version:04X}")));
        }
        Ok(Self {
            file_type,
            version,
            file_size: words(&raw.file_size),
            num_objects: raw.num_objects.get(),
            max_record: words(&raw.max_record),
        })
    }
}

/// WMF record borrowed from the metafile buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmfRecord<'a> {
    /// Record size in words (including size and function)
    pub size: u32,
    pub function: u16,
    pub params: &'a [u8],
}

impl<'a> WmfRecord<'a> {
    pub fn parse(cursor: &mut BinaryCursor<'a>) -> Result<Self> {
        let offset = cursor.position();
        let (size, function) = match (cursor.read_u32(), cursor.read_u16()) {
            (Ok(size), Ok(function)) => (size, function),
            _ => return Err(invalid(format!("truncated record at offset {offset}"))),
        };
        let param_len = (size as usize)
            .checked_mul(2)
            .and_then(|bytes| bytes.checked_sub(6))
            .filter(|&len| len <= cursor.remaining())
            .ok_or_else(|| invalid(format!("record at offset {offset} has bad size {size}")))?;
        let params = cursor.read_bytes(param_len)?;
        Ok(Self {
            size,
            function,
            params,
        })
    }

    pub const fn is_eof(&self) -> bool {
        self.function == META_EOF
    }
}

/// WMF file parser
#[derive(Debug, Clone)]
pub struct WmfParser<'a> {
    pub placeable: Option<WmfPlaceableHeader>,
    pub header: WmfHeader,
    /// All records, META_EOF included
    pub records: Vec<WmfRecord<'a>>,
}

impl<'a> WmfParser<'a> {
    /// Parse and validate a metafile, detecting a placeable header by its key.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut cursor = BinaryCursor::new(data);
        let placeable = if WmfPlaceableHeader::is_placeable(data) {
            Some(WmfPlaceableHeader::parse(&mut cursor)?)
        } else {
            None
        };
        let header = WmfHeader::parse(&mut cursor)?;

        let mut records = Vec::new();
        loop {
            if cursor.is_empty() {
                return Err(invalid("record chain ends without META_EOF"));
            }
            let record = WmfRecord::parse(&mut cursor)?;
            let is_eof = record.is_eof();
            records.push(record);
            if is_eof {
                break;
            }
        }

        Ok(Self {
            placeable,
            header,
            records,
        })
    }

    pub fn is_placeable(&self) -> bool {
        self.placeable.is_some()
    }
}
