//! Unified error type for EMF+ decoding.
//!
//! Every variant is fatal to the enumeration that produced it and carries the
//! byte offset (relative to the stream being decoded) where the problem was
//! detected, plus the record type when one is known.
use crate::images::emfplus::header::RecordType;
use thiserror::Error;

/// Main error type for decoding operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A read would run past the end of the buffer
    #[error(
        "Out of data at offset {offset:#x}{}: need {needed} bytes, {available} available",
        record_suffix(*.record)
    )]
    OutOfData {
        offset: usize,
        needed: usize,
        available: usize,
        /// Record being decoded, once the header has been read
        record: Option<RecordType>,
    },

    /// The type tag is unknown, or differs from the tag a typed decoder expects
    #[error("Unexpected record type {found:#06x} at offset {offset:#x}{}", expected_suffix(*.expected))]
    UnexpectedRecordType {
        offset: usize,
        found: u16,
        expected: Option<RecordType>,
    },

    /// Declared `Size`/`DataSize` fields, or a sub-buffer, have the wrong length
    #[error("Size invariant violated by {record:?} record at offset {offset:#x}: {detail}")]
    SizeInvariantViolation {
        offset: usize,
        record: RecordType,
        detail: String,
    },

    /// The payload decoder consumed a different number of bytes than declared
    #[error(
        "{record:?} record at offset {offset:#x} declares {declared} bytes but {consumed} were consumed"
    )]
    TrailingDataMismatch {
        offset: usize,
        record: RecordType,
        declared: usize,
        consumed: usize,
    },

    /// An enumerated field carries an undefined code
    #[error("Invalid {field} value {value:#x} at offset {offset:#x}{}", record_suffix(*.record))]
    InvalidEnumValue {
        offset: usize,
        field: &'static str,
        value: u32,
        record: Option<RecordType>,
    },

    /// A flags decoder asked for more bits than the word has left
    #[error(
        "Bit field exhausted{}: requested {requested} bits, {remaining} remaining",
        record_suffix(*.record)
    )]
    BitFieldExhausted {
        requested: u32,
        remaining: u32,
        record: Option<RecordType>,
    },

    /// Embedded metafiles nest deeper than the configured limit
    #[error("Embedded metafile depth {depth} exceeds the limit of {limit}")]
    RecursionLimitExceeded { depth: usize, limit: usize },

    /// A continuation record for another object arrived while a chain was open
    #[error(
        "Object record at offset {offset:#x} targets object {found_id} while the chain for object {open_id} is still open"
    )]
    InterleavedContinuation {
        offset: usize,
        open_id: u8,
        found_id: u8,
    },

    /// The stream ended before an open continuation chain was closed
    #[error(
        "Continuation chain for object {object_id} ended after {collected} of {expected} bytes"
    )]
    UnterminatedContinuation {
        object_id: u8,
        collected: usize,
        expected: usize,
    },

    /// The EMF or WMF collaborator rejected an embedded metafile
    #[error("Invalid metafile: {0}")]
    InvalidMetafile(String),

    /// Decoding failed inside a metafile embedded in an image object.
    ///
    /// `parent_offsets` lists the offsets of the Object records that carried
    /// each nesting level, outermost first, each relative to its own stream.
    /// `source` keeps the offsets of the stream it was raised in.
    #[error(
        "In metafile embedded at depth {} (Object records at {parent_offsets:x?}): {source}",
        .parent_offsets.len()
    )]
    Embedded {
        parent_offsets: Vec<usize>,
        source: Box<Error>,
    },
}

fn record_suffix(record: Option<RecordType>) -> String {
    match record {
        Some(record) => format!(" in {record:?} record"),
        None => String::new(),
    }
}

fn expected_suffix(expected: Option<RecordType>) -> String {
    match expected {
        Some(record) => format!(" (expected {:?} {:#06x})", record, record as u16),
        None => String::new(),
    }
}

impl Error {
    /// Byte offset the error refers to, when it has one.
    ///
    /// For errors inside embedded metafiles this is the offset of the
    /// outermost carrying Object record, in the buffer the caller passed in.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Embedded { parent_offsets, .. } => parent_offsets.first().copied(),
            Error::OutOfData { offset, .. }
            | Error::UnexpectedRecordType { offset, .. }
            | Error::SizeInvariantViolation { offset, .. }
            | Error::TrailingDataMismatch { offset, .. }
            | Error::InvalidEnumValue { offset, .. }
            | Error::InterleavedContinuation { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Record type the error refers to, when it has one.
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            Error::SizeInvariantViolation { record, .. }
            | Error::TrailingDataMismatch { record, .. } => Some(*record),
            Error::OutOfData { record, .. }
            | Error::InvalidEnumValue { record, .. }
            | Error::BitFieldExhausted { record, .. } => *record,
            Error::UnexpectedRecordType { expected, .. } => *expected,
            Error::Embedded { source, .. } => source.record_type(),
            _ => None,
        }
    }

    /// Embedding depth of the stream the error was raised in, 0 for the
    /// top-level stream.
    pub fn depth(&self) -> usize {
        match self {
            Error::Embedded { parent_offsets, .. } => parent_offsets.len(),
            _ => 0,
        }
    }

    /// The error as raised in the innermost stream.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Embedded { source, .. } => source.as_ref(),
            other => other,
        }
    }

    /// Attach the type of the record being decoded to errors raised by its
    /// payload or flags decoders.
    pub(crate) fn in_record(mut self, record_type: RecordType) -> Self {
        if let Error::OutOfData { record, .. }
        | Error::InvalidEnumValue { record, .. }
        | Error::BitFieldExhausted { record, .. } = &mut self
            && record.is_none()
        {
            *record = Some(record_type);
        }
        self
    }

    /// Mark the error as raised in a metafile carried by the Object record at
    /// `parent_offset`.
    pub(crate) fn embedded_in(self, parent_offset: usize) -> Self {
        match self {
            Error::Embedded {
                mut parent_offsets,
                source,
            } => {
                parent_offsets.insert(0, parent_offset);
                Error::Embedded {
                    parent_offsets,
                    source,
                }
            },
            other => Error::Embedded {
                parent_offsets: vec![parent_offset],
                source: Box::new(other),
            },
        }
    }

    /// Reclassify a buffer overrun inside a length-delimited structure as a
    /// size invariant violation of `record`. Other errors pass through.
    pub(crate) fn into_size_violation(self, record: RecordType, what: &str) -> Self {
        match self {
            Error::OutOfData {
                offset,
                needed,
                available,
                ..
            } => Error::SizeInvariantViolation {
                offset,
                record,
                detail: format!("{what} needs {needed} bytes, only {available} left"),
            },
            other => other,
        }
    }
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;
