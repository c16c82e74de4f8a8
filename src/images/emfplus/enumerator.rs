//! Record stream enumeration.
//!
//! [`EmfPlusDecoder`] walks an EMF+ stream record by record, reassembles
//! continued objects, and descends into metafiles embedded in image objects.
//! Records of an embedded stream are delivered to the same visitor, right
//! after the Object record that carried them, with their depth raised by one.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::continuation::ContinuationReassembler;
use crate::images::emfplus::embedded::{MetafileReader, StandardMetafileReader, read_embedded};
use crate::images::emfplus::options::DecoderOptions;
use crate::images::emfplus::records::{ObjectRecord, Record, RecordBody, decode_record_with};
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// A record together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub record: Record,
    /// Offset of the record within its own stream
    pub offset: usize,
    /// Embedding depth, 0 for the top-level stream
    pub depth: usize,
}

type Visitor<'v> = dyn FnMut(&DecodedRecord) -> ControlFlow<()> + 'v;

/// EMF+ stream decoder
pub struct EmfPlusDecoder<'r> {
    options: DecoderOptions,
    reader: &'r dyn MetafileReader,
}

impl EmfPlusDecoder<'static> {
    /// Create a decoder using the crate's EMF and WMF readers.
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            reader: &StandardMetafileReader,
        }
    }
}

impl Default for EmfPlusDecoder<'static> {
    fn default() -> Self {
        Self::new(DecoderOptions::default())
    }
}

impl<'r> EmfPlusDecoder<'r> {
    /// Use `reader` for embedded metafiles.
    pub fn with_reader<'a>(self, reader: &'a dyn MetafileReader) -> EmfPlusDecoder<'a> {
        EmfPlusDecoder {
            options: self.options,
            reader,
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode every record of `data`, handing each to `visitor`.
    ///
    /// Stops early, without error, when the visitor breaks. The first decode
    /// error aborts the whole enumeration, embedded streams included; errors
    /// from an embedded stream come back as [`Error::Embedded`], naming the
    /// Object record that carried each nesting level.
    pub fn enumerate_records<F>(&self, data: &[u8], mut visitor: F) -> Result<()>
    where
        F: FnMut(&DecodedRecord) -> ControlFlow<()>,
    {
        self.enumerate_at_depth(data, 0, &mut visitor).map(|_| ())
    }

    /// Decode every record of `data` into a list.
    pub fn decode_all(&self, data: &[u8]) -> Result<Vec<DecodedRecord>> {
        let mut records = Vec::new();
        self.enumerate_records(data, |record| {
            records.push(record.clone());
            ControlFlow::Continue(())
        })?;
        Ok(records)
    }

    fn enumerate_at_depth(
        &self,
        data: &[u8],
        depth: usize,
        visitor: &mut Visitor<'_>,
    ) -> Result<ControlFlow<()>> {
        let limit = self.options.max_recursion_depth;
        if depth > limit {
            return Err(Error::RecursionLimitExceeded { depth, limit });
        }

        let mut cursor = BinaryCursor::new(data);
        let mut chains = ContinuationReassembler::new();
        while !cursor.is_empty() {
            let offset = cursor.position();
            let record = decode_record_with(&mut cursor, &mut chains)?;
            trace!(
                offset,
                depth,
                record_type = ?record.record_type(),
                size = record.size(),
                "decoded record"
            );

            let streams = self
                .embedded_streams(&record, depth)
                .map_err(|err| err.embedded_in(offset))?;
            let decoded = DecodedRecord {
                record,
                offset,
                depth,
            };
            if visitor(&decoded).is_break() {
                return Ok(ControlFlow::Break(()));
            }

            for stream in &streams {
                let flow = self
                    .enumerate_at_depth(stream, depth + 1, visitor)
                    .map_err(|err| err.embedded_in(offset))?;
                if flow.is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        chains.finish()?;
        Ok(ControlFlow::Continue(()))
    }

    fn embedded_streams(&self, record: &Record, depth: usize) -> Result<Vec<Vec<u8>>> {
        if !self.options.decode_embedded_metafiles {
            return Ok(Vec::new());
        }
        let RecordBody::Object(ObjectRecord::Complete(object)) = &record.body else {
            return Ok(Vec::new());
        };
        let Some(metafile) = object.kind.embedded_metafile() else {
            return Ok(Vec::new());
        };
        debug!(
            object_id = object.object_id,
            kind = ?metafile.kind,
            bytes = metafile.data.len(),
            depth,
            "reading embedded metafile"
        );
        read_embedded(self.reader, metafile)
    }
}

/// Decode every record of `data` with default options.
///
/// # Example
/// ```no_run
/// use emfplus::images::emf::extract_emf_plus;
/// use emfplus::images::emfplus::enumerate_records;
/// use std::ops::ControlFlow;
///
/// let emf = std::fs::read("drawing.emf")?;
/// let stream = extract_emf_plus(&emf)?;
/// enumerate_records(&stream, |decoded| {
///     println!("{:>8} {:?}", decoded.offset, decoded.record.record_type());
///     ControlFlow::Continue(())
/// })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn enumerate_records<F>(data: &[u8], visitor: F) -> Result<()>
where
    F: FnMut(&DecodedRecord) -> ControlFlow<()>,
{
    EmfPlusDecoder::default().enumerate_records(data, visitor)
}
