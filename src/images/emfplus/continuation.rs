//! Reassembly of graphics objects split over several Object records.
//!
//! An object too large for one record is written as a chain: every record but
//! the last has the Continue flag set, the first one announces the total
//! object size in a 4-byte prefix, and the chain is closed by the first record
//! for the same object ID without the flag. Only one chain may be open at a
//! time.

use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use tracing::debug;

/// A chain collecting fragments for one object ID.
#[derive(Debug, Clone)]
struct OpenChain {
    object_id: u8,
    total_object_size: usize,
    buffer: Vec<u8>,
    /// Absolute offset of the first fragment byte
    data_offset: usize,
    /// Offset of the record that opened the chain
    record_offset: usize,
    fragments: usize,
}

/// The concatenated payload of a closed chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassembledObject {
    pub data: Vec<u8>,
    /// Absolute offset of the first fragment byte, used as the base for
    /// errors raised while decoding `data`
    pub data_offset: usize,
    pub fragments: usize,
}

/// Per-stream continuation state.
#[derive(Debug, Clone, Default)]
pub struct ContinuationReassembler {
    open: Option<OpenChain>,
}

impl ContinuationReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object ID of the open chain, if any.
    pub fn open_chain(&self) -> Option<u8> {
        self.open.as_ref().map(|chain| chain.object_id)
    }

    pub fn has_chain_for(&self, object_id: u8) -> bool {
        self.open_chain() == Some(object_id)
    }

    /// Fail if a chain for a different object is open.
    pub fn check_not_interleaved(&self, object_id: u8, offset: usize) -> Result<()> {
        match self.open_chain() {
            Some(open_id) if open_id != object_id => Err(Error::InterleavedContinuation {
                offset,
                open_id,
                found_id: object_id,
            }),
            _ => Ok(()),
        }
    }

    /// Open a chain with its first fragment.
    pub fn start(
        &mut self,
        object_id: u8,
        total_object_size: u32,
        fragment: &[u8],
        data_offset: usize,
        record_offset: usize,
    ) -> Result<()> {
        self.check_not_interleaved(object_id, record_offset)?;
        if self.open.is_some() {
            return Err(Error::SizeInvariantViolation {
                offset: record_offset,
                record: RecordType::Object,
                detail: format!("object {object_id} announces a second TotalObjectSize"),
            });
        }

        let total_object_size = total_object_size as usize;
        debug!(
            object_id,
            total_object_size,
            offset = record_offset,
            "opening continuation chain"
        );
        let mut chain = OpenChain {
            object_id,
            total_object_size,
            buffer: Vec::new(),
            data_offset,
            record_offset,
            fragments: 0,
        };
        append(&mut chain, fragment, record_offset)?;
        self.open = Some(chain);
        Ok(())
    }

    /// Append a middle fragment to the open chain for `object_id`.
    pub fn extend(&mut self, object_id: u8, fragment: &[u8], record_offset: usize) -> Result<()> {
        self.check_not_interleaved(object_id, record_offset)?;
        let chain = self.open.as_mut().ok_or(Error::SizeInvariantViolation {
            offset: record_offset,
            record: RecordType::Object,
            detail: format!("object {object_id} continues a chain that was never opened"),
        })?;
        append(chain, fragment, record_offset)
    }

    /// Close the chain for `object_id` with its last fragment.
    ///
    /// Returns `None` when no chain is open for the ID, meaning the record is
    /// a stand-alone object.
    pub fn close(
        &mut self,
        object_id: u8,
        fragment: &[u8],
        record_offset: usize,
    ) -> Result<Option<ReassembledObject>> {
        self.check_not_interleaved(object_id, record_offset)?;
        let Some(mut chain) = self.open.take() else {
            return Ok(None);
        };
        append(&mut chain, fragment, record_offset)?;

        if chain.buffer.len() != chain.total_object_size {
            return Err(Error::SizeInvariantViolation {
                offset: record_offset,
                record: RecordType::Object,
                detail: format!(
                    "object {object_id} reassembled to {} bytes, TotalObjectSize is {}",
                    chain.buffer.len(),
                    chain.total_object_size
                ),
            });
        }

        debug!(
            object_id,
            size = chain.buffer.len(),
            fragments = chain.fragments,
            opened_at = chain.record_offset,
            "closed continuation chain"
        );
        Ok(Some(ReassembledObject {
            data: chain.buffer,
            data_offset: chain.data_offset,
            fragments: chain.fragments,
        }))
    }

    /// Check that the stream did not end in the middle of a chain.
    pub fn finish(&self) -> Result<()> {
        match &self.open {
            Some(chain) => Err(Error::UnterminatedContinuation {
                object_id: chain.object_id,
                collected: chain.buffer.len(),
                expected: chain.total_object_size,
            }),
            None => Ok(()),
        }
    }
}

fn append(chain: &mut OpenChain, fragment: &[u8], record_offset: usize) -> Result<()> {
    let collected = chain.buffer.len() + fragment.len();
    if collected > chain.total_object_size {
        return Err(Error::SizeInvariantViolation {
            offset: record_offset,
            record: RecordType::Object,
            detail: format!(
                "object {} fragments reach {collected} bytes, TotalObjectSize is {}",
                chain.object_id, chain.total_object_size
            ),
        });
    }
    chain.buffer.extend_from_slice(fragment);
    chain.fragments += 1;
    Ok(())
}
