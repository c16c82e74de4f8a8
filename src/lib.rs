//! EMF+ - A validating decoder for EMF+ record streams
//!
//! EMF+ is the GDI+ drawing command stream that Windows stores inside the
//! comment records of Enhanced Metafiles. This library decodes that stream
//! record by record, checking every size invariant and enumerated value, and
//! follows metafiles embedded in image objects down to a bounded depth.
//!
//! # Features
//!
//! - **Strict framing**: every record's `Size`/`DataSize` pair is checked
//!   against its type, and payload decoders must consume exactly `DataSize`
//! - **Packed flags**: flag words are split into named sub-fields with
//!   undefined codes rejected
//! - **Object reassembly**: objects continued over several records are
//!   reassembled before decoding
//! - **Embedded metafiles**: EMF and WMF images inside image objects are
//!   read back through a pluggable [`MetafileReader`](images::emfplus::MetafileReader)
//!
//! # Example - Listing the records of an EMF file
//!
//! ```no_run
//! use emfplus::images::emf::extract_emf_plus;
//! use emfplus::images::emfplus::EmfPlusDecoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let emf = std::fs::read("drawing.emf")?;
//! let stream = extract_emf_plus(&emf)?;
//!
//! for decoded in EmfPlusDecoder::default().decode_all(&stream)? {
//!     println!(
//!         "{:indent$}{:#06x} {:?}",
//!         "",
//!         decoded.offset,
//!         decoded.record.record_type(),
//!         indent = decoded.depth * 2
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Stopping early
//!
//! ```no_run
//! use emfplus::images::emfplus::{RecordType, enumerate_records};
//! use std::ops::ControlFlow;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let stream: Vec<u8> = Vec::new();
//! let mut objects = 0;
//! enumerate_records(&stream, |decoded| {
//!     if decoded.record.record_type() == RecordType::Object {
//!         objects += 1;
//!     }
//!     if objects == 10 {
//!         ControlFlow::Break(())
//!     } else {
//!         ControlFlow::Continue(())
//!     }
//! })?;
//! # Ok(())
//! # }
//! ```

/// Byte cursor, bit-field reader and the crate error type
pub mod common;

/// Metafile formats: the EMF+ decoder and its EMF/WMF container readers
pub mod images;

// Re-export commonly used types for convenience
pub use common::error::{Error, Result};
pub use images::emfplus::{
    DecodedRecord, DecoderOptions, EmfPlusDecoder, Record, RecordBody, RecordType,
    enumerate_records,
};
