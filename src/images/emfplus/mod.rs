// EMF+ record stream decoder
//
// EMF+ is the GDI+ command stream stored in comment records of an Enhanced
// Metafile. This module validates and decodes it: record framing and size
// invariants, packed flag words, graphics objects (including those split over
// several continued records), image effects, and metafiles embedded in image
// objects, which are decoded recursively up to a configurable depth.
//
// References:
// - [MS-EMFPLUS]: Enhanced Metafile Format Plus Extensions
// - https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-emfplus/

#[macro_use]
mod macros;

pub mod continuation;
pub mod effects;
pub mod embedded;
pub mod enumerator;
pub mod header;
pub mod objects;
pub mod options;
pub mod records;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use continuation::{ContinuationReassembler, ReassembledObject};
pub use effects::ImageEffect;
pub use embedded::{MetafileReader, StandardMetafileReader};
pub use enumerator::{DecodedRecord, EmfPlusDecoder, enumerate_records};
pub use header::{RecordFamily, RecordHeader, RecordType};
pub use objects::{GraphicsObject, ObjectKind, ObjectType};
pub use options::DecoderOptions;
pub use records::{Record, RecordBody, decode_record, decode_record_of, decode_record_with};
