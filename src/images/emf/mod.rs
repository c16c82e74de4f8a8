// Enhanced Metafile (EMF) container reader
//
// EMF+ records travel inside EMR_COMMENT records of an ordinary EMF file.
// This module walks the EMF record chain and hands back the EMF+ bytes.
//
// References:
// - [MS-EMF]: Enhanced Metafile Format Specification
// - https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-emf/

pub mod parser;

pub use parser::{EmfHeader, EmfParser, EmfRecord};

use crate::common::error::Result;

/// Extract the EMF+ command stream of an EMF file.
///
/// # Example
/// ```no_run
/// use emfplus::images::emf::extract_emf_plus;
///
/// let emf_data = std::fs::read("image.emf")?;
/// let stream = extract_emf_plus(&emf_data)?;
/// println!("{} bytes of EMF+ records", stream.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract_emf_plus(emf_data: &[u8]) -> Result<Vec<u8>> {
    EmfParser::new(emf_data)?.emf_plus_stream()
}
