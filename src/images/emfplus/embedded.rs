//! Readers for metafiles embedded in EMF+ image objects.

use crate::common::error::{Error, Result};
use crate::images::emf::EmfParser;
use crate::images::emfplus::objects::{EmbeddedMetafile, MetafileDataType};
use crate::images::wmf::WmfParser;
use tracing::debug;

/// Turns an embedded metafile into the EMF+ streams it carries.
///
/// An empty result means the metafile is valid but holds no EMF+ records.
pub trait MetafileReader {
    fn read_emf(&self, data: &[u8]) -> Result<Vec<Vec<u8>>>;

    fn read_wmf(&self, data: &[u8], placeable: bool) -> Result<Vec<Vec<u8>>>;
}

/// Reader backed by the crate's EMF and WMF parsers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetafileReader;

impl MetafileReader for StandardMetafileReader {
    fn read_emf(&self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        let parser = EmfParser::new(data)?;
        let stream = parser.emf_plus_stream()?;
        debug!(
            records = parser.records.len(),
            emf_plus_bytes = stream.len(),
            "read embedded EMF"
        );
        Ok(if stream.is_empty() { Vec::new() } else { vec![stream] })
    }

    fn read_wmf(&self, data: &[u8], placeable: bool) -> Result<Vec<Vec<u8>>> {
        let parser = WmfParser::new(data)?;
        if parser.is_placeable() != placeable {
            return Err(Error::InvalidMetafile(format!(
                "WMF: placeable header {}, image object says {}",
                if parser.is_placeable() { "present" } else { "absent" },
                if placeable { "placeable" } else { "standard" },
            )));
        }
        debug!(records = parser.records.len(), placeable, "read embedded WMF");
        Ok(Vec::new())
    }
}

/// Dispatch an embedded metafile to the matching reader method.
pub(crate) fn read_embedded(
    reader: &dyn MetafileReader,
    metafile: &EmbeddedMetafile,
) -> Result<Vec<Vec<u8>>> {
    match metafile.kind {
        MetafileDataType::Wmf => reader.read_wmf(&metafile.data, false),
        MetafileDataType::WmfPlaceable => reader.read_wmf(&metafile.data, true),
        MetafileDataType::Emf | MetafileDataType::EmfPlusOnly | MetafileDataType::EmfPlusDual => {
            reader.read_emf(&metafile.data)
        },
    }
}
