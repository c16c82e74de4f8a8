// Windows Metafile (WMF) reader
//
// WMF is the 16-bit predecessor of EMF. Image objects may embed one; it is
// validated but carries no EMF+ records.
//
// References:
// - [MS-WMF]: Windows Metafile Format Specification
// - https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-wmf/

pub mod parser;

pub use parser::{WmfFileType, WmfHeader, WmfParser, WmfPlaceableHeader, WmfRecord};
