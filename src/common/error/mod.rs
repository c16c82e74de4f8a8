//! Unified error type for the decoder.
//!
//! One error enum covers the EMF+ engine and the EMF/WMF collaborators so that
//! a failure deep inside an embedded metafile surfaces unchanged to the caller
//! of the top-level enumeration.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
