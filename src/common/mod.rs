//! Common types and utilities shared across formats.
//!
//! This module provides the byte cursor, the bit-field reader and the error
//! type used by both the EMF+ engine and its EMF/WMF collaborators.

// Submodule declarations
pub mod binary;
pub mod bitfield;
pub mod error;

// Re-exports for convenience
pub use binary::BinaryCursor;
pub use bitfield::{BitField16, BitField32};
pub use error::{Error, Result};
