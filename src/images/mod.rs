// Metafile formats
//
// - `emfplus`: EMF+ record stream decoder
// - `emf`: Enhanced Metafile container, source of EMF+ streams
// - `wmf`: Windows Metafile reader for WMF images embedded in EMF+ objects

pub mod emf;
pub mod emfplus;
pub mod wmf;
