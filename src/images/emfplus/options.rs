//! Decoder configuration.

/// Options for EMF+ decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Deepest nesting level of embedded metafiles that is decoded. The
    /// top-level stream is depth 0.
    pub max_recursion_depth: usize,
    /// Decode EMF+ streams found in embedded metafiles
    pub decode_embedded_metafiles: bool,
}

impl DecoderOptions {
    pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 8;

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_embedded_metafiles(mut self, enabled: bool) -> Self {
        self.decode_embedded_metafiles = enabled;
        self
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: Self::DEFAULT_MAX_RECURSION_DEPTH,
            decode_embedded_metafiles: true,
        }
    }
}
