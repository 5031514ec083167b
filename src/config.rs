// Decoder limits

/// Default upper bound on a single frame's declared value length (16 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum nesting depth of struct frames.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest value length a frame may declare. Checked as soon as the length
    /// field is complete, before any value bytes are buffered.
    pub max_frame_length: usize,
    /// Deepest chain of struct frames accepted, counting the outermost frame as 1.
    pub max_nesting_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }
}
