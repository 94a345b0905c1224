//! Decoder configuration.

/// Default maximum list/map nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default cap on capacity reserved up front from a declared length.
pub const DEFAULT_MAX_PREALLOCATION: usize = 4096;

/// What to do when a decoded map repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// Keep the last value seen for the key.
    #[default]
    LastWins,
    /// Fail with [`LeonError::DuplicateKey`](crate::error::LeonError::DuplicateKey).
    Reject,
}

/// Limits and policies applied by a [`Decoder`](super::Decoder).
///
/// ```
/// use leon::codec::{DecoderOptions, DuplicateKeys};
///
/// let options = DecoderOptions::new()
///     .max_depth(16)
///     .duplicate_keys(DuplicateKeys::Reject);
/// assert_eq!(options.get_max_depth(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    max_depth: usize,
    duplicate_keys: DuplicateKeys,
    max_preallocation: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeys::default(),
            max_preallocation: DEFAULT_MAX_PREALLOCATION,
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of nested lists/maps for decode and skip.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the duplicate map key policy.
    pub fn duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }

    /// Sets how many list elements or map entries may be reserved before
    /// they are actually read.
    pub fn max_preallocation(mut self, limit: usize) -> Self {
        self.max_preallocation = limit;
        self
    }

    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get_duplicate_keys(&self) -> DuplicateKeys {
        self.duplicate_keys
    }

    pub fn get_max_preallocation(&self) -> usize {
        self.max_preallocation
    }
}
