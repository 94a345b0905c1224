//! Error types for the LEON codec.

use crate::codec::tag::Tag;

/// Errors that can occur while encoding or decoding LEON data.
///
/// Decoding errors carry the byte offset at which they were detected. After
/// any decoding error the stream position is indeterminate and the decoder
/// should be abandoned.
#[derive(Debug, thiserror::Error)]
pub enum LeonError {
    #[error("unrepresentable value: {0}")]
    UnrepresentableValue(String),

    #[error("malformed decode at offset {offset}: expected {expected}, found {found}")]
    MalformedDecode {
        expected: &'static str,
        found: Tag,
        offset: u64,
    },

    #[error(
        "unexpected end of input at offset {offset} while reading {context}: \
         needed {needed} byte(s), got {available}"
    )]
    TruncatedInput {
        context: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("invalid tag 0x{byte:02X} at offset {offset}")]
    InvalidTag { byte: u8, offset: u64 },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("nesting depth exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("integer at offset {offset} does not fit in 64 bits")]
    IntegerOverflow { offset: u64 },

    #[error("invalid length {length} at offset {offset}")]
    InvalidLength { length: i64, offset: u64 },

    #[error("invalid UTF-8 string at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: u64,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("duplicate map key {key} at offset {offset}")]
    DuplicateKey { key: String, offset: u64 },

    #[error("trailing data after value at offset {offset}")]
    TrailingData { offset: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LeonError {
    /// Builds an `UnrepresentableValue` error from any displayable description.
    pub fn unrepresentable(e: impl std::fmt::Display) -> Self {
        Self::UnrepresentableValue(e.to_string())
    }

    /// Returns `true` if the input ended before a value was complete.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }

    /// Returns the stream offset the error was detected at, if it has one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::MalformedDecode { offset, .. }
            | Self::TruncatedInput { offset, .. }
            | Self::InvalidTag { offset, .. }
            | Self::IntegerOverflow { offset }
            | Self::InvalidLength { offset, .. }
            | Self::InvalidUtf8 { offset, .. }
            | Self::DuplicateKey { offset, .. }
            | Self::TrailingData { offset } => Some(*offset),
            _ => None,
        }
    }
}
