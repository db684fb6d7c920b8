//! Error types for SUR encoding and decoding.

use std::fmt;

/// Errors that can occur while decoding or encoding SUR data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurError {
    /// Fewer bytes were available than a field or section declares.
    ///
    /// Fatal: the stream cannot be resynchronized past this point.
    TruncatedStream { expected: usize, actual: usize },
    /// An offset, tag, or count is structurally inconsistent.
    ///
    /// Fatal for the part being decoded; the collection loader may still
    /// continue with the remaining parts when the enclosing section length
    /// is known.
    CorruptFormat {
        context: &'static str,
        detail: String,
    },
    /// The stream does not start with a recognized container tag.
    UnsupportedTag { tag: u32 },
    /// An in-memory tree exceeds a fixed-width field of the format.
    ///
    /// Reported before any bytes for the offending entity are written,
    /// rather than silently truncating bits.
    FormatLimitExceeded {
        context: &'static str,
        value: i64,
        max: i64,
    },
}

impl SurError {
    /// Whether the collection loader can discard the current part and keep
    /// reading the remaining ones.
    ///
    /// The part reader only surfaces these variants once it has positioned
    /// the cursor at the start of the next part record.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CorruptFormat { .. } | Self::FormatLimitExceeded { .. })
    }
}

impl fmt::Display for SurError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedStream { expected, actual } => {
                write!(
                    f,
                    "truncated stream: expected {expected} bytes, got {actual}"
                )
            }
            Self::CorruptFormat { context, detail } => {
                write!(f, "corrupt surface format in {context}: {detail}")
            }
            Self::UnsupportedTag { tag } => {
                let b = tag.to_le_bytes();
                write!(
                    f,
                    "unsupported container tag {:02x}{:02x}{:02x}{:02x}",
                    b[0], b[1], b[2], b[3]
                )
            }
            Self::FormatLimitExceeded { context, value, max } => {
                write!(f, "format limit exceeded in {context}: {value} > {max}")
            }
        }
    }
}

impl std::error::Error for SurError {}

/// Result type for SUR codec operations.
pub type SurResult<T> = Result<T, SurError>;
