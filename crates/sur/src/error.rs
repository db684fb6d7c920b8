//! Error types for the sur crate.

use std::fmt;
use std::path::PathBuf;

/// Result type for sur operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur loading or saving SUR files.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the file itself failed.
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The byte stream could not be decoded or the model could not be
    /// encoded.
    Codec(sur_codec::SurError),
    /// The decoded model is inconsistent.
    InvalidData {
        /// Context for where the error occurred.
        context: &'static str,
        /// Description of what was invalid.
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "io error on {}: {source}", path.display())
            }
            Error::Codec(e) => write!(f, "codec error: {e}"),
            Error::InvalidData { context, detail } => {
                write!(f, "invalid {context}: {detail}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Codec(e) => Some(e),
            Error::InvalidData { .. } => None,
        }
    }
}

impl From<sur_codec::SurError> for Error {
    fn from(e: sur_codec::SurError) -> Self {
        Error::Codec(e)
    }
}
