//! Custom error types for the crossword-reader crate.

use std::error::Error as StdError;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum CrosswordError {
    /// An error originating from I/O operations, other than a premature end of stream.
    #[error("I/O error: {0:?}")]
    Io(std::io::Error),

    /// The stream ended before an expected field or record was complete.
    #[error("Truncated input: {0}")]
    Truncated(String),

    /// The input is structurally invalid (magic/version mismatch, malformed field, bad count).
    #[error("Invalid format: {0}")]
    Format(String),

    /// A malformed structured sub-document (XML, JSON, number) wrapped with the context it
    /// was found in.
    #[error("Invalid format: {context}: {source}")]
    FormatCause {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// No descrambling key in the searched range produced the expected checksum.
    #[error("Puzzle is locked and no valid unlock key was found")]
    KeyNotFound,

    /// The requested operation is not supported (e.g. writing with a read-only formatter).
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A progress snapshot does not have the same dimensions as the puzzle.
    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A caller broke an API contract (out-of-range key, out-of-bounds write, bad direction).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CrosswordError {
    /// Wraps a parse error from a structured sub-document into a format error.
    pub fn caused_by(context: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        CrosswordError::FormatCause {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for CrosswordError {
    fn from(err: std::io::Error) -> Self {
        // A short read is a truncated document, not an I/O failure
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CrosswordError::Truncated(err.to_string())
        } else {
            CrosswordError::Io(err)
        }
    }
}

/// A convenience `Result` type alias using the crate's `CrosswordError` type.
pub type Result<T> = std::result::Result<T, CrosswordError>;
