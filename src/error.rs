//! Error types for the clausewitz-tree library.

use std::io;
use thiserror::Error;

/// Result type alias for clausewitz-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clausewitz-tree operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sniffed header matched neither the binary nor text header, and
    /// the input is not a ZIP archive either.
    #[error("invalid header: expected {expected:?}, found {found:?}")]
    InvalidHeader { expected: String, found: String },

    /// A binary opcode appeared where the grammar does not allow it.
    #[error("unexpected token {kind} at byte offset {position}")]
    UnexpectedToken { kind: String, position: u64 },

    /// Neither parser found an `=` where one was required.
    #[error("missing '=' at byte offset {position}")]
    MissingEquals { position: u64 },

    /// A value or group was expected to be preceded by an identifier/key.
    #[error("missing identifier at byte offset {position}")]
    MissingIdentifier { position: u64 },

    /// The ZIP archive does not contain exactly one usable entry.
    #[error("zip archive layout error: {0}")]
    ZipLayout(String),

    /// Attempted to serialize a `Value` that is not a top-level `Record`.
    #[error("cannot serialize a non-record value as the document root")]
    Serialize(String),

    /// An accessor (`Value::get`) found no property with the requested name.
    #[error("{0}")]
    NotFound(String),

    /// Recursive descent exceeded the configured nesting limit.
    #[error("nesting depth exceeded {limit} at byte offset {position}")]
    DepthLimitExceeded { limit: usize, position: u64 },
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipLayout(err.to_string())
    }
}
