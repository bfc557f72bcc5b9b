//! Error types for pdfskel.
//!
//! Structural problems inside a document are never errors: they are reported
//! as [`Diagnostic`](crate::model::Diagnostic)s. This type only covers the
//! outer surfaces (loading input, header sniffing, offset conversion and
//! rendering).

use std::io;
use thiserror::Error;

/// Result type alias for pdfskel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur around a structural analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is recognised neither as PDF nor as FDF.
    #[error("Unknown file format: not a PDF or FDF file")]
    UnknownFormat,

    /// The header version is malformed.
    #[error("Unsupported header version: {0}")]
    UnsupportedVersion(String),

    /// A negative offset was passed to the position mapper.
    #[error("Offset {0} is negative")]
    NegativeOffset(i64),

    /// A line/character position does not exist in the document.
    #[error("Position {line}:{character} is outside the document")]
    PositionOutOfRange {
        /// Zero-based line
        line: u32,
        /// Zero-based character
        character: u32,
    },

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
