//! Error types for thesischeck.

use std::io;
use thiserror::Error;

/// Result type alias for thesischeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading inputs or building the document snapshot.
///
/// Rule failures are reported separately as [`crate::rules::Violation`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// The configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The configuration has no entry for the requested document type.
    #[error("Document type '{0}' is not defined in the configuration")]
    UnknownDocumentType(String),

    /// A table-of-contents section looked up by title does not exist.
    #[error("Section '{0}' not found in the table of contents")]
    SectionNotFound(String),

    /// A rule identifier could not be parsed.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Error while serializing a report.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
