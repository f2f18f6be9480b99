//! Unified error type for workbook metric extraction.
use thiserror::Error;

/// Main error type for workbook metric operations.
///
/// All variants are terminal for the file being processed; nothing is
/// retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The path extension is neither `.twb` nor `.twbx`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The packaged workbook is not a readable ZIP archive
    #[error("Corrupted archive: {0}")]
    ArchiveCorrupt(String),

    /// The packaged workbook contains no `.twb` member
    #[error("Workbook document not found in archive: {0}")]
    DocumentNotFound(String),

    /// The workbook XML is not well-formed
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The threshold configuration could not be read
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for workbook metric operations.
pub type Result<T> = std::result::Result<T, Error>;
