use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by My Reads.
///
/// The aggregation functions never fail; these errors come from the record
/// source and the current-reading store.
#[derive(Error, Debug)]
pub enum ReadsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A JSON document parsed but was not a list of book records.
    #[error("Unexpected record shape: {0}")]
    InvalidRecordShape(String),

    /// The expected data file or directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No export files were found under the given directory.
    #[error("No JSON export files found in {0}")]
    NoDataFiles(PathBuf),

    /// A page update was attempted with no book selected.
    #[error("No book is currently being read")]
    NoCurrentBook,

    /// A page number lies outside the selected book.
    #[error("Page {page} is out of range (book has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
}

/// Convenience alias used throughout the reads crates.
pub type Result<T> = std::result::Result<T, ReadsError>;
