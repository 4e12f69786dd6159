//! Error types for the catalog crate.
//!
//! Loading errors (bad files, bad records) and store errors (the backing
//! catalog could not answer a query) share one enum so callers can treat
//! any of them as "catalog unavailable".

use thiserror::Error;

/// Errors that can occur while loading or querying the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The catalog file is not valid JSON or a record has the wrong shape
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A record field had an invalid value
    #[error("Invalid value for {field} in record {record}: {value}")]
    InvalidValue {
        record: usize,
        field: String,
        value: String,
    },

    /// Two records share the same identifier
    #[error("Duplicate item id: {0}")]
    DuplicateId(String),

    /// The backing store could not serve a query
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
