//! Error types for the `airwatch` library.
//!
//! Every failure here is per-item: the catalog, decoder and HTTP clients log
//! and skip instead of surfacing these to the end user. The binary wraps
//! startup failures in `anyhow` instead.

use thiserror::Error;

/// Result type for `airwatch` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // ---
    /// Object store rejected or failed a list/read/delete call.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Outbound HTTP request failed (transport, status or body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local filesystem error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input did not match the configured date format.
    #[error("Could not parse date '{input}': {source}")]
    DateParse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Parsed wall-clock time does not exist in the configured offset.
    #[error("Date '{0}' is not representable in the configured timezone")]
    AmbiguousDate(String),

    /// Object path too short for the bucket's prefix/suffix window.
    #[error("Path '{path}' is too short to strip {offset} leading and {suffix} trailing characters")]
    PathTooShort {
        path: String,
        offset: usize,
        suffix: usize,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}
