//! Error types for rustpsd-io.

use thiserror::Error;

/// Result type alias for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot arrays are inconsistent with the declared dimensions.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}
