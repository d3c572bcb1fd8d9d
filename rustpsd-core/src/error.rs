//! Error types for rustpsd-core.

use thiserror::Error;

/// Result type alias for rustpsd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for rustpsd operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (inconsistent array lengths, invalid parameter).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// One or more tube pairs occupy overlapping volumes.
    #[error("{count} overlapping tube pair(s) in detector geometry")]
    TubeOverlap {
        /// Number of overlapping pairs found.
        count: usize,
    },

    /// A configured event-record field name does not exist in the schema.
    #[error("event record has no field named '{0}'")]
    UnknownField(String),

    /// Degenerate geometry (zero-length axis, non-positive radius).
    #[error("invalid tube geometry: {0}")]
    InvalidGeometry(String),

    /// Propagated I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
