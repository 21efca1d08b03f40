//! Error types for the capsule core.

use thiserror::Error;

/// Errors raised while building the capsule core.
///
/// Store, tracker and router operations are total and never fail; only
/// configuration input can be rejected.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// The release date could not be parsed.
    #[error("invalid release date {input:?}: {source}")]
    InvalidReleaseDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A notification interval was zero or not a number.
    #[error("invalid notify interval: {0}")]
    InvalidInterval(String),
}

/// Result type for capsule core operations.
pub type Result<T> = std::result::Result<T, CapsuleError>;
