//! Error types for the map source layer.

use thiserror::Error;

/// Errors that can occur while obtaining the raw object map.
///
/// All variants are hard errors from the pipeline's point of view: the
/// caller decides whether to surface them or substitute a fixture dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The map could not be obtained at all (file missing, network down,
    /// HTTP error status)
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The map was obtained but is not parseable JSON
    #[error("source returned malformed JSON: {0}")]
    Malformed(String),

    /// The fetch exceeded its deadline
    #[error("source timed out after {0}ms")]
    Timeout(u64),
}

impl SourceError {
    /// Creates an unavailable error.
    pub fn unavailable(msg: impl std::fmt::Display) -> Self {
        Self::Unavailable(msg.to_string())
    }

    /// Creates a malformed-payload error.
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        Self::Malformed(msg.to_string())
    }
}
