//! The map source trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;

/// Abstraction over where the raw object-track map comes from.
///
/// # Implementations
///
/// - [`crate::FileSource`]: a JSON file on disk
/// - [`crate::HttpSource`]: an HTTP(S) resource, timeout-bound
/// - [`crate::MemorySource`]: a pre-parsed value (tests, demos)
///
/// Fetching is the only legitimately blocking operation in the system;
/// implementations must be cancellable (dropping the future aborts the
/// fetch) so callers can bound it with their own deadlines.
#[async_trait]
pub trait MapSource: Send + Sync {
    /// Obtain the raw map document.
    ///
    /// The returned value is handed to the pure pipeline as-is; shape
    /// tolerance (flat vs wrapped, optional fields) is the loader's job,
    /// so this method only fails for true I/O-level problems.
    async fn fetch(&self) -> Result<Value, SourceError>;

    /// Human-readable description of the source for logs.
    fn describe(&self) -> String;
}
