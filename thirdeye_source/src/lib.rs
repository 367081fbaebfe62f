//! Third Eye Map Source Layer
//!
//! Obtaining the raw object-track map is the only operation in the system
//! allowed to block or fail for I/O reasons, so it lives behind its own
//! abstraction:
//! - [`MapSource`]: async fetch trait (file, HTTP, in-memory)
//! - [`SessionCache`]: per-session single-flight so concurrent requests
//!   for the same session share one load instead of re-parsing a large map
//!
//! The pure pipeline stages in `thirdeye_core` never see any of this; they
//! receive an already-fetched `serde_json::Value`.

mod cache;
mod error;
mod source;
mod sources;

pub use cache::SessionCache;
pub use error::SourceError;
pub use source::MapSource;
pub use sources::{FileSource, HttpSource, MemorySource};
