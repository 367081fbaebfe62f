//! Per-session single-flight cache.
//!
//! Pipeline invocations are stateless, but re-fetching and re-parsing a
//! large object map for every concurrent request of the same session is
//! wasted work. `SessionCache` guarantees at-most-one load in flight per
//! key: the first caller runs the load, concurrent callers for the same
//! key await that same result, and distinct keys proceed independently.
//! A failed load is not cached; the next caller retries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::SourceError;

/// Keyed single-flight cache for expensive load-and-compute results.
///
/// Keys are session/video identifiers; values are whatever the caller
/// computes from the fetched map (typically the annotation list). The pure
/// pipeline stages stay lock-free; only the entry lookup takes a short
/// mutex hold.
pub struct SessionCache<T> {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<T>>>>>,
}

impl<T: Send + Sync + 'static> SessionCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, loading it at most once.
    ///
    /// When several callers race on a cold key, exactly one executes
    /// `load`; the rest await the same cell and share the resulting `Arc`.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<T>, SourceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.to_string()).or_default().clone()
        };

        let value = cell
            .get_or_try_init(|| async { load().await.map(Arc::new) })
            .await?;
        Ok(value.clone())
    }

    /// Drop the cached value for `key` (e.g. the upstream map was rebuilt).
    pub async fn invalidate(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Number of cached (or in-flight) keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl<T: Send + Sync + 'static> Default for SessionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
