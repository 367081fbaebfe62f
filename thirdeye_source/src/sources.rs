//! Production map source implementations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::source::MapSource;

/// Default deadline for a single fetch.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// FILE
// ============================================================================

/// A JSON object map on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MapSource for FileSource {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::unavailable(format!("{}: {}", self.path.display(), e)))?;

        debug!("read {} bytes from {}", bytes.len(), self.path.display());
        serde_json::from_slice(&bytes).map_err(SourceError::malformed)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// A JSON object map served over HTTP(S), e.g. the exporter's
/// `/alumni_spatial_model.json` artifact.
///
/// The whole fetch (connect, transfer, parse) is bounded by one deadline
/// so a stalled upstream cannot wedge a request handler.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MapSource for HttpSource {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let request = async {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(SourceError::unavailable)?
                .error_for_status()
                .map_err(SourceError::unavailable)?;

            response
                .json::<Value>()
                .await
                .map_err(SourceError::malformed)
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout.as_millis() as u64))?
    }

    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }
}

// ============================================================================
// MEMORY
// ============================================================================

/// A pre-parsed map value, for tests and demos.
#[derive(Debug, Clone)]
pub struct MemorySource {
    value: Value,
}

impl MemorySource {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

#[async_trait]
impl MapSource for MemorySource {
    async fn fetch(&self) -> Result<Value, SourceError> {
        Ok(self.value.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_source_reads_and_parses() {
        let dir = std::env::temp_dir();
        let path = dir.join("thirdeye_source_test_map.json");
        tokio::fs::write(&path, r#"{"mug_0": {"label": "mug"}}"#)
            .await
            .unwrap();

        let value = FileSource::new(&path).fetch().await.unwrap();
        assert_eq!(value["mug_0"]["label"], "mug");

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_unavailable() {
        let source = FileSource::new("/nonexistent/thirdeye/object_map.json");
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_file_source_bad_json_is_malformed() {
        let path = std::env::temp_dir().join("thirdeye_source_test_bad.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let result = FileSource::new(&path).fetch().await;
        assert!(matches!(result, Err(SourceError::Malformed(_))));

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_memory_source_round_trip() {
        let doc = json!({ "object_map": { "chair_1": {} } });
        let value = MemorySource::new(doc.clone()).fetch().await.unwrap();
        assert_eq!(value, doc);
    }

    #[test]
    fn test_describe_strings() {
        assert_eq!(
            FileSource::new("map.json").describe(),
            "file:map.json"
        );
        assert_eq!(
            HttpSource::new("http://localhost:8000/map.json").describe(),
            "http:http://localhost:8000/map.json"
        );
    }
}
