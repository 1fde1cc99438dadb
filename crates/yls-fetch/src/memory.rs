use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::{CacheStatus, FetchError, Fetcher};

/// An in-memory [`Fetcher`], used in tests and for schemas bundled directly
/// with the binary (no network access, no disk cache).
#[derive(Default)]
pub struct MemoryFetcher {
    schemas: RwLock<HashMap<String, Value>>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_schema(self, url: impl Into<String>, schema: Value) -> Self {
        self.insert(url, schema);
        self
    }

    pub fn insert(&self, url: impl Into<String>, schema: Value) {
        self.schemas
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(url.into(), schema);
    }
}

#[async_trait::async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<(Value, CacheStatus), FetchError> {
        self.schemas
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(url)
            .cloned()
            .map(|v| (v, CacheStatus::Disabled))
            .ok_or_else(|| FetchError::NotInMemory { url: url.to_string() })
    }
}

#[async_trait::async_trait]
impl jsonschema::AsyncRetrieve for MemoryFetcher {
    async fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let (value, _status) = self.fetch(uri.as_str()).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_returns_inserted_schema() {
        let fetcher = MemoryFetcher::new().with_schema("https://example.com/s.json", json!({"type": "object"}));
        let (value, status) = fetcher.fetch("https://example.com/s.json").await.unwrap();
        assert_eq!(value, json!({"type": "object"}));
        assert_eq!(status, CacheStatus::Disabled);
    }

    #[tokio::test]
    async fn fetch_missing_url_errors() {
        let fetcher = MemoryFetcher::new();
        let err = fetcher.fetch("https://example.com/missing.json").await.unwrap_err();
        assert!(matches!(err, FetchError::NotInMemory { .. }));
    }

    #[test]
    fn insert_after_construction_is_visible() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("https://example.com/s.json", json!({"type": "string"}));
        assert!(fetcher.schemas.read().unwrap().contains_key("https://example.com/s.json"));
    }
}
