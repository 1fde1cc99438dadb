use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::sync::Semaphore;

use crate::{CacheStatus, FetchError, Fetcher};

/// Default freshness window for a cached schema before a conditional
/// re-fetch is attempted.
pub const DEFAULT_SCHEMA_CACHE_TTL: Duration = Duration::from_secs(12 * 3600);

/// A [`Fetcher`] backed by an on-disk, ETag-aware byte cache, falling back
/// to a plain HTTP GET when the cache is stale or absent.
///
/// Concurrent fetches of distinct URLs run in parallel, bounded by
/// `max_concurrent_requests`; repeated fetches of the same URL within a
/// process share the same in-memory copy once resolved once.
pub struct DiskCache {
    cache_dir: Option<PathBuf>,
    client: reqwest::Client,
    force_fetch: bool,
    ttl: Duration,
    memory: Arc<Mutex<HashMap<String, Value>>>,
    http_semaphore: Arc<Semaphore>,
}

pub struct DiskCacheBuilder {
    cache_dir: Option<PathBuf>,
    force_fetch: bool,
    ttl: Duration,
    max_concurrent_requests: usize,
}

impl Default for DiskCacheBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            force_fetch: false,
            ttl: DEFAULT_SCHEMA_CACHE_TTL,
            max_concurrent_requests: 8,
        }
    }
}

impl DiskCacheBuilder {
    #[must_use]
    pub fn cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    #[must_use]
    pub fn force_fetch(mut self, force: bool) -> Self {
        self.force_fetch = force;
        self
    }

    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n.max(1);
        self
    }

    /// Resolve the configured cache directory, falling back first to
    /// `dirs::cache_dir()/yamlls/schemas` and then to a temp directory if
    /// the OS cache directory is unavailable (e.g. in minimal containers).
    #[must_use]
    pub fn cache_dir_or_default(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(ensure_cache_dir)
    }

    #[must_use]
    pub fn build(self) -> DiskCache {
        DiskCache {
            cache_dir: Some(self.cache_dir_or_default()),
            client: reqwest::Client::new(),
            force_fetch: self.force_fetch,
            ttl: self.ttl,
            memory: Arc::new(Mutex::new(HashMap::new())),
            http_semaphore: Arc::new(Semaphore::new(self.max_concurrent_requests)),
        }
    }
}

fn ensure_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("yamlls").join("schemas"))
        .unwrap_or_else(|| std::env::temp_dir().join("yamlls").join("schemas"))
}

fn hash_uri(uri: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uri.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Most fetched URLs are JSON Schemas, but a few catalog sources (CRD
/// `index.yaml`) are YAML; try JSON first since it is the common case.
fn parse_body(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok().or_else(|| serde_yaml::from_str(text).ok())
}

impl DiskCache {
    #[must_use]
    pub fn builder() -> DiskCacheBuilder {
        DiskCacheBuilder::default()
    }

    fn cache_paths(&self, url: &str) -> Option<(PathBuf, PathBuf)> {
        let dir = self.cache_dir.as_ref()?;
        let hash = hash_uri(url);
        Some((dir.join(format!("{hash}.json")), dir.join(format!("{hash}.etag"))))
    }

    fn read_fresh(&self, body_path: &PathBuf) -> Option<Value> {
        let metadata = std::fs::metadata(body_path).ok()?;
        let modified = metadata.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age > self.ttl {
            return None;
        }
        let text = std::fs::read_to_string(body_path).ok()?;
        parse_body(&text)
    }

    fn read_etag(&self, etag_path: &std::path::Path) -> Option<String> {
        std::fs::read_to_string(etag_path).ok()
    }

    fn write_cache(&self, body_path: &std::path::Path, etag_path: &std::path::Path, body: &str, etag: Option<&str>) {
        if let Some(parent) = body_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(body_path, body);
        if let Some(etag) = etag {
            let _ = std::fs::write(etag_path, etag);
        }
        let _ = filetime::set_file_mtime(body_path, filetime::FileTime::now());
    }

    #[tracing::instrument(skip(self), fields(status))]
    async fn fetch_inner(&self, url: &str) -> Result<(Value, CacheStatus), FetchError> {
        {
            let memory = self.memory.lock().await;
            if let Some(v) = memory.get(url) {
                tracing::Span::current().record("status", "memory-hit");
                return Ok((v.clone(), CacheStatus::Hit));
            }
        }

        let paths = self.cache_paths(url);

        if !self.force_fetch
            && let Some((body_path, _)) = &paths
            && let Some(value) = self.read_fresh(body_path)
        {
            tracing::Span::current().record("status", "disk-hit");
            self.memory.lock().await.insert(url.to_string(), value.clone());
            return Ok((value, CacheStatus::Hit));
        }

        let _permit = self
            .http_semaphore
            .acquire()
            .await
            .map_err(|e| FetchError::Http { url: url.to_string(), message: e.to_string() })?;

        let etag = paths.as_ref().and_then(|(_, etag_path)| self.read_etag(etag_path));
        let mut request = self.client.get(url);
        if let Some(etag) = &etag
            && !self.force_fetch
        {
            request = request.header(reqwest::header::IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Http { url: url.to_string(), message: e.to_string() })?;

        if response.status() == reqwest::StatusCode::NOT_MODIFIED {
            if let Some((body_path, _)) = &paths
                && let Ok(text) = std::fs::read_to_string(body_path)
                && let Some(value) = parse_body(&text)
            {
                tracing::Span::current().record("status", "not-modified");
                self.memory.lock().await.insert(url.to_string(), value.clone());
                return Ok((value, CacheStatus::Hit));
            }
        }

        let new_etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http { url: url.to_string(), message: e.to_string() })?;
        let value: Value = parse_body(&body)
            .ok_or_else(|| FetchError::Cache { url: url.to_string(), message: "response body is neither JSON nor YAML".to_string() })?;

        if let Some((body_path, etag_path)) = &paths {
            self.write_cache(body_path, etag_path, &body, new_etag.as_deref());
        }
        tracing::Span::current().record("status", "fetched");
        self.memory.lock().await.insert(url.to_string(), value.clone());
        Ok((value, CacheStatus::Miss))
    }
}

#[async_trait::async_trait]
impl Fetcher for DiskCache {
    async fn fetch(&self, url: &str) -> Result<(Value, CacheStatus), FetchError> {
        self.fetch_inner(url).await
    }
}

#[async_trait::async_trait]
impl jsonschema::AsyncRetrieve for DiskCache {
    async fn retrieve(
        &self,
        uri: &jsonschema::Uri<String>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let (value, _status) = self.fetch_inner(uri.as_str()).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_uri_is_deterministic() {
        assert_eq!(hash_uri("https://example.com/a.json"), hash_uri("https://example.com/a.json"));
    }

    #[test]
    fn hash_uri_differs_for_different_urls() {
        assert_ne!(hash_uri("https://example.com/a.json"), hash_uri("https://example.com/b.json"));
    }

    #[test]
    fn hash_uri_is_hex() {
        let hash = hash_uri("https://example.com/a.json");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ensure_cache_dir_has_expected_suffix() {
        let dir = ensure_cache_dir();
        assert!(dir.ends_with("yamlls/schemas") || dir.to_string_lossy().ends_with("yamlls\\schemas"));
    }

    #[tokio::test]
    async fn disk_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DiskCache::builder().cache_dir(tmp.path().to_path_buf()).build();
        let body_path = cache.cache_paths("https://example.com/s.json").unwrap().0;
        std::fs::write(&body_path, r#"{"type":"object"}"#).unwrap();
        let (value, status) = cache.fetch("https://example.com/s.json").await.unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(value, serde_json::json!({"type": "object"}));
    }

    #[tokio::test]
    async fn stale_disk_entry_is_not_served() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DiskCache::builder()
            .cache_dir(tmp.path().to_path_buf())
            .ttl(Duration::from_secs(0))
            .build();
        let body_path = cache.cache_paths("https://example.com/s.json").unwrap().0;
        std::fs::write(&body_path, r#"{"type":"object"}"#).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.read_fresh(&body_path).is_none());
    }
}
