#![doc = include_str!("../README.md")]

mod disk;
mod memory;

pub use disk::{DiskCache, DiskCacheBuilder, DEFAULT_SCHEMA_CACHE_TTL};
pub use memory::MemoryFetcher;

use core::fmt;

/// Whether a fetched byte sequence came from the on-disk cache, was fetched
/// fresh over the network, or caching is disabled entirely for this
/// fetcher (e.g. [`MemoryFetcher`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Disabled,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Hit => write!(f, "cached"),
            CacheStatus::Miss => write!(f, "fetched"),
            CacheStatus::Disabled => write!(f, "fetched (no cache)"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetching {url}: {message}")]
    Http { url: String, message: String },
    #[error("reading cache for {url}: {message}")]
    Cache { url: String, message: String },
    #[error("{url} is not available in memory")]
    NotInMemory { url: String },
}

/// A source of schema bytes, addressed by URL. Implemented by [`DiskCache`]
/// (real HTTP + on-disk cache) and [`MemoryFetcher`] (tests, and the
/// builtin Kubernetes/CRD schemas bundled with the binary).
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<(serde_json::Value, CacheStatus), FetchError>;
}
