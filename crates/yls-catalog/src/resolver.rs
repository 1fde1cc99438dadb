use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use yls_fetch::{FetchError, Fetcher};

use crate::crd::{parse_crd_index, CrdIndexError};
use crate::file_pattern::{parse_catalog, CompiledCatalog};
use crate::native::parse_native_definitions;

/// Base URL the native Kubernetes schema set is published under, by default
/// the `yannh/kubernetes-json-schema` mirror used throughout the ecosystem.
pub const DEFAULT_KUBERNETES_BASE_URL: &str = "https://raw.githubusercontent.com/yannh/kubernetes-json-schema/master";

/// Base URL the bundled CRD catalog index is published under.
pub const DEFAULT_CRD_BASE_URL: &str = "https://raw.githubusercontent.com/datreeio/CRDs-catalog/main";

/// The built-in file-pattern catalog, covering common non-Kubernetes YAML
/// dialects (kustomization files, GitHub Actions workflows, and so on).
pub const DEFAULT_FILE_PATTERN_CATALOG_URL: &str = "https://www.schemastore.org/api/json/catalog.json";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub kubernetes_base_url: String,
    pub crd_base_url: String,
    pub file_pattern_catalog_urls: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            kubernetes_base_url: DEFAULT_KUBERNETES_BASE_URL.to_string(),
            crd_base_url: DEFAULT_CRD_BASE_URL.to_string(),
            file_pattern_catalog_urls: vec![DEFAULT_FILE_PATTERN_CATALOG_URL.to_string()],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    CrdIndex(#[from] CrdIndexError),
}

fn key(kind: &str, api_version: &str) -> String {
    format!("{kind}_{api_version}")
}

struct CatalogData {
    kind_apiversion_urls: HashMap<String, String>,
    api_versions_by_kind: HashMap<String, Vec<String>>,
    file_pattern: CompiledCatalog,
}

/// Resolves schemas for Kubernetes manifests and general YAML files from
/// three catalog sources: native Kubernetes GVKs, CRD catalogs, and
/// filename-pattern catalogs. Read-only once built; `refresh` rebuilds the
/// whole thing in the background and swaps in only on success.
pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
    config: CatalogConfig,
    data: RwLock<CatalogData>,
    schema_bytes: Mutex<HashMap<String, Value>>,
}

impl Resolver {
    /// Build a resolver by fetching all three catalogs once.
    ///
    /// # Errors
    ///
    /// Returns an error if any catalog fetch or parse fails; no resolver is
    /// constructed in that case.
    pub async fn build(fetcher: Arc<dyn Fetcher>, config: CatalogConfig) -> Result<Self, CatalogError> {
        let data = Self::build_data(fetcher.as_ref(), &config).await?;
        Ok(Self { fetcher, config, data: RwLock::new(data), schema_bytes: Mutex::new(HashMap::new()) })
    }

    async fn build_data(fetcher: &dyn Fetcher, config: &CatalogConfig) -> Result<CatalogData, CatalogError> {
        let mut kind_apiversion_urls = HashMap::new();
        let mut api_versions_by_kind: HashMap<String, Vec<String>> = HashMap::new();

        let (native_defs, _) = fetcher.fetch(&format!("{}/_definitions.json", config.kubernetes_base_url)).await?;
        for entry in parse_native_definitions(&native_defs, &config.kubernetes_base_url) {
            kind_apiversion_urls.insert(key(&entry.kind, &entry.api_version), entry.url);
            api_versions_by_kind.entry(entry.kind).or_default().push(entry.api_version);
        }

        let (crd_index, _) = fetcher.fetch(&format!("{}/index.yaml", config.crd_base_url)).await?;
        let crd_index_text = serde_yaml::to_string(&crd_index).unwrap_or_default();
        for entry in parse_crd_index(&crd_index_text, &config.crd_base_url)? {
            kind_apiversion_urls.entry(key(&entry.kind, &entry.api_version)).or_insert_with(|| entry.url.clone());
            api_versions_by_kind.entry(entry.kind).or_default().push(entry.api_version);
        }

        let mut merged_file_pattern_schemas = Vec::new();
        for url in &config.file_pattern_catalog_urls {
            let (value, _) = fetcher.fetch(url).await?;
            let text = serde_json::to_string(&value)?;
            let catalog = parse_catalog(&text)?;
            merged_file_pattern_schemas.extend(catalog.schemas);
        }
        let file_pattern = CompiledCatalog::compile(&crate::file_pattern::Catalog {
            version: 1,
            title: None,
            schemas: merged_file_pattern_schemas,
        });

        Ok(CatalogData { kind_apiversion_urls, api_versions_by_kind, file_pattern })
    }

    /// Look up the schema URL for an exact `(kind, apiVersion)` pair.
    pub async fn schema_url_for_kind_apiversion(&self, kind: &str, api_version: &str) -> Option<String> {
        self.data.read().await.kind_apiversion_urls.get(&key(kind, api_version)).cloned()
    }

    /// Look up the schema URL for a bare kind, preferring the
    /// empty-group/native `apiVersion` and otherwise the one with the
    /// fewest path segments.
    pub async fn schema_url_for_kind(&self, kind: &str) -> Option<String> {
        let data = self.data.read().await;
        let versions = data.api_versions_by_kind.get(kind)?;
        let best = versions.iter().min_by_key(|v| v.matches('/').count())?;
        data.kind_apiversion_urls.get(&key(kind, best)).cloned()
    }

    /// Look up the schema URL for a filename (first catalog match wins).
    pub async fn schema_url_for_filename(&self, path: &str) -> Option<String> {
        self.data.read().await.file_pattern.find_schema(path).map(str::to_string)
    }

    /// Look up the schema URL registered under a file-pattern catalog
    /// entry's `name`, e.g. `"kustomization"`.
    pub async fn schema_url_for_name(&self, name: &str) -> Option<String> {
        self.data.read().await.file_pattern.url_for_name(name).map(str::to_string)
    }

    /// Fetch and memoize schema bytes for a URL, populating the cache only
    /// once per URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying fetch fails.
    pub async fn schema_bytes(&self, url: &str) -> Result<Value, CatalogError> {
        {
            let cache = self.schema_bytes.lock().await;
            if let Some(value) = cache.get(url) {
                return Ok(value.clone());
            }
        }
        let (value, _status) = self.fetcher.fetch(url).await?;
        self.schema_bytes.lock().await.insert(url.to_string(), value.clone());
        Ok(value)
    }

    /// List every schema identifier known to the resolver: `kind/apiVersion`
    /// pairs from the native and CRD catalogs, plus the names registered in
    /// the file-pattern catalogs. Sorted and deduplicated.
    pub async fn known_schema_ids(&self) -> Vec<String> {
        let data = self.data.read().await;
        let mut ids: Vec<String> = Vec::new();
        for (kind, versions) in &data.api_versions_by_kind {
            for version in versions {
                ids.push(format!("{kind}/{version}"));
            }
        }
        ids.extend(data.file_pattern.known_names().iter().map(|name| (*name).to_string()));
        ids.sort();
        ids.dedup();
        ids
    }

    /// Rebuild all three catalog indices and swap them in only on success;
    /// the schema-bytes cache is purged so subsequent lookups refetch.
    ///
    /// # Errors
    ///
    /// Returns an error (and leaves the current catalogs untouched) if any
    /// fetch or parse fails during the rebuild.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        let new_data = Self::build_data(self.fetcher.as_ref(), &self.config).await?;
        *self.data.write().await = new_data;
        self.schema_bytes.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yls_fetch::MemoryFetcher;

    #[test]
    fn default_config_points_at_builtin_sources() {
        let config = CatalogConfig::default();
        assert_eq!(config.kubernetes_base_url, DEFAULT_KUBERNETES_BASE_URL);
        assert_eq!(config.crd_base_url, DEFAULT_CRD_BASE_URL);
        assert_eq!(config.file_pattern_catalog_urls, vec![DEFAULT_FILE_PATTERN_CATALOG_URL.to_string()]);
    }

    fn config() -> CatalogConfig {
        CatalogConfig {
            kubernetes_base_url: "https://example.com/k8s".into(),
            crd_base_url: "https://example.com/crds".into(),
            file_pattern_catalog_urls: vec!["https://example.com/catalog.json".into()],
        }
    }

    fn fetcher() -> Arc<MemoryFetcher> {
        let fetcher = MemoryFetcher::new();
        fetcher.insert(
            "https://example.com/k8s/_definitions.json",
            json!({
                "definitions": {
                    "io.k8s.api.core.v1.Pod": {
                        "x-kubernetes-group-version-kind": [{"group": "", "kind": "Pod", "version": "v1"}]
                    },
                    "io.k8s.api.apps.v1.Deployment": {
                        "x-kubernetes-group-version-kind": [{"group": "apps", "kind": "Deployment", "version": "v1"}]
                    }
                }
            }),
        );
        fetcher.insert(
            "https://example.com/crds/index.yaml",
            json!([
                {"kind": "Certificate", "apiVersion": "cert-manager.io/v1", "filename": "cert.json"}
            ]),
        );
        fetcher.insert(
            "https://example.com/catalog.json",
            json!({
                "version": 1,
                "schemas": [
                    {"name": "kustomization", "description": "", "url": "https://example.com/kustomization.json", "fileMatch": ["kustomization.yaml"]}
                ]
            }),
        );
        Arc::new(fetcher)
    }

    #[tokio::test]
    async fn resolves_native_kind_apiversion() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(
            resolver.schema_url_for_kind_apiversion("Pod", "v1").await,
            Some("https://example.com/k8s/pod-v1.json".to_string())
        );
    }

    #[tokio::test]
    async fn resolves_bare_kind_prefers_empty_group() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(
            resolver.schema_url_for_kind("Pod").await,
            Some("https://example.com/k8s/pod-v1.json".to_string())
        );
    }

    #[tokio::test]
    async fn resolves_crd_kind_apiversion() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(
            resolver.schema_url_for_kind_apiversion("Certificate", "cert-manager.io/v1").await,
            Some("https://example.com/crds/cert.json".to_string())
        );
    }

    #[tokio::test]
    async fn resolves_filename() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(
            resolver.schema_url_for_filename("kustomization.yaml").await,
            Some("https://example.com/kustomization.json".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_kind_apiversion_is_none() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(resolver.schema_url_for_kind_apiversion("Nope", "v1").await, None);
    }

    #[tokio::test]
    async fn schema_bytes_are_memoized() {
        let fetcher = fetcher();
        fetcher.insert("https://example.com/schema.json", json!({"type": "object"}));
        let resolver = Resolver::build(fetcher, config()).await.unwrap();
        let first = resolver.schema_bytes("https://example.com/schema.json").await.unwrap();
        let second = resolver.schema_bytes("https://example.com/schema.json").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn known_schema_ids_lists_kinds_and_catalog_names() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        let ids = resolver.known_schema_ids().await;
        assert!(ids.contains(&"Pod/v1".to_string()));
        assert!(ids.contains(&"Deployment/apps/v1".to_string()));
        assert!(ids.contains(&"kustomization".to_string()));
    }

    #[tokio::test]
    async fn resolves_catalog_entry_by_name() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        assert_eq!(
            resolver.schema_url_for_name("kustomization").await,
            Some("https://example.com/kustomization.json".to_string())
        );
        assert_eq!(resolver.schema_url_for_name("no-such-entry").await, None);
    }

    #[tokio::test]
    async fn refresh_rebuilds_indices() {
        let resolver = Resolver::build(fetcher(), config()).await.unwrap();
        resolver.refresh().await.unwrap();
        assert_eq!(
            resolver.schema_url_for_kind_apiversion("Pod", "v1").await,
            Some("https://example.com/k8s/pod-v1.json".to_string())
        );
    }
}
