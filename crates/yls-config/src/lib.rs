#![doc = include_str!("../README.md")]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const CONFIG_FILENAMES: [&str; 2] = ["yamlls.toml", ".yamlls.toml"];

/// Configuration loaded from `yamlls.toml`. Every field is optional: an
/// absent config, or an absent field within it, falls back to the built-in
/// defaults baked into `yls-catalog`.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Override the base URL the native Kubernetes catalog is fetched from.
    #[serde(default, rename = "kubernetes-base-url")]
    pub kubernetes_base_url: Option<String>,

    /// Override the base URL the CRD catalog is fetched from.
    #[serde(default, rename = "crd-base-url")]
    pub crd_base_url: Option<String>,

    /// Extra file-pattern catalog URLs to fetch alongside the built-in one.
    #[serde(default)]
    pub catalogs: Vec<String>,

    /// Override the schema cache TTL, as a `humantime` duration string
    /// (e.g. `"12h"`, `"30m"`).
    #[serde(default, rename = "schema-cache-ttl")]
    pub schema_cache_ttl: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("parsing {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("schema-cache-ttl {value:?} is not a valid duration: {message}")]
    InvalidTtl { value: String, message: String },
}

impl Config {
    /// Parse the `schema-cache-ttl` field, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but is not a valid
    /// `humantime` duration string.
    pub fn schema_cache_ttl(&self) -> Result<Option<Duration>, ConfigError> {
        match &self.schema_cache_ttl {
            None => Ok(None),
            Some(raw) => humantime::parse_duration(raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidTtl { value: raw.clone(), message: e.to_string() }),
        }
    }
}

/// Find `yamlls.toml` or `.yamlls.toml` directly in `dir` (no upward
/// directory-tree search: a language server is rooted at a single workspace
/// directory, unlike a CLI linter walking an arbitrary file tree).
#[must_use]
pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES.iter().map(|name| dir.join(name)).find(|candidate| candidate.is_file())
}

/// Load the config from `dir`, if present. Returns the default config when
/// no config file exists.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load_from_dir(dir: &Path) -> Result<Config, ConfigError> {
    let Some(path) = find_config_path(dir) else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io { path: path.clone(), message: e.to_string() })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml { path, source })
}

/// Apply a loaded config's overrides onto a base catalog config, returning
/// a new one. File-pattern catalog URLs from `config.catalogs` are appended
/// after the base's own list.
#[must_use]
pub fn apply_overrides(base: &yls_catalog::CatalogConfig, config: &Config) -> yls_catalog::CatalogConfig {
    let mut file_pattern_catalog_urls = base.file_pattern_catalog_urls.clone();
    file_pattern_catalog_urls.extend(config.catalogs.iter().cloned());

    yls_catalog::CatalogConfig {
        kubernetes_base_url: config.kubernetes_base_url.clone().unwrap_or_else(|| base.kubernetes_base_url.clone()),
        crd_base_url: config.crd_base_url.clone().unwrap_or_else(|| base.crd_base_url.clone()),
        file_pattern_catalog_urls,
    }
}
