use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use yls_catalog::{CatalogConfig, Resolver};
use yls_cli_common::CliCacheOptions;
use yls_fetch::{DiskCache, Fetcher};

/// Build a schema resolver honoring the shared cache flags and any
/// `yamlls.toml`/`.yamlls.toml` found in `root`.
///
/// # Errors
///
/// Returns an error if the project config fails to parse, or if any of the
/// three catalog fetches the resolver performs on construction fails.
pub async fn build_resolver(cache: &CliCacheOptions, root: &Path) -> anyhow::Result<Resolver> {
    let config = yls_config::load_from_dir(root).context("loading yamlls.toml")?;

    let mut builder = DiskCache::builder().force_fetch(cache.force_schema_fetch);
    if let Some(dir) = &cache.cache_dir {
        builder = builder.cache_dir(PathBuf::from(dir));
    }
    if let Some(ttl) = cache.schema_cache_ttl {
        builder = builder.ttl(ttl);
    }
    let fetcher: Arc<dyn Fetcher> = Arc::new(builder.build());

    let mut catalog_config = yls_config::apply_overrides(&CatalogConfig::default(), &config);
    if cache.no_catalog {
        catalog_config.file_pattern_catalog_urls.clear();
    }

    Resolver::build(fetcher, catalog_config).await.context("building schema catalogs")
}
