use anyhow::{Context, Result};

use yls_cli_common::CliCacheOptions;

use super::support::build_resolver;

/// Rebuild the schema catalogs from scratch, discarding any memoised bytes.
pub async fn run(cache: &CliCacheOptions) -> Result<bool> {
    let root = std::env::current_dir()?;
    let resolver = build_resolver(cache, &root).await?;
    resolver.refresh().await.context("refreshing schema catalogs")?;
    println!("schema catalogs refreshed");
    Ok(false)
}
