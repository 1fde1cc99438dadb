use anyhow::Result;

use yls_cli_common::CliCacheOptions;

use super::support::build_resolver;

/// List every schema id the resolver knows about, one per line.
pub async fn run(cache: &CliCacheOptions) -> Result<bool> {
    let root = std::env::current_dir()?;
    let resolver = build_resolver(cache, &root).await?;
    for id in resolver.known_schema_ids().await {
        println!("{id}");
    }
    Ok(false)
}
