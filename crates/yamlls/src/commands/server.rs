use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::prelude::*;

use yls_cli_common::CliCacheOptions;
use yls_lsp::{run_server, ServerOptions};

/// Run the language server over stdio, logging to a file rather than
/// stdout/stderr since those carry the JSON-RPC transport.
pub async fn run(cache: &CliCacheOptions) -> Result<()> {
    let log_dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("yamlls");
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(&log_dir, "log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(tracing_subscriber::EnvFilter::try_from_env("YAMLLS_LOG").unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let options = ServerOptions {
        cache_dir: cache.cache_dir.clone().map(PathBuf::from),
        schema_cache_ttl: cache.schema_cache_ttl,
        force_schema_fetch: cache.force_schema_fetch,
    };
    run_server(options).await;
    Ok(())
}
