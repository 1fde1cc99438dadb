use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use yls_cli_common::CliCacheOptions;
use yls_fetch::{DiskCache, Fetcher};
use yls_fill::fill_to_yaml;

use crate::FillArgs;

async fn load_schema(schema_arg: &str, cache: &CliCacheOptions) -> Result<Value> {
    if schema_arg.starts_with("http://") || schema_arg.starts_with("https://") {
        let mut builder = DiskCache::builder().force_fetch(cache.force_schema_fetch);
        if let Some(dir) = &cache.cache_dir {
            builder = builder.cache_dir(PathBuf::from(dir));
        }
        if let Some(ttl) = cache.schema_cache_ttl {
            builder = builder.ttl(ttl);
        }
        let disk_cache = builder.build();
        let (value, _status) = disk_cache.fetch(schema_arg).await.with_context(|| format!("fetching {schema_arg}"))?;
        Ok(value)
    } else {
        let text = std::fs::read_to_string(schema_arg).with_context(|| format!("reading {schema_arg}"))?;
        serde_json::from_str(&text)
            .or_else(|_| serde_yaml::from_str(&text))
            .with_context(|| format!("parsing {schema_arg} as JSON or YAML"))
    }
}

/// Walk a dotted path (`spec.containers`) down through nested `properties`,
/// resolving a `$ref` at every step.
fn navigate_schema<'a>(root: &'a Value, path: &str) -> Result<&'a Value, String> {
    let mut current = yls_schema::resolve_ref(root, root);
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = current.get("properties").and_then(Value::as_object).and_then(|props| props.get(segment));
        let Some(next) = next else {
            return Err(segment.to_string());
        };
        current = yls_schema::resolve_ref(next, root);
    }
    Ok(current)
}

/// Fill a schema into a YAML skeleton, optionally narrowed to a sub-path and
/// overlaid with a `kind`/`apiVersion` pair.
pub async fn run(cache: &CliCacheOptions, args: &FillArgs) -> Result<bool> {
    let schema = load_schema(&args.schema, cache).await?;

    let target = match &args.path {
        Some(path) => match navigate_schema(&schema, path) {
            Ok(value) => value.clone(),
            Err(segment) => {
                eprintln!("no such sub-path '{segment}' in '{path}'");
                return Ok(true);
            }
        },
        None => schema,
    };

    let overlay = match (&args.kind, &args.api_version) {
        (Some(kind), Some(api_version)) => Some((kind.as_str(), api_version.as_str())),
        _ => None,
    };

    match fill_to_yaml(&target, overlay, overlay.is_some()) {
        Ok(yaml) => {
            print!("{yaml}");
            Ok(false)
        }
        Err(error) => {
            eprintln!("{error}");
            Ok(true)
        }
    }
}
