use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

use yls_cli_common::CliCacheOptions;
use yls_validate::{extract_kind_api_version, validate_file, Severity};
use yls_yaml::split_documents;

use super::support::build_resolver;

/// Validate a single file against its resolved schema, printing one
/// `file:line:message` line per finding to stderr.
pub async fn run(cache: &CliCacheOptions, file: &str) -> Result<bool> {
    let root = std::env::current_dir()?;
    let resolver = build_resolver(cache, &root).await?;
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;

    let mut schemas: HashMap<(String, String), Value> = HashMap::new();
    for doc in split_documents(&text) {
        let Some((kind, api_version)) = extract_kind_api_version(doc.text) else {
            continue;
        };
        if schemas.contains_key(&(kind.clone(), api_version.clone())) {
            continue;
        }
        if let Some(url) = resolver.schema_url_for_kind_apiversion(&kind, &api_version).await {
            let schema = resolver.schema_bytes(&url).await.context("fetching schema")?;
            schemas.insert((kind, api_version), schema);
        }
    }

    let errors = validate_file(&text, |kind, api_version| {
        schemas.get(&(kind.to_string(), api_version.to_string())).cloned()
    });

    let mut had_error = false;
    for error in &errors {
        eprintln!("{file}:{}:{}", error.range.start.line + 1, error.message);
        if error.severity == Severity::Error {
            had_error = true;
        }
    }
    Ok(had_error)
}
