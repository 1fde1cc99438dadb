use anyhow::{Context, Result};

use yls_cli_common::CliCacheOptions;
use yls_schema::{SchemaProperty, Walker};

use super::support::build_resolver;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn render_html(schema_id: &str, properties: &[SchemaProperty]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>");
    html.push_str(&escape(schema_id));
    html.push_str("</title></head>\n<body>\n<h1>");
    html.push_str(&escape(schema_id));
    html.push_str("</h1>\n<dl>\n");

    for prop in properties {
        html.push_str("<dt><code>");
        html.push_str(&escape(prop.path.as_str()));
        html.push_str("</code>");
        if let Some(ty) = &prop.type_tag {
            html.push_str(&format!(" <em>{}</em>", escape(ty)));
        }
        if prop.required {
            html.push_str(" <strong>required</strong>");
        }
        html.push_str("</dt>\n<dd>");
        html.push_str(&escape(prop.description.as_deref().unwrap_or("")));
        html.push_str("</dd>\n");
    }

    html.push_str("</dl>\n</body>\n</html>\n");
    html
}

/// Resolve `schema_id` (either a `kind/apiVersion` pair, or a file-pattern
/// catalog entry name) and emit a flat HTML property listing for it.
pub async fn run(cache: &CliCacheOptions, schema_id: &str) -> Result<bool> {
    let root = std::env::current_dir()?;
    let resolver = build_resolver(cache, &root).await?;

    let by_kind = schema_id.split_once('/');
    let url = match by_kind {
        Some((kind, api_version)) => resolver.schema_url_for_kind_apiversion(kind, api_version).await,
        None => None,
    };
    let url = match url {
        Some(url) => Some(url),
        None => resolver.schema_url_for_name(schema_id).await,
    };

    let Some(url) = url else {
        eprintln!("unknown schema id '{schema_id}'");
        return Ok(true);
    };

    let schema = resolver.schema_bytes(&url).await.context("fetching schema")?;
    let properties = Walker::new(&schema).walk(&schema);
    print!("{}", render_html(schema_id, &properties));
    Ok(false)
}
