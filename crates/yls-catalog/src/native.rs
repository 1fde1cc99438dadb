use serde_json::Value;

/// A single `(kind, apiVersion) -> schema URL` registration derived from a
/// Kubernetes `_definitions.json` OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GvkEntry {
    pub kind: String,
    pub api_version: String,
    pub url: String,
}

const SKIPPED_ID_FRAGMENTS: [&str; 3] = ["apimachinery", "apiextensions", "apiserverinternal"];

/// Parse the `_definitions.json` OpenAPI document into one [`GvkEntry`] per
/// definition that carries exactly one `x-kubernetes-group-version-kind`
/// entry, skipping internal/meta definitions.
#[must_use]
pub fn parse_native_definitions(document: &Value, base_url: &str) -> Vec<GvkEntry> {
    let Some(definitions) = document.get("definitions").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (id, def) in definitions {
        if SKIPPED_ID_FRAGMENTS.iter().any(|frag| id.contains(frag)) {
            continue;
        }

        let Some(gvks) = def.get("x-kubernetes-group-version-kind").and_then(Value::as_array) else {
            continue;
        };
        if gvks.len() != 1 {
            continue;
        }

        let gvk = &gvks[0];
        let (Some(group), Some(version), Some(kind)) = (
            gvk.get("group").and_then(Value::as_str),
            gvk.get("version").and_then(Value::as_str),
            gvk.get("kind").and_then(Value::as_str),
        ) else {
            continue;
        };

        let kind_lower = kind.to_lowercase();
        let group_head = group.split('.').next().filter(|s| !s.is_empty());

        let api_version = match group_head {
            Some(head) => format!("{head}/{version}"),
            None => version.to_string(),
        };
        let url = match group_head {
            Some(head) => format!("{base_url}/{kind_lower}-{head}-{version}.json"),
            None => format!("{base_url}/{kind_lower}-{version}.json"),
        };

        entries.push(GvkEntry { kind: kind.to_string(), api_version, url });
    }
    entries
}
