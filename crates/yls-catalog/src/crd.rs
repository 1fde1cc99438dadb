use serde::Deserialize;

/// One entry from a CRD catalog's `index.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CrdIndexEntry {
    pub kind: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub filename: String,
}

/// A `(kind, apiVersion) -> schema URL` registration derived from a CRD
/// catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrdEntry {
    pub kind: String,
    pub api_version: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CrdIndexError {
    #[error("parsing CRD index.yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse a CRD catalog's `index.yaml`, rejecting entries whose `kind`
/// contains a `/` (defensive; such an entry cannot be a real Kubernetes
/// kind and would corrupt the `(kind, apiVersion)` key namespace).
pub fn parse_crd_index(yaml: &str, base_url: &str) -> Result<Vec<CrdEntry>, CrdIndexError> {
    let raw: Vec<CrdIndexEntry> = serde_yaml::from_str(yaml)?;
    let entries = raw
        .into_iter()
        .filter(|entry| {
            if entry.kind.contains('/') {
                tracing::warn!(kind = %entry.kind, "skipping CRD index entry with slash in kind");
                false
            } else {
                true
            }
        })
        .map(|entry| CrdEntry {
            kind: entry.kind,
            api_version: entry.api_version,
            url: format!("{base_url}/{}", entry.filename),
        })
        .collect();
    Ok(entries)
}
