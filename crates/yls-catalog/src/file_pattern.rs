use std::collections::BTreeMap;

use glob_set::{Glob, GlobMap, GlobMapBuilder};
use serde::{Deserialize, Serialize};

/// A JSON Schema catalog following the `SchemaStore` catalog format:
/// <https://json.schemastore.org/schema-catalog.json>.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub schemas: Vec<SchemaEntry>,
}

/// A single schema entry in a file-pattern catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default, rename = "fileMatch", skip_serializing_if = "Vec::is_empty")]
    pub file_match: Vec<String>,
}

/// Parse a file-pattern catalog from a JSON string.
///
/// # Errors
///
/// Returns an error if the string is not valid JSON or does not match the
/// catalog schema.
pub fn parse_catalog(json: &str) -> Result<Catalog, serde_json::Error> {
    serde_json::from_str(json)
}

/// Details about how a filename was matched against the catalog.
#[derive(Debug)]
pub struct SchemaMatch<'a> {
    pub url: &'a str,
    pub matched_pattern: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
}

struct CatalogEntryInfo {
    name: String,
    description: Option<String>,
}

struct GlobEntry {
    url: String,
    pattern: String,
}

/// A file-pattern catalog compiled into a glob matcher for fast filename
/// lookup. Entries are compiled in catalog order, so among multiple
/// matches the first registered entry wins.
pub struct CompiledCatalog {
    map: GlobMap<GlobEntry>,
    url_to_entry: BTreeMap<String, CatalogEntryInfo>,
}

impl CompiledCatalog {
    /// Compile a catalog into a matcher.
    ///
    /// Basename patterns (no `/`) are expanded to `**/pattern` so they
    /// match a file with that basename at any depth; full-path globs are
    /// kept as-is. Negation patterns (`!...`) are skipped.
    #[must_use]
    pub fn compile(catalog: &Catalog) -> Self {
        let mut builder = GlobMapBuilder::new();
        let mut url_to_entry: BTreeMap<String, CatalogEntryInfo> = BTreeMap::new();

        for schema in &catalog.schemas {
            let description = if schema.description.is_empty() { None } else { Some(schema.description.clone()) };
            url_to_entry
                .entry(schema.url.clone())
                .or_insert_with(|| CatalogEntryInfo { name: schema.name.clone(), description });

            for pattern in &schema.file_match {
                if pattern.starts_with('!') {
                    continue;
                }
                let normalized = if pattern.contains('/') { pattern.clone() } else { format!("**/{pattern}") };
                if let Ok(glob) = Glob::new(&normalized) {
                    builder.insert(glob, GlobEntry { url: schema.url.clone(), pattern: pattern.clone() });
                }
            }
        }

        let map = builder.build().unwrap_or_else(|_| GlobMapBuilder::new().build().expect("empty map builds"));
        Self { map, url_to_entry }
    }

    /// Find the schema URL for a given file path (first matching entry
    /// wins).
    #[must_use]
    pub fn find_schema(&self, path: &str) -> Option<&str> {
        let path = path.strip_prefix("./").unwrap_or(path);
        self.map.get(path).map(|e| e.url.as_str())
    }

    /// Every schema name registered in the catalog, sorted.
    #[must_use]
    pub fn known_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.url_to_entry.values().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Find the schema URL registered under a catalog entry's `name` (first
    /// match wins; names are not guaranteed unique across a merged catalog).
    #[must_use]
    pub fn url_for_name(&self, name: &str) -> Option<&str> {
        self.url_to_entry.iter().find(|(_, info)| info.name == name).map(|(url, _)| url.as_str())
    }

    #[must_use]
    pub fn find_schema_detailed(&self, path: &str) -> Option<SchemaMatch<'_>> {
        let path = path.strip_prefix("./").unwrap_or(path);
        let entry = self.map.get(path)?;
        let info = self.url_to_entry.get(&entry.url)?;
        Some(SchemaMatch {
            url: &entry.url,
            matched_pattern: &entry.pattern,
            name: &info.name,
            description: info.description.as_deref(),
        })
    }
}
