#![doc = include_str!("../README.md")]

mod crd;
mod file_pattern;
mod native;
mod resolver;

pub use crd::{parse_crd_index, CrdEntry, CrdIndexEntry, CrdIndexError};
pub use file_pattern::{parse_catalog, Catalog, CompiledCatalog, SchemaEntry, SchemaMatch};
pub use native::{parse_native_definitions, GvkEntry};
pub use resolver::{
    CatalogConfig, CatalogError, Resolver, DEFAULT_CRD_BASE_URL, DEFAULT_FILE_PATTERN_CATALOG_URL, DEFAULT_KUBERNETES_BASE_URL,
};
