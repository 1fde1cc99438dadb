#![doc = include_str!("../README.md")]

mod model;
mod path;
mod walker;

pub use model::{
    COMPOSITION_KEYWORDS, description_of, navigate_pointer, preserves_unknown_fields, ref_name,
    required_set, resolve_ref, type_summary,
};
pub use path::{SchemaPath, yaml_path_to_schema_path};
pub use walker::{DEFAULT_MAX_DEPTH, SchemaProperty, Walker};
