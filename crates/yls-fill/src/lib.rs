#![doc = include_str!("../README.md")]

mod fill;
mod overlay;

pub use fill::{fill, FillError, DEFAULT_MAX_DEPTH};
pub use overlay::{delete_status_field, overlay_kind_api_version};

use serde_json::Value;

/// Fill a schema and serialize the result as YAML bytes.
///
/// # Errors
///
/// Returns an error if filling the schema fails (see [`fill`]), or if the
/// resulting value cannot be serialized as YAML (should not happen for
/// values `fill` produces, which are always a subset of JSON).
pub fn fill_to_yaml(schema: &Value, overlay: Option<(&str, &str)>, drop_status: bool) -> Result<String, FillError> {
    let mut value = fill(schema)?;
    if let Some((kind, api_version)) = overlay {
        overlay_kind_api_version(&mut value, kind, api_version);
    }
    if drop_status {
        delete_status_field(&mut value);
    }
    Ok(serde_yaml::to_string(&value).unwrap_or_default())
}
