#![doc = include_str!("../README.md")]

mod kind_version;
mod modeline;
mod validator;

pub use kind_version::extract_kind_api_version;
pub use modeline::extract_schema_modeline;
pub use validator::{validate_file, Severity, ValidationError};
