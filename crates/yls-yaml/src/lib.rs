#![doc = include_str!("../README.md")]

mod index;
mod path;
mod position;
mod split;

pub use index::{PathIndex, YamlParseError};
pub use path::YamlPath;
pub use position::{DocumentPosition, Position, Range};
pub use split::{DocumentSlice, split_documents};
