pub mod docs;
pub mod fill;
pub mod refresh;
pub mod schemas;
pub mod server;
mod support;
pub mod validate;
