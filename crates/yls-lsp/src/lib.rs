#![doc = include_str!("../README.md")]

mod capabilities;
mod convert;
mod server;

pub use server::{run_server, ServerOptions};
