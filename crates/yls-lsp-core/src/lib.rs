#![doc = include_str!("../README.md")]

mod code_action;
mod completion;
mod document;
mod engine;
mod hover;

pub use code_action::{external_docs_action, ExternalDocsAction};
pub use completion::{completion_at, CompletionItem};
pub use document::{Document, DocumentStore};
pub use engine::{Engine, DISPATCH_CONCURRENCY_LIMIT};
pub use hover::{hover_at, HoverResult};
