//! Infrastructure layer for entity-tools
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: an in-memory transactional store, a
//! directory-backed template renderer, the JSONL invocation log,
//! JSON Schema export and configuration file loading.

pub mod config;
pub mod logging;
pub mod store;
pub mod templates;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use logging::JsonlInvocationLogger;
pub use store::{MemoryRepository, MemoryStore, MemoryTransaction};
pub use templates::{DirectoryTemplateRenderer, TemplateError};
pub use tools::JsonSchemaToolConverter;
