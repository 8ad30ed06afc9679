//! Template adapters

mod directory;

pub use directory::{DirectoryTemplateRenderer, TemplateError};
