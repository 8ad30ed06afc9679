//! Application layer for entity-tools
//!
//! This crate contains the ports the subsystem needs from its collaborators
//! (store, templates, audit log, schema export) and the services built on
//! them: the view registry and factory, tool synthesis, transactional
//! invocation and progressive disclosure. It depends only on the domain
//! layer.

pub mod config;
pub mod ports;
pub mod tools;
pub mod views;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::ToolingConfig;
pub use ports::{
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    store::{Repository, StoreError, Transaction, TransactionManager},
    template::{NoTemplates, TemplateRenderer},
    tool_schema::ToolSchemaPort,
};
pub use tools::{
    EntityTool, FinderTool, RelationTool, ToolRuntime, ToolSet, ToolSynthesizer, TransactionalTool,
};
pub use views::{
    RepositoryLocator, View, ViewDescriptor, ViewFactory, ViewRegistry, ViewRegistryBuilder,
};
