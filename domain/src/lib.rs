//! Domain layer for entity-tools
//!
//! This crate contains the pure vocabulary of the entity tool projection:
//! inspectable entities, declared views and operations, and the tool
//! descriptors handed to an LLM. It has no dependencies on persistence,
//! transactions or configuration loading.
//!
//! # Core Concepts
//!
//! ## Entities
//!
//! An [`Entity`] exposes its identifier and an ordered list of [`Field`]s.
//! Relations between entities are carried by identifier only.
//!
//! ## Views
//!
//! A [`ViewInterface`] declares how one entity type is presented to the
//! agent: summary, full text, and the [`Operation`]s that become tools.
//!
//! ## Tools
//!
//! A [`ToolDefinition`] is the agent-facing descriptor of a callable
//! operation; every invocation produces a [`ToolResult`].

pub mod core;
pub mod entity;
pub mod tool;
pub mod view;

// Re-export commonly used types
pub use core::error::ConfigurationError;
pub use core::string::{simple_type_name, to_snake_case};
pub use entity::{
    AsAny, CloneEntity, Entity, EntityId, EntityType, Field, FieldValue, IdentifierKind,
    downcast_mut, downcast_ref,
};
pub use tool::{
    ParamType, RiskLevel, ToolCall, ToolDefinition, ToolError, ToolParameter, ToolResult,
    ToolResultMetadata,
};
pub use view::{
    ArgumentError, Arguments, Bound, DeclaredType, Detached, InputPolicy, Operation,
    OperationError, Outcome, ParamSpec, ViewContext, ViewInterface, ViewModule, default_full_text,
    default_summary,
};
