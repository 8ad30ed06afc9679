//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod invocation_logger;
pub mod store;
pub mod template;
pub mod tool_schema;
