//! Tool domain module
//!
//! Tool descriptors are what the conversational layer hands to the LLM: a
//! name, a description, and an ordered, typed parameter list. Every tool
//! invocation returns a [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ToolDefinition│───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (synthesized)│    │ (invocation) │    │ (output)     │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Risk-Based Persistence
//!
//! Each tool carries a [`RiskLevel`](entities::RiskLevel):
//!
//! | Risk | Examples | Entity written back on commit |
//! |------|----------|-------------------------------|
//! | **Low** | finders, relation tools, `getStatus` | No |
//! | **High** | `checkIn`, `extendStay` | Yes |
//!
//! # Key Types
//!
//! - [`ToolDefinition`] - Schema for a single tool (name, params, risk level)
//! - [`ParamType`](entities::ParamType) - Semantic parameter type
//! - [`ToolCall`] - An invocation request with arguments
//! - [`ToolResult`] - Execution outcome with structured [`ToolResultMetadata`](value_objects::ToolResultMetadata)

pub mod entities;
pub mod value_objects;

pub use entities::{ParamType, RiskLevel, ToolCall, ToolDefinition, ToolParameter};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
