//! Tool schema conversion port.
//!
//! Separates "which tools an entity exposes" (application) from "how to
//! serialize them for an LLM API" (infrastructure).

use entity_tools_domain::tool::ToolDefinition;

/// Port for converting tool definitions to provider-neutral JSON Schema.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert all tools (sorted by name).
    fn tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value>;

    /// Convert read-only tools only (sorted by name).
    fn read_only_tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value>;
}
