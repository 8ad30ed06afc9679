//! The agent-facing tool contract
//!
//! Every tool this crate produces (operation tools, relation tools, finders)
//! implements [`EntityTool`]: a [`ToolDefinition`] for the LLM plus
//! `call(raw_input)`, which never fails outright. Failures are reported as
//! `ToolResult::failure` so the agent can react to them conversationally.

use std::sync::Arc;

use async_trait::async_trait;
use entity_tools_domain::entity::{EntityId, EntityType};
use entity_tools_domain::tool::{ToolDefinition, ToolResult};
use serde_json::json;

use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger};

#[async_trait]
pub trait EntityTool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Invoke the tool with a JSON-shaped payload
    async fn call(&self, raw_input: &str) -> ToolResult;

    /// Invoke the tool and return the tools disclosed by this very call.
    ///
    /// Unlike reading [`inner_tools`](Self::inner_tools) afterwards, the
    /// returned set cannot be overwritten by a concurrent call on the same
    /// tool.
    async fn call_disclosing(&self, raw_input: &str) -> (ToolResult, Vec<Arc<dyn EntityTool>>) {
        (self.call(raw_input).await, Vec::new())
    }

    /// Whether the hosting tool set discards this tool after a successful call
    fn remove_on_invoke(&self) -> bool {
        false
    }

    /// Tools disclosed by the most recent successful call
    fn inner_tools(&self) -> Vec<Arc<dyn EntityTool>> {
        Vec::new()
    }

    /// `Type#id` of the entity this tool acts on, when bound to one
    fn entity(&self) -> Option<String> {
        None
    }
}

/// `Type#id`, as recorded in result metadata and audit records
pub fn entity_label(entity_type: EntityType, id: &EntityId) -> String {
    format!("{}#{}", entity_type, id)
}

/// Record one audit event for a finished call
pub(crate) fn audit(
    logger: &dyn InvocationLogger,
    entity_type: EntityType,
    id: Option<&EntityId>,
    result: &ToolResult,
) {
    logger.log(InvocationEvent::new(
        "tool_invocation",
        json!({
            "tool": result.tool_name,
            "entity": entity_type.name(),
            "id": id.map(EntityId::to_json),
            "success": result.success,
            "error_code": result.error.as_ref().map(|e| e.code.as_str()),
            "duration_ms": result.metadata.duration_ms,
            "disclosed_tools": result.metadata.disclosed_tools,
        }),
    ));
}

/// Log a finished call at debug, or at warn when it failed
pub(crate) fn trace_outcome(result: &ToolResult, entity: &str) {
    match &result.error {
        None => tracing::debug!(
            tool = %result.tool_name,
            entity = entity,
            duration_ms = result.metadata.duration_ms,
            "Entity tool succeeded"
        ),
        Some(error) => tracing::warn!(
            tool = %result.tool_name,
            entity = entity,
            code = %error.code,
            error = %error.message,
            "Entity tool failed"
        ),
    }
}
