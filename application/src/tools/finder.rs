//! Finder / nested-disclosure tool
//!
//! A finder is the coarse entry point for one entity type: the agent passes
//! an identifier, the finder loads the entity, and its full tool set becomes
//! the finder's inner group. Finders are single-shot (`remove_on_invoke`):
//! a hosting [`ToolSet`](super::tool_set::ToolSet) discards one after its
//! first successful resolution, and the conversational layer offers a fresh
//! finder when another lookup is needed.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::core::string::to_snake_case;
use entity_tools_domain::entity::{EntityId, EntityType, IdentifierKind};
use entity_tools_domain::tool::{
    ParamType, RiskLevel, ToolDefinition, ToolError, ToolParameter, ToolResult,
};
use serde_json::Value;

use super::disclosure::{Disclosure, disclose};
use super::runtime::ToolRuntime;
use super::tool::{EntityTool, audit, trace_outcome};
use super::transactional::complete;
use crate::ports::store::Repository;

pub struct FinderTool {
    runtime: Arc<ToolRuntime>,
    entity_type: EntityType,
    repository: Arc<dyn Repository>,
    definition: ToolDefinition,
    disclosure: Disclosure,
}

impl FinderTool {
    /// Build a finder for `entity_type`.
    ///
    /// Fails immediately when no repository serves the type.
    pub fn new(
        runtime: Arc<ToolRuntime>,
        entity_type: EntityType,
    ) -> Result<Self, ConfigurationError> {
        let repository = runtime.repositories().locate(entity_type)?;
        let kind = repository.identifier_kind();

        let name = format!(
            "{}{}",
            runtime.config().finder_prefix,
            to_snake_case(entity_type.name())
        );
        let mut description = format!(
            "Look up a {} by id and reveal the tools available for it",
            entity_type
        );
        if let Some(descriptor) = runtime.registry().descriptor(entity_type) {
            description = format!("{}. {}", description, descriptor.description);
        }
        let id_type = match kind {
            IdentifierKind::Integer => ParamType::Integer,
            IdentifierKind::Text | IdentifierKind::Uuid => ParamType::Text,
        };
        let id_description = format!("{} identifier ({})", entity_type, kind.as_str());
        let definition = ToolDefinition::new(name, description, RiskLevel::Low)
            .with_parameter(ToolParameter::new("id", id_description, true).with_type(id_type));

        Ok(Self {
            runtime,
            entity_type,
            repository,
            definition,
            disclosure: Disclosure::new(),
        })
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn is_resolved(&self) -> bool {
        self.disclosure.is_resolved()
    }

    /// Summary of the most recently resolved entity
    pub fn summary(&self) -> Option<String> {
        self.disclosure.summary()
    }

    async fn resolve(&self, id: &EntityId) -> (ToolResult, Vec<Arc<dyn EntityTool>>) {
        let name = self.definition.name.as_str();
        match self.runtime.transactions().begin().await {
            Ok(mut tx) => {
                let (result, disclosed) =
                    disclose(&self.runtime, tx.as_mut(), self.repository.as_ref(), id, name)
                        .await;
                let result = complete(tx, result).await;
                let tools = self.disclosure.settle(&result, disclosed);
                (result, tools)
            }
            Err(e) => {
                let message = format!("Could not open a transaction: {}", e);
                let result = ToolResult::failure(name, ToolError::execution_failed(message));
                (result, Vec::new())
            }
        }
    }
}

#[async_trait]
impl EntityTool for FinderTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, raw_input: &str) -> ToolResult {
        self.call_disclosing(raw_input).await.0
    }

    async fn call_disclosing(&self, raw_input: &str) -> (ToolResult, Vec<Arc<dyn EntityTool>>) {
        let started = Instant::now();
        let kind = self.repository.identifier_kind();

        let (id, result, tools) = match parse_identifier(raw_input, kind) {
            Ok(id) => {
                tracing::debug!(tool = %self.definition.name, id = %id, "Resolving finder");
                let (result, tools) = self.resolve(&id).await;
                (Some(id), result, tools)
            }
            Err(message) => {
                let error = ToolError::invalid_argument(message);
                (None, ToolResult::failure(&self.definition.name, error), Vec::new())
            }
        };

        let result = result.with_duration(started.elapsed().as_millis() as u64);
        trace_outcome(&result, self.entity_type.name());
        audit(self.runtime.logger(), self.entity_type, id.as_ref(), &result);
        (result, tools)
    }

    fn remove_on_invoke(&self) -> bool {
        true
    }

    fn inner_tools(&self) -> Vec<Arc<dyn EntityTool>> {
        self.disclosure.inner_tools()
    }
}

/// Read an identifier from finder input.
///
/// Accepts `{"id": ...}`, a bare JSON value (`42`, `"R-42"`), or raw text
/// (`R-42`), and coerces it to the repository's identifier kind.
pub fn parse_identifier(raw_input: &str, kind: IdentifierKind) -> Result<EntityId, String> {
    let trimmed = raw_input.trim();
    if trimmed.is_empty() {
        return Err("An 'id' is required".to_string());
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(mut map)) => map
            .remove("id")
            .ok_or_else(|| "An 'id' is required".to_string())?,
        Ok(value) => value,
        Err(_) => Value::String(trimmed.to_string()),
    };
    kind.coerce(&value)
}
