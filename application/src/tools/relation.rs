//! Nested-disclosure tools for relation fields
//!
//! A parent entity's single-valued relation to a type that exposes
//! operations becomes one coarse tool named after the field. Calling it
//! reloads the parent, follows the relation by id, and discloses the related
//! entity's own tools as an inner group.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use entity_tools_domain::entity::{EntityId, EntityType};
use entity_tools_domain::tool::{RiskLevel, ToolDefinition, ToolError, ToolResult};
use entity_tools_domain::view::Arguments;

use super::disclosure::{Disclosed, Disclosure, disclose};
use super::runtime::ToolRuntime;
use super::tool::{EntityTool, audit, entity_label, trace_outcome};
use super::transactional::complete;
use crate::ports::store::{Repository, Transaction};

pub struct RelationTool {
    runtime: Arc<ToolRuntime>,
    parent_type: EntityType,
    parent_id: EntityId,
    parent_repository: Arc<dyn Repository>,
    field: &'static str,
    target_repository: Arc<dyn Repository>,
    definition: ToolDefinition,
    disclosure: Disclosure,
}

impl RelationTool {
    pub fn new(
        runtime: Arc<ToolRuntime>,
        parent_id: EntityId,
        parent_repository: Arc<dyn Repository>,
        field: &'static str,
        target_repository: Arc<dyn Repository>,
    ) -> Self {
        let parent_type = parent_repository.entity_type();
        let target_type = target_repository.entity_type();
        let definition = ToolDefinition::new(
            field,
            format!(
                "Open the {} ({}) linked from this {} and reveal the tools available for it",
                field, target_type, parent_type
            ),
            RiskLevel::Low,
        );
        Self {
            runtime,
            parent_type,
            parent_id,
            parent_repository,
            field,
            target_repository,
            definition,
            disclosure: Disclosure::new(),
        }
    }

    pub fn field(&self) -> &str {
        self.field
    }

    pub fn target_type(&self) -> EntityType {
        self.target_repository.entity_type()
    }

    pub fn is_resolved(&self) -> bool {
        self.disclosure.is_resolved()
    }

    async fn run(
        &self,
        tx: &mut dyn Transaction,
        raw_input: &str,
    ) -> (ToolResult, Option<Disclosed>) {
        let name = self.definition.name.as_str();
        let label = entity_label(self.parent_type, &self.parent_id);

        if let Err(e) = Arguments::parse(raw_input, &[], self.runtime.config().input_policy) {
            let error = ToolError::invalid_argument(e.to_string());
            return (ToolResult::failure(name, error), None);
        }

        let parent = match self.parent_repository.find_by_id(tx, &self.parent_id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => return (ToolResult::failure(name, ToolError::not_found(label)), None),
            Err(e) => {
                let error = ToolError::execution_failed(format!("Could not load {}: {}", label, e));
                return (ToolResult::failure(name, error), None);
            }
        };

        let target_id = parent
            .field(self.field)
            .and_then(|field| field.value.relation_id().cloned());
        let Some(target_id) = target_id else {
            let missing = format!("{} linked from {}", self.target_type(), label);
            return (ToolResult::failure(name, ToolError::not_found(missing)), None);
        };

        disclose(
            &self.runtime,
            tx,
            self.target_repository.as_ref(),
            &target_id,
            name,
        )
        .await
    }
}

#[async_trait]
impl EntityTool for RelationTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, raw_input: &str) -> ToolResult {
        self.call_disclosing(raw_input).await.0
    }

    async fn call_disclosing(&self, raw_input: &str) -> (ToolResult, Vec<Arc<dyn EntityTool>>) {
        let started = Instant::now();
        let label = entity_label(self.parent_type, &self.parent_id);
        tracing::debug!(tool = %self.definition.name, entity = %label, "Following relation");

        let (result, tools) = match self.runtime.transactions().begin().await {
            Ok(mut tx) => {
                let (result, disclosed) = self.run(tx.as_mut(), raw_input).await;
                let result = complete(tx, result).await;
                let tools = self.disclosure.settle(&result, disclosed);
                (result, tools)
            }
            Err(e) => {
                let message = format!("Could not open a transaction: {}", e);
                let error = ToolError::execution_failed(message);
                (ToolResult::failure(&self.definition.name, error), Vec::new())
            }
        };

        let result = result.with_duration(started.elapsed().as_millis() as u64);
        trace_outcome(&result, &label);
        audit(
            self.runtime.logger(),
            self.parent_type,
            Some(&self.parent_id),
            &result,
        );
        (result, tools)
    }

    fn inner_tools(&self) -> Vec<Arc<dyn EntityTool>> {
        self.disclosure.inner_tools()
    }

    fn entity(&self) -> Option<String> {
        Some(entity_label(self.parent_type, &self.parent_id))
    }
}
