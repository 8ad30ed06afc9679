//! Tool Synthesizer
//!
//! Turns the operations visible for an entity into agent-facing tools:
//!
//! - one [`TransactionalTool`] per operation, taken from the registered view
//!   or, when the type has no view, from the operations declared on the
//!   entity type itself
//! - one [`RelationTool`] per single-valued relation field whose target type
//!   exposes at least one operation
//!
//! Callers never need to know in advance which path applies.

use std::sync::Arc;

use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::entity::{Entity, FieldValue};
use entity_tools_domain::tool::{ToolDefinition, ToolParameter};
use entity_tools_domain::view::Operation;

use super::relation::RelationTool;
use super::runtime::ToolRuntime;
use super::tool::EntityTool;
use super::transactional::{InvocationContext, TransactionalTool};

pub struct ToolSynthesizer {
    runtime: Arc<ToolRuntime>,
}

impl ToolSynthesizer {
    pub fn new(runtime: Arc<ToolRuntime>) -> Self {
        Self { runtime }
    }

    /// Tools for `entity`, in declaration order: operations first, then
    /// relation tools.
    ///
    /// Only the entity's type and identifier are captured; each tool reloads
    /// the entity when called. Fails when a needed repository is missing.
    pub fn tools_for(
        &self,
        entity: &dyn Entity,
    ) -> Result<Vec<Arc<dyn EntityTool>>, ConfigurationError> {
        let registry = self.runtime.registry();
        let entity_type = entity.entity_type();
        let id = entity.id();

        let operations = registry.exposed_operations(entity_type);
        let relations: Vec<(&'static str, _)> = if self.runtime.config().relation_tools {
            entity
                .fields()
                .into_iter()
                .filter_map(|field| match field.value {
                    FieldValue::Relation { target, .. } if registry.exposes_operations(target) => {
                        Some((field.name, target))
                    }
                    _ => None,
                })
                .collect()
        } else {
            Vec::new()
        };

        if operations.is_empty() && relations.is_empty() {
            tracing::debug!(entity = %entity_type, "Entity exposes no tools");
            return Ok(Vec::new());
        }

        let repository = self.runtime.repositories().locate(entity_type)?;
        let via_view = registry.has_view_for(entity_type);
        let mut tools: Vec<Arc<dyn EntityTool>> =
            Vec::with_capacity(operations.len() + relations.len());

        for operation in operations {
            let definition = definition_for(&operation);
            let context = InvocationContext {
                entity_type,
                id: id.clone(),
                operation,
                repository: Arc::clone(&repository),
                via_view,
            };
            tools.push(Arc::new(TransactionalTool::new(
                Arc::clone(&self.runtime),
                context,
                definition,
            )));
        }

        for (field, target) in relations {
            let target_repository = self.runtime.repositories().locate(target)?;
            tools.push(Arc::new(RelationTool::new(
                Arc::clone(&self.runtime),
                id.clone(),
                Arc::clone(&repository),
                field,
                target_repository,
            )));
        }

        tracing::trace!(entity = %entity_type, id = %id, tools = tools.len(), "Synthesized tools");
        Ok(tools)
    }
}

/// Tool descriptor for one operation: the tool name, the description, and
/// parameters in declaration order, required unless marked optional
pub fn definition_for(operation: &Operation) -> ToolDefinition {
    operation.params().iter().fold(
        ToolDefinition::new(
            operation.tool_name(),
            operation.description(),
            operation.risk_level(),
        ),
        |definition, param| {
            definition.with_parameter(
                ToolParameter::new(&param.name, &param.description, !param.optional)
                    .with_type(param.param_type.clone()),
            )
        },
    )
}
