//! Transactional Invocation Wrapper
//!
//! A [`TransactionalTool`] carries only an [`InvocationContext`]: the entity
//! type, the identifier captured when the tool was synthesized, and the
//! operation to run. Every call runs in its own unit of work:
//!
//! ```text
//! begin ─▶ find_by_id ─▶ view ─▶ parse args ─▶ invoke ─▶ save? ─▶ convert
//!   │          │ None                │ Err         │ Err
//!   │          ▼                     ▼             ▼
//!   │       NOT_FOUND          INVALID_ARGUMENT  EXECUTION_FAILED
//!   ▼
//! commit on success, rollback otherwise
//! ```
//!
//! The instance the tool was created from is never reused; it may be stale
//! by the time the agent calls back.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use entity_tools_domain::entity::{EntityId, EntityType};
use entity_tools_domain::tool::{ToolDefinition, ToolError, ToolResult};
use entity_tools_domain::view::{Arguments, Operation};

use super::conversion::convert_outcome;
use super::runtime::ToolRuntime;
use super::tool::{EntityTool, audit, entity_label, trace_outcome};
use crate::ports::store::{Repository, Transaction};

/// Per-tool invocation state, captured once at synthesis time
#[derive(Clone)]
pub struct InvocationContext {
    pub entity_type: EntityType,
    pub id: EntityId,
    pub operation: Operation,
    pub repository: Arc<dyn Repository>,
    /// Dispatch through the registered view rather than the bare entity
    pub via_view: bool,
}

impl InvocationContext {
    pub fn label(&self) -> String {
        entity_label(self.entity_type, &self.id)
    }
}

/// Operation tool that reloads its entity inside a fresh transaction per call
pub struct TransactionalTool {
    runtime: Arc<ToolRuntime>,
    context: InvocationContext,
    definition: ToolDefinition,
}

impl TransactionalTool {
    pub fn new(
        runtime: Arc<ToolRuntime>,
        context: InvocationContext,
        definition: ToolDefinition,
    ) -> Self {
        Self {
            runtime,
            context,
            definition,
        }
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    fn parse_arguments(&self, raw_input: &str) -> Result<Arguments, ToolResult> {
        Arguments::parse(
            raw_input,
            self.context.operation.params(),
            self.runtime.config().input_policy,
        )
        .map_err(|e| {
            ToolResult::failure(&self.definition.name, ToolError::invalid_argument(e.to_string()))
        })
    }

    async fn run(&self, tx: &mut dyn Transaction, raw_input: &str) -> ToolResult {
        let name = self.definition.name.as_str();
        let ctx = &self.context;

        let mut entity = match ctx.repository.find_by_id(tx, &ctx.id).await {
            Ok(Some(entity)) => entity,
            Ok(None) => return ToolResult::failure(name, ToolError::not_found(ctx.label())),
            Err(e) => {
                return ToolResult::failure(
                    name,
                    ToolError::execution_failed(format!("Could not load {}: {}", ctx.label(), e)),
                );
            }
        };

        let invoked = if ctx.via_view {
            let mut view = match self.runtime.factory().view_of(entity.as_mut()) {
                Ok(view) => view,
                Err(e) => return ToolResult::failure(name, e.into()),
            };
            let args = match self.parse_arguments(raw_input) {
                Ok(args) => args,
                Err(failure) => return failure,
            };
            view.invoke(&ctx.operation, &args)
        } else {
            let args = match self.parse_arguments(raw_input) {
                Ok(args) => args,
                Err(failure) => return failure,
            };
            ctx.operation.invoke(entity.as_mut(), &args)
        };

        let outcome = match invoked {
            Ok(outcome) => outcome,
            Err(e) => {
                let mut error = ToolError::execution_failed(e.root_cause_message());
                if e.message() != error.message {
                    error = error.with_details(e.message());
                }
                return ToolResult::failure(name, error);
            }
        };

        if ctx.operation.risk_level().is_mutating()
            && let Err(e) = ctx.repository.save(tx, entity.as_ref()).await
        {
            return ToolResult::failure(
                name,
                ToolError::execution_failed(format!("Could not save {}: {}", ctx.label(), e)),
            );
        }

        convert_outcome(
            name,
            outcome,
            self.runtime.factory(),
            &self.runtime.config().list_separator,
        )
    }
}

#[async_trait]
impl EntityTool for TransactionalTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, raw_input: &str) -> ToolResult {
        let started = Instant::now();
        let label = self.context.label();
        tracing::debug!(tool = %self.definition.name, entity = %label, "Invoking entity tool");

        let result = match self.runtime.transactions().begin().await {
            Ok(mut tx) => {
                let result = self.run(tx.as_mut(), raw_input).await;
                complete(tx, result).await
            }
            Err(e) => ToolResult::failure(
                &self.definition.name,
                ToolError::execution_failed(format!("Could not open a transaction: {}", e)),
            ),
        };

        let result = result
            .with_duration(started.elapsed().as_millis() as u64)
            .with_entity(label.as_str());
        trace_outcome(&result, &label);
        audit(
            self.runtime.logger(),
            self.context.entity_type,
            Some(&self.context.id),
            &result,
        );
        result
    }

    fn entity(&self) -> Option<String> {
        Some(self.context.label())
    }
}

/// Commit a successful result, roll back a failed one.
///
/// A failed commit turns the result into `EXECUTION_FAILED`; a failed
/// rollback is logged and the original failure is returned.
pub(crate) async fn complete(tx: Box<dyn Transaction>, result: ToolResult) -> ToolResult {
    if result.is_success() {
        match tx.commit().await {
            Ok(()) => result,
            Err(e) => {
                let message = format!("Commit failed, changes were not saved: {}", e);
                ToolResult::failure(result.tool_name, ToolError::execution_failed(message))
            }
        }
    } else {
        if let Err(e) = tx.rollback().await {
            tracing::warn!(tool = %result.tool_name, error = %e, "Rollback failed");
        }
        result
    }
}
