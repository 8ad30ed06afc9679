//! Progressive disclosure state shared by finders and relation tools
//!
//! ```text
//! Unresolved ──call ok──▶ Resolved { entity, summary, tools }
//!                             │
//!                             └─call ok──▶ Resolved (inner tools replaced)
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use entity_tools_domain::entity::EntityId;
use entity_tools_domain::tool::{ToolError, ToolResult};

use super::runtime::ToolRuntime;
use super::synthesizer::ToolSynthesizer;
use super::tool::{EntityTool, entity_label};
use crate::ports::store::{Repository, Transaction};

#[derive(Default)]
enum State {
    #[default]
    Unresolved,
    Resolved {
        entity: String,
        summary: String,
        tools: Vec<Arc<dyn EntityTool>>,
    },
}

/// Entity loaded by a disclosing call, with its synthesized tools
pub(crate) struct Disclosed {
    pub entity: String,
    pub summary: String,
    pub tools: Vec<Arc<dyn EntityTool>>,
}

/// Inner tool group of one disclosing tool
#[derive(Default)]
pub struct Disclosure {
    state: Mutex<State>,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the disclosed tools the current inner set, replacing any previous
    /// resolution. Returns the tools this resolution made available.
    pub(crate) fn resolve(&self, disclosed: Disclosed) -> Vec<Arc<dyn EntityTool>> {
        let Disclosed {
            entity,
            summary,
            tools,
        } = disclosed;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let State::Resolved { entity: previous, .. } = &*state {
            tracing::debug!(previous = %previous, current = %entity, "Replacing disclosed tools");
        }
        *state = State::Resolved {
            entity,
            summary,
            tools: tools.clone(),
        };
        tools
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            State::Resolved { .. }
        )
    }

    pub fn inner_tools(&self) -> Vec<Arc<dyn EntityTool>> {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Resolved { tools, .. } => tools.clone(),
            State::Unresolved => Vec::new(),
        }
    }

    pub fn summary(&self) -> Option<String> {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Resolved { summary, .. } => Some(summary.clone()),
            State::Unresolved => None,
        }
    }

    /// `Type#id` of the resolved entity
    pub fn entity(&self) -> Option<String> {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            State::Resolved { entity, .. } => Some(entity.clone()),
            State::Unresolved => None,
        }
    }

    /// Record `disclosed` once the call's unit of work has completed
    /// successfully, and hand its tools back to the caller
    pub(crate) fn settle(
        &self,
        result: &ToolResult,
        disclosed: Option<Disclosed>,
    ) -> Vec<Arc<dyn EntityTool>> {
        match disclosed {
            Some(disclosed) if result.is_success() => self.resolve(disclosed),
            _ => Vec::new(),
        }
    }
}

/// Load `id` and synthesize its tools inside `tx`. Returns the summary plus
/// the names of the newly available tools, and the tools themselves on
/// success.
pub(crate) async fn disclose(
    runtime: &Arc<ToolRuntime>,
    tx: &mut dyn Transaction,
    repository: &dyn Repository,
    id: &EntityId,
    tool_name: &str,
) -> (ToolResult, Option<Disclosed>) {
    let entity_type = repository.entity_type();
    let label = entity_label(entity_type, id);

    let entity = match repository.find_by_id(tx, id).await {
        Ok(Some(entity)) => entity,
        Ok(None) => return (ToolResult::failure(tool_name, ToolError::not_found(label)), None),
        Err(e) => {
            let message = format!("Could not load {}: {}", label, e);
            return (
                ToolResult::failure(tool_name, ToolError::execution_failed(message)),
                None,
            );
        }
    };

    let summary = runtime.factory().summarize(entity.as_ref());
    let tools = match ToolSynthesizer::new(Arc::clone(runtime)).tools_for(entity.as_ref()) {
        Ok(tools) => tools,
        Err(e) => return (ToolResult::failure(tool_name, e.into()), None),
    };
    let names: Vec<String> = tools.iter().map(|t| t.name().to_string()).collect();

    let listing = if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    };
    let output = format!("{}\nAvailable tools: {}", summary, listing);

    let result = ToolResult::success(tool_name, output)
        .with_entity(label.clone())
        .with_disclosed_tools(names);
    let disclosed = Disclosed {
        entity: label,
        summary,
        tools,
    };
    (result, Some(disclosed))
}
