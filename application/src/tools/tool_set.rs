//! Tool Set
//!
//! The [`ToolSet`] holds the tools currently offered to the agent, routes
//! calls by name, and applies the progressive-disclosure protocol after each
//! successful call:
//!
//! 1. tools disclosed by the call are added (replacing same-named ones)
//! 2. a `remove_on_invoke` tool (a finder) is removed
//!
//! Disclosed tools are taken from the call itself, so several sets may share
//! one finder and call it concurrently. A replacement that swaps a tool bound
//! to one entity for a tool bound to another is logged at `warn`.
//!
//! # Usage
//!
//! ```ignore
//! let mut tools = ToolSet::new().with_tool(Arc::new(runtime.finder(reservation)?));
//!
//! tools.call("find_reservation", r#"{"id": "R-42"}"#).await;
//! assert!(tools.contains("checkIn"));
//! assert!(!tools.contains("find_reservation"));
//! ```

use std::sync::Arc;

use entity_tools_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolResult};

use super::tool::EntityTool;

/// Ordered, name-unique set of offered tools
#[derive(Default, Clone)]
pub struct ToolSet {
    tools: Vec<Arc<dyn EntityTool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn EntityTool>) -> Self {
        self.add(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn EntityTool>>) -> Self {
        for tool in tools {
            self.add(tool);
        }
        self
    }

    /// Add a tool, replacing any tool with the same name in place.
    ///
    /// Returns the replaced tool.
    pub fn add(&mut self, tool: Arc<dyn EntityTool>) -> Option<Arc<dyn EntityTool>> {
        let Some(index) = self.tools.iter().position(|t| t.name() == tool.name()) else {
            self.tools.push(tool);
            return None;
        };
        let (previous, current) = (self.tools[index].entity(), tool.entity());
        if previous != current {
            tracing::warn!(
                tool = tool.name(),
                previous = previous.as_deref().unwrap_or("-"),
                current = current.as_deref().unwrap_or("-"),
                "Tool replaced by a same-named tool of another entity"
            );
        }
        Some(std::mem::replace(&mut self.tools[index], tool))
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn EntityTool>> {
        let index = self.tools.iter().position(|t| t.name() == name)?;
        Some(self.tools.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn EntityTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call tool `name` and apply disclosure to the set
    pub async fn call(&mut self, name: &str, raw_input: &str) -> ToolResult {
        let Some(tool) = self.get(name).cloned() else {
            return ToolResult::failure(name, ToolError::not_found(format!("tool '{}'", name)));
        };

        let (result, disclosed) = tool.call_disclosing(raw_input).await;
        if !result.is_success() {
            return result;
        }

        if !disclosed.is_empty() {
            tracing::debug!(tool = name, disclosed = disclosed.len(), "Disclosing inner tools");
        }
        for inner in disclosed {
            self.add(inner);
        }
        if tool.remove_on_invoke() {
            tracing::debug!(tool = name, "Discarding single-shot tool");
            self.remove(name);
        }
        result
    }

    /// Route a [`ToolCall`] by its tool name
    pub async fn execute(&mut self, call: &ToolCall) -> ToolResult {
        self.call(&call.tool_name, &call.raw_input()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        Customer, FakeTransactions, Reservation, hotel_locator, hotel_registry, seeded_store,
    };
    use crate::tools::runtime::ToolRuntime;
    use entity_tools_domain::entity::EntityType;

    fn runtime() -> (Arc<crate::test_support::FakeStore>, Arc<ToolRuntime>) {
        let store = seeded_store();
        let runtime = ToolRuntime::new(
            hotel_registry(),
            hotel_locator(&store),
            Arc::new(FakeTransactions(Arc::clone(&store))),
        )
        .into_shared();
        (store, runtime)
    }

    #[tokio::test]
    async fn test_finder_is_discarded_after_success() {
        let (store, runtime) = runtime();
        let finder = runtime.finder(EntityType::of::<Reservation>()).unwrap();
        let mut tools = ToolSet::new().with_tool(Arc::new(finder));

        let result = tools.call("find_reservation", "R-42").await;
        assert!(result.is_success());
        assert!(!tools.contains("find_reservation"));
        assert_eq!(
            tools.names(),
            vec!["checkIn", "extendStay", "guestName", "cancel", "room"]
        );

        let checked = tools.execute(&ToolCall::new("checkIn")).await;
        assert!(checked.output().unwrap().contains("R-42"));
        assert!(store.get::<Reservation>("R-42").unwrap().checked_in);
    }

    #[tokio::test]
    async fn test_failed_finder_stays_offered() {
        let (_store, runtime) = runtime();
        let finder = runtime.finder(EntityType::of::<Customer>()).unwrap();
        let mut tools = ToolSet::new().with_tool(Arc::new(finder));

        let result = tools.call("find_customer", r#"{"id": 404}"#).await;
        assert!(!result.is_success());
        assert_eq!(tools.names(), vec!["find_customer"]);
    }

    #[tokio::test]
    async fn test_nested_relation_discloses_without_removal() {
        let (store, runtime) = runtime();
        let reservation = store.get::<Reservation>("R-42").unwrap();
        let mut tools = ToolSet::new().with_tools(runtime.tools_for(&reservation).unwrap());

        let result = tools.call("room", "").await;
        assert!(result.is_success(), "{}", result.text());
        assert!(result.output().unwrap().starts_with("Room (id=101)"));
        assert!(tools.contains("room"));
        assert!(tools.contains("markClean"));

        tools.call("markClean", "").await;
        assert!(store.get::<crate::test_support::Room>(101).unwrap().clean);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let mut tools = ToolSet::new();
        let result = tools.call("nope", "").await;
        assert_eq!(result.error().unwrap().code, ToolError::NOT_FOUND);
    }

    #[test]
    fn test_cross_entity_replacement_returns_previous_tool() {
        let (store, runtime) = runtime();
        store.insert(Reservation::new("R-43", "Grace"));
        let first = store.get::<Reservation>("R-42").unwrap();
        let second = store.get::<Reservation>("R-43").unwrap();

        let mut tools = ToolSet::new().with_tools(runtime.tools_for(&first).unwrap());
        let mut replaced = Vec::new();
        for tool in runtime.tools_for(&second).unwrap() {
            replaced.extend(tool.entity().zip(tools.add(tool)));
        }

        assert_eq!(replaced.len(), 5);
        for (current, previous) in replaced {
            assert_eq!(current, "Reservation#R-43");
            assert_eq!(previous.entity().as_deref(), Some("Reservation#R-42"));
        }
        assert_eq!(tools.len(), 5);
        let check_in = tools.get("checkIn").unwrap();
        assert_eq!(check_in.entity().as_deref(), Some("Reservation#R-43"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sets_sharing_a_finder_disclose_their_own_entity() {
        let (store, runtime) = runtime();
        store.insert(Reservation::new("R-43", "Grace"));
        let finder: Arc<dyn EntityTool> =
            Arc::new(runtime.finder(EntityType::of::<Reservation>()).unwrap());
        let shared = ToolSet::new().with_tool(finder);

        for _ in 0..25 {
            let calls = ["R-42", "R-43"].map(|code| {
                let mut tools = shared.clone();
                tokio::spawn(async move {
                    let result = tools.call("find_reservation", code).await;
                    (code, result, tools)
                })
            });
            for call in calls {
                let (code, result, tools) = call.await.unwrap();
                assert!(result.is_success(), "{}", result.text());
                let label = format!("Reservation#{}", code);
                assert_eq!(result.metadata.entity.as_deref(), Some(label.as_str()));
                let check_in = tools.get("checkIn").unwrap();
                assert_eq!(check_in.entity(), Some(label));
            }
        }
    }

    #[test]
    fn test_add_replaces_same_name_in_place() {
        let (store, runtime) = runtime();
        let reservation = store.get::<Reservation>("R-42").unwrap();
        let first = runtime.tools_for(&reservation).unwrap();
        let second = runtime.tools_for(&reservation).unwrap();

        let mut tools = ToolSet::new().with_tools(first);
        let before = tools.names().into_iter().map(String::from).collect::<Vec<_>>();
        for tool in second {
            tools.add(tool);
        }
        assert_eq!(tools.names(), before);
        assert_eq!(tools.definitions().len(), 5);
    }
}
