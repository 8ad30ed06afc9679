//! Conversion of operation outcomes into tool results

use entity_tools_domain::entity::Entity;
use entity_tools_domain::tool::ToolResult;
use entity_tools_domain::view::Outcome;
use serde_json::Value;

use crate::views::ViewFactory;

/// Convert a successful operation outcome.
///
/// | Outcome | Result text |
/// |---------|-------------|
/// | `Empty` | empty |
/// | `Text` | verbatim |
/// | `Result` | passed through unchanged |
/// | `Entity` with a view | view summary |
/// | `Entities`, all with views | summaries joined by `separator` |
/// | anything else | JSON text |
pub fn convert_outcome(
    tool_name: &str,
    outcome: Outcome,
    factory: &ViewFactory,
    separator: &str,
) -> ToolResult {
    let text = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Text(text) => text,
        Outcome::Result(result) => return result,
        Outcome::Entity(entity) => match summary_if_viewed(factory, entity.as_ref()) {
            Some(summary) => summary,
            None => entity.to_json().to_string(),
        },
        Outcome::Entities(entities) => {
            let summaries: Option<Vec<String>> = entities
                .iter()
                .map(|e| summary_if_viewed(factory, e.as_ref()))
                .collect();
            match summaries {
                Some(summaries) => summaries.join(separator),
                None => Value::Array(
                    entities
                        .iter()
                        .map(|e| match summary_if_viewed(factory, e.as_ref()) {
                            Some(summary) => Value::String(summary),
                            None => e.to_json(),
                        })
                        .collect(),
                )
                .to_string(),
            }
        }
        Outcome::Value(Value::Null) => String::new(),
        Outcome::Value(Value::String(text)) => text,
        Outcome::Value(value) => value.to_string(),
    };
    ToolResult::success(tool_name, text)
}

fn summary_if_viewed(factory: &ViewFactory, entity: &dyn Entity) -> Option<String> {
    factory.display(entity).ok().map(|view| view.summary())
}
