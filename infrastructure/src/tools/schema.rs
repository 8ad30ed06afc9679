//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] that produces provider-neutral
//! JSON Schema for the entity tools an agent is handed.

use entity_tools_application::ports::tool_schema::ToolSchemaPort;
use entity_tools_domain::tool::{ParamType, ToolDefinition};

/// Default implementation producing provider-neutral JSON Schema.
///
/// Parameter types map through [`ParamType::json_type`]; arrays carry an
/// `items` schema for their element type.
pub struct JsonSchemaToolConverter;

fn type_schema(param_type: &ParamType) -> serde_json::Map<String, serde_json::Value> {
    let mut schema = serde_json::Map::new();
    schema.insert(
        "type".to_string(),
        serde_json::json!(param_type.json_type()),
    );
    if let ParamType::Array(item) = param_type {
        schema.insert(
            "items".to_string(),
            serde_json::Value::Object(type_schema(item)),
        );
    }
    schema
}

fn sorted_schemas<'a>(
    converter: &JsonSchemaToolConverter,
    tools: impl Iterator<Item = &'a ToolDefinition>,
) -> Vec<serde_json::Value> {
    let mut tools: Vec<&ToolDefinition> = tools.collect();
    tools.sort_by_key(|t| &t.name);
    tools.into_iter().map(|t| converter.tool_to_schema(t)).collect()
}

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let mut prop = type_schema(&param.param_type);
            prop.insert(
                "description".to_string(),
                serde_json::json!(param.description),
            );
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }

    fn tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        sorted_schemas(self, tools.iter())
    }

    fn read_only_tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        sorted_schemas(self, tools.iter().filter(|t| !t.is_high_risk()))
    }
}
