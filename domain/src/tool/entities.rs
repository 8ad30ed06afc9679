//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Risk level of a tool operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk - read-only operations; the entity is not written back
    Low,
    /// High risk - operations that modify the entity (e.g., checkIn)
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::High => "high",
        }
    }

    /// Whether invoking the operation may change persisted state
    pub fn is_mutating(&self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic type of a tool parameter, as presented to the LLM
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "items")]
pub enum ParamType {
    Text,
    Integer,
    Number,
    Boolean,
    Array(Box<ParamType>),
    /// Catch-all for structured values
    Object,
}

impl ParamType {
    pub fn array_of(item: ParamType) -> Self {
        ParamType::Array(Box::new(item))
    }

    /// JSON Schema `type` keyword for this parameter type
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::Text => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array(_) => "array",
            ParamType::Object => "object",
        }
    }

    /// Whether a JSON value is acceptable for this type without coercion
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;

        match (self, value) {
            (ParamType::Text, Value::String(_)) => true,
            (ParamType::Integer, Value::Number(n)) => n.is_i64(),
            (ParamType::Number, Value::Number(_)) => true,
            (ParamType::Boolean, Value::Bool(_)) => true,
            (ParamType::Array(item), Value::Array(values)) => {
                values.iter().all(|v| item.accepts(v))
            }
            (ParamType::Object, _) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::Array(item) => write!(f, "array<{}>", item),
            other => f.write_str(other.json_type()),
        }
    }
}

/// Definition of a tool that can be used by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "checkIn")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Risk level of this tool
    pub risk_level: RiskLevel,
    /// Parameter specifications, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Semantic parameter type
    pub param_type: ParamType,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk_level,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level.is_mutating()
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParamType::Text,
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }
}

/// A call to a tool with arguments, as issued by the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments passed to the tool
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Render the arguments as the raw JSON payload tools receive
    pub fn raw_input(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_level() {
        assert!(!RiskLevel::Low.is_mutating());
        assert!(RiskLevel::High.is_mutating());
        assert_eq!(RiskLevel::High.to_string(), "high");
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("extendStay", "Extend the stay", RiskLevel::High)
            .with_parameter(
                ToolParameter::new("nights", "Extra nights", true).with_type(ParamType::Integer),
            )
            .with_parameter(ToolParameter::new("note", "Front desk note", false));

        assert_eq!(tool.name, "extendStay");
        assert!(tool.is_high_risk());
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.required_parameters().count(), 1);
        assert_eq!(tool.parameters[1].param_type, ParamType::Text);
    }

    #[test]
    fn test_param_type_accepts() {
        assert!(ParamType::Integer.accepts(&json!(3)));
        assert!(!ParamType::Integer.accepts(&json!(3.5)));
        assert!(!ParamType::Integer.accepts(&json!(u64::MAX)));
        assert!(ParamType::Number.accepts(&json!(3.5)));
        assert!(ParamType::array_of(ParamType::Text).accepts(&json!(["a", "b"])));
        assert!(!ParamType::array_of(ParamType::Text).accepts(&json!(["a", 1])));
        assert!(ParamType::Object.accepts(&json!({"any": "thing"})));
        assert_eq!(ParamType::array_of(ParamType::Integer).to_string(), "array<integer>");
    }

    #[test]
    fn test_tool_call_raw_input() {
        let call = ToolCall::new("extendStay").with_arg("nights", 2);

        assert_eq!(call.tool_name, "extendStay");
        let raw: serde_json::Value = serde_json::from_str(&call.raw_input()).unwrap();
        assert_eq!(raw, json!({"nights": 2}));
        assert!(call.get_string("nights").is_none());
    }
}
