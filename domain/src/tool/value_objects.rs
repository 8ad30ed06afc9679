//! Tool domain value objects - immutable result and error types
//!
//! These types form the **output side** of every entity tool call. A call
//! never raises to the agent layer: configuration, not-found, input and
//! invocation failures all come back as a failed [`ToolResult`] carrying a
//! [`ToolError`] the agent can react to conversationally.

use serde::{Deserialize, Serialize};

/// Error that occurred during tool execution.
///
/// | Code | Retryable? | Description |
/// |------|-----------|-------------|
/// | `INVALID_ARGUMENT` | Yes | Malformed payload or wrong parameter types |
/// | `NOT_FOUND` | Yes | Entity missing on reload, unknown tool, empty relation |
/// | `EXECUTION_FAILED` | No | The operation failed, or the store did |
/// | `CONFIGURATION` | No | Missing view or repository mapping |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub const INVALID_ARGUMENT: &'static str = "INVALID_ARGUMENT";
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const EXECUTION_FAILED: &'static str = "EXECUTION_FAILED";
    pub const CONFIGURATION: &'static str = "CONFIGURATION";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            Self::NOT_FOUND,
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_ARGUMENT, message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(Self::EXECUTION_FAILED, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(Self::CONFIGURATION, message)
    }

    /// Whether the agent can reasonably retry with corrected input
    pub fn is_retryable(&self) -> bool {
        matches!(self.code.as_str(), Self::INVALID_ARGUMENT | Self::NOT_FOUND)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

impl From<crate::core::error::ConfigurationError> for ToolError {
    fn from(error: crate::core::error::ConfigurationError) -> Self {
        ToolError::configuration(error.to_string())
    }
}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Metadata about the execution
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about tool execution.
///
/// | Tool | `duration_ms` | `entity` | `disclosed_tools` |
/// |------|:---:|:---:|:---:|
/// | operation tool | yes | yes | - |
/// | relation tool | yes | yes | yes |
/// | finder tool | yes | yes | yes |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// The entity the call acted on, as `Type#id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Names of tools made available by this call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disclosed_tools: Vec<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Add duration metadata
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    /// Add entity metadata
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.metadata.entity = Some(entity.into());
        self
    }

    /// Record the tools this call disclosed
    pub fn with_disclosed_tools(mut self, names: Vec<String>) -> Self {
        self.metadata.disclosed_tools = names;
        self
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the output content
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Get the error
    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Output on success, `[CODE] message` on failure
    pub fn text(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) => output.clone(),
            (None, Some(error)) => error.to_string(),
            (None, None) => String::new(),
        }
    }
}
