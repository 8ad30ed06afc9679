//! Tooling parameters: how tools are synthesized and how their input is read.
//!
//! [`ToolingConfig`] groups the static parameters consumed by the tool
//! synthesizer, the transactional wrapper and the finder. These are
//! application-layer concerns, not domain policy.

use entity_tools_domain::view::InputPolicy;
use serde::{Deserialize, Serialize};

/// Tool synthesis and invocation parameters.
///
/// | Field | Used by |
/// |-------|---------|
/// | `input_policy` | argument parsing in every entity tool |
/// | `relation_tools` | synthesizer (nested relation tools) |
/// | `finder_prefix` | finder tool naming |
/// | `list_separator` | result conversion of view-backed collections |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolingConfig {
    /// How malformed tool input is handled.
    pub input_policy: InputPolicy,
    /// Whether relation fields produce nested-disclosure tools.
    pub relation_tools: bool,
    /// Prefix of finder tool names (`find_` + snake_case type name).
    pub finder_prefix: String,
    /// Separator between summaries when an operation returns several entities.
    pub list_separator: String,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            input_policy: InputPolicy::Strict,
            relation_tools: true,
            finder_prefix: "find_".to_string(),
            list_separator: "\n".to_string(),
        }
    }
}

impl ToolingConfig {
    // ==================== Builder Methods ====================

    pub fn with_input_policy(mut self, policy: InputPolicy) -> Self {
        self.input_policy = policy;
        self
    }

    pub fn with_relation_tools(mut self, enabled: bool) -> Self {
        self.relation_tools = enabled;
        self
    }

    pub fn with_finder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.finder_prefix = prefix.into();
        self
    }

    pub fn with_list_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }
}
