//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; enum-like values are kept as strings and
//! parsed (with reported issues) when converted to application types.
//!
//! ```toml
//! [views]
//! base_paths = ["hotel"]
//!
//! [templates]
//! dir = "templates"
//! extension = "txt"
//!
//! [tools]
//! input_policy = "strict"
//! relation_tools = true
//! finder_prefix = "find_"
//!
//! [logging]
//! invocation_log = "logs/invocations.jsonl"
//! ```

use std::fmt;
use std::path::PathBuf;

use entity_tools_application::config::ToolingConfig;
use entity_tools_domain::view::InputPolicy;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// View module scanning
    pub views: FileViewsConfig,
    /// Summary / full-text templates
    pub templates: FileTemplatesConfig,
    /// Tool synthesis and input handling
    pub tools: FileToolsConfig,
    /// Invocation audit log
    pub logging: FileLoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileViewsConfig {
    /// Module paths to scan for marked view interfaces; empty scans everything
    pub base_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTemplatesConfig {
    /// Directory of `<TypeName>_short` / `<TypeName>_long` templates
    pub dir: Option<PathBuf>,
    /// Template file extension
    pub extension: String,
}

impl Default for FileTemplatesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: "txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// "strict" or "lenient"
    pub input_policy: String,
    pub relation_tools: bool,
    pub finder_prefix: String,
    pub list_separator: String,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        let defaults = ToolingConfig::default();
        Self {
            input_policy: "strict".to_string(),
            relation_tools: defaults.relation_tools,
            finder_prefix: defaults.finder_prefix,
            list_separator: defaults.list_separator,
        }
    }
}

impl FileToolsConfig {
    /// Convert to [`ToolingConfig`], reporting values that had to be replaced
    pub fn to_tooling_config(&self) -> (ToolingConfig, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let input_policy = match self.input_policy.parse::<InputPolicy>() {
            Ok(policy) => policy,
            Err(_) => {
                issues.push(ConfigIssue::warning(
                    "tools.input_policy",
                    format!(
                        "unknown value '{}' (expected strict or lenient), falling back to 'strict'",
                        self.input_policy
                    ),
                ));
                InputPolicy::Strict
            }
        };

        let mut finder_prefix = self.finder_prefix.clone();
        if !finder_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            issues.push(ConfigIssue::error(
                "tools.finder_prefix",
                format!(
                    "'{}' contains characters not allowed in tool names, falling back to 'find_'",
                    self.finder_prefix
                ),
            ));
            finder_prefix = "find_".to_string();
        }

        let config = ToolingConfig::default()
            .with_input_policy(input_policy)
            .with_relation_tools(self.relation_tools)
            .with_finder_prefix(finder_prefix)
            .with_list_separator(self.list_separator.clone());
        (config, issues)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one record per tool invocation
    pub invocation_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found while validating configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.tools.to_tooling_config().1;

        if let Some(dir) = &self.templates.dir
            && !dir.is_dir()
        {
            issues.push(ConfigIssue::warning(
                "templates.dir",
                format!("{} is not a directory, templates are disabled", dir.display()),
            ));
        }

        for base in &self.views.base_paths {
            if base.trim().is_empty() {
                issues.push(ConfigIssue::warning(
                    "views.base_paths",
                    "empty base path matches every module",
                ));
            }
        }

        issues
    }
}
