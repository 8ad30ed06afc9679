//! Configuration file loading for entity-tools
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ENTITY_TOOLS_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./entity-tools.toml` or `./.entity-tools.toml`
//! 4. Global: `<config_dir>/entity-tools/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileConfig, FileLoggingConfig, FileTemplatesConfig, FileToolsConfig,
    FileViewsConfig, Severity,
};
pub use loader::ConfigLoader;
