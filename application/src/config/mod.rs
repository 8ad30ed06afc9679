//! Application-level configuration.
//!
//! - [`ToolingConfig`] - tool synthesis, input policy and finder naming

pub mod tooling;

pub use tooling::ToolingConfig;
