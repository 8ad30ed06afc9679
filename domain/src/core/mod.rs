//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ConfigurationError`] - missing view, repository or type mappings
//! - [`string`] - naming helpers used when deriving tool names

pub mod error;
pub mod string;
