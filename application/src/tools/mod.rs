//! Entity tools: synthesis, transactional invocation and progressive disclosure
//!
//! ```text
//! ToolRuntime ──▶ ToolSynthesizer::tools_for(entity)
//!                   ├─ TransactionalTool   (one per operation)
//!                   └─ RelationTool        (one per relation to a tool-exposing type)
//!             ──▶ FinderTool::new(entity_type)
//!                   └─ call(id) ─▶ inner tools of the found entity
//! ```

pub mod conversion;
pub mod disclosure;
pub mod finder;
pub mod relation;
pub mod runtime;
pub mod synthesizer;
pub mod tool;
pub mod tool_set;
pub mod transactional;

pub use conversion::convert_outcome;
pub use disclosure::Disclosure;
pub use finder::{FinderTool, parse_identifier};
pub use relation::RelationTool;
pub use runtime::ToolRuntime;
pub use synthesizer::{ToolSynthesizer, definition_for};
pub use tool::{EntityTool, entity_label};
pub use tool_set::ToolSet;
pub use transactional::{InvocationContext, TransactionalTool};
