//! Template rendering port.
//!
//! Summary and full-text output may be overridden per entity type by named
//! templates (`Reservation_short`, `Reservation_long`). A missing template is
//! a normal outcome that makes the caller fall back to declared or default
//! text.

use serde_json::Value;

/// Port for rendering named text templates
pub trait TemplateRenderer: Send + Sync {
    /// Render template `name` against `bindings`, or `None` when no such template exists
    fn render(&self, name: &str, bindings: &Value) -> Option<String>;
}

/// Renderer with no templates; every lookup falls through
pub struct NoTemplates;

impl TemplateRenderer for NoTemplates {
    fn render(&self, _name: &str, _bindings: &Value) -> Option<String> {
        None
    }
}
