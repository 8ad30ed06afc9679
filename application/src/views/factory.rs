//! View Factory
//!
//! Binds a registered [`ViewInterface`] to one live entity. The resulting
//! [`View`] answers the framework-level accessors itself (wrapped entity,
//! summary, full text, derived views) and routes every declared operation to
//! its handler with the bound entity. Handlers declared with
//! [`Operation::bound`] reach the same accessors through a [`ViewContext`],
//! so an operation that reports its own summary sees the template-resolved
//! text rather than the default.
//!
//! Summary and full text are resolved in this order:
//!
//! 1. template `<TypeName>_short` / `<TypeName>_long`
//! 2. behavior declared on the view interface (or one it extends)
//! 3. defaults derived from the entity's fields

use std::fmt;
use std::sync::Arc;

use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::entity::Entity;
use entity_tools_domain::view::{
    Arguments, Operation, OperationError, Outcome, ViewContext, ViewInterface,
};
use serde_json::json;

use super::registry::{ViewDescriptor, ViewRegistry};
use crate::ports::template::{NoTemplates, TemplateRenderer};

pub use entity_tools_domain::view::{default_full_text, default_summary};

/// Produces views for registered entity types
pub struct ViewFactory {
    registry: Arc<ViewRegistry>,
    templates: Arc<dyn TemplateRenderer>,
}

impl ViewFactory {
    pub fn new(registry: Arc<ViewRegistry>) -> Self {
        Self {
            registry,
            templates: Arc::new(NoTemplates),
        }
    }

    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    pub fn registry(&self) -> &Arc<ViewRegistry> {
        &self.registry
    }

    /// Bind a view to `entity` for operation dispatch.
    ///
    /// Fails when the entity's runtime type has no registered view.
    pub fn view_of<'a>(
        &'a self,
        entity: &'a mut dyn Entity,
    ) -> Result<View<'a>, ConfigurationError> {
        let descriptor = self.registry.require(entity.entity_type())?;
        Ok(View {
            factory: self,
            descriptor,
            binding: Binding::Exclusive(entity),
        })
    }

    /// Bind a read-only view for prompt content; operations cannot be invoked on it
    pub fn display<'a>(&'a self, entity: &'a dyn Entity) -> Result<View<'a>, ConfigurationError> {
        let descriptor = self.registry.require(entity.entity_type())?;
        Ok(View {
            factory: self,
            descriptor,
            binding: Binding::Shared(entity),
        })
    }

    /// Summary of `entity` through its view when one is registered, the
    /// default summary otherwise
    pub fn summarize(&self, entity: &dyn Entity) -> String {
        match self.display(entity) {
            Ok(view) => view.summary(),
            Err(_) => default_summary(entity),
        }
    }

    fn render_template(&self, entity: &dyn Entity, suffix: &str) -> Option<String> {
        let name = format!("{}_{}", entity.entity_type().name(), suffix);
        let bindings = json!({
            "type": entity.entity_type().name(),
            "id": entity.id().to_json(),
            "entity": entity.to_json(),
        });
        self.templates.render(&name, &bindings)
    }
}

impl fmt::Debug for ViewFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewFactory")
            .field("views", &self.registry.len())
            .finish()
    }
}

/// View-level accessors shared by [`View`] and the operations it invokes
struct ViewScope<'a> {
    factory: &'a ViewFactory,
    descriptor: &'a ViewDescriptor,
}

impl ViewContext for ViewScope<'_> {
    fn interface_name(&self) -> Option<&str> {
        Some(self.descriptor.interface.name())
    }

    fn summary_of(&self, entity: &dyn Entity) -> String {
        self.factory
            .render_template(entity, "short")
            .or_else(|| self.descriptor.interface.render_summary(entity))
            .unwrap_or_else(|| default_summary(entity))
    }

    fn full_text_of(&self, entity: &dyn Entity) -> String {
        self.factory
            .render_template(entity, "long")
            .or_else(|| self.descriptor.interface.render_full_text(entity))
            .unwrap_or_else(|| default_full_text(entity))
    }

    fn derive_summary(&self, related: &dyn Entity) -> Result<String, OperationError> {
        let view = self.factory.display(related).map_err(derive_failed)?;
        Ok(view.summary())
    }

    fn derive_full_text(&self, related: &dyn Entity) -> Result<String, OperationError> {
        let view = self.factory.display(related).map_err(derive_failed)?;
        Ok(view.full_text())
    }
}

fn derive_failed(error: ConfigurationError) -> OperationError {
    OperationError::with_source(error.to_string(), error)
}

enum Binding<'a> {
    Shared(&'a dyn Entity),
    Exclusive(&'a mut dyn Entity),
}

/// An entity presented under its view interface.
///
/// Views are never persisted and live no longer than the borrow of the
/// entity they wrap. Equality is identity: two views are equal only when
/// they are the same value.
pub struct View<'a> {
    factory: &'a ViewFactory,
    descriptor: &'a ViewDescriptor,
    binding: Binding<'a>,
}

impl<'a> View<'a> {
    /// The exact entity instance this view was built for
    pub fn entity(&self) -> &dyn Entity {
        match &self.binding {
            Binding::Shared(entity) => *entity,
            Binding::Exclusive(entity) => &**entity,
        }
    }

    pub fn interface(&self) -> &ViewInterface {
        &self.descriptor.interface
    }

    pub fn descriptor(&self) -> &ViewDescriptor {
        self.descriptor
    }

    pub fn is_display(&self) -> bool {
        matches!(self.binding, Binding::Shared(_))
    }

    pub fn summary(&self) -> String {
        self.scope().summary_of(self.entity())
    }

    pub fn full_text(&self) -> String {
        self.scope().full_text_of(self.entity())
    }

    /// Display view of a related entity
    pub fn derive<'b>(&'b self, related: &'b dyn Entity) -> Result<View<'b>, ConfigurationError> {
        self.factory.display(related)
    }

    /// Operations visible on the view interface
    pub fn operations(&self) -> Vec<&Operation> {
        self.interface().operations()
    }

    fn scope(&self) -> ViewScope<'a> {
        ViewScope {
            factory: self.factory,
            descriptor: self.descriptor,
        }
    }

    /// Run `operation` against the bound entity, under this view
    pub fn invoke(
        &mut self,
        operation: &Operation,
        args: &Arguments,
    ) -> Result<Outcome, OperationError> {
        let scope = self.scope();
        match &mut self.binding {
            Binding::Exclusive(entity) => operation.invoke_in(&mut **entity, &scope, args),
            Binding::Shared(entity) => Err(OperationError::new(format!(
                "Cannot invoke '{}' on a display view of {}",
                operation.tool_name(),
                entity.entity_type()
            ))),
        }
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]",
            self.interface().name(),
            default_summary(self.entity())
        )
    }
}
