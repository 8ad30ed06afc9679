//! The view an operation runs under
//!
//! Operations invoked through a view receive it as a [`ViewContext`]: the
//! view's own summary and full text (template, then interface, then default)
//! and views of related entities. A typed handler sees the pair as a
//! [`Bound`] entity. Invoked without a view, an operation runs under
//! [`Detached`], which answers with the default texts.

use super::operation::OperationError;
use crate::entity::Entity;

/// View-level behavior an operation can reach while it runs
pub trait ViewContext {
    /// Name of the view interface, `None` when invoked without a view
    fn interface_name(&self) -> Option<&str>;

    fn summary_of(&self, entity: &dyn Entity) -> String;

    fn full_text_of(&self, entity: &dyn Entity) -> String;

    /// Summary of a related entity through the view registered for its type
    fn derive_summary(&self, related: &dyn Entity) -> Result<String, OperationError>;

    /// Full text of a related entity through the view registered for its type
    fn derive_full_text(&self, related: &dyn Entity) -> Result<String, OperationError>;
}

/// Context for operations invoked on a bare entity
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl ViewContext for Detached {
    fn interface_name(&self) -> Option<&str> {
        None
    }

    fn summary_of(&self, entity: &dyn Entity) -> String {
        default_summary(entity)
    }

    fn full_text_of(&self, entity: &dyn Entity) -> String {
        default_full_text(entity)
    }

    fn derive_summary(&self, related: &dyn Entity) -> Result<String, OperationError> {
        Ok(default_summary(related))
    }

    fn derive_full_text(&self, related: &dyn Entity) -> Result<String, OperationError> {
        Ok(default_full_text(related))
    }
}

/// An entity of type `E` together with the view it was invoked through
pub struct Bound<'v, E> {
    entity: &'v mut E,
    view: &'v dyn ViewContext,
}

impl<'v, E: Entity> Bound<'v, E> {
    pub fn new(entity: &'v mut E, view: &'v dyn ViewContext) -> Self {
        Self { entity, view }
    }

    pub fn entity(&self) -> &E {
        self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        self.entity
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.view.interface_name()
    }

    /// Summary of the bound entity as the view presents it
    pub fn summary(&self) -> String {
        self.view.summary_of(&*self.entity)
    }

    pub fn full_text(&self) -> String {
        self.view.full_text_of(&*self.entity)
    }

    pub fn derive_summary(&self, related: &dyn Entity) -> Result<String, OperationError> {
        self.view.derive_summary(related)
    }

    pub fn derive_full_text(&self, related: &dyn Entity) -> Result<String, OperationError> {
        self.view.derive_full_text(related)
    }
}

/// `"<TypeName> (id=<id>)"`
pub fn default_summary(entity: &dyn Entity) -> String {
    format!("{} (id={})", entity.entity_type().name(), entity.id())
}

/// Type name header, then `name: value` for every simple field and
/// `name: N items` for every collection. Relations and embedded objects are
/// left out; they are reached through relation tools instead.
pub fn default_full_text(entity: &dyn Entity) -> String {
    let mut lines = vec![default_summary(entity)];
    lines.extend(entity.fields().into_iter().filter_map(|field| {
        field
            .value
            .render()
            .map(|value| format!("{}: {}", field.name, value))
    }));
    lines.join("\n")
}
