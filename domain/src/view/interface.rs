//! View interfaces: the contract a view exposes over one entity type
//!
//! A [`ViewInterface`] plays the part of an interface with default methods:
//! it may be parameterized with an entity type directly, extend other
//! interfaces (mixins contributing shared operations), carry a view marker
//! with a human description, and optionally declare its own summary and
//! full-text behavior. Declarations are resolved through the `extends`
//! chain, nearest first.
//!
//! ```text
//! ReservationView ──extends──▶ Auditable          (operations: history)
//!        │        └─extends──▶ EntityView<Reservation>  (entity parameter)
//!        └─ operations: checkIn, extendStay
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::operation::Operation;
use crate::core::error::ConfigurationError;
use crate::entity::{Entity, EntityType, downcast_ref};

type TextRenderer = dyn Fn(&dyn Entity) -> Option<String> + Send + Sync;

/// Declared view contract
#[derive(Clone)]
pub struct ViewInterface {
    name: String,
    entity: Option<EntityType>,
    extends: Vec<Arc<ViewInterface>>,
    marker: Option<String>,
    summary: Option<Arc<TextRenderer>>,
    full_text: Option<Arc<TextRenderer>>,
    operations: Vec<Operation>,
}

impl ViewInterface {
    /// An interface with no entity parameter of its own (a mixin, or a view
    /// whose entity type is inherited)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: None,
            extends: Vec::new(),
            marker: None,
            summary: None,
            full_text: None,
            operations: Vec::new(),
        }
    }

    /// An interface parameterized directly with entity type `E`
    pub fn for_entity<E: Entity>(name: impl Into<String>) -> Self {
        let mut interface = Self::new(name);
        interface.entity = Some(EntityType::of::<E>());
        interface
    }

    pub fn extends(mut self, parent: Arc<ViewInterface>) -> Self {
        self.extends.push(parent);
        self
    }

    /// Attach the view marker; marked interfaces are picked up by module scans
    pub fn marked(mut self, description: impl Into<String>) -> Self {
        self.marker = Some(description.into());
        self
    }

    /// Declare summary behavior for entities of type `E`
    pub fn with_summary<E, F>(mut self, render: F) -> Self
    where
        E: Entity,
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        self.summary = Some(Arc::new(move |entity: &dyn Entity| {
            downcast_ref::<E>(entity).map(&render)
        }));
        self
    }

    /// Declare full-text behavior for entities of type `E`
    pub fn with_full_text<E, F>(mut self, render: F) -> Self
    where
        E: Entity,
        F: Fn(&E) -> String + Send + Sync + 'static,
    {
        self.full_text = Some(Arc::new(move |entity: &dyn Entity| {
            downcast_ref::<E>(entity).map(&render)
        }));
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entity type this interface is directly parameterized with
    pub fn declared_entity(&self) -> Option<EntityType> {
        self.entity
    }

    pub fn parents(&self) -> &[Arc<ViewInterface>] {
        &self.extends
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// Human description from the view marker
    pub fn description(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// Operations declared on this interface only
    pub fn declared_operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Infer the entity type by walking the supertype chain.
    ///
    /// The direct parameter wins; otherwise parents are searched depth-first
    /// in declaration order, so the entity-parameterized interface may appear
    /// in any position of a multiple extension.
    pub fn resolve_entity_type(&self) -> Result<EntityType, ConfigurationError> {
        self.find_entity_type(&mut HashSet::new())
            .ok_or_else(|| ConfigurationError::UnresolvedEntityType {
                view: self.name.clone(),
            })
    }

    fn find_entity_type(&self, visited: &mut HashSet<*const ViewInterface>) -> Option<EntityType> {
        if !visited.insert(self as *const ViewInterface) {
            return None;
        }
        if let Some(entity) = self.entity {
            return Some(entity);
        }
        self.extends
            .iter()
            .find_map(|parent| parent.find_entity_type(visited))
    }

    /// Every operation visible on this interface, own declarations first,
    /// then inherited ones; a tool name is only taken by its nearest declaration
    pub fn operations(&self) -> Vec<&Operation> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_operations(&mut seen, &mut out);
        out
    }

    fn collect_operations<'a>(&'a self, seen: &mut HashSet<String>, out: &mut Vec<&'a Operation>) {
        for op in &self.operations {
            if seen.insert(op.tool_name().to_string()) {
                out.push(op);
            }
        }
        for parent in &self.extends {
            parent.collect_operations(seen, out);
        }
    }

    /// Declared summary for `entity`, searching the chain nearest first
    pub fn render_summary(&self, entity: &dyn Entity) -> Option<String> {
        self.find_rendered(entity, &|i| i.summary.as_ref())
    }

    /// Declared full text for `entity`, searching the chain nearest first
    pub fn render_full_text(&self, entity: &dyn Entity) -> Option<String> {
        self.find_rendered(entity, &|i| i.full_text.as_ref())
    }

    fn find_rendered(
        &self,
        entity: &dyn Entity,
        pick: &dyn Fn(&ViewInterface) -> Option<&Arc<TextRenderer>>,
    ) -> Option<String> {
        if let Some(text) = pick(self).and_then(|render| render(entity)) {
            return Some(text);
        }
        self.extends
            .iter()
            .find_map(|parent| parent.find_rendered(entity, pick))
    }
}

impl fmt::Debug for ViewInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewInterface")
            .field("name", &self.name)
            .field("entity", &self.entity)
            .field(
                "extends",
                &self.extends.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("marker", &self.marker)
            .field("operations", &self.operations.len())
            .finish()
    }
}

/// A named group of view interfaces, the unit a registry scan walks.
///
/// Module paths are `::`-separated (`"hotel::views"`); a scan with base path
/// `"hotel"` covers `"hotel"` and everything below it.
#[derive(Debug, Clone)]
pub struct ViewModule {
    path: String,
    interfaces: Vec<Arc<ViewInterface>>,
}

impl ViewModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            interfaces: Vec::new(),
        }
    }

    pub fn with_interface(mut self, interface: Arc<ViewInterface>) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn interfaces(&self) -> &[Arc<ViewInterface>] {
        &self.interfaces
    }

    /// Whether this module lies at or below `base`
    pub fn is_under(&self, base: &str) -> bool {
        let base = base.trim_end_matches("::");
        base.is_empty()
            || self.path == base
            || self
                .path
                .strip_prefix(base)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}
