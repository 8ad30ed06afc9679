//! View Registry
//!
//! The [`ViewRegistry`] maps each entity type to exactly one view interface
//! plus a human description, and keeps the per-entity operation catalog used
//! when no view is registered. It is assembled once at startup through
//! [`ViewRegistryBuilder`] and is read-only afterwards, shared behind an
//! `Arc` across every invocation.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ViewRegistry::builder()
//!     .scan(&[hotel_views()], &["hotel".to_string()])?
//!     .entity_operations::<Customer>(vec![get_status()])
//!     .build();
//!
//! assert!(registry.has_view_for(EntityType::of::<Reservation>()));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::entity::{Entity, EntityType};
use entity_tools_domain::view::{Operation, ViewInterface, ViewModule};

/// Registry entry: one entity type mapped to one view interface
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    pub entity_type: EntityType,
    pub interface: Arc<ViewInterface>,
    /// Used when presenting a finder for this entity type
    pub description: String,
}

/// Collects view mappings and entity operations before the registry is frozen
#[derive(Debug, Default)]
pub struct ViewRegistryBuilder {
    views: HashMap<EntityType, ViewDescriptor>,
    entity_operations: HashMap<EntityType, Vec<Operation>>,
}

impl ViewRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the mapping for `entity_type`
    pub fn register(
        mut self,
        entity_type: EntityType,
        interface: Arc<ViewInterface>,
        description: impl Into<String>,
    ) -> Self {
        let descriptor = ViewDescriptor {
            entity_type,
            interface,
            description: description.into(),
        };
        if let Some(previous) = self.views.insert(entity_type, descriptor) {
            tracing::debug!(
                entity = %entity_type,
                previous = previous.interface.name(),
                "Overwriting view mapping"
            );
        }
        self
    }

    /// Register an interface whose entity type is inferred from its
    /// parameterization; the marker description (or the interface name) is
    /// used as the description
    pub fn register_view(self, interface: Arc<ViewInterface>) -> Result<Self, ConfigurationError> {
        let entity_type = interface.resolve_entity_type()?;
        let description = interface
            .description()
            .map(str::to_string)
            .unwrap_or_else(|| interface.name().to_string());
        Ok(self.register(entity_type, interface, description))
    }

    /// Register every marked interface in modules at or below one of
    /// `base_paths`. An empty path list covers every module.
    ///
    /// Unmarked interfaces (mixins, intermediate contracts) are skipped. An
    /// interface whose entity type cannot be inferred fails the whole scan.
    pub fn scan(
        mut self,
        modules: &[ViewModule],
        base_paths: &[String],
    ) -> Result<Self, ConfigurationError> {
        for module in modules {
            let included =
                base_paths.is_empty() || base_paths.iter().any(|base| module.is_under(base));
            if !included {
                tracing::trace!(module = module.path(), "Module outside base paths, skipping");
                continue;
            }

            for interface in module.interfaces().iter().filter(|i| i.is_marked()) {
                self = self.register_view(Arc::clone(interface))?;
            }
        }
        Ok(self)
    }

    /// Declare operations directly on an entity type (the no-view path)
    pub fn entity_operations<E: Entity>(self, operations: Vec<Operation>) -> Self {
        self.register_operations(EntityType::of::<E>(), operations)
    }

    pub fn register_operations(
        mut self,
        entity_type: EntityType,
        operations: Vec<Operation>,
    ) -> Self {
        self.entity_operations
            .entry(entity_type)
            .or_default()
            .extend(operations);
        self
    }

    pub fn has_view_for(&self, entity_type: EntityType) -> bool {
        self.views.contains_key(&entity_type)
    }

    /// Freeze the registry and log the discovered mapping set
    pub fn build(self) -> Arc<ViewRegistry> {
        let mut mappings: Vec<&ViewDescriptor> = self.views.values().collect();
        mappings.sort_by_key(|d| d.entity_type.name());
        for descriptor in &mappings {
            tracing::info!(
                entity = %descriptor.entity_type,
                view = descriptor.interface.name(),
                description = %descriptor.description,
                "View mapping"
            );
        }
        tracing::info!(
            views = self.views.len(),
            entity_operation_types = self.entity_operations.len(),
            "View registry built"
        );

        Arc::new(ViewRegistry {
            views: self.views,
            entity_operations: self.entity_operations,
        })
    }
}

/// Immutable entity type → view mapping
#[derive(Debug)]
pub struct ViewRegistry {
    views: HashMap<EntityType, ViewDescriptor>,
    entity_operations: HashMap<EntityType, Vec<Operation>>,
}

impl ViewRegistry {
    pub fn builder() -> ViewRegistryBuilder {
        ViewRegistryBuilder::new()
    }

    pub fn has_view_for(&self, entity_type: EntityType) -> bool {
        self.views.contains_key(&entity_type)
    }

    pub fn descriptor(&self, entity_type: EntityType) -> Option<&ViewDescriptor> {
        self.views.get(&entity_type)
    }

    /// Like [`descriptor`](Self::descriptor), failing with a configuration error
    pub fn require(&self, entity_type: EntityType) -> Result<&ViewDescriptor, ConfigurationError> {
        self.descriptor(entity_type)
            .ok_or_else(|| ConfigurationError::NoView {
                entity: entity_type.name().to_string(),
            })
    }

    /// Operations declared directly on the entity type
    pub fn entity_operations(&self, entity_type: EntityType) -> &[Operation] {
        self.entity_operations
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Operations that become tools for `entity_type`: the view's operations
    /// when a view is registered, the entity's own operations otherwise
    pub fn exposed_operations(&self, entity_type: EntityType) -> Vec<Operation> {
        match self.views.get(&entity_type) {
            Some(descriptor) => descriptor
                .interface
                .operations()
                .into_iter()
                .cloned()
                .collect(),
            None => self.entity_operations(entity_type).to_vec(),
        }
    }

    pub fn exposes_operations(&self, entity_type: EntityType) -> bool {
        match self.views.get(&entity_type) {
            Some(descriptor) => !descriptor.interface.operations().is_empty(),
            None => !self.entity_operations(entity_type).is_empty(),
        }
    }

    /// All view mappings, ordered by entity type name
    pub fn mappings(&self) -> Vec<&ViewDescriptor> {
        let mut mappings: Vec<&ViewDescriptor> = self.views.values().collect();
        mappings.sort_by_key(|d| d.entity_type.name());
        mappings
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
