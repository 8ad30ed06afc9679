//! Repository Locator
//!
//! Resolves the [`Repository`] able to load and save a given entity type.
//! A missing repository is a configuration error, surfaced when tools or
//! finders are built rather than when they are called.

use std::collections::HashMap;
use std::sync::Arc;

use entity_tools_domain::core::error::ConfigurationError;
use entity_tools_domain::entity::EntityType;

use crate::ports::store::Repository;

#[derive(Default, Clone)]
pub struct RepositoryLocator {
    repositories: HashMap<EntityType, Arc<dyn Repository>>,
}

impl RepositoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository under the entity type it serves
    pub fn register(&mut self, repository: Arc<dyn Repository>) -> &mut Self {
        let entity_type = repository.entity_type();
        tracing::debug!(
            entity = %entity_type,
            identifier = repository.identifier_kind().as_str(),
            "Registered repository"
        );
        self.repositories.insert(entity_type, repository);
        self
    }

    pub fn contains(&self, entity_type: EntityType) -> bool {
        self.repositories.contains_key(&entity_type)
    }

    pub fn locate(
        &self,
        entity_type: EntityType,
    ) -> Result<Arc<dyn Repository>, ConfigurationError> {
        self.repositories
            .get(&entity_type)
            .cloned()
            .ok_or_else(|| ConfigurationError::NoRepository {
                entity: entity_type.name().to_string(),
            })
    }

    pub fn entity_types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.repositories.keys().copied()
    }
}
