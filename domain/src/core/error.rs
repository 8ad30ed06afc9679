//! Domain error types

use thiserror::Error;

/// Setup-time errors: a mapping the subsystem needs was never declared.
///
/// These are raised eagerly (when a registry is built, a view is requested,
/// or tools and finders are constructed) and are never recovered from
/// automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(
        "No view registered for entity type '{entity}'. Add a mapping with \
         ViewRegistryBuilder::register or mark a view interface parameterized with '{entity}'"
    )]
    NoView { entity: String },

    #[error(
        "No repository registered for entity type '{entity}'. Register one with \
         RepositoryLocator::register before requesting tools for it"
    )]
    NoRepository { entity: String },

    #[error(
        "Cannot infer the entity type of view interface '{view}': neither it nor any \
         interface it extends is parameterized with an entity type"
    )]
    UnresolvedEntityType { view: String },
}

impl ConfigurationError {
    /// Name of the entity type or view interface the error refers to
    pub fn subject(&self) -> &str {
        match self {
            ConfigurationError::NoView { entity } | ConfigurationError::NoRepository { entity } => {
                entity
            }
            ConfigurationError::UnresolvedEntityType { view } => view,
        }
    }
}
