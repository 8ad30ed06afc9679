//! Persistence ports
//!
//! The store owns entities; this subsystem only borrows them for the length
//! of one transaction. Every tool invocation begins a fresh [`Transaction`],
//! reloads its entity through a [`Repository`], and commits or rolls back
//! before returning.

use std::any::Any;

use async_trait::async_trait;
use entity_tools_domain::entity::{Entity, EntityId, EntityType, IdentifierKind};
use thiserror::Error;

/// Errors raised by store adapters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Write conflict on {entity}#{id}")]
    Conflict { entity: String, id: String },

    #[error("Transaction was not opened by this store")]
    ForeignTransaction,

    #[error("Repository for {expected} was handed an entity of type {actual}")]
    TypeMismatch { expected: String, actual: String },
}

/// A single unit of work.
///
/// Adapters downcast through [`as_any_mut`](Transaction::as_any_mut) to reach
/// their own transaction state.
#[async_trait]
pub trait Transaction: Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Opens transactions; no nesting or propagation is expected of it
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError>;
}

/// Load-by-id and save for one entity type
#[async_trait]
pub trait Repository: Send + Sync {
    /// Entity type this repository serves
    fn entity_type(&self) -> EntityType;

    /// Declared identifier type, used to coerce finder input
    fn identifier_kind(&self) -> IdentifierKind;

    /// Load a fresh copy of the entity, or `None` when absent
    async fn find_by_id(
        &self,
        tx: &mut dyn Transaction,
        id: &EntityId,
    ) -> Result<Option<Box<dyn Entity>>, StoreError>;

    /// Stage the entity's current state for write-back on commit
    async fn save(&self, tx: &mut dyn Transaction, entity: &dyn Entity) -> Result<(), StoreError>;
}
