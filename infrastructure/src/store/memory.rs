//! In-memory transactional store
//!
//! [`MemoryStore`] keeps one committed copy of every entity, keyed by entity
//! type and identifier. A [`MemoryTransaction`] stages saves privately and
//! applies them on commit; rollback discards them. Reads inside a
//! transaction see its own staged writes first.
//!
//! Conflicts are detected optimistically: every committed entity carries a
//! version, a transaction remembers the version it read, and a commit that
//! would overwrite a newer version fails with [`StoreError::Conflict`].

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use entity_tools_application::ports::store::{
    Repository, StoreError, Transaction, TransactionManager,
};
use entity_tools_domain::entity::{Entity, EntityId, EntityType, IdentifierKind, downcast_ref};

type Key = (EntityType, EntityId);

struct Record {
    version: u64,
    entity: Box<dyn Entity>,
}

#[derive(Default)]
struct Tables {
    records: HashMap<Key, Record>,
}

/// Shared in-memory store; cheap to clone
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    stats: Arc<Stats>,
}

#[derive(Default)]
struct Stats {
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a committed entity outside any transaction
    pub fn insert<E: Entity>(&self, entity: E) {
        let key = (EntityType::of::<E>(), entity.id());
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let version = tables.records.get(&key).map_or(0, |r| r.version + 1);
        tables.records.insert(
            key,
            Record {
                version,
                entity: Box::new(entity),
            },
        );
    }

    /// Committed copy of an entity
    pub fn get<E: Entity + Clone>(&self, id: impl Into<EntityId>) -> Option<E> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .records
            .get(&(EntityType::of::<E>(), id.into()))
            .and_then(|r| downcast_ref::<E>(r.entity.as_ref()).cloned())
    }

    pub fn remove(&self, entity_type: EntityType, id: &EntityId) -> bool {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.records.remove(&(entity_type, id.clone())).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn commits(&self) -> usize {
        self.stats.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.stats.rollbacks.load(Ordering::SeqCst)
    }

    /// Repository for entity type `E` over this store
    pub fn repository<E: Entity>(&self, kind: IdentifierKind) -> Arc<MemoryRepository<E>> {
        Arc::new(MemoryRepository {
            store: self.clone(),
            kind,
            _entity: PhantomData,
        })
    }

    fn snapshot(&self, key: &Key) -> Option<(u64, Box<dyn Entity>)> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .records
            .get(key)
            .map(|r| (r.version, r.entity.clone_entity()))
    }
}

#[async_trait]
impl TransactionManager for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        tracing::trace!("Begin memory transaction");
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            read_versions: HashMap::new(),
            staged: HashMap::new(),
        }))
    }
}

/// Unit of work over a [`MemoryStore`]
pub struct MemoryTransaction {
    store: MemoryStore,
    /// Version observed on first read of each key; `None` when it was absent
    read_versions: HashMap<Key, Option<u64>>,
    staged: HashMap<Key, Box<dyn Entity>>,
}

impl MemoryTransaction {
    fn find(&mut self, key: Key) -> Option<Box<dyn Entity>> {
        if let Some(staged) = self.staged.get(&key) {
            return Some(staged.clone_entity());
        }
        let snapshot = self.store.snapshot(&key);
        self.read_versions
            .entry(key)
            .or_insert_with(|| snapshot.as_ref().map(|(version, _)| *version));
        snapshot.map(|(_, entity)| entity)
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            store,
            read_versions,
            staged,
        } = *self;

        let mut tables = store.tables.write().unwrap_or_else(PoisonError::into_inner);
        for key in staged.keys() {
            let current = tables.records.get(key).map(|r| r.version);
            if let Some(seen) = read_versions.get(key)
                && *seen != current
            {
                return Err(StoreError::Conflict {
                    entity: key.0.name().to_string(),
                    id: key.1.to_string(),
                });
            }
        }

        let writes = staged.len();
        for (key, entity) in staged {
            let version = tables.records.get(&key).map_or(0, |r| r.version + 1);
            tables.records.insert(key, Record { version, entity });
        }
        drop(tables);

        store.stats.commits.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(writes, "Committed memory transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.store.stats.rollbacks.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(discarded = self.staged.len(), "Rolled back memory transaction");
        Ok(())
    }
}

/// Repository for one entity type over a [`MemoryStore`]
pub struct MemoryRepository<E> {
    store: MemoryStore,
    kind: IdentifierKind,
    _entity: PhantomData<fn() -> E>,
}

impl<E> MemoryRepository<E> {
    fn transaction<'t>(
        &self,
        tx: &'t mut dyn Transaction,
    ) -> Result<&'t mut MemoryTransaction, StoreError> {
        let tx = tx
            .as_any_mut()
            .downcast_mut::<MemoryTransaction>()
            .ok_or(StoreError::ForeignTransaction)?;
        if !Arc::ptr_eq(&tx.store.tables, &self.store.tables) {
            return Err(StoreError::ForeignTransaction);
        }
        Ok(tx)
    }
}

#[async_trait]
impl<E: Entity> Repository for MemoryRepository<E> {
    fn entity_type(&self) -> EntityType {
        EntityType::of::<E>()
    }

    fn identifier_kind(&self) -> IdentifierKind {
        self.kind
    }

    async fn find_by_id(
        &self,
        tx: &mut dyn Transaction,
        id: &EntityId,
    ) -> Result<Option<Box<dyn Entity>>, StoreError> {
        let tx = self.transaction(tx)?;
        Ok(tx.find((EntityType::of::<E>(), id.clone())))
    }

    async fn save(&self, tx: &mut dyn Transaction, entity: &dyn Entity) -> Result<(), StoreError> {
        let expected = EntityType::of::<E>();
        if entity.entity_type() != expected {
            return Err(StoreError::TypeMismatch {
                expected: expected.name().to_string(),
                actual: entity.entity_type().name().to_string(),
            });
        }
        let tx = self.transaction(tx)?;
        tx.staged.insert((expected, entity.id()), entity.clone_entity());
        Ok(())
    }
}
