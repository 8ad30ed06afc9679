//! Hotel fixtures and an in-crate transactional fake store for unit tests

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use entity_tools_domain::entity::{Entity, EntityId, EntityType, Field, IdentifierKind};
use entity_tools_domain::view::{
    Arguments, Operation, OperationError, Outcome, ParamSpec, ViewInterface,
};
use serde::Serialize;

use crate::ports::store::{Repository, StoreError, Transaction, TransactionManager};
use crate::views::locator::RepositoryLocator;
use crate::views::registry::ViewRegistry;

// ==================== Entities ====================

#[derive(Debug, Clone)]
pub struct Reservation {
    pub code: String,
    pub guest: String,
    pub nights: i64,
    pub checked_in: bool,
    pub room: Option<i64>,
    pub charges: Vec<i64>,
}

impl Reservation {
    pub fn new(code: &str, guest: &str) -> Self {
        Self {
            code: code.to_string(),
            guest: guest.to_string(),
            nights: 1,
            checked_in: false,
            room: None,
            charges: Vec::new(),
        }
    }
}

impl Entity for Reservation {
    fn id(&self) -> EntityId {
        self.code.as_str().into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("guest", self.guest.as_str()),
            Field::new("nights", self.nights),
            Field::new("checked_in", self.checked_in),
            Field::relation::<Room>("room", self.room.map(EntityId::from)),
            Field::collection("charges", self.charges.len()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub number: i64,
    pub clean: bool,
}

impl Entity for Room {
    fn id(&self) -> EntityId {
        self.number.into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("clean", self.clean)]
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum Status {
    Gold,
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub status: Status,
}

impl Customer {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: Status::Gold,
        }
    }
}

impl Entity for Customer {
    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("name", self.name.as_str())]
    }
}

/// Billing folio: no operations of its own, one relation to a reservation
#[derive(Debug, Clone)]
pub struct Folio {
    pub id: i64,
    pub reservation: Option<String>,
}

impl Entity for Folio {
    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::relation::<Reservation>(
            "reservation",
            self.reservation.clone().map(EntityId::from),
        )]
    }
}

// ==================== Operations ====================

pub fn check_in() -> Operation {
    Operation::new("checkIn", "Check the guest in", |r: &mut Reservation, _: &Arguments| {
        if r.checked_in {
            return Ok(format!("Reservation {} was already checked in", r.code).into());
        }
        r.checked_in = true;
        Ok(format!("Checked in reservation {}", r.code).into())
    })
}

pub fn extend_stay() -> Operation {
    Operation::new("extendStay", "Extend the stay", |r: &mut Reservation, args: &Arguments| {
        let nights: i64 = args.require("nights")?;
        r.nights += nights;
        Ok(format!("Reservation {} now runs {} nights", r.code, r.nights).into())
    })
    .with_param(ParamSpec::of::<i64>("nights", "Additional nights"))
    .with_param(ParamSpec::of::<String>("note", "Note for the front desk").optional())
}

pub fn guest_name() -> Operation {
    Operation::new("guestName", "Name of the guest", |r: &mut Reservation, _: &Arguments| {
        Ok(r.guest.clone().into())
    })
    .read_only()
}

pub fn cancel() -> Operation {
    Operation::new("cancel", "Cancel the reservation", |r: &mut Reservation, _: &Arguments| {
        r.nights = 0;
        Err(OperationError::with_source(
            "Cancellation failed",
            std::io::Error::other("payment gateway unavailable"),
        ))
    })
}

pub fn get_status() -> Operation {
    Operation::new("getStatus", "Loyalty status", |c: &mut Customer, _: &Arguments| {
        Outcome::value(&c.status)
    })
    .read_only()
}

pub fn mark_clean() -> Operation {
    Operation::new("markClean", "Mark the room clean", |r: &mut Room, _: &Arguments| {
        r.clean = true;
        Ok(Outcome::Empty)
    })
}

pub fn reservation_view() -> Arc<ViewInterface> {
    ViewInterface::for_entity::<Reservation>("ReservationView")
        .marked("Hotel reservations by confirmation code")
        .with_operation(check_in())
        .with_operation(extend_stay())
        .with_operation(guest_name())
        .with_operation(cancel())
        .into_shared()
}

/// Reservation has a view, Customer and Room expose entity operations,
/// Folio exposes nothing
pub fn hotel_registry() -> Arc<ViewRegistry> {
    ViewRegistry::builder()
        .register_view(reservation_view())
        .expect("reservation view resolves")
        .entity_operations::<Customer>(vec![get_status()])
        .entity_operations::<Room>(vec![mark_clean()])
        .build()
}

// ==================== Fake store ====================

type Key = (EntityType, EntityId);

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<HashMap<Key, Box<dyn Entity>>>,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub fail_commit: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert<E: Entity>(&self, entity: E) {
        let key = (EntityType::of::<E>(), entity.id());
        self.records.lock().unwrap().insert(key, Box::new(entity));
    }

    pub fn get<E: Entity + Clone>(&self, id: impl Into<EntityId>) -> Option<E> {
        let records = self.records.lock().unwrap();
        records
            .get(&(EntityType::of::<E>(), id.into()))
            .and_then(|e| entity_tools_domain::entity::downcast_ref::<E>(e.as_ref()).cloned())
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

pub struct FakeTransaction {
    store: Arc<FakeStore>,
    staged: Vec<Box<dyn Entity>>,
}

#[async_trait]
impl Transaction for FakeTransaction {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let FakeTransaction { store, staged } = *self;
        if store.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        {
            let mut records = store.records.lock().unwrap();
            for entity in staged {
                records.insert((entity.entity_type(), entity.id()), entity);
            }
        }
        store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeTransactions(pub Arc<FakeStore>);

#[async_trait]
impl TransactionManager for FakeTransactions {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        Ok(Box::new(FakeTransaction {
            store: Arc::clone(&self.0),
            staged: Vec::new(),
        }))
    }
}

pub struct FakeRepository<E> {
    store: Arc<FakeStore>,
    kind: IdentifierKind,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> FakeRepository<E> {
    pub fn new(store: &Arc<FakeStore>, kind: IdentifierKind) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::clone(store),
            kind,
            _entity: PhantomData,
        })
    }
}

fn fake_tx(tx: &mut dyn Transaction) -> Result<&mut FakeTransaction, StoreError> {
    tx.as_any_mut()
        .downcast_mut::<FakeTransaction>()
        .ok_or(StoreError::ForeignTransaction)
}

#[async_trait]
impl<E: Entity> Repository for FakeRepository<E> {
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
        let tx = fake_tx(tx)?;
        let entity_type = EntityType::of::<E>();
        if let Some(staged) = tx
            .staged
            .iter()
            .rev()
            .find(|e| e.entity_type() == entity_type && &e.id() == id)
        {
            return Ok(Some(staged.clone_entity()));
        }
        let records = self.store.records.lock().unwrap();
        Ok(records.get(&(entity_type, id.clone())).map(|e| e.clone_entity()))
    }

    async fn save(&self, tx: &mut dyn Transaction, entity: &dyn Entity) -> Result<(), StoreError> {
        if entity.entity_type() != EntityType::of::<E>() {
            return Err(StoreError::TypeMismatch {
                expected: EntityType::of::<E>().name().to_string(),
                actual: entity.entity_type().name().to_string(),
            });
        }
        fake_tx(tx)?.staged.push(entity.clone_entity());
        Ok(())
    }
}

/// Store seeded with R-42 (room 101), room 101, customer 7 and folio 9 → R-42
pub fn seeded_store() -> Arc<FakeStore> {
    let store = FakeStore::new();
    let mut reservation = Reservation::new("R-42", "Ada");
    reservation.room = Some(101);
    store.insert(reservation);
    store.insert(Room {
        number: 101,
        clean: false,
    });
    store.insert(Customer::new(7, "Grace"));
    store.insert(Folio {
        id: 9,
        reservation: Some("R-42".to_string()),
    });
    store
}

pub fn hotel_locator(store: &Arc<FakeStore>) -> RepositoryLocator {
    let mut locator = RepositoryLocator::new();
    locator.register(FakeRepository::<Reservation>::new(store, IdentifierKind::Text));
    locator.register(FakeRepository::<Room>::new(store, IdentifierKind::Integer));
    locator.register(FakeRepository::<Customer>::new(store, IdentifierKind::Integer));
    locator.register(FakeRepository::<Folio>::new(store, IdentifierKind::Integer));
    locator
}
