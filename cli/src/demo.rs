//! Bundled hotel domain used by the CLI

use std::sync::Arc;

use chrono::NaiveDate;
use entity_tools_application::{RepositoryLocator, ViewRegistry};
use entity_tools_domain::ConfigurationError;
use entity_tools_domain::entity::{Entity, EntityId, EntityType, Field, IdentifierKind};
use entity_tools_domain::view::{
    Arguments, Bound, Operation, OperationError, Outcome, ParamSpec, ViewInterface, ViewModule,
};
use entity_tools_infrastructure::MemoryStore;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Reservation {
    code: String,
    guest: String,
    arrival: NaiveDate,
    nights: i64,
    checked_in: bool,
    room: Option<i64>,
}

impl Entity for Reservation {
    fn id(&self) -> EntityId {
        self.code.as_str().into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("guest", self.guest.as_str()),
            Field::new("arrival", self.arrival),
            Field::new("nights", self.nights),
            Field::new("checked_in", self.checked_in),
            Field::relation::<Room>("room", self.room.map(EntityId::from)),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    number: i64,
    clean: bool,
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
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Silver,
    Gold,
}

#[derive(Debug, Clone)]
pub struct Customer {
    id: i64,
    name: String,
    level: Level,
}

impl Entity for Customer {
    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![Field::new("name", self.name.as_str())]
    }
}

#[derive(Debug, Clone)]
pub struct Folio {
    id: i64,
    balance: Decimal,
    reservation: Option<String>,
}

impl Entity for Folio {
    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("balance", self.balance),
            Field::relation::<Reservation>(
                "reservation",
                self.reservation.clone().map(EntityId::from),
            ),
        ]
    }
}

/// Operations shared by anything describing a guest's stay
fn stay_view() -> Arc<ViewInterface> {
    ViewInterface::new("StayView")
        .with_summary(|r: &Reservation| format!("Stay of {} from {}", r.guest, r.arrival))
        .with_operation(
            Operation::new(
                "guestName",
                "Name of the guest",
                |r: &mut Reservation, _: &Arguments| Ok(r.guest.clone().into()),
            )
            .read_only(),
        )
        .with_operation(
            Operation::bound(
                "describe",
                "Everything the front desk knows about the stay",
                |r: &mut Bound<'_, Reservation>, _: &Arguments| {
                    Ok(format!("{}\n{}", r.summary(), r.full_text()).into())
                },
            )
            .read_only(),
        )
        .into_shared()
}

fn reservation_view() -> Arc<ViewInterface> {
    ViewInterface::for_entity::<Reservation>("ReservationView")
        .extends(stay_view())
        .marked("Hotel reservations by confirmation code")
        .with_summary(|r: &Reservation| {
            let state = if r.checked_in { "checked in" } else { "expected" };
            format!("Reservation {} for {} ({}, {} nights)", r.code, r.guest, state, r.nights)
        })
        .with_operation(Operation::new(
            "checkIn",
            "Check the guest in",
            |r: &mut Reservation, _: &Arguments| {
                if r.checked_in {
                    return Ok(format!("Reservation {} was already checked in", r.code).into());
                }
                r.checked_in = true;
                Ok(format!("Checked in reservation {}", r.code).into())
            },
        ))
        .with_operation(
            Operation::new(
                "extendStay",
                "Add nights to the stay",
                |r: &mut Reservation, args: &Arguments| {
                    let nights: i64 = args.require("nights")?;
                    if nights <= 0 {
                        return Err(OperationError::new("Nights must be positive"));
                    }
                    r.nights += nights;
                    Ok(format!("Reservation {} now runs {} nights", r.code, r.nights).into())
                },
            )
            .with_param(ParamSpec::of::<i64>("nights", "Additional nights")),
        )
        .into_shared()
}

fn folio_view() -> Arc<ViewInterface> {
    ViewInterface::for_entity::<Folio>("FolioView")
        .marked("Guest folios and their running balance")
        .with_summary(|f: &Folio| format!("Folio {} (balance {})", f.id, f.balance))
        .with_operation(
            Operation::new(
                "addCharge",
                "Post a charge to the folio",
                |f: &mut Folio, args: &Arguments| {
                    let amount: Decimal = args.require("amount")?;
                    f.balance += amount;
                    Ok(Outcome::Text(format!("Balance is now {}", f.balance)))
                },
            )
            .with_param(ParamSpec::of::<Decimal>("amount", "Amount to charge")),
        )
        .with_operation(
            Operation::new("balance", "Current balance", |f: &mut Folio, _: &Arguments| {
                Outcome::value(&f.balance)
            })
            .read_only(),
        )
        .into_shared()
}

/// View modules the registry scans
pub fn modules() -> Vec<ViewModule> {
    vec![
        ViewModule::new("hotel::front_desk")
            .with_interface(stay_view())
            .with_interface(reservation_view()),
        ViewModule::new("hotel::billing").with_interface(folio_view()),
    ]
}

pub fn registry(base_paths: &[String]) -> Result<Arc<ViewRegistry>, ConfigurationError> {
    Ok(ViewRegistry::builder()
        .scan(&modules(), base_paths)?
        .entity_operations::<Customer>(vec![
            Operation::new("getStatus", "Loyalty level", |c: &mut Customer, _: &Arguments| {
                Outcome::value(&c.level)
            })
            .read_only(),
        ])
        .entity_operations::<Room>(vec![Operation::new(
            "markClean",
            "Mark the room as cleaned",
            |r: &mut Room, _: &Arguments| {
                r.clean = true;
                Ok(format!("Room {} is clean", r.number).into())
            },
        )])
        .build())
}

/// Seed the demo data
pub fn seed(store: &MemoryStore) {
    let arrival = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default();
    store.insert(Reservation {
        code: "R-42".to_string(),
        guest: "Ada Lovelace".to_string(),
        arrival,
        nights: 3,
        checked_in: false,
        room: Some(101),
    });
    store.insert(Reservation {
        code: "R-43".to_string(),
        guest: "Charles Babbage".to_string(),
        arrival,
        nights: 1,
        checked_in: false,
        room: None,
    });
    store.insert(Room {
        number: 101,
        clean: false,
    });
    store.insert(Customer {
        id: 7,
        name: "Grace Hopper".to_string(),
        level: Level::Gold,
    });
    store.insert(Customer {
        id: 8,
        name: "Alan Turing".to_string(),
        level: Level::Silver,
    });
    store.insert(Folio {
        id: 9,
        balance: Decimal::new(12050, 2),
        reservation: Some("R-42".to_string()),
    });
}

pub fn locator(store: &MemoryStore) -> RepositoryLocator {
    let mut locator = RepositoryLocator::new();
    locator
        .register(store.repository::<Reservation>(IdentifierKind::Text))
        .register(store.repository::<Room>(IdentifierKind::Integer))
        .register(store.repository::<Customer>(IdentifierKind::Integer))
        .register(store.repository::<Folio>(IdentifierKind::Integer));
    locator
}

/// Resolve a user-typed entity type name, case-insensitively
pub fn entity_type(name: &str) -> Option<EntityType> {
    entity_types()
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
}

pub fn entity_types() -> Vec<EntityType> {
    vec![
        EntityType::of::<Reservation>(),
        EntityType::of::<Room>(),
        EntityType::of::<Customer>(),
        EntityType::of::<Folio>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_registers_marked_views_only() {
        let registry = registry(&[]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.has_view_for(EntityType::of::<Reservation>()));
        assert!(registry.has_view_for(EntityType::of::<Folio>()));
        assert!(!registry.has_view_for(EntityType::of::<Customer>()));
    }

    #[test]
    fn test_base_paths_limit_scan() {
        let registry = registry(&["hotel::billing".to_string()]).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.has_view_for(EntityType::of::<Folio>()));
    }

    #[test]
    fn test_describe_uses_the_reservation_view() {
        let registry = registry(&[]).unwrap();
        let factory = entity_tools_application::ViewFactory::new(registry);
        let mut reservation = Reservation {
            code: "R-42".to_string(),
            guest: "Ada Lovelace".to_string(),
            arrival: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            nights: 3,
            checked_in: false,
            room: Some(101),
        };
        let mut view = factory.view_of(&mut reservation).unwrap();
        let describe = view
            .operations()
            .into_iter()
            .find(|op| op.name() == "describe")
            .cloned()
            .unwrap();

        let outcome = view.invoke(&describe, &Arguments::empty()).unwrap();
        match outcome {
            Outcome::Text(text) => {
                assert!(text.starts_with("Reservation R-42 for Ada Lovelace (expected, 3 nights)"));
                assert!(text.contains("guest: Ada Lovelace"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_entity_type_lookup() {
        assert_eq!(entity_type("reservation"), Some(EntityType::of::<Reservation>()));
        assert_eq!(entity_type(" Folio "), Some(EntityType::of::<Folio>()));
        assert_eq!(entity_type("invoice"), None);
    }

    #[test]
    fn test_seeded_store() {
        let store = MemoryStore::new();
        seed(&store);
        assert_eq!(store.len(), 6);
        let locator = locator(&store);
        assert!(entity_types().into_iter().all(|t| locator.contains(t)));
    }
}
