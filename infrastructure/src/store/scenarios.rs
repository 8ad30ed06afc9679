//! Tool projection scenarios over the in-memory store
//!
//! Views, finders, relation tools and the tool set wired to [`MemoryStore`],
//! templates and the JSONL invocation log, the way the CLI wires them.

use std::collections::HashMap;
use std::sync::Arc;

use entity_tools_application::{
    EntityTool, RepositoryLocator, ToolRuntime, ToolSet, ToolingConfig, ViewRegistry,
};
use entity_tools_domain::entity::{Entity, EntityId, EntityType, Field, IdentifierKind};
use entity_tools_domain::view::{
    Arguments, Bound, InputPolicy, Operation, Outcome, ParamSpec, ViewInterface,
};
use serde::Serialize;

use super::MemoryStore;
use crate::logging::JsonlInvocationLogger;
use crate::templates::DirectoryTemplateRenderer;

#[derive(Debug, Clone)]
struct Reservation {
    code: String,
    guest: String,
    nights: i64,
    checked_in: bool,
}

impl Reservation {
    fn new(code: &str, guest: &str) -> Self {
        Self {
            code: code.to_string(),
            guest: guest.to_string(),
            nights: 1,
            checked_in: false,
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
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
enum Level {
    Gold,
}

#[derive(Debug, Clone)]
struct Customer {
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

/// No operations of its own; one link to a reservation
#[derive(Debug, Clone)]
struct Folio {
    id: i64,
    reservation: Option<String>,
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

#[derive(Debug, Clone)]
struct Invoice {
    id: i64,
}

impl Entity for Invoice {
    fn id(&self) -> EntityId {
        self.id.into()
    }

    fn fields(&self) -> Vec<Field> {
        Vec::new()
    }
}

fn check_in() -> Operation {
    Operation::new("checkIn", "Check the guest in", |r: &mut Reservation, _: &Arguments| {
        if r.checked_in {
            return Ok(format!("Reservation {} was already checked in", r.code).into());
        }
        r.checked_in = true;
        Ok(format!("Checked in reservation {}", r.code).into())
    })
}

fn extend_stay() -> Operation {
    Operation::new("extendStay", "Extend the stay", |r: &mut Reservation, args: &Arguments| {
        let nights: i64 = args.require("nights")?;
        r.nights += nights;
        Ok(format!("Reservation {} now runs {} nights", r.code, r.nights).into())
    })
    .with_param(ParamSpec::of::<i64>("nights", "Additional nights"))
}

fn is_checked_in() -> Operation {
    Operation::new(
        "isCheckedIn",
        "Whether the guest has arrived",
        |r: &mut Reservation, _: &Arguments| Outcome::value(&r.checked_in),
    )
    .read_only()
}

fn get_status() -> Operation {
    Operation::new("getStatus", "Loyalty level", |c: &mut Customer, _: &Arguments| {
        Outcome::value(&c.level)
    })
    .read_only()
}

struct Hotel {
    store: MemoryStore,
    runtime: Arc<ToolRuntime>,
}

fn hotel(view: ViewInterface, config: ToolingConfig) -> Hotel {
    let store = MemoryStore::new();
    store.insert(Reservation::new("R-42", "Ada Lovelace"));
    store.insert(Reservation::new("R-43", "Charles Babbage"));
    store.insert(Customer {
        id: 7,
        name: "Grace".to_string(),
        level: Level::Gold,
    });
    store.insert(Folio {
        id: 9,
        reservation: Some("R-42".to_string()),
    });

    let registry = ViewRegistry::builder()
        .register_view(view.into_shared())
        .unwrap()
        .entity_operations::<Customer>(vec![get_status()])
        .build();

    let mut locator = RepositoryLocator::new();
    locator
        .register(store.repository::<Reservation>(IdentifierKind::Text))
        .register(store.repository::<Customer>(IdentifierKind::Integer))
        .register(store.repository::<Folio>(IdentifierKind::Integer));

    let runtime = ToolRuntime::new(registry, locator, Arc::new(store.clone()))
        .with_config(config)
        .into_shared();
    Hotel { store, runtime }
}

fn check_in_only() -> Hotel {
    hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(check_in()),
        ToolingConfig::default(),
    )
}

fn names(tools: &[Arc<dyn EntityTool>]) -> Vec<String> {
    tools.iter().map(|t| t.name().to_string()).collect()
}

#[tokio::test]
async fn test_reservation_check_in_through_view() {
    let hotel = check_in_only();
    let reservation = hotel.store.get::<Reservation>("R-42").unwrap();

    let tools = hotel.runtime.tools_for(&reservation).unwrap();
    assert_eq!(names(&tools), vec!["checkIn"]);

    let first = tools[0].call("").await;
    assert!(first.is_success(), "{:?}", first.error());
    assert!(first.text().contains("R-42"));
    assert_eq!(first.metadata.entity.as_deref(), Some("Reservation#R-42"));

    let second = tools[0].call("{}").await;
    assert!(second.is_success());
    assert!(second.text().contains("already checked in"));

    assert!(hotel.store.get::<Reservation>("R-42").unwrap().checked_in);
    assert_eq!(hotel.store.commits(), 2);
}

#[tokio::test]
async fn test_customer_without_view_uses_entity_operations() {
    let hotel = check_in_only();
    let customer = hotel.store.get::<Customer>(7).unwrap();

    let tools = hotel.runtime.tools_for(&customer).unwrap();
    assert_eq!(names(&tools), vec!["getStatus"]);

    let result = tools[0].call("").await;
    assert!(result.is_success());
    assert_eq!(result.text(), "GOLD");
}

#[tokio::test]
async fn test_relation_discloses_target_tools() {
    let hotel = check_in_only();
    let folio = hotel.store.get::<Folio>(9).unwrap();

    let tools = hotel.runtime.tools_for(&folio).unwrap();
    assert_eq!(names(&tools), vec!["reservation"]);
    assert!(tools[0].inner_tools().is_empty());

    let result = tools[0].call("").await;
    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.metadata.disclosed_tools, vec!["checkIn"]);

    let inner = tools[0].inner_tools();
    assert_eq!(inner.len(), 1);
    assert!(inner[0].call("").await.is_success());
    assert!(hotel.store.get::<Reservation>("R-42").unwrap().checked_in);
}

#[tokio::test]
async fn test_finder_without_repository_fails_at_construction() {
    let hotel = check_in_only();
    let error = hotel
        .runtime
        .finder(EntityType::of::<Invoice>())
        .err()
        .unwrap();
    assert_eq!(error.subject(), "Invoice");
    assert!(error.to_string().contains("No repository registered"));
}

#[tokio::test]
async fn test_every_call_reloads_the_entity() {
    let hotel = check_in_only();
    let stale = hotel.store.get::<Reservation>("R-42").unwrap();
    let tools = hotel.runtime.tools_for(&stale).unwrap();

    // changed behind the tool's back after synthesis
    let mut fresh = Reservation::new("R-42", "Ada Lovelace");
    fresh.checked_in = true;
    hotel.store.insert(fresh);

    let result = tools[0].call("").await;
    assert!(result.text().contains("already checked in"));
}

#[tokio::test]
async fn test_removed_entity_reports_not_found_and_rolls_back() {
    let hotel = check_in_only();
    let reservation = hotel.store.get::<Reservation>("R-42").unwrap();
    let tools = hotel.runtime.tools_for(&reservation).unwrap();

    assert!(
        hotel
            .store
            .remove(EntityType::of::<Reservation>(), &EntityId::from("R-42"))
    );

    let result = tools[0].call("").await;
    assert!(!result.is_success());
    assert_eq!(result.error().unwrap().code, "NOT_FOUND");
    assert_eq!(hotel.store.rollbacks(), 1);
    assert_eq!(hotel.store.commits(), 0);
}

#[tokio::test]
async fn test_argument_round_trip_is_persisted() {
    let hotel = hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(check_in())
            .with_operation(extend_stay()),
        ToolingConfig::default(),
    );
    let reservation = hotel.store.get::<Reservation>("R-42").unwrap();
    let tools = hotel.runtime.tools_for(&reservation).unwrap();
    let extend = tools.iter().find(|t| t.name() == "extendStay").unwrap();

    let result = extend.call(r#"{"nights": 3}"#).await;
    assert_eq!(result.text(), "Reservation R-42 now runs 4 nights");
    assert_eq!(hotel.store.get::<Reservation>("R-42").unwrap().nights, 4);

    let rejected = extend.call(r#"{"nights": 2, "late": true}"#).await;
    assert_eq!(rejected.error().unwrap().code, "INVALID_ARGUMENT");
    assert_eq!(hotel.store.get::<Reservation>("R-42").unwrap().nights, 4);
}

#[tokio::test]
async fn test_lenient_input_ignores_unknown_arguments() {
    let hotel = hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(extend_stay()),
        ToolingConfig::default().with_input_policy(InputPolicy::Lenient),
    );
    let reservation = hotel.store.get::<Reservation>("R-43").unwrap();
    let tools = hotel.runtime.tools_for(&reservation).unwrap();

    let result = tools[0].call(r#"{"nights": "2", "late": true}"#).await;
    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(hotel.store.get::<Reservation>("R-43").unwrap().nights, 3);
}

#[tokio::test]
async fn test_finder_overwrites_inner_tools_on_second_lookup() {
    let hotel = check_in_only();
    let finder = hotel.runtime.finder(EntityType::of::<Reservation>()).unwrap();
    assert_eq!(finder.name(), "find_reservation");
    assert!(finder.remove_on_invoke());

    let first = finder.call(r#"{"id": "R-42"}"#).await;
    assert!(first.is_success());
    assert_eq!(first.metadata.entity.as_deref(), Some("Reservation#R-42"));

    let second = finder.call("\"R-43\"").await;
    assert!(second.is_success());
    assert_eq!(second.metadata.entity.as_deref(), Some("Reservation#R-43"));

    let inner = finder.inner_tools();
    assert_eq!(names(&inner), vec!["checkIn"]);
    let result = inner[0].call("").await;
    assert!(result.text().contains("R-43"));
    assert!(!hotel.store.get::<Reservation>("R-42").unwrap().checked_in);
}

#[tokio::test]
async fn test_tool_set_discards_finder_after_use() {
    let hotel = check_in_only();
    let finder = hotel.runtime.finder(EntityType::of::<Customer>()).unwrap();
    let mut tools = ToolSet::new().with_tool(Arc::new(finder));

    let missing = tools.call("find_customer", r#"{"id": 99}"#).await;
    assert_eq!(missing.error().unwrap().code, "NOT_FOUND");
    assert!(tools.contains("find_customer"));

    let found = tools.call("find_customer", "7").await;
    assert!(found.is_success());
    assert!(!tools.contains("find_customer"));
    assert_eq!(tools.names(), vec!["getStatus"]);

    let status = tools.call("getStatus", "").await;
    assert_eq!(status.text(), "GOLD");
}

#[tokio::test]
async fn test_templates_and_invocation_log() {
    let dir = tempfile::tempdir().unwrap();
    let templates = DirectoryTemplateRenderer::from_map(HashMap::from([(
        "Reservation_short".to_string(),
        "Reservation {{id}} for {{entity.guest}}".to_string(),
    )]))
    .unwrap();
    let log_path = dir.path().join("invocations.jsonl");
    let logger = JsonlInvocationLogger::new(&log_path).unwrap();

    let base = check_in_only();
    let runtime = Arc::new(
        ToolRuntime::new(
            Arc::clone(base.runtime.registry()),
            base.runtime.repositories().clone(),
            Arc::new(base.store.clone()),
        )
        .with_templates(Arc::new(templates))
        .with_logger(Arc::new(logger)),
    );

    let finder = runtime.finder(EntityType::of::<Reservation>()).unwrap();
    let result = finder.call("R-42").await;
    assert!(result.is_success());
    assert!(
        result
            .text()
            .starts_with("Reservation R-42 for Ada Lovelace")
    );
    assert!(result.text().contains("checkIn"));

    drop(finder);
    drop(runtime);
    let records: Vec<serde_json::Value> = std::fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["tool"], "find_reservation");
    assert_eq!(records[0]["entity"], "Reservation");
    assert_eq!(records[0]["success"], true);
}

#[tokio::test]
async fn test_read_tool_observes_mutation_by_another_tool() {
    let hotel = hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(check_in())
            .with_operation(is_checked_in()),
        ToolingConfig::default(),
    );
    let finder = hotel.runtime.finder(EntityType::of::<Reservation>()).unwrap();
    let mut tools = ToolSet::new().with_tool(Arc::new(finder));

    assert!(tools.call("find_reservation", "R-42").await.is_success());
    assert_eq!(tools.call("isCheckedIn", "").await.text(), "false");
    assert!(tools.call("checkIn", "").await.is_success());
    assert_eq!(tools.call("isCheckedIn", "").await.text(), "true");
    assert_eq!(hotel.store.commits(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_never_lose_committed_updates() {
    let hotel = hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(extend_stay()),
        ToolingConfig::default(),
    );
    let reservation = hotel.store.get::<Reservation>("R-42").unwrap();
    let extend = hotel.runtime.tools_for(&reservation).unwrap().remove(0);

    let calls: Vec<_> = (0..16)
        .map(|_| {
            let extend = Arc::clone(&extend);
            tokio::spawn(async move { extend.call(r#"{"nights": 1}"#).await })
        })
        .collect();

    let mut succeeded = 0;
    for call in calls {
        let result = call.await.unwrap();
        match result.error() {
            None => succeeded += 1,
            Some(error) => {
                assert_eq!(error.code, "EXECUTION_FAILED");
                assert!(error.message.contains("conflict"), "{}", error.message);
            }
        }
    }

    assert!(succeeded >= 1);
    let nights = hotel.store.get::<Reservation>("R-42").unwrap().nights;
    assert_eq!(nights, 1 + succeeded);
    assert_eq!(hotel.store.commits() as i64, succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_runtime_serves_finders_concurrently() {
    let hotel = check_in_only();
    let lookups: Vec<_> = ["R-42", "R-43"]
        .into_iter()
        .cycle()
        .take(20)
        .map(|code| {
            let runtime = Arc::clone(&hotel.runtime);
            tokio::spawn(async move {
                let finder = runtime.finder(EntityType::of::<Reservation>()).unwrap();
                let (result, tools) = finder.call_disclosing(code).await;
                (code, result, tools)
            })
        })
        .collect();

    for lookup in lookups {
        let (code, result, tools) = lookup.await.unwrap();
        assert!(result.is_success(), "{:?}", result.error());
        let label = format!("Reservation#{}", code);
        assert_eq!(tools[0].entity(), Some(label));
    }
}

#[tokio::test]
async fn test_bound_operation_reports_template_summary() {
    let describe = Operation::bound(
        "describe",
        "Describe the booking",
        |r: &mut Bound<'_, Reservation>, _: &Arguments| Ok(r.summary().into()),
    )
    .read_only();
    let templates = DirectoryTemplateRenderer::from_map(HashMap::from([(
        "Reservation_short".to_string(),
        "{{entity.guest}} ({{entity.nights}} nights)".to_string(),
    )]))
    .unwrap();

    let base = hotel(
        ViewInterface::for_entity::<Reservation>("ReservationView")
            .marked("Hotel reservations")
            .with_operation(describe),
        ToolingConfig::default(),
    );
    let runtime = Arc::new(
        ToolRuntime::new(
            Arc::clone(base.runtime.registry()),
            base.runtime.repositories().clone(),
            Arc::new(base.store.clone()),
        )
        .with_templates(Arc::new(templates)),
    );

    let reservation = base.store.get::<Reservation>("R-43").unwrap();
    let tools = runtime.tools_for(&reservation).unwrap();
    let result = tools[0].call("").await;
    assert_eq!(result.text(), "Charles Babbage (1 nights)");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn finder_resolves_any_stored_customer(id in any::<i64>(), name in "[A-Za-z ]{1,24}") {
            let hotel = check_in_only();
            hotel.store.insert(Customer { id, name, level: Level::Gold });
            let finder = hotel.runtime.finder(EntityType::of::<Customer>()).unwrap();

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let result = runtime.block_on(finder.call(&id.to_string()));

            prop_assert!(result.is_success(), "{:?}", result.error());
            let label = format!("Customer#{}", id);
            prop_assert_eq!(result.metadata.entity.as_deref(), Some(label.as_str()));
            let expected_prefix = format!("Customer (id={})", id);
            prop_assert!(result.text().starts_with(&expected_prefix));
        }
    }
}
