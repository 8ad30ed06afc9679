//! Entity domain module
//!
//! An **entity** is a persisted domain object with a stable identifier. The
//! persistence layer owns entities; this crate only describes how they can be
//! inspected so that views, summaries and tools can be derived from them.
//!
//! ```text
//! ┌──────────────┐   fields()   ┌──────────────────────────────┐
//! │ dyn Entity   │─────────────▶│ Field { name, FieldValue }   │
//! │  id()        │              │  simple  → "name: value"      │
//! │  entity_type │              │  collection → "name: N items" │
//! └──────────────┘              │  relation → navigation tool   │
//!                               └──────────────────────────────┘
//! ```
//!
//! Relations are carried by identifier ([`FieldValue::Relation`]), never by
//! live reference, so an entity can be handed across a slow boundary as an
//! [`EntityId`] and reloaded when fast, transactional work is about to run.

pub mod entities;
pub mod value_objects;

pub use entities::{
    AsAny, CloneEntity, Entity, EntityId, EntityType, IdentifierKind, downcast_mut, downcast_ref,
};
pub use value_objects::{Field, FieldValue};
