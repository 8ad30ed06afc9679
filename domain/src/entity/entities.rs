//! Entity domain entities

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use super::value_objects::Field;
use crate::core::string::simple_type_name;

/// Upcast helper so `dyn Entity` can be downcast to its concrete type.
///
/// Implemented for every `'static` type. Call it on `&dyn Entity`, never on
/// `&Box<dyn Entity>` (the box itself is `Any` too); prefer [`downcast_ref`]
/// and [`downcast_mut`].
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Object-safe clone for boxed entities.
pub trait CloneEntity {
    fn clone_entity(&self) -> Box<dyn Entity>;
}

impl<T: Entity + Clone> CloneEntity for T {
    fn clone_entity(&self) -> Box<dyn Entity> {
        Box::new(self.clone())
    }
}

/// A persisted domain object.
///
/// Implementations describe their identifier and their fields; everything
/// else (summaries, full text, tools) is derived from these two methods plus
/// the declarations held by the view registry.
pub trait Entity: AsAny + CloneEntity + fmt::Debug + Send + Sync {
    /// Stable identifier of this instance
    fn id(&self) -> EntityId;

    /// Inspectable fields, in declaration order
    fn fields(&self) -> Vec<Field>;

    /// Runtime type of this entity
    fn entity_type(&self) -> EntityType {
        EntityType::of::<Self>()
    }

    /// Look up a single field by name
    fn field(&self, name: &str) -> Option<Field> {
        self.fields().into_iter().find(|f| f.name == name)
    }

    /// Structured rendering used when an entity without a view must be serialized
    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), self.id().to_json());
        for field in self.fields() {
            map.insert(field.name.to_string(), field.value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

/// Borrow a `dyn Entity` as its concrete type.
pub fn downcast_ref<E: Entity>(entity: &dyn Entity) -> Option<&E> {
    entity.as_any().downcast_ref::<E>()
}

/// Mutably borrow a `dyn Entity` as its concrete type.
pub fn downcast_mut<E: Entity>(entity: &mut dyn Entity) -> Option<&mut E> {
    entity.as_any_mut().downcast_mut::<E>()
}

/// Runtime identity of an entity type.
///
/// Equality and hashing use the `TypeId` only; the simple name is carried for
/// messages, template keys and tool names.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    pub fn of<E: Entity + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: simple_type_name(std::any::type_name::<E>()),
        }
    }

    /// Simple (unqualified) type name, e.g. `"Reservation"`
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn is<E: Entity>(&self) -> bool {
        self.id == TypeId::of::<E>()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifier of a persisted entity.
///
/// Deserializes from a JSON number (`42`), a UUID string, or any other string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Integer(i64),
    Uuid(Uuid),
    Text(String),
}

impl EntityId {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            EntityId::Integer(_) => IdentifierKind::Integer,
            EntityId::Uuid(_) => IdentifierKind::Uuid,
            EntityId::Text(_) => IdentifierKind::Text,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            EntityId::Integer(n) => serde_json::Value::from(*n),
            EntityId::Uuid(u) => serde_json::Value::String(u.to_string()),
            EntityId::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Integer(n) => write!(f, "{}", n),
            EntityId::Uuid(u) => write!(f, "{}", u),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Integer(value)
    }
}

impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        EntityId::Integer(i64::from(value))
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        EntityId::Uuid(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

/// Declared identifier type of an entity's repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Integer,
    Text,
    Uuid,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &str {
        match self {
            IdentifierKind::Integer => "integer",
            IdentifierKind::Text => "text",
            IdentifierKind::Uuid => "uuid",
        }
    }

    /// Coerce a JSON value to an identifier of this kind.
    ///
    /// Numbers and numeric strings are both accepted for integer ids; numbers
    /// are accepted for text ids.
    pub fn coerce(&self, value: &serde_json::Value) -> Result<EntityId, String> {
        use serde_json::Value;

        match (self, value) {
            (IdentifierKind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(EntityId::Integer)
                .ok_or_else(|| format!("'{}' is not an integer identifier", n)),
            (IdentifierKind::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(EntityId::Integer)
                .map_err(|_| format!("'{}' is not an integer identifier", s)),
            (IdentifierKind::Text, Value::String(s)) => Ok(EntityId::Text(s.clone())),
            (IdentifierKind::Text, Value::Number(n)) => Ok(EntityId::Text(n.to_string())),
            (IdentifierKind::Uuid, Value::String(s)) => Uuid::parse_str(s.trim())
                .map(EntityId::Uuid)
                .map_err(|_| format!("'{}' is not a UUID identifier", s)),
            (kind, other) => Err(format!(
                "expected a {} identifier, got {}",
                kind.as_str(),
                other
            )),
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::value_objects::FieldValue;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Ticket {
        id: i64,
        title: String,
    }

    impl Entity for Ticket {
        fn id(&self) -> EntityId {
            self.id.into()
        }

        fn fields(&self) -> Vec<Field> {
            vec![Field::new("title", self.title.as_str())]
        }
    }

    #[test]
    fn test_entity_type_uses_simple_name() {
        let ticket = Ticket {
            id: 7,
            title: "Broken lamp".to_string(),
        };
        assert_eq!(ticket.entity_type().name(), "Ticket");
        assert_eq!(ticket.entity_type(), EntityType::of::<Ticket>());
        assert!(ticket.entity_type().is::<Ticket>());
    }

    #[test]
    fn test_dyn_entity_keeps_concrete_type() {
        let boxed: Box<dyn Entity> = Box::new(Ticket {
            id: 7,
            title: "Broken lamp".to_string(),
        });
        assert_eq!(boxed.entity_type(), EntityType::of::<Ticket>());
        assert!(downcast_ref::<Ticket>(boxed.as_ref()).is_some());

        let cloned = boxed.clone_entity();
        assert_eq!(cloned.id(), EntityId::Integer(7));
    }

    #[test]
    fn test_field_lookup_and_json() {
        let ticket = Ticket {
            id: 7,
            title: "Broken lamp".to_string(),
        };
        assert!(matches!(
            ticket.field("title").map(|f| f.value),
            Some(FieldValue::Text(t)) if t == "Broken lamp"
        ));
        assert_eq!(ticket.to_json(), json!({"id": 7, "title": "Broken lamp"}));
    }

    #[test]
    fn test_entity_id_deserializes_untagged() {
        let n: EntityId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(n, EntityId::Integer(42));

        let s: EntityId = serde_json::from_value(json!("R-42")).unwrap();
        assert_eq!(s, EntityId::Text("R-42".to_string()));

        let u: EntityId =
            serde_json::from_value(json!("6f1c1f6e-8f33-4c1e-9a53-8d1f3b2f6a10")).unwrap();
        assert_eq!(u.kind(), IdentifierKind::Uuid);
    }

    #[test]
    fn test_identifier_kind_coercion() {
        assert_eq!(
            IdentifierKind::Integer.coerce(&json!("17")),
            Ok(EntityId::Integer(17))
        );
        assert_eq!(
            IdentifierKind::Text.coerce(&json!(17)),
            Ok(EntityId::Text("17".to_string()))
        );
        assert!(IdentifierKind::Integer.coerce(&json!("R-42")).is_err());
        assert!(IdentifierKind::Uuid.coerce(&json!("nope")).is_err());
        assert!(IdentifierKind::Text.coerce(&json!(true)).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    fn arb_uuid() -> impl Strategy<Value = Uuid> {
        prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
    }

    proptest! {
        #[test]
        fn integer_ids_coerce_from_numbers_and_strings(n in any::<i64>()) {
            prop_assert_eq!(IdentifierKind::Integer.coerce(&json!(n)), Ok(EntityId::Integer(n)));
            prop_assert_eq!(
                IdentifierKind::Integer.coerce(&json!(n.to_string())),
                Ok(EntityId::Integer(n))
            );
            prop_assert_eq!(EntityId::Integer(n).to_json(), json!(n));
        }

        #[test]
        fn text_ids_are_kept_verbatim(s in any::<String>()) {
            let id = IdentifierKind::Text.coerce(&Value::String(s.clone()));
            prop_assert_eq!(id, Ok(EntityId::Text(s.clone())));
            prop_assert_eq!(EntityId::Text(s.clone()).to_string(), s);
        }

        #[test]
        fn uuid_ids_round_trip_through_json(u in arb_uuid()) {
            let id = EntityId::Uuid(u);
            prop_assert_eq!(IdentifierKind::Uuid.coerce(&id.to_json()), Ok(id.clone()));
            let back: EntityId = serde_json::from_value(id.to_json()).unwrap();
            prop_assert_eq!(back, id);
        }
    }
}
