//! Entity value objects - inspectable field values
//!
//! [`FieldValue`] is the stand-in for accessor reflection: each entity lists
//! its fields with a typed value, and the view layer decides what to render.
//!
//! | Variant | Full text | Tool synthesis |
//! |---------|-----------|----------------|
//! | simple (`Bool` … `Uuid`, `Null`) | `name: value` | - |
//! | `Collection` | `name: N items` | - |
//! | `Relation` | omitted | nested relation tool |
//! | `Object` | omitted | - |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::entities::{Entity, EntityId, EntityType};

/// A named field of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// A single-valued reference to another entity of type `E`
    pub fn relation<E: Entity>(name: &'static str, id: Option<EntityId>) -> Self {
        Self {
            name,
            value: FieldValue::Relation {
                target: EntityType::of::<E>(),
                id,
            },
        }
    }

    /// A collection of related entities, reported by size only
    pub fn collection(name: &'static str, len: usize) -> Self {
        Self {
            name,
            value: FieldValue::Collection(len),
        }
    }
}

/// Typed value of an entity field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    /// Enum variant name (e.g. `"Gold"`)
    Enum(&'static str),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    Uuid(Uuid),
    /// Collection of related entities
    Collection(usize),
    /// Single-valued relation, held by identifier
    Relation {
        target: EntityType,
        id: Option<EntityId>,
    },
    /// Complex embedded value; never inlined into full text
    Object(serde_json::Value),
}

impl FieldValue {
    /// Whether this value renders as a plain `name: value` line
    pub fn is_simple(&self) -> bool {
        !matches!(
            self,
            FieldValue::Collection(_) | FieldValue::Relation { .. } | FieldValue::Object(_)
        )
    }

    /// Text used in reflection-based full text, `None` for omitted values
    pub fn render(&self) -> Option<String> {
        let text = match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Float(x) => x.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Enum(v) => (*v).to_string(),
            FieldValue::Date(d) => d.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::LocalDateTime(dt) => dt.to_string(),
            FieldValue::Uuid(u) => u.to_string(),
            FieldValue::Collection(len) => format!("{} items", len),
            FieldValue::Relation { .. } | FieldValue::Object(_) => return None,
        };
        Some(text)
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Decimal(d) => Value::String(d.to_string()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Enum(v) => Value::String((*v).to_string()),
            FieldValue::Date(d) => Value::String(d.to_string()),
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            FieldValue::LocalDateTime(dt) => Value::String(dt.to_string()),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::Collection(len) => Value::from(*len),
            FieldValue::Relation { id, .. } => {
                id.as_ref().map(EntityId::to_json).unwrap_or(Value::Null)
            }
            FieldValue::Object(v) => v.clone(),
        }
    }

    /// Identifier held by a relation field
    pub fn relation_id(&self) -> Option<&EntityId> {
        match self {
            FieldValue::Relation { id, .. } => id.as_ref(),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::LocalDateTime(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
