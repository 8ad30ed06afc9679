//! Operations - the LLM-callable behavior of a view or entity
//!
//! An [`Operation`] is the declarative counterpart of an annotated method:
//! a name (optionally overridden for the tool), a description, ordered typed
//! parameters, a risk level, and a handler. Handlers are registered typed
//! (`Fn(&mut Reservation, &Arguments)`) and stored type-erased so a registry
//! can hold operations for every entity type in one table.
//!
//! Handlers declared with [`Operation::bound`] also see the view they were
//! invoked through, as a [`Bound`] entity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::arguments::Arguments;
use super::context::{Bound, Detached, ViewContext};
use crate::entity::{Entity, EntityType, downcast_mut};
use crate::tool::{ParamType, RiskLevel, ToolResult};

type Handler =
    dyn Fn(&mut dyn Entity, &dyn ViewContext, &Arguments) -> Result<Outcome, OperationError>
        + Send
        + Sync;

/// A failure raised by an operation handler.
///
/// The optional source chain is walked by [`root_cause_message`](Self::root_cause_message)
/// so the agent sees the underlying cause rather than a wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct OperationError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it as the source
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message of the innermost error in the source chain
    pub fn root_cause_message(&self) -> String {
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }
}

impl From<serde_json::Error> for OperationError {
    fn from(error: serde_json::Error) -> Self {
        OperationError::with_source("Could not serialize operation result", error)
    }
}

/// Value returned by an operation handler, before conversion to a [`ToolResult`].
#[derive(Debug)]
pub enum Outcome {
    /// No value; converts to empty text
    Empty,
    /// Text, passed through verbatim
    Text(String),
    /// A ready-made result, passed through unchanged
    Result(ToolResult),
    /// An entity; reduced to its view summary when a view is registered
    Entity(Box<dyn Entity>),
    /// Several entities; reduced to a list of summaries
    Entities(Vec<Box<dyn Entity>>),
    /// Any other value; serialized to JSON text
    Value(serde_json::Value),
}

impl Outcome {
    pub fn text(text: impl Into<String>) -> Self {
        Outcome::Text(text.into())
    }

    pub fn entity<E: Entity>(entity: E) -> Self {
        Outcome::Entity(Box::new(entity))
    }

    /// Serialize any value as a structured outcome
    pub fn value<T: Serialize>(value: &T) -> Result<Self, OperationError> {
        Ok(Outcome::Value(serde_json::to_value(value)?))
    }
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        Outcome::Text(value)
    }
}

impl From<&str> for Outcome {
    fn from(value: &str) -> Self {
        Outcome::Text(value.to_string())
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Empty
    }
}

impl From<ToolResult> for Outcome {
    fn from(value: ToolResult) -> Self {
        Outcome::Result(value)
    }
}

/// Declared parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub param_type: ParamType,
    /// Parameters are required unless explicitly marked optional
    pub optional: bool,
}

impl ParamSpec {
    pub fn new(
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type,
            optional: false,
        }
    }

    /// Parameter whose semantic type is derived from the Rust type `T`
    pub fn of<T: DeclaredType>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, T::param_type(), description)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Maps a declared Rust parameter type to its semantic [`ParamType`].
pub trait DeclaredType {
    fn param_type() -> ParamType;
}

macro_rules! declared_type {
    ($param:expr => $($ty:ty),+) => {
        $(impl DeclaredType for $ty {
            fn param_type() -> ParamType {
                $param
            }
        })+
    };
}

declared_type!(ParamType::Text => String, &str, char, uuid::Uuid, chrono::NaiveDate);
declared_type!(ParamType::Text => chrono::DateTime<chrono::Utc>);
declared_type!(ParamType::Integer => i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);
declared_type!(ParamType::Number => f32, f64, rust_decimal::Decimal);
declared_type!(ParamType::Boolean => bool);
declared_type!(ParamType::Object => serde_json::Value, serde_json::Map<String, serde_json::Value>);

impl<T: DeclaredType> DeclaredType for Vec<T> {
    fn param_type() -> ParamType {
        ParamType::array_of(T::param_type())
    }
}

impl<T: DeclaredType> DeclaredType for Option<T> {
    fn param_type() -> ParamType {
        T::param_type()
    }
}

impl<V> DeclaredType for HashMap<String, V> {
    fn param_type() -> ParamType {
        ParamType::Object
    }
}

/// An LLM-callable operation declared on a view interface or entity type.
#[derive(Clone)]
pub struct Operation {
    name: String,
    tool_name: Option<String>,
    description: String,
    params: Vec<ParamSpec>,
    risk_level: RiskLevel,
    handler: Arc<Handler>,
}

impl Operation {
    /// Declare an operation on entities of type `E`.
    ///
    /// Operations default to [`RiskLevel::High`]; mark read-only ones with
    /// [`read_only`](Self::read_only).
    pub fn new<E, F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        E: Entity,
        F: Fn(&mut E, &Arguments) -> Result<Outcome, OperationError> + Send + Sync + 'static,
    {
        Self::typed::<E, _>(name.into(), description, move |entity, _view, args| {
            handler(entity, args)
        })
    }

    /// Declare an operation on entities of type `E` that also reaches the
    /// view it is invoked through: its summary and full text, and the views
    /// of related entities.
    pub fn bound<E, F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        E: Entity,
        F: for<'v> Fn(&mut Bound<'v, E>, &Arguments) -> Result<Outcome, OperationError>
            + Send
            + Sync
            + 'static,
    {
        Self::typed::<E, _>(name.into(), description, move |entity, view, args| {
            handler(&mut Bound::new(entity, view), args)
        })
    }

    /// Declare an operation that works on any entity type
    pub fn dynamic<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut dyn Entity, &Arguments) -> Result<Outcome, OperationError>
            + Send
            + Sync
            + 'static,
    {
        let erased = move |entity: &mut dyn Entity, _view: &dyn ViewContext, args: &Arguments| {
            handler(entity, args)
        };
        Self::from_handler(name.into(), description, Arc::new(erased))
    }

    fn typed<E, F>(name: String, description: impl Into<String>, handler: F) -> Self
    where
        E: Entity,
        F: Fn(&mut E, &dyn ViewContext, &Arguments) -> Result<Outcome, OperationError>
            + Send
            + Sync
            + 'static,
    {
        let op_name = name.clone();
        let erased = move |entity: &mut dyn Entity, view: &dyn ViewContext, args: &Arguments| {
            let actual = entity.entity_type();
            match downcast_mut::<E>(entity) {
                Some(typed) => handler(typed, view, args),
                None => Err(OperationError::new(format!(
                    "Operation '{}' is declared for {} but was invoked on {}",
                    op_name,
                    EntityType::of::<E>(),
                    actual
                ))),
            }
        };
        Self::from_handler(name, description, Arc::new(erased))
    }

    fn from_handler(name: String, description: impl Into<String>, handler: Arc<Handler>) -> Self {
        Self {
            name,
            tool_name: None,
            description: description.into(),
            params: Vec::new(),
            risk_level: RiskLevel::High,
            handler,
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Override the tool name presented to the agent
    pub fn named(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.risk_level = RiskLevel::Low;
        self
    }

    /// Declared operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool name: the explicit override, or the operation name
    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or(&self.name)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Invoke on a bare entity; bound handlers see the default texts
    pub fn invoke(
        &self,
        entity: &mut dyn Entity,
        args: &Arguments,
    ) -> Result<Outcome, OperationError> {
        self.invoke_in(entity, &Detached, args)
    }

    /// Invoke through a view
    pub fn invoke_in(
        &self,
        entity: &mut dyn Entity,
        view: &dyn ViewContext,
        args: &Arguments,
    ) -> Result<Outcome, OperationError> {
        (self.handler)(entity, view, args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("tool_name", &self.tool_name)
            .field("params", &self.params)
            .field("risk_level", &self.risk_level)
            .finish_non_exhaustive()
    }
}
