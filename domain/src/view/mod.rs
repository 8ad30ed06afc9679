//! View domain module
//!
//! Views are how an entity is presented to an LLM agent: a short summary, a
//! long full text, and a set of callable [`Operation`]s. The declarations live
//! here as plain data; binding a declaration to a live entity happens in the
//! application layer's view factory.
//!
//! # Key Types
//!
//! - [`ViewInterface`] - declared view contract (entity parameter, extends chain,
//!   marker description, summary/full-text behavior, operations)
//! - [`ViewModule`] - a named group of interfaces, scanned at startup
//! - [`Operation`] - an LLM-callable operation with typed [`ParamSpec`]s
//! - [`ViewContext`] - the view an operation is invoked through; typed
//!   handlers see it as a [`Bound`] entity
//! - [`Arguments`] - parsed, positional tool input
//! - [`Outcome`] - what an operation returns, before result conversion

pub mod arguments;
pub mod context;
pub mod interface;
pub mod operation;

pub use arguments::{ArgumentError, Arguments, InputPolicy};
pub use context::{Bound, Detached, ViewContext, default_full_text, default_summary};
pub use interface::{ViewInterface, ViewModule};
pub use operation::{DeclaredType, Operation, OperationError, Outcome, ParamSpec};
