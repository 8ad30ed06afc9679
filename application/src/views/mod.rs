//! Views: the registry, repository lookup and the view factory
//!
//! ```text
//! ViewRegistry ──▶ ViewFactory::view_of(entity) ──▶ View
//!   (built once)        (template → declared → default text)
//! ```

pub mod factory;
pub mod locator;
pub mod registry;

pub use factory::{View, ViewFactory, default_full_text, default_summary};
pub use locator::RepositoryLocator;
pub use registry::{ViewDescriptor, ViewRegistry, ViewRegistryBuilder};
