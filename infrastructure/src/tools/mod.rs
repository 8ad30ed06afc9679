//! Tool export adapters

mod schema;

pub use schema::JsonSchemaToolConverter;
