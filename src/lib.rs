//! resourcekit - schema-validated REST resources
//!
//! A resource is a named JSON document collection with a declared schema.
//! Writes are coerced and validated against it, updates are partial, and
//! reads accept a query object for filtering, ordering and paging.

pub mod cli;
pub mod config;
pub mod document;
pub mod http;
pub mod query;
pub mod resource;
pub mod schema;

pub use document::{Document, FieldMap};
pub use resource::{Resource, ResourceError, ResourceRegistry};
pub use schema::{FieldDef, FieldType, Schema};
