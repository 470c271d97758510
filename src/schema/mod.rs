//! Schema subsystem
//!
//! A schema is the allow-list of fields a resource accepts. It is defined
//! once at startup and then used to validate and coerce every write.
//!
//! # Design Principles
//!
//! - Undeclared fields are dropped, never stored
//! - Values are coerced to the declared type (`"3"` → `3`)
//! - "No value" (null, "") is a distinct state from `0` / `false`
//! - Partial updates validate only what they touch

mod coerce;
mod errors;
mod loader;
mod types;
mod validator;

pub use coerce::{coerce, format_date, parse_date};
pub use errors::{FieldError, SchemaError, SchemaResult, ValidationErrors, ROOT_PATH};
pub use loader::{parse_resource, SchemaLoader, CONFIG_FILE};
pub use types::{FieldDef, FieldType, Schema, ID_FIELD};
pub use validator::SchemaValidator;
