//! Resource subsystem
//!
//! A resource is a schema bound to a document store. The façade validates
//! writes, merges partial updates under a per-id lock and runs queries
//! over the stored collection.

mod errors;
mod facade;
mod locks;
mod registry;
mod store;

pub use errors::{ResourceError, ResourceResult, StoreError, StoreResult};
pub use facade::{RequestPhase, Resource};
pub use locks::KeyedLocks;
pub use registry::ResourceRegistry;
pub use store::{DocumentStore, InMemoryStore};
