//! Query subsystem
//!
//! Parses query objects (`$orderby`, filters, `$skip`, `$limit`, `$fields`)
//! and runs them over a resource's documents.
//!
//! # Invariants
//!
//! - Sorting is stable; ties keep insertion order
//! - An empty query returns the collection in insertion order
//! - Sort keys outside the schema are ignored

mod errors;
mod executor;
mod filter;
mod parser;
mod sorter;
mod spec;

pub use errors::{QueryError, QueryResult};
pub use executor::{execute_query, QueryExecutor};
pub use filter::{FilterExpr, FilterOp, FilterSet};
pub use parser::{parse_params, parse_query, QUERY_PARAM};
pub use sorter::ResultSorter;
pub use spec::{Projection, QuerySpec, SortDirection, SortSpec};
