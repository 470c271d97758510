//! Query executor
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter documents (AND of all filters)
//! 2. Sort (stable, multi-key)
//! 3. Apply skip
//! 4. Apply limit
//! 5. Apply field projection
//!
//! Execution is eager and pure over the documents handed in.

use super::sorter::ResultSorter;
use super::spec::{Projection, QuerySpec};
use crate::document::Document;
use crate::schema::Schema;

/// Runs query specs over in-memory collections of one resource
pub struct QueryExecutor<'a> {
    schema: &'a Schema,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Executes a query over documents given in insertion order.
    pub fn execute(&self, documents: Vec<Document>, spec: &QuerySpec) -> Vec<Document> {
        let mut results: Vec<Document> = if spec.filters.is_empty() {
            documents
        } else {
            documents
                .into_iter()
                .filter(|doc| spec.filters.matches(doc))
                .collect()
        };

        ResultSorter::sort(&mut results, &spec.sort, self.schema);

        let results = results.into_iter().skip(spec.skip);
        let mut results: Vec<Document> = match spec.limit {
            Some(limit) => results.take(limit).collect(),
            None => results.collect(),
        };

        if spec.fields != Projection::All {
            for doc in &mut results {
                doc.retain(|field| spec.fields.keeps(field));
            }
        }

        results
    }
}

/// Convenience wrapper around [`QueryExecutor::execute`]
pub fn execute_query(schema: &Schema, documents: Vec<Document>, spec: &QuerySpec) -> Vec<Document> {
    QueryExecutor::new(schema).execute(documents, spec)
}
