//! # Resource Façade
//!
//! Binds one schema to one store and exposes create / read / list /
//! update / delete. Transports translate their requests into these calls.
//!
//! Request lifecycle:
//!
//! ```text
//! received -> validating -> persisting -> complete
//!                       \-> rejected
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::errors::{ResourceError, ResourceResult};
use super::locks::KeyedLocks;
use super::store::{DocumentStore, InMemoryStore};
use crate::document::Document;
use crate::query::{parse_query, QueryExecutor, QuerySpec};
use crate::schema::{Schema, SchemaValidator, ValidationErrors};

/// Where a request currently is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Validating,
    Persisting,
    Complete,
    Rejected,
}

impl RequestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPhase::Received => "received",
            RequestPhase::Validating => "validating",
            RequestPhase::Persisting => "persisting",
            RequestPhase::Complete => "complete",
            RequestPhase::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, schema-validated collection
pub struct Resource<S: DocumentStore = InMemoryStore> {
    schema: Arc<Schema>,
    store: S,
    locks: KeyedLocks,
}

impl Resource<InMemoryStore> {
    /// Creates a resource backed by a fresh in-memory store
    pub fn in_memory(schema: Schema) -> Self {
        Self::new(schema, InMemoryStore::new())
    }
}

impl<S: DocumentStore> Resource<S> {
    pub fn new(schema: Schema, store: S) -> Self {
        Self {
            schema: Arc::new(schema),
            store,
            locks: KeyedLocks::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.resource
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates `input` and stores it under a new id.
    ///
    /// # Errors
    ///
    /// `ResourceError::Validation` with every failing field; nothing is
    /// stored in that case.
    pub fn create(&self, input: &Value) -> ResourceResult<Document> {
        self.phase("create", RequestPhase::Received);
        self.phase("create", RequestPhase::Validating);

        let fields = SchemaValidator::new(&self.schema)
            .validate(input)
            .map_err(|errors| self.reject("create", errors))?;

        self.phase("create", RequestPhase::Persisting);
        let document = self.store.insert(fields)?;

        debug!(resource = %self.name(), id = %document.id(), phase = %RequestPhase::Complete, "create");
        Ok(document)
    }

    /// Fetches one document; an absent id is `Ok(None)`.
    pub fn read(&self, id: &str) -> ResourceResult<Option<Document>> {
        self.phase("read", RequestPhase::Received);
        let document = self.store.get(id)?;
        self.phase("read", RequestPhase::Complete);
        Ok(document)
    }

    /// Runs a parsed query over the collection
    pub fn list(&self, spec: &QuerySpec) -> ResourceResult<Vec<Document>> {
        self.phase("list", RequestPhase::Received);
        let documents = self.store.all()?;
        let results = QueryExecutor::new(&self.schema).execute(documents, spec);
        debug!(resource = %self.name(), count = results.len(), phase = %RequestPhase::Complete, "list");
        Ok(results)
    }

    /// Parses a JSON query object and runs it
    pub fn query(&self, query: &Value) -> ResourceResult<Vec<Document>> {
        let spec = parse_query(&self.schema, query)?;
        self.list(&spec)
    }

    /// Applies a partial update to an existing document.
    ///
    /// The fetch, merge and replace run under the lock for `id`.
    ///
    /// # Errors
    ///
    /// - `MissingId` when `id` is absent or empty
    /// - `NotFound` when no document has that id
    /// - `Validation` when a supplied field fails; the stored document is
    ///   left as it was
    pub fn update(&self, id: Option<&str>, partial: &Value) -> ResourceResult<Document> {
        self.phase("update", RequestPhase::Received);
        let id = self.require_id("update", id)?;

        self.locks.with_lock(id, || -> ResourceResult<Document> {
            let existing = self.store.get(id)?.ok_or_else(|| {
                self.phase("update", RequestPhase::Rejected);
                ResourceError::NotFound {
                    resource: self.name().to_string(),
                    id: id.to_string(),
                }
            })?;

            self.phase("update", RequestPhase::Validating);
            let merged = SchemaValidator::new(&self.schema)
                .apply_partial(&existing, partial)
                .map_err(|errors| self.reject("update", errors))?;

            self.phase("update", RequestPhase::Persisting);
            let document = self.store.replace(id, merged)?;

            debug!(resource = %self.name(), id = %id, phase = %RequestPhase::Complete, "update");
            Ok(document)
        })?
    }

    /// Removes a document. Deleting an absent id succeeds.
    pub fn delete(&self, id: Option<&str>) -> ResourceResult<()> {
        self.phase("delete", RequestPhase::Received);
        let id = self.require_id("delete", id)?;

        self.phase("delete", RequestPhase::Persisting);
        self.locks.with_lock(id, || self.store.remove(id))??;

        debug!(resource = %self.name(), id = %id, phase = %RequestPhase::Complete, "delete");
        Ok(())
    }

    fn require_id<'i>(&self, op: &'static str, id: Option<&'i str>) -> ResourceResult<&'i str> {
        match id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => {
                self.phase(op, RequestPhase::Rejected);
                Err(ResourceError::MissingId)
            }
        }
    }

    fn reject(&self, op: &'static str, errors: ValidationErrors) -> ResourceError {
        debug!(
            resource = %self.name(),
            op,
            phase = %RequestPhase::Rejected,
            fields = errors.len(),
            "validation failed"
        );
        ResourceError::Validation(errors)
    }

    fn phase(&self, op: &'static str, phase: RequestPhase) {
        debug!(resource = %self.name(), op, phase = %phase);
    }
}

impl<S: DocumentStore> fmt::Debug for Resource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name())
            .field("fields", &self.schema.fields().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortSpec;
    use crate::schema::{FieldDef, FieldError};
    use serde_json::json;
    use std::thread;

    fn todos() -> Resource {
        let schema = Schema::new("todos")
            .with_field("title", FieldDef::required_string())
            .and_then(|s| s.with_field("completed", FieldDef::optional_boolean()))
            .and_then(|s| s.with_field("order", FieldDef::optional_number()))
            .and_then(|s| s.with_field("due", FieldDef::optional_date()))
            .unwrap();
        Resource::in_memory(schema)
    }

    #[test]
    fn test_create_then_read() {
        let todos = todos();
        let created = todos.create(&json!({"title": "foo", "order": "3"})).unwrap();

        assert_eq!(created.get("order"), Some(&json!(3)));
        assert_eq!(todos.read(created.id()).unwrap(), Some(created));
    }

    #[test]
    fn test_invalid_create_stores_nothing() {
        let todos = todos();
        let err = todos.create(&json!({"order": "foo"})).unwrap_err();

        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("title"), Some(FieldError::Required));
        assert_eq!(errors.get("order"), Some(FieldError::InvalidNumber));
        assert!(todos.store().is_empty().unwrap());
    }

    #[test]
    fn test_read_absent_is_none() {
        assert_eq!(todos().read("missing").unwrap(), None);
    }

    #[test]
    fn test_list_sorted_by_title() {
        let todos = todos();
        for title in ["c", "a", "b"] {
            todos.create(&json!({ "title": title })).unwrap();
        }

        let spec = QuerySpec::new().order_by(SortSpec::asc("title"));
        let titles: Vec<Value> = todos
            .list(&spec)
            .unwrap()
            .iter()
            .filter_map(|d| d.get("title").cloned())
            .collect();
        assert_eq!(titles, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_query_rejects_unknown_operator() {
        let err = todos().query(&json!({"$bogus": 1})).unwrap_err();
        assert!(matches!(err, ResourceError::Query(_)));
    }

    #[test]
    fn test_update_keeps_unsupplied_fields() {
        let todos = todos();
        let created = todos.create(&json!({"title": "foo", "order": 1})).unwrap();

        let updated = todos
            .update(Some(created.id()), &json!({"completed": true}))
            .unwrap();
        assert_eq!(updated.get("title"), Some(&json!("foo")));
        assert_eq!(updated.get("order"), Some(&json!(1)));
        assert_eq!(updated.get("completed"), Some(&json!(true)));
        assert_eq!(updated.id(), created.id());
    }

    #[test]
    fn test_update_without_id() {
        let todos = todos();
        assert!(matches!(
            todos.update(None, &json!({"title": "x"})),
            Err(ResourceError::MissingId)
        ));
        assert!(matches!(
            todos.update(Some(""), &json!({"title": "x"})),
            Err(ResourceError::MissingId)
        ));
    }

    #[test]
    fn test_update_unknown_id() {
        let err = todos()
            .update(Some("nope"), &json!({"title": "x"}))
            .unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
    }

    #[test]
    fn test_failed_update_leaves_document() {
        let todos = todos();
        let created = todos.create(&json!({"title": "foo", "order": 1})).unwrap();

        let err = todos
            .update(Some(created.id()), &json!({"title": "", "order": 2}))
            .unwrap_err();
        assert_eq!(
            err.validation_errors().and_then(|e| e.get("title")),
            Some(FieldError::Required)
        );
        assert_eq!(todos.read(created.id()).unwrap(), Some(created));
    }

    #[test]
    fn test_delete_then_read() {
        let todos = todos();
        let created = todos.create(&json!({"title": "foo"})).unwrap();

        todos.delete(Some(created.id())).unwrap();
        assert_eq!(todos.read(created.id()).unwrap(), None);
        todos.delete(Some(created.id())).unwrap();
    }

    #[test]
    fn test_delete_without_id() {
        assert!(matches!(todos().delete(None), Err(ResourceError::MissingId)));
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_fields() {
        let todos = Arc::new(todos());
        let created = todos.create(&json!({"title": "foo"})).unwrap();
        let id = created.id().to_string();

        let handles: Vec<_> = [json!({"order": 7}), json!({"completed": true})]
            .into_iter()
            .map(|partial| {
                let todos = Arc::clone(&todos);
                let id = id.clone();
                thread::spawn(move || todos.update(Some(&id), &partial).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = todos.read(&id).unwrap().unwrap();
        assert_eq!(stored.get("order"), Some(&json!(7)));
        assert_eq!(stored.get("completed"), Some(&json!(true)));
    }
}
