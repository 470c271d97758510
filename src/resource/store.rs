//! Storage collaborator contract and the in-memory implementation.

use std::sync::RwLock;

use indexmap::IndexMap;

use super::errors::{StoreError, StoreResult};
use crate::document::{Document, FieldMap};

/// Storage operations a resource needs.
///
/// Implementations own the collection and must keep insertion order for
/// [`DocumentStore::all`].
pub trait DocumentStore: Send + Sync {
    /// Stores validated fields under a newly generated id
    fn insert(&self, fields: FieldMap) -> StoreResult<Document>;

    /// Fetches a document; `None` when absent
    fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// All documents in insertion order
    fn all(&self) -> StoreResult<Vec<Document>>;

    /// Overwrites an existing document, keeping its position
    fn replace(&self, id: &str, document: Document) -> StoreResult<Document>;

    /// Removes a document; removing an absent id succeeds
    fn remove(&self, id: &str) -> StoreResult<()>;
}

/// Process-lifetime collection held in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<IndexMap<String, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, IndexMap<String, Document>>> {
        self.documents
            .read()
            .map_err(|_| StoreError::Poisoned("in-memory store"))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, IndexMap<String, Document>>> {
        self.documents
            .write()
            .map_err(|_| StoreError::Poisoned("in-memory store"))
    }
}

impl DocumentStore for InMemoryStore {
    fn insert(&self, fields: FieldMap) -> StoreResult<Document> {
        let document = Document::with_generated_id(fields);
        self.write()?
            .insert(document.id().to_string(), document.clone());
        Ok(document)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn all(&self) -> StoreResult<Vec<Document>> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn replace(&self, id: &str, document: Document) -> StoreResult<Document> {
        let mut documents = self.write()?;
        let slot = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;
        *slot = document.clone();
        Ok(document)
    }

    fn remove(&self, id: &str) -> StoreResult<()> {
        self.write()?.shift_remove(id);
        Ok(())
    }
}
