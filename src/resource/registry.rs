//! Name → resource lookup used by transports.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use super::facade::Resource;
use super::store::{DocumentStore, InMemoryStore};
use crate::schema::{Schema, SchemaLoader};

/// Every mounted resource, keyed by name
#[derive(Debug)]
pub struct ResourceRegistry<S: DocumentStore = InMemoryStore> {
    resources: BTreeMap<String, Arc<Resource<S>>>,
}

impl<S: DocumentStore> Default for ResourceRegistry<S> {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }
}

impl<S: DocumentStore + Default> ResourceRegistry<S> {
    /// Mounts each schema over a fresh store
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Self {
        let mut registry = Self::default();
        for schema in schemas {
            registry.mount(Resource::new(schema, S::default()));
        }
        registry
    }

    /// Mounts every schema a loader has read
    pub fn from_loader(loader: SchemaLoader) -> Self {
        Self::from_schemas(loader.into_schemas())
    }
}

impl<S: DocumentStore> ResourceRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource, replacing any previous one with the same name
    pub fn mount(&mut self, resource: Resource<S>) -> Arc<Resource<S>> {
        let name = resource.name().to_string();
        let resource = Arc::new(resource);
        info!(resource = %name, fields = resource.schema().fields().len(), "resource mounted");
        self.resources.insert(name, Arc::clone(&resource));
        resource
    }

    pub fn get(&self, name: &str) -> Option<Arc<Resource<S>>> {
        self.resources.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
