//! Resource definition loader
//!
//! Layout on disk:
//!
//! ```text
//! <resources_dir>/
//!   todos/
//!     config.json
//! ```
//!
//! Each `config.json` looks like:
//!
//! ```json
//! {
//!   "type": "Collection",
//!   "properties": {
//!     "title": { "type": "string", "required": true, "order": 0 },
//!     "order": { "type": "number", "order": 1 }
//!   }
//! }
//! ```
//!
//! The directory name is the resource name. Malformed definitions fail the
//! whole load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, Schema};

/// File name of a resource definition inside its directory
pub const CONFIG_FILE: &str = "config.json";

/// Resource kind this crate serves
const COLLECTION_KIND: &str = "Collection";

#[derive(Debug, Deserialize)]
struct ResourceConfig {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    properties: IndexMap<String, PropertyConfig>,
}

#[derive(Debug, Deserialize)]
struct PropertyConfig {
    #[serde(flatten)]
    def: FieldDef,
    #[serde(default)]
    order: Option<i64>,
}

/// Loads resource schemas from disk and keeps them by resource name.
pub struct SchemaLoader {
    /// Directory holding one sub-directory per resource
    resources_dir: PathBuf,
    /// Loaded schemas by resource name
    schemas: BTreeMap<String, Schema>,
}

impl SchemaLoader {
    pub fn new(resources_dir: &Path) -> Self {
        Self {
            resources_dir: resources_dir.to_path_buf(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Loads every resource directory.
    ///
    /// A missing resources directory is not an error; it simply yields no
    /// resources. Directories without a `config.json` are skipped.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.resources_dir.exists() {
            tracing::warn!(dir = %self.resources_dir.display(), "resources directory does not exist");
            return Ok(());
        }

        let entries = fs::read_dir(&self.resources_dir).map_err(|e| {
            SchemaError::malformed(
                self.resources_dir.display().to_string(),
                format!("Failed to read resources directory: {}", e),
            )
        })?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    self.resources_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.is_dir() && path.join(CONFIG_FILE).is_file() {
                dirs.push(path);
            }
        }
        dirs.sort();

        for dir in dirs {
            self.load_resource_dir(&dir)?;
        }

        Ok(())
    }

    fn load_resource_dir(&mut self, dir: &Path) -> SchemaResult<()> {
        let config_path = dir.join(CONFIG_FILE);
        let path_str = config_path.display().to_string();

        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SchemaError::malformed(&path_str, "resource name is not valid UTF-8"))?;

        let content = fs::read_to_string(&config_path)
            .map_err(|e| SchemaError::malformed(&path_str, format!("Failed to read file: {}", e)))?;

        match parse_resource(name, &content).map_err(|e| match e {
            SchemaError::Malformed { reason, .. } => SchemaError::malformed(&path_str, reason),
            other => other,
        })? {
            Some(schema) => {
                tracing::debug!(resource = name, fields = schema.fields().len(), "loaded resource");
                self.register(schema)
            }
            None => Ok(()),
        }
    }

    /// Registers a schema directly
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(&schema.resource) {
            return Err(SchemaError::AlreadyRegistered(schema.resource));
        }
        self.schemas.insert(schema.resource.clone(), schema);
        Ok(())
    }

    pub fn get(&self, resource: &str) -> Option<&Schema> {
        self.schemas.get(resource)
    }

    /// Iterates schemas ordered by resource name
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn into_schemas(self) -> Vec<Schema> {
        self.schemas.into_values().collect()
    }
}

/// Parses one resource definition.
///
/// Returns `Ok(None)` for resource kinds other than collections.
pub fn parse_resource(name: &str, content: &str) -> SchemaResult<Option<Schema>> {
    if !is_valid_resource_name(name) {
        return Err(SchemaError::malformed(
            name,
            "resource names may only contain letters, digits, '-' and '_'",
        ));
    }

    let config: ResourceConfig = serde_json::from_str(content)
        .map_err(|e| SchemaError::malformed(name, format!("Invalid JSON: {}", e)))?;

    if let Some(kind) = config.kind.as_deref() {
        if kind != COLLECTION_KIND {
            tracing::warn!(resource = name, kind, "skipping unsupported resource type");
            return Ok(None);
        }
    }

    // Stable sort: properties without an explicit order keep file order, last
    let mut properties: Vec<(String, PropertyConfig)> = config.properties.into_iter().collect();
    properties.sort_by_key(|(_, p)| p.order.unwrap_or(i64::MAX));

    let mut schema = Schema::new(name);
    for (field, property) in properties {
        schema.define_field(field, property.def)?;
    }

    Ok(Some(schema))
}

fn is_valid_resource_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
