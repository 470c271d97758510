//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - number: integer or floating point
//! - date: timestamp, stored as RFC 3339 UTC
//! - boolean: true / false
//! - object: arbitrary nested JSON object

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Integer or floating point number
    Number,
    /// Point in time
    Date,
    /// Boolean
    Boolean,
    /// Nested JSON object, passed through unchanged
    Object,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether field must be present
    #[serde(default)]
    pub required: bool,
    /// Value used on create when the field is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDef {
    /// Create a field definition of the given type
    pub fn new(field_type: FieldType, required: bool) -> Self {
        Self {
            field_type,
            required,
            default: None,
        }
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::new(FieldType::String, true)
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::new(FieldType::String, false)
    }

    /// Create an optional number field
    pub fn optional_number() -> Self {
        Self::new(FieldType::Number, false)
    }

    /// Create an optional date field
    pub fn optional_date() -> Self {
        Self::new(FieldType::Date, false)
    }

    /// Create an optional boolean field
    pub fn optional_boolean() -> Self {
        Self::new(FieldType::Boolean, false)
    }

    /// Create an optional object field
    pub fn optional_object() -> Self {
        Self::new(FieldType::Object, false)
    }

    /// Attach a default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Schema for one resource: an ordered allow-list of fields.
///
/// Fields are registered once while the resource is configured and the
/// schema is shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Resource this schema governs (e.g. "todos")
    pub resource: String,
    /// Field definitions in declaration order
    fields: IndexMap<String, FieldDef>,
}

impl Schema {
    /// Create an empty schema for a resource
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            fields: IndexMap::new(),
        }
    }

    /// Registers a field.
    ///
    /// # Errors
    ///
    /// Rejects duplicate names, the reserved `_id` name and required fields
    /// whose default is null or an empty string.
    pub fn define_field(&mut self, name: impl Into<String>, def: FieldDef) -> SchemaResult<()> {
        let name = name.into();

        if name.is_empty() {
            return Err(SchemaError::invalid_field(&self.resource, name, "field name is empty"));
        }
        if name == ID_FIELD {
            return Err(SchemaError::reserved_field(&self.resource, name));
        }
        if self.fields.contains_key(&name) {
            return Err(SchemaError::duplicate_field(&self.resource, name));
        }
        if def.required && def.default.as_ref().is_some_and(is_empty_value) {
            return Err(SchemaError::invalid_field(
                &self.resource,
                name,
                "required field cannot default to an empty value",
            ));
        }

        self.fields.insert(name, def);
        Ok(())
    }

    /// Builder form of [`Schema::define_field`]
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> SchemaResult<Self> {
        self.define_field(name, def)?;
        Ok(self)
    }

    /// Returns the ordered field mapping
    pub fn fields(&self) -> &IndexMap<String, FieldDef> {
        &self.fields
    }

    /// Looks up a single field definition
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Returns true if the field is declared (or is `_id`)
    pub fn knows(&self, name: &str) -> bool {
        name == ID_FIELD || self.fields.contains_key(name)
    }
}

/// Null and the empty string both mean "no value" on input.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
