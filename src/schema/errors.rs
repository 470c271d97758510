//! Schema error types
//!
//! Two families live here:
//! - `SchemaError`: a resource definition is malformed (loader / builder)
//! - `ValidationErrors`: a document failed validation, one reason per field

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Result type for schema definition and loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while defining or loading a schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Field declared twice
    #[error("Resource '{resource}' declares field '{field}' more than once")]
    DuplicateField { resource: String, field: String },

    /// Field uses a reserved name
    #[error("Resource '{resource}' cannot declare reserved field '{field}'")]
    ReservedField { resource: String, field: String },

    /// Field definition is invalid
    #[error("Resource '{resource}' field '{field}': {reason}")]
    InvalidField {
        resource: String,
        field: String,
        reason: String,
    },

    /// Definition file could not be read or parsed
    #[error("Malformed resource definition '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// Two definitions claim the same resource name
    #[error("Resource '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl SchemaError {
    pub fn duplicate_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        SchemaError::DuplicateField {
            resource: resource.into(),
            field: field.into(),
        }
    }

    pub fn reserved_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        SchemaError::ReservedField {
            resource: resource.into(),
            field: field.into(),
        }
    }

    pub fn invalid_field(
        resource: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidField {
            resource: resource.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for malformed definition file
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateField { .. } => "SCHEMA_DUPLICATE_FIELD",
            SchemaError::ReservedField { .. } => "SCHEMA_RESERVED_FIELD",
            SchemaError::InvalidField { .. } => "SCHEMA_INVALID_FIELD",
            SchemaError::Malformed { .. } => "SCHEMA_MALFORMED",
            SchemaError::AlreadyRegistered(_) => "SCHEMA_ALREADY_REGISTERED",
        }
    }
}

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Required field omitted, null or empty
    Required,
    /// Value could not be read as a number
    InvalidNumber,
    /// Value could not be read as a date
    InvalidDate,
    /// Value has the wrong JSON type
    TypeMismatch { expected: &'static str },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => write!(f, "required"),
            FieldError::InvalidNumber => write!(f, "invalid number"),
            FieldError::InvalidDate => write!(f, "invalid date"),
            FieldError::TypeMismatch { expected } => {
                let article = if expected.starts_with(['a', 'e', 'i', 'o', 'u']) {
                    "an"
                } else {
                    "a"
                };
                write!(f, "must be {} {}", article, expected)
            }
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field path used when the whole input is rejected
pub const ROOT_PATH: &str = "$root";

/// Per-field validation failures.
///
/// Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set for an input that is not an object at all
    pub fn not_an_object() -> Self {
        let mut errors = Self::new();
        errors.add(ROOT_PATH, FieldError::TypeMismatch { expected: "object" });
        errors
    }

    /// Records a failure; the first reason for a field wins
    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.errors.entry(field.into()).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<FieldError> {
        self.errors.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Converts an accumulated set into a result
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, (field, reason)) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{} {}", sep, field, reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
