//! Schema validator for incoming documents
//!
//! Validation semantics:
//! - The schema is an allow-list; undeclared input fields are dropped
//! - Null and "" mean "no value"
//! - Omitted required fields fail unless a default exists
//! - Values are coerced to the declared type
//! - Every failing field is reported, not just the first
//!
//! Partial updates validate only the supplied fields and merge
//! all-or-nothing into the stored document.

use serde_json::Value;

use super::coerce::coerce;
use super::errors::{FieldError, ValidationErrors};
use super::types::{is_empty_value, FieldDef, Schema};
use crate::document::{Document, FieldMap};

/// Outcome of checking one supplied field
enum FieldOutcome {
    /// Store this coerced value
    Set(Value),
    /// Leave the field without a value
    Unset,
}

/// Validator bound to a single resource schema.
///
/// Validation is pure: it never mutates its inputs and holds no state
/// beyond the schema reference, so it is safe to run across requests
/// in parallel.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Validates a complete document for creation.
    ///
    /// # Errors
    ///
    /// Returns every failing field. No fields are returned alongside an
    /// error.
    pub fn validate(&self, input: &Value) -> Result<FieldMap, ValidationErrors> {
        let obj = input.as_object().ok_or_else(ValidationErrors::not_an_object)?;

        let mut output = FieldMap::new();
        let mut errors = ValidationErrors::new();

        for (name, def) in self.schema.fields() {
            let supplied = obj.get(name).filter(|v| !is_empty_value(v));

            let raw = match (supplied, &def.default) {
                (Some(value), _) => value,
                (None, Some(default)) if !is_empty_value(default) => default,
                (None, _) => {
                    if def.required {
                        errors.add(name, FieldError::Required);
                    }
                    continue;
                }
            };

            match coerce(def.field_type, raw) {
                Ok(value) => {
                    output.insert(name.clone(), value);
                }
                Err(e) => errors.add(name, e),
            }
        }

        errors.into_result(output)
    }

    /// Merges a partial update into an existing document.
    ///
    /// Only fields present in `partial` are checked. Supplying null or ""
    /// clears an optional field and fails a required one. Defaults are not
    /// re-applied and `_id` never changes.
    ///
    /// # Errors
    ///
    /// Returns every failing field; `existing` is left untouched.
    pub fn apply_partial(
        &self,
        existing: &Document,
        partial: &Value,
    ) -> Result<Document, ValidationErrors> {
        let obj = partial.as_object().ok_or_else(ValidationErrors::not_an_object)?;

        let mut changes = Vec::with_capacity(obj.len());
        let mut errors = ValidationErrors::new();

        for (name, def) in self.schema.fields() {
            let Some(value) = obj.get(name) else {
                continue;
            };

            match check_supplied(def, value) {
                Ok(outcome) => changes.push((name, outcome)),
                Err(e) => errors.add(name, e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut merged = existing.clone();
        for (name, outcome) in changes {
            match outcome {
                FieldOutcome::Set(value) => merged.set(name.clone(), value),
                FieldOutcome::Unset => merged.unset(name),
            }
        }

        Ok(merged)
    }
}

fn check_supplied(def: &FieldDef, value: &Value) -> Result<FieldOutcome, FieldError> {
    if is_empty_value(value) {
        return if def.required {
            Err(FieldError::Required)
        } else {
            Ok(FieldOutcome::Unset)
        };
    }

    coerce(def.field_type, value).map(FieldOutcome::Set)
}
