//! Stored document type

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::ID_FIELD;

/// Field name → value, in insertion order
pub type FieldMap = Map<String, Value>;

/// A stored document.
///
/// `_id` is always the first key and cannot be changed once assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    body: FieldMap,
}

impl Document {
    /// Builds a document from an id and validated fields.
    ///
    /// Any `_id` key inside `fields` is discarded.
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        let mut body = FieldMap::with_capacity(fields.len() + 1);
        body.insert(ID_FIELD.to_string(), Value::String(id.into()));
        for (key, value) in fields {
            if key != ID_FIELD {
                body.insert(key, value);
            }
        }
        Self { body }
    }

    /// Builds a document with a freshly generated id
    pub fn with_generated_id(fields: FieldMap) -> Self {
        Self::new(generate_id(), fields)
    }

    /// Returns the document ID
    pub fn id(&self) -> &str {
        self.body
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns a field value; `_id` is addressable like any other field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Returns the full body, `_id` included
    pub fn body(&self) -> &FieldMap {
        &self.body
    }

    /// Returns the fields without `_id`
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.body.iter().filter(|(k, _)| k.as_str() != ID_FIELD)
    }

    /// Sets a field; writes to `_id` are ignored
    pub(crate) fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        if field != ID_FIELD {
            self.body.insert(field, value);
        }
    }

    /// Removes a field; `_id` cannot be removed
    pub(crate) fn unset(&mut self, field: &str) {
        if field != ID_FIELD {
            self.body.shift_remove(field);
        }
    }

    /// Keeps `_id` plus the fields accepted by `keep`
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.body.retain(|k, _| k == ID_FIELD || keep(k));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

/// New document identifier: 32 lowercase hex characters
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_id_is_first_key() {
        let doc = Document::new("abc", fields(json!({"title": "foo", "order": 1})));
        let keys: Vec<&str> = doc.body().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_id", "title", "order"]);
        assert_eq!(doc.id(), "abc");
    }

    #[test]
    fn test_embedded_id_is_discarded() {
        let doc = Document::new("abc", fields(json!({"_id": "other", "title": "foo"})));
        assert_eq!(doc.id(), "abc");
        assert_eq!(doc.fields().count(), 1);
    }

    #[test]
    fn test_id_is_immutable() {
        let mut doc = Document::new("abc", FieldMap::new());
        doc.set(ID_FIELD, json!("changed"));
        doc.unset(ID_FIELD);
        assert_eq!(doc.id(), "abc");
    }

    #[test]
    fn test_serializes_flat() {
        let doc = Document::new("abc", fields(json!({"title": "foo"})));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, json!({"_id": "abc", "title": "foo"}));
    }

    #[test]
    fn test_generated_ids_are_unique_hex() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
