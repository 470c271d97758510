//! Result sorting
//!
//! Multi-key, stable, deterministic.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::spec::{SortDirection, SortSpec};
use crate::document::Document;
use crate::schema::{parse_date, FieldType, Schema};

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents by the given keys in order.
    ///
    /// Sort is stable: documents that tie on every key keep their
    /// incoming (insertion) order.
    pub fn sort(documents: &mut [Document], keys: &[SortSpec], schema: &Schema) {
        if keys.is_empty() {
            return;
        }

        let types: Vec<Option<FieldType>> = keys
            .iter()
            .map(|k| schema.field(&k.field).map(|def| def.field_type))
            .collect();

        documents.sort_by(|a, b| {
            for (key, field_type) in keys.iter().zip(&types) {
                let ordering =
                    Self::compare_values(a.get(&key.field), b.get(&key.field), *field_type);

                let ordering = match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Compares two field values.
    ///
    /// Ordering rules:
    /// - missing = null < bool < number < string < array < object
    /// - For same types, natural ordering (arrays and objects tie)
    /// - Date fields compare chronologically; unparseable dates count as
    ///   missing
    pub fn compare_values(
        a: Option<&Value>,
        b: Option<&Value>,
        field_type: Option<FieldType>,
    ) -> Ordering {
        if field_type == Some(FieldType::Date) {
            return a.and_then(parse_date).cmp(&b.and_then(parse_date));
        }

        let type_order = |v: Option<&Value>| -> u8 {
            match v {
                None | Some(Value::Null) => 0,
                Some(Value::Bool(_)) => 1,
                Some(Value::Number(_)) => 2,
                Some(Value::String(_)) => 3,
                Some(Value::Array(_)) => 4,
                Some(Value::Object(_)) => 5,
            }
        };

        let a_type = type_order(a);
        let b_type = type_order(b);
        if a_type != b_type {
            return a_type.cmp(&b_type);
        }

        match (a, b) {
            (Some(Value::Bool(a_b)), Some(Value::Bool(b_b))) => a_b.cmp(b_b),
            (Some(Value::Number(a_n)), Some(Value::Number(b_n))) => compare_numbers(a_n, b_n),
            (Some(Value::String(a_s)), Some(Value::String(b_s))) => a_s.cmp(b_s),
            _ => Ordering::Equal,
        }
    }
}

/// Integers compare exactly; only mixed or fractional pairs go through f64.
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    // One side is a negative i64, the other a u64 above i64::MAX
    match (a.as_i64(), b.as_u64(), a.as_u64(), b.as_i64()) {
        (Some(_), Some(_), None, None) => return Ordering::Less,
        (None, None, Some(_), Some(_)) => return Ordering::Greater,
        _ => {}
    }
    let a = a.as_f64().unwrap_or(0.0);
    let b = b.as_f64().unwrap_or(0.0);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
