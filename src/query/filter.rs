//! # Filter Expressions
//!
//! Predicates applied to documents before sorting. Operands are coerced to
//! the field's schema type by the parser, so matching here is exact.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use super::sorter::ResultSorter;
use crate::document::Document;
use crate::schema::{parse_date, FieldType};

/// Filter operators
#[derive(Debug, Clone)]
pub enum FilterOp {
    /// Equals (`null` also matches a missing field)
    Eq(Value),
    /// Not equals (a missing field matches)
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// Value in list
    In(Vec<Value>),
    /// Value not in list (a missing field matches)
    Nin(Vec<Value>),
    /// String field matches pattern
    Regex(Regex),
    /// Field present (and non-null) or absent
    Exists(bool),
}

impl FilterOp {
    /// Returns the query-language operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::Ne(_) => "$ne",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Lt(_) => "$lt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::In(_) => "$in",
            FilterOp::Nin(_) => "$nin",
            FilterOp::Regex(_) => "$regex",
            FilterOp::Exists(_) => "$exists",
        }
    }
}

/// A filter expression on one field
#[derive(Debug, Clone)]
pub struct FilterExpr {
    /// Field to filter on
    pub field: String,
    /// Comparison operator and operand
    pub op: FilterOp,
    /// Schema type of the field, when declared
    pub field_type: Option<FieldType>,
}

impl FilterExpr {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
            field_type: None,
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Eq(value))
    }

    /// Create a greater than filter
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Gt(value))
    }

    /// Create a less than filter
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOp::Lt(value))
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOp::In(values))
    }

    pub fn with_type(mut self, field_type: Option<FieldType>) -> Self {
        self.field_type = field_type;
        self
    }

    /// Check if a document matches this filter
    pub fn matches(&self, doc: &Document) -> bool {
        let value = doc.get(&self.field).filter(|v| !v.is_null());

        match &self.op {
            FilterOp::Eq(expected) => match value {
                Some(v) => self.equal(v, expected),
                None => expected.is_null(),
            },
            FilterOp::Ne(expected) => match value {
                Some(v) => !self.equal(v, expected),
                None => !expected.is_null(),
            },
            FilterOp::Gt(bound) => self.range(value, bound, |o| o == Ordering::Greater),
            FilterOp::Gte(bound) => self.range(value, bound, |o| o != Ordering::Less),
            FilterOp::Lt(bound) => self.range(value, bound, |o| o == Ordering::Less),
            FilterOp::Lte(bound) => self.range(value, bound, |o| o != Ordering::Greater),
            FilterOp::In(list) => value.is_some_and(|v| list.iter().any(|e| self.equal(v, e))),
            FilterOp::Nin(list) => !value.is_some_and(|v| list.iter().any(|e| self.equal(v, e))),
            FilterOp::Regex(re) => value.and_then(Value::as_str).is_some_and(|s| re.is_match(s)),
            FilterOp::Exists(expected) => value.is_some() == *expected,
        }
    }

    fn equal(&self, actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Number(_), Value::Number(_)) => {
                self.compare(actual, expected) == Some(Ordering::Equal)
            }
            _ if self.field_type == Some(FieldType::Date) => {
                self.compare(actual, expected) == Some(Ordering::Equal)
            }
            _ => actual == expected,
        }
    }

    fn range(&self, actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
        actual
            .and_then(|v| self.compare(v, bound))
            .is_some_and(accept)
    }

    /// Orders two present values; `None` when they are not comparable
    /// (different kinds, or a date that does not parse).
    fn compare(&self, actual: &Value, bound: &Value) -> Option<Ordering> {
        if self.field_type == Some(FieldType::Date) {
            let a = parse_date(actual)?;
            let b = parse_date(bound)?;
            return Some(a.cmp(&b));
        }

        match (actual, bound) {
            (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Bool(_), Value::Bool(_)) => {
                Some(ResultSorter::compare_values(Some(actual), Some(bound), self.field_type))
            }
            _ => None,
        }
    }
}

/// A set of filters combined with AND logic
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub filters: Vec<FilterExpr>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: FilterExpr) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: FilterExpr) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check if a document matches all filters
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}
