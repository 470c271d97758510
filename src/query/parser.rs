//! # Query Parser
//!
//! Parses the JSON query object into a [`QuerySpec`].
//!
//! ```json
//! {
//!   "completed": false,
//!   "order": { "$gte": 2 },
//!   "$orderby": { "title": 1, "order": -1 },
//!   "$skip": 10,
//!   "$limit": 5,
//!   "$fields": { "title": 1 }
//! }
//! ```
//!
//! Over HTTP the object arrives JSON-encoded in the `q` parameter; other
//! plain parameters become equality filters.

use std::collections::HashMap;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::errors::{QueryError, QueryResult};
use super::filter::{FilterExpr, FilterOp, FilterSet};
use super::spec::{Projection, QuerySpec, SortDirection, SortSpec};
use crate::schema::{coerce, FieldType, Schema};

/// HTTP parameter carrying the JSON query
pub const QUERY_PARAM: &str = "q";

/// Parses a query object against a schema.
///
/// Sort keys outside the schema are ignored. Filter operands on declared
/// fields are coerced to the field type. `$limit: 0` means no limit.
pub fn parse_query(schema: &Schema, query: &Value) -> QueryResult<QuerySpec> {
    let obj = query
        .as_object()
        .ok_or_else(|| QueryError::NotAnObject("query".to_string()))?;

    let mut spec = QuerySpec::new();

    for (key, value) in obj {
        match key.as_str() {
            "$orderby" | "$sort" => spec.sort = parse_sort(schema, key, value)?,
            "$skip" => spec.skip = parse_count(key, value)?,
            "$limit" => spec.limit = Some(parse_count(key, value)?).filter(|n| *n > 0),
            "$fields" => spec.fields = parse_fields(value)?,
            op if op.starts_with('$') => return Err(QueryError::UnknownOperator(op.to_string())),
            field => parse_field_filter(schema, field, value, &mut spec.filters)?,
        }
    }

    Ok(spec)
}

/// Parses HTTP query parameters.
///
/// `q` holds the JSON query; every other parameter is an equality filter
/// (or a `$skip` / `$limit` count) unless `q` already names that key.
pub fn parse_params(schema: &Schema, params: &HashMap<String, String>) -> QueryResult<QuerySpec> {
    let mut query = match params.get(QUERY_PARAM) {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Value>(raw)
            .map_err(|e| QueryError::InvalidJson(e.to_string()))?,
        _ => Value::Object(Map::new()),
    };

    let obj = query
        .as_object_mut()
        .ok_or_else(|| QueryError::NotAnObject("q".to_string()))?;

    let mut extra: Vec<(&String, &String)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != QUERY_PARAM)
        .collect();
    extra.sort();

    for (key, value) in extra {
        if !obj.contains_key(key) {
            obj.insert(key.clone(), Value::String(value.clone()));
        }
    }

    parse_query(schema, &query)
}

fn parse_sort(schema: &Schema, key: &str, value: &Value) -> QueryResult<Vec<SortSpec>> {
    let obj = value
        .as_object()
        .ok_or_else(|| QueryError::NotAnObject(key.to_string()))?;

    let mut sort = Vec::with_capacity(obj.len());
    for (field, direction) in obj {
        let direction = direction
            .as_i64()
            .and_then(SortDirection::from_wire)
            .ok_or_else(|| QueryError::InvalidSortDirection {
                field: field.clone(),
            })?;

        if !schema.knows(field) {
            tracing::debug!(resource = %schema.resource, field = %field, "ignoring sort on undeclared field");
            continue;
        }

        sort.push(SortSpec {
            field: field.clone(),
            direction,
        });
    }

    Ok(sort)
}

fn parse_count(key: &str, value: &Value) -> QueryResult<usize> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    n.and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| QueryError::InvalidCount(key.to_string()))
}

fn parse_fields(value: &Value) -> QueryResult<Projection> {
    let obj = value
        .as_object()
        .ok_or_else(|| QueryError::NotAnObject("$fields".to_string()))?;

    let mut include = Vec::new();
    let mut exclude = Vec::new();

    for (field, flag) in obj {
        let keep = match flag {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            _ => return Err(QueryError::invalid_operand(field, "expected 1 / 0 or true / false")),
        };
        if keep {
            include.push(field.clone());
        } else {
            exclude.push(field.clone());
        }
    }

    match (include.is_empty(), exclude.is_empty()) {
        (true, true) => Ok(Projection::All),
        (false, true) => Ok(Projection::Include(include)),
        (true, false) => Ok(Projection::Exclude(exclude)),
        (false, false) => Err(QueryError::MixedProjection),
    }
}

fn parse_field_filter(
    schema: &Schema,
    field: &str,
    value: &Value,
    filters: &mut FilterSet,
) -> QueryResult<()> {
    let field_type = schema.field(field).map(|def| def.field_type);

    let operators = match value {
        Value::Object(obj) if !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')) => obj,
        _ => {
            let operand = coerce_operand(field, field_type, value)?;
            filters.push(FilterExpr::eq(field, operand).with_type(field_type));
            return Ok(());
        }
    };

    for (op, operand) in operators {
        let filter_op = match op.as_str() {
            "$eq" => FilterOp::Eq(coerce_operand(field, field_type, operand)?),
            "$ne" => FilterOp::Ne(coerce_operand(field, field_type, operand)?),
            "$gt" => FilterOp::Gt(coerce_operand(field, field_type, operand)?),
            "$gte" => FilterOp::Gte(coerce_operand(field, field_type, operand)?),
            "$lt" => FilterOp::Lt(coerce_operand(field, field_type, operand)?),
            "$lte" => FilterOp::Lte(coerce_operand(field, field_type, operand)?),
            "$in" => FilterOp::In(coerce_list(field, field_type, operand)?),
            "$nin" => FilterOp::Nin(coerce_list(field, field_type, operand)?),
            "$exists" => FilterOp::Exists(
                operand
                    .as_bool()
                    .ok_or_else(|| QueryError::invalid_operand(field, "$exists expects a boolean"))?,
            ),
            "$regex" => FilterOp::Regex(build_regex(field, operand, operators.get("$options"))?),
            "$options" if operators.contains_key("$regex") => continue,
            "$options" => return Err(QueryError::invalid_operand(field, "$options requires $regex")),
            other => return Err(QueryError::UnknownOperator(other.to_string())),
        };
        filters.push(FilterExpr::new(field, filter_op).with_type(field_type));
    }

    Ok(())
}

/// Coerces a literal operand to the field's type; null stays null.
fn coerce_operand(field: &str, field_type: Option<FieldType>, operand: &Value) -> QueryResult<Value> {
    match field_type {
        Some(ft) if !operand.is_null() => {
            coerce(ft, operand).map_err(|e| QueryError::invalid_operand(field, e.to_string()))
        }
        _ => Ok(operand.clone()),
    }
}

fn coerce_list(field: &str, field_type: Option<FieldType>, operand: &Value) -> QueryResult<Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| QueryError::invalid_operand(field, "expected an array"))?
        .iter()
        .map(|v| coerce_operand(field, field_type, v))
        .collect()
}

fn build_regex(field: &str, pattern: &Value, options: Option<&Value>) -> QueryResult<regex::Regex> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| QueryError::invalid_operand(field, "$regex expects a string"))?;
    let options = options.and_then(Value::as_str).unwrap_or_default();

    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .build()
        .map_err(|e| QueryError::InvalidRegex {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;

    fn schema() -> Schema {
        let mut schema = Schema::new("todos");
        schema.define_field("title", FieldDef::required_string()).unwrap();
        schema.define_field("completed", FieldDef::optional_boolean()).unwrap();
        schema.define_field("order", FieldDef::optional_number()).unwrap();
        schema.define_field("dateCompleted", FieldDef::optional_date()).unwrap();
        schema
    }

    #[test]
    fn test_parse_orderby() {
        let spec = parse_query(&schema(), &json!({"$orderby": {"title": 1, "order": -1}})).unwrap();
        assert_eq!(spec.sort, vec![SortSpec::asc("title"), SortSpec::desc("order")]);
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn test_sort_alias_and_id() {
        let spec = parse_query(&schema(), &json!({"$sort": {"_id": -1}})).unwrap();
        assert_eq!(spec.sort, vec![SortSpec::desc("_id")]);
    }

    #[test]
    fn test_undeclared_sort_field_ignored() {
        let spec = parse_query(&schema(), &json!({"$orderby": {"bat": 1, "title": 1}})).unwrap();
        assert_eq!(spec.sort, vec![SortSpec::asc("title")]);
    }

    #[test]
    fn test_invalid_sort_direction() {
        let err = parse_query(&schema(), &json!({"$orderby": {"title": 2}})).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_SORT");
    }

    #[test]
    fn test_skip_and_limit() {
        let spec = parse_query(&schema(), &json!({"$skip": 2, "$limit": "5"})).unwrap();
        assert_eq!(spec.skip, 2);
        assert_eq!(spec.limit, Some(5));

        assert!(parse_query(&schema(), &json!({"$limit": -1})).is_err());
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let spec = parse_query(&schema(), &json!({"$limit": 0})).unwrap();
        assert_eq!(spec.limit, None);
    }

    #[test]
    fn test_options_without_regex_rejected() {
        let err = parse_query(&schema(), &json!({"title": {"$options": "i"}})).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_OPERAND");

        let err = parse_query(&schema(), &json!({"title": {"$options": "i", "$ne": "a"}})).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_OPERAND");

        let spec = parse_query(&schema(), &json!({"title": {"$regex": "^A", "$options": "i"}})).unwrap();
        assert_eq!(spec.filters.filters.len(), 1);
    }

    #[test]
    fn test_literal_filter_is_coerced() {
        let spec = parse_query(&schema(), &json!({"order": "3"})).unwrap();
        match &spec.filters.filters[0].op {
            FilterOp::Eq(v) => assert_eq!(v, &json!(3)),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_operator_filters() {
        let spec = parse_query(
            &schema(),
            &json!({"order": {"$gte": 1, "$lt": 5}, "title": {"$in": ["a", "b"]}}),
        )
        .unwrap();
        assert_eq!(spec.filters.filters.len(), 3);
        let ops: Vec<&str> = spec.filters.filters.iter().map(|f| f.op.as_str()).collect();
        assert_eq!(ops, vec!["$gte", "$lt", "$in"]);
    }

    #[test]
    fn test_date_operand_canonicalised() {
        let spec =
            parse_query(&schema(), &json!({"dateCompleted": {"$gt": "12/12/12"}})).unwrap();
        match &spec.filters.filters[0].op {
            FilterOp::Gt(v) => assert_eq!(v, &json!("2012-12-12T00:00:00.000Z")),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_bad_operand_rejected() {
        let err = parse_query(&schema(), &json!({"order": {"$gt": "foo"}})).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_OPERAND");
    }

    #[test]
    fn test_regex_with_options() {
        let spec = parse_query(
            &schema(),
            &json!({"title": {"$regex": "^FEED", "$options": "i"}}),
        )
        .unwrap();
        assert_eq!(spec.filters.filters.len(), 1);
        match &spec.filters.filters[0].op {
            FilterOp::Regex(re) => assert!(re.is_match("feed the cat")),
            other => panic!("unexpected op {:?}", other),
        }

        let err = parse_query(&schema(), &json!({"title": {"$regex": "("}})).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_REGEX");
    }

    #[test]
    fn test_unknown_operators_rejected() {
        assert!(parse_query(&schema(), &json!({"$where": "1"})).is_err());
        assert!(parse_query(&schema(), &json!({"order": {"$near": 1}})).is_err());
    }

    #[test]
    fn test_fields_projection() {
        let spec = parse_query(&schema(), &json!({"$fields": {"title": 1}})).unwrap();
        assert_eq!(spec.fields, Projection::Include(vec!["title".to_string()]));

        let spec = parse_query(&schema(), &json!({"$fields": {"title": false}})).unwrap();
        assert_eq!(spec.fields, Projection::Exclude(vec!["title".to_string()]));

        let err = parse_query(&schema(), &json!({"$fields": {"title": 1, "order": 0}})).unwrap_err();
        assert_eq!(err, QueryError::MixedProjection);
    }

    #[test]
    fn test_query_must_be_object() {
        assert!(parse_query(&schema(), &json!([1, 2])).is_err());
    }

    #[test]
    fn test_params_with_q() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), r#"{"$orderby":{"title":1}}"#.to_string());
        params.insert("completed".to_string(), "true".to_string());

        let spec = parse_params(&schema(), &params).unwrap();
        assert_eq!(spec.sort, vec![SortSpec::asc("title")]);
        match &spec.filters.filters[0].op {
            FilterOp::Eq(v) => assert_eq!(v, &json!(true)),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_params_invalid_json() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), "{nope".to_string());
        let err = parse_params(&schema(), &params).unwrap_err();
        assert_eq!(err.code(), "QUERY_INVALID_JSON");
    }

    #[test]
    fn test_empty_params() {
        let spec = parse_params(&schema(), &HashMap::new()).unwrap();
        assert!(spec.is_empty());
    }
}
