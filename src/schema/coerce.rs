//! Type coercion strategies
//!
//! One pure function per field type. Callers decide what "no value" means
//! (null / empty string) before a value reaches these functions.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use super::errors::FieldError;
use super::types::FieldType;

/// Coerces a raw input value to the declared field type.
pub fn coerce(field_type: FieldType, value: &Value) -> Result<Value, FieldError> {
    match field_type {
        FieldType::String => coerce_string(value),
        FieldType::Number => coerce_number(value),
        FieldType::Date => coerce_date(value),
        FieldType::Boolean => coerce_boolean(value),
        FieldType::Object => coerce_object(value),
    }
}

fn coerce_string(value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::String(_) => Ok(value.clone()),
        _ => Err(mismatch(FieldType::String)),
    }
}

fn coerce_number(value: &Value) -> Result<Value, FieldError> {
    let n = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => return Ok(value.clone()),
        Value::Number(n) => n.as_f64().ok_or(FieldError::InvalidNumber)?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FieldError::InvalidNumber)?,
        _ => return Err(FieldError::InvalidNumber),
    };

    number_value(n).ok_or(FieldError::InvalidNumber)
}

/// Integral values become JSON integers so `"3"` and `3` compare equal.
fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    // i64::MAX as f64 rounds up to 2^63, which does not fit
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Some(Value::Number((n as i64).into()));
    }
    Number::from_f64(n).map(Value::Number)
}

fn coerce_date(value: &Value) -> Result<Value, FieldError> {
    parse_date(value)
        .map(|dt| Value::String(format_date(&dt)))
        .ok_or(FieldError::InvalidDate)
}

fn coerce_boolean(value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) if s == "true" => Ok(Value::Bool(true)),
        Value::String(s) if s == "false" => Ok(Value::Bool(false)),
        _ => Err(mismatch(FieldType::Boolean)),
    }
}

fn coerce_object(value: &Value) -> Result<Value, FieldError> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        _ => Err(mismatch(FieldType::Object)),
    }
}

fn mismatch(expected: FieldType) -> FieldError {
    FieldError::TypeMismatch {
        expected: expected.type_name(),
    }
}

/// Parses a date from one of the accepted inputs:
///
/// - RFC 3339 (`2012-12-12T10:00:00Z`, `2012-12-12T10:00:00+02:00`)
/// - naive date-time (`2012-12-12T10:00:00`, fractional seconds allowed)
/// - ISO date (`2012-12-12`)
/// - US date with 4 or 2 digit year (`12/12/2012`, `12/12/12`)
/// - integer epoch milliseconds
///
/// Naive inputs are read as UTC.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return midnight_utc(date);
    }
    parse_us_date(s)
}

/// `MM/DD/YYYY` or `MM/DD/YY`. The year width picks the format so that
/// `12/12/12` is never read as the year 12.
fn parse_us_date(s: &str) -> Option<DateTime<Utc>> {
    let year = s.rsplit('/').next()?;
    let format = match year.len() {
        2 => "%m/%d/%y",
        4 => "%m/%d/%Y",
        _ => return None,
    };
    NaiveDate::parse_from_str(s, format)
        .ok()
        .and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// Canonical stored form: RFC 3339, UTC, millisecond precision.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;

    #[test]
    fn test_numeric_string_becomes_integer() {
        assert_eq!(coerce(FieldType::Number, &json!("3")), Ok(json!(3)));
        assert_eq!(coerce(FieldType::Number, &json!(" 42 ")), Ok(json!(42)));
        assert_eq!(coerce(FieldType::Number, &json!("2.5")), Ok(json!(2.5)));
        assert_eq!(coerce(FieldType::Number, &json!(7)), Ok(json!(7)));
        assert_eq!(coerce(FieldType::Number, &json!(7.0)), Ok(json!(7)));
    }

    #[test]
    fn test_out_of_range_integer_not_clamped() {
        let coerced = coerce(FieldType::Number, &json!("9223372036854775808")).unwrap();
        assert!(coerced.is_f64());
        assert_eq!(coerced.as_f64(), Some(9_223_372_036_854_775_808.0));
        assert_ne!(coerced, json!(i64::MAX));
    }

    #[test]
    fn test_object_field_passes_through() {
        let def = FieldDef::optional_object();
        let value = json!({"tags": ["a"], "nested": {"x": 1}});
        assert_eq!(coerce(def.field_type, &value), Ok(value.clone()));
        assert_eq!(
            coerce(def.field_type, &json!("flat")),
            Err(FieldError::TypeMismatch { expected: "object" })
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_eq!(
            coerce(FieldType::Number, &json!("foo")),
            Err(FieldError::InvalidNumber)
        );
        assert_eq!(
            coerce(FieldType::Number, &json!("NaN")),
            Err(FieldError::InvalidNumber)
        );
        assert_eq!(
            coerce(FieldType::Number, &json!("inf")),
            Err(FieldError::InvalidNumber)
        );
        assert_eq!(
            coerce(FieldType::Number, &json!(true)),
            Err(FieldError::InvalidNumber)
        );
    }

    #[test]
    fn test_two_digit_year_date() {
        assert_eq!(
            coerce(FieldType::Date, &json!("12/12/12")),
            Ok(json!("2012-12-12T00:00:00.000Z"))
        );
    }

    #[test]
    fn test_accepted_date_formats_agree() {
        let expected = json!("2012-12-12T00:00:00.000Z");
        for input in [
            json!("12/12/2012"),
            json!("2012-12-12"),
            json!("2012-12-12T00:00:00"),
            json!("2012-12-12T00:00:00Z"),
            json!("2012-12-12T02:00:00+02:00"),
            json!(1355270400000i64),
        ] {
            assert_eq!(coerce(FieldType::Date, &input), Ok(expected.clone()), "{}", input);
        }
    }

    #[test]
    fn test_bad_dates_rejected() {
        for input in [json!("bad date"), json!("13/45/12"), json!("12/12/123"), json!(true)] {
            assert_eq!(
                coerce(FieldType::Date, &input),
                Err(FieldError::InvalidDate),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(coerce(FieldType::Boolean, &json!(true)), Ok(json!(true)));
        assert_eq!(coerce(FieldType::Boolean, &json!("false")), Ok(json!(false)));
        assert_eq!(
            coerce(FieldType::Boolean, &json!("flarg")),
            Err(FieldError::TypeMismatch { expected: "boolean" })
        );
    }

    #[test]
    fn test_string_and_object_type_checks() {
        assert_eq!(coerce(FieldType::String, &json!("foo")), Ok(json!("foo")));
        assert!(coerce(FieldType::String, &json!(123)).is_err());
        assert_eq!(
            coerce(FieldType::Object, &json!({"a": [1, 2]})),
            Ok(json!({"a": [1, 2]}))
        );
        assert!(coerce(FieldType::Object, &json!([1, 2])).is_err());
    }
}
