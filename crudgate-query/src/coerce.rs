//! Conversion of raw query-string values into typed filter values.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::descriptor::FieldType;
use crate::error::{QueryError, QueryResult};

/// A typed value a predicate compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw string.
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// UTC date-time.
    DateTime(DateTime<Utc>),
    /// Object identifier.
    Key(ObjectId),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Self::Key(v)
    }
}

/// Coerce a raw value to a field's declared type.
///
/// `param` is the full parameter name and only feeds error messages.
pub fn coerce(field_type: FieldType, param: &str, raw: &str) -> QueryResult<Value> {
    match field_type {
        FieldType::Text => Ok(Value::String(raw.to_string())),
        FieldType::DateTime => parse_datetime(raw)
            .map(Value::DateTime)
            .map_err(|e| QueryError::invalid_date(param, e)),
        FieldType::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| QueryError::invalid_float(param, e)),
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| QueryError::invalid_integer(param, e)),
        FieldType::Key => ObjectId::parse_str(raw)
            .map(Value::Key)
            .map_err(|e| QueryError::invalid_key_format(param, e)),
    }
}

/// Parse a `between` value: two comma-separated RFC 3339 date-times.
///
/// Surrounding whitespace on each bound is ignored. Any other shape, or an
/// unparsable bound, is an `InvalidBetweenValue` error.
pub fn parse_between(param: &str, raw: &str) -> QueryResult<(DateTime<Utc>, DateTime<Utc>)> {
    let parts: Vec<&str> = raw.split(',').collect();
    let [start, end] = parts.as_slice() else {
        return Err(QueryError::invalid_between(
            param,
            format!("expected two comma-separated dates, got {:?}", raw),
        ));
    };

    let start = parse_datetime(start.trim()).map_err(|e| {
        QueryError::invalid_between(param, format!("invalid start date: {}", e))
    })?;
    let end = parse_datetime(end.trim())
        .map_err(|e| QueryError::invalid_between(param, format!("invalid end date: {}", e)))?;

    Ok((start, end))
}

/// Escape a literal so that pattern metacharacters match themselves.
pub fn escape_pattern(raw: &str) -> String {
    regex_lite::escape(raw)
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::TimeZone;

    #[test]
    fn test_text_passes_through() {
        assert_eq!(
            coerce(FieldType::Text, "name", " Ada ").unwrap(),
            Value::String(" Ada ".into())
        );
    }

    #[test]
    fn test_datetime() {
        let v = coerce(FieldType::DateTime, "birthdate", "2020-01-01T02:00:00+02:00").unwrap();
        assert_eq!(
            v,
            Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );

        let err = coerce(FieldType::DateTime, "birthdate_gt", "2020-01-01").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateFormat);
        assert!(err.message.contains("birthdate_gt"));
    }

    #[test]
    fn test_float() {
        assert_eq!(coerce(FieldType::Float, "score", "2.5").unwrap(), Value::Float(2.5));

        let err = coerce(FieldType::Float, "score_lt", "two").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFloatFormat);
        assert!(err.message.contains("score_lt"));
    }

    #[test]
    fn test_integer_and_key() {
        assert_eq!(coerce(FieldType::Integer, "age", "-3").unwrap(), Value::Integer(-3));
        assert_eq!(
            coerce(FieldType::Integer, "age", "3.0").unwrap_err().code,
            ErrorCode::InvalidIntegerFormat
        );

        let oid = ObjectId::new();
        assert_eq!(
            coerce(FieldType::Key, "id", &oid.to_hex()).unwrap(),
            Value::Key(oid)
        );
        assert_eq!(
            coerce(FieldType::Key, "id", "nope").unwrap_err().code,
            ErrorCode::InvalidKeyFormat
        );
    }

    #[test]
    fn test_between() {
        let (start, end) =
            parse_between("at_between", "2020-01-01T00:00:00Z, 2020-12-31T23:59:59Z").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_between_rejects_bad_shapes() {
        for raw in ["onlyone", "a,b,c", "", "2020-01-01T00:00:00Z,"] {
            let err = parse_between("at_between", raw).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidBetweenValue, "{raw}");
        }

        let err = parse_between("at_between", "2020-01-01T00:00:00Z,tomorrow").unwrap_err();
        assert!(err.message.contains("end date"));
    }

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern("a.b"), r"a\.b");
        assert_eq!(escape_pattern("(x)*"), r"\(x\)\*");
        assert_eq!(escape_pattern("plain"), "plain");
    }
}
