//! Conversions from compiled filter values to BSON.

use bson::Bson;
use chrono::{DateTime, Utc};
use crudgate_query::Value;

/// Convert a typed filter value to BSON.
///
/// Integers are widened to 64 bits; the server compares numeric types by
/// value, so they still match 32-bit stored fields.
pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::String(s) => Bson::String(s.clone()),
        Value::Integer(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::DateTime(dt) => datetime_to_bson(*dt),
        Value::Key(oid) => Bson::ObjectId(*oid),
    }
}

/// Convert a UTC date-time to a BSON date (millisecond precision).
pub fn datetime_to_bson(value: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_chrono(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use chrono::TimeZone;

    #[test]
    fn test_scalar_values() {
        assert_eq!(value_to_bson(&Value::from("ada")), Bson::String("ada".into()));
        assert_eq!(value_to_bson(&Value::Integer(7)), Bson::Int64(7));
        assert_eq!(value_to_bson(&Value::Float(2.5)), Bson::Double(2.5));

        let oid = ObjectId::new();
        assert_eq!(value_to_bson(&Value::Key(oid)), Bson::ObjectId(oid));
    }

    #[test]
    fn test_datetime_value() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let Bson::DateTime(converted) = value_to_bson(&Value::DateTime(dt)) else {
            panic!("expected a BSON date");
        };
        assert_eq!(converted.timestamp_millis(), dt.timestamp_millis());
    }
}
