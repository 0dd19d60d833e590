//! Typed document field values.
//!
//! Values use the Cloud Firestore REST encoding on the wire and on disk:
//! a single-entry object keyed by the value kind, with 64-bit integers
//! carried as decimal strings.
//!
//! ```text
//! {"stringValue": "Alice"}
//! {"integerValue": "87"}
//! {"doubleValue": 87.5}
//! {"timestampValue": "2025-03-01T10:00:00.123456789Z"}
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Field name → value map of one document.
pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
}

impl FieldValue {
    /// Rank of the value kind in the cross-kind sort order.
    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Boolean(_) => 1,
            FieldValue::Integer(_) | FieldValue::Double(_) => 2,
            FieldValue::Timestamp(_) => 3,
            FieldValue::String(_) => 4,
        }
    }

    /// Compare two values of the same kind. Integers and doubles are both
    /// numbers; any other pairing of kinds yields `None`.
    pub fn compare_same_kind(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(a), Double(b)) => Some((*a as f64).total_cmp(b)),
            (Double(a), Integer(b)) => Some(a.total_cmp(&(*b as f64))),
            (Double(a), Double(b)) => Some(a.total_cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            // Rust string comparison is UTF-8 byte order.
            (String(a), String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting:
    /// null < booleans < numbers < timestamps < strings.
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        self.compare_same_kind(other)
            .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            FieldValue::Null => map.serialize_entry("nullValue", &())?,
            FieldValue::Boolean(v) => map.serialize_entry("booleanValue", v)?,
            FieldValue::Integer(v) => map.serialize_entry("integerValue", &v.to_string())?,
            FieldValue::Double(v) => map.serialize_entry("doubleValue", v)?,
            FieldValue::Timestamp(v) => map.serialize_entry(
                "timestampValue",
                &v.to_rfc3339_opts(SecondsFormat::Nanos, true),
            )?,
            FieldValue::String(v) => map.serialize_entry("stringValue", v)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        let wire = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut entries = wire.into_iter();
        let (kind, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err(de::Error::custom("expected exactly one value kind")),
        };

        match (kind.as_str(), value) {
            ("nullValue", _) => Ok(FieldValue::Null),
            ("booleanValue", Value::Bool(b)) => Ok(FieldValue::Boolean(b)),
            ("integerValue", Value::String(s)) => s
                .parse()
                .map(FieldValue::Integer)
                .map_err(|e| de::Error::custom(format!("invalid integerValue `{s}`: {e}"))),
            ("integerValue", Value::Number(n)) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| de::Error::custom("integerValue out of range")),
            ("doubleValue", Value::Number(n)) => n
                .as_f64()
                .map(FieldValue::Double)
                .ok_or_else(|| de::Error::custom("invalid doubleValue")),
            ("timestampValue", Value::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| de::Error::custom(format!("invalid timestampValue `{s}`: {e}"))),
            ("stringValue", Value::String(s)) => Ok(FieldValue::String(s)),
            (kind, value) => Err(de::Error::custom(format!(
                "unsupported field value `{kind}`: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_wire_encoding() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let mut fields = Fields::new();
        fields.insert("name".into(), "Alice".into());
        fields.insert("marks".into(), 87i64.into());
        fields.insert("timestamp".into(), ts.into());

        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "marks": {"integerValue": "87"},
                "name": {"stringValue": "Alice"},
                "timestamp": {"timestampValue": "2025-03-01T10:00:00.000000000Z"},
            })
        );
    }

    #[test]
    fn test_decodes_firestore_payload() {
        let fields: Fields = serde_json::from_value(json!({
            "marks": {"doubleValue": 91.5},
            "rank": {"integerValue": 3},
            "name": {"stringValue": "Bob"},
            "graduated": {"booleanValue": false},
            "note": {"nullValue": null},
            "timestamp": {"timestampValue": "2025-03-01T10:00:00.123456Z"},
        }))
        .unwrap();

        assert_eq!(fields["marks"], FieldValue::Double(91.5));
        assert_eq!(fields["rank"], FieldValue::Integer(3));
        assert_eq!(fields["name"].as_str(), Some("Bob"));
        assert_eq!(fields["graduated"], FieldValue::Boolean(false));
        assert_eq!(fields["note"], FieldValue::Null);
        assert!(fields["timestamp"].as_timestamp().is_some());
    }

    #[test]
    fn test_rejects_unknown_kinds() {
        let parsed = serde_json::from_value::<FieldValue>(json!({"mapValue": {}}));
        assert!(parsed.is_err());

        let parsed = serde_json::from_value::<FieldValue>(
            json!({"stringValue": "a", "integerValue": "1"}),
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cross_kind_ordering() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut values = vec![
            FieldValue::from("a"),
            FieldValue::from(ts),
            FieldValue::from(2.5),
            FieldValue::Null,
            FieldValue::from(2i64),
            FieldValue::from(true),
        ];
        values.sort_by(|a, b| a.total_cmp(b));

        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::from(true),
                FieldValue::from(2i64),
                FieldValue::from(2.5),
                FieldValue::from(ts),
                FieldValue::from("a"),
            ]
        );
    }

    #[test]
    fn test_same_kind_comparison() {
        assert_eq!(
            FieldValue::from(80i64).compare_same_kind(&FieldValue::from(80.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(FieldValue::from("80").compare_same_kind(&FieldValue::from(80i64)), None);
        assert_eq!(
            FieldValue::from("Al").compare_same_kind(&FieldValue::from("al")),
            Some(Ordering::Less)
        );
    }
}
