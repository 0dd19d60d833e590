//! Student record types and their document mapping.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::store::{Document, FieldValue, Fields, StoreError};

pub const NAME: &str = "name";
pub const MARKS: &str = "marks";
pub const TIMESTAMP: &str = "timestamp";

/// A mark in the inclusive range `[0, 100]`.
///
/// Whole marks serialize as JSON integers, fractional marks as floats.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Marks(f64);

impl Marks {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (Self::MIN..=Self::MAX).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn is_whole(self) -> bool {
        self.0.fract() == 0.0
    }
}

impl From<Marks> for FieldValue {
    fn from(marks: Marks) -> Self {
        if marks.is_whole() {
            FieldValue::Integer(marks.0 as i64)
        } else {
            FieldValue::Double(marks.0)
        }
    }
}

impl Serialize for Marks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Marks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Marks::new(value)
            .ok_or_else(|| de::Error::custom(format!("marks {value} outside [0, 100]")))
    }
}

/// A validated create/update payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    /// Trimmed, non-empty.
    pub name: String,
    pub marks: Marks,
}

impl StudentInput {
    /// Document fields for this input, stamped with `timestamp`.
    pub fn into_fields(self, timestamp: DateTime<Utc>) -> Fields {
        let mut fields = Fields::new();
        fields.insert(NAME.to_owned(), self.name.into());
        fields.insert(MARKS.to_owned(), self.marks.into());
        fields.insert(TIMESTAMP.to_owned(), timestamp.into());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub marks: Marks,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<Document> for StudentRecord {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let shape_error = |field: &str| {
            StoreError::UnexpectedShape(format!(
                "student `{}` has a missing or mistyped `{field}`",
                doc.id
            ))
        };

        let name = doc
            .fields
            .get(NAME)
            .and_then(FieldValue::as_str)
            .ok_or_else(|| shape_error(NAME))?
            .to_owned();
        let marks = doc
            .fields
            .get(MARKS)
            .and_then(FieldValue::as_f64)
            .and_then(Marks::new)
            .ok_or_else(|| shape_error(MARKS))?;
        let timestamp = doc
            .fields
            .get(TIMESTAMP)
            .and_then(FieldValue::as_timestamp)
            .ok_or_else(|| shape_error(TIMESTAMP))?;

        Ok(Self {
            id: doc.id,
            name,
            marks,
            timestamp,
        })
    }
}
