use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields of a domain record, as handed to the record store
pub type RecordFields = serde_json::Map<String, serde_json::Value>;

/// A single typed field value inside a step draft
///
/// Raw edits arrive as JSON values from the embedding layer; the field
/// schema coerces them into this tagged union before they are stored in
/// a draft. Enumerated-string fields are `Text` values constrained by
/// their field kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free-form or enumerated text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Floating-point number
    Number(f64),
    /// Boolean flag
    Boolean(bool),
    /// Calendar date (no time component)
    Date(NaiveDate),
}

impl FieldValue {
    /// Convert the value to its JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(n) => serde_json::Value::Number((*n).into()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Date(d) => serde_json::Value::String(d.to_string()),
        }
    }

    /// Try to view the value as text
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view the value as a whole number
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to view the value as a floating-point number
    ///
    /// Integers widen so numeric validation rules apply to both kinds.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to view the value as a boolean
    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to view the value as a date
    #[inline]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// A record returned by the record store after creation, including the
/// generated id later mappings may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRecord {
    /// Store-generated identifier
    pub id: String,
    /// Table the record was created in
    pub table: String,
    /// Fields the record was created with
    pub fields: RecordFields,
}
