//! Declarative field schemas for wizard steps
//!
//! A schema describes the shape of one step's draft: its named fields,
//! their kinds, defaults, and validation rules. Validation is total and
//! pure: it never mutates the draft and reports one message per invalid
//! field rather than a bare boolean.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::wizard_data::StepDraft;
use crate::types::FieldValue;
use crate::EngineError;

/// Primitive kind of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free-form text
    Text,
    /// Whole number
    Integer,
    /// Floating-point number
    Number,
    /// Boolean flag
    Boolean,
    /// Calendar date
    Date,
    /// Text constrained to one of the listed options
    Choice(Vec<String>),
}

/// A validation rule applied to a present field value
///
/// Rules run only after the value conforms to its field kind, so each
/// rule can assume the matching accessor succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationRule {
    /// Text must contain at least one non-whitespace character
    NonEmpty,
    /// Text must parse as a UUID
    Uuid,
    /// Numeric value must be at least the given bound
    Min(f64),
    /// Numeric value must be at most the given bound
    Max(f64),
}

/// Declaration of a single field within a step schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within its schema
    pub name: String,

    /// Kind of value the field holds
    pub kind: FieldKind,

    /// Whether the field must be present for the step to be valid
    pub required: bool,

    /// Default value used when a draft has never been touched
    pub default: Option<FieldValue>,

    /// Validation rules applied when the field is present
    pub rules: Vec<ValidationRule>,
}

impl FieldSpec {
    /// Create an optional field with no default and no rules
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            rules: Vec::new(),
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the field's default value
    pub fn with_default(mut self, default: FieldValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach a validation rule
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Result of validating a step draft against its schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// One error message per invalid field
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// True when no field has an error
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// An ordered set of field declarations for one wizard step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// Create a schema from an ordered list of field declarations
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Create a schema with no fields (steps that collect nothing)
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// The field declarations, in declaration order
    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field declaration by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build the untouched draft: every field with a declared default is
    /// present, all others are absent
    pub fn defaults(&self) -> StepDraft {
        let mut draft = StepDraft::new();
        for field in &self.fields {
            if let Some(default) = &field.default {
                draft.insert(&field.name, default.clone());
            }
        }
        draft
    }

    /// Merge two schemas into a composite one, used when a single wizard
    /// step edits two related domain records at once
    ///
    /// A field name collision is rejected outright so neither schema's
    /// errors can silently shadow the other's.
    pub fn merge(mut self, other: FieldSchema) -> Result<FieldSchema, EngineError> {
        for field in other.fields {
            if self.field(&field.name).is_some() {
                return Err(EngineError::DefinitionError(format!(
                    "Field name collision in merged schema: {}",
                    field.name
                )));
            }
            self.fields.push(field);
        }
        Ok(self)
    }

    /// Coerce a raw JSON edit into a typed field value
    ///
    /// `None` means the field is absent: nulls always, and empty strings
    /// for every kind except free-form text (string-typed HTML inputs
    /// report cleared numeric fields as `""`, which must never become
    /// NaN). Unparseable input is kept verbatim as text so validation
    /// can report a kind error instead of losing the user's keystrokes.
    pub fn coerce(kind: &FieldKind, raw: &serde_json::Value) -> Option<FieldValue> {
        use serde_json::Value;

        if raw.is_null() {
            return None;
        }

        match kind {
            FieldKind::Text => match raw {
                Value::String(s) => Some(FieldValue::Text(s.clone())),
                Value::Bool(b) => Some(FieldValue::Text(b.to_string())),
                Value::Number(n) => Some(FieldValue::Text(n.to_string())),
                other => Some(FieldValue::Text(other.to_string())),
            },
            FieldKind::Choice(_) => match raw {
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(FieldValue::Text(s.clone())),
                other => Some(FieldValue::Text(other.to_string())),
            },
            FieldKind::Integer => match raw {
                Value::Number(n) => match n.as_i64() {
                    Some(i) => Some(FieldValue::Integer(i)),
                    None => n.as_f64().map(FieldValue::Number),
                },
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        None
                    } else if let Ok(i) = trimmed.parse::<i64>() {
                        Some(FieldValue::Integer(i))
                    } else if let Ok(f) = trimmed.parse::<f64>() {
                        Some(FieldValue::Number(f))
                    } else {
                        Some(FieldValue::Text(s.clone()))
                    }
                }
                other => Some(FieldValue::Text(other.to_string())),
            },
            FieldKind::Number => match raw {
                Value::Number(n) => n.as_f64().map(FieldValue::Number),
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        None
                    } else if let Ok(f) = trimmed.parse::<f64>() {
                        Some(FieldValue::Number(f))
                    } else {
                        Some(FieldValue::Text(s.clone()))
                    }
                }
                other => Some(FieldValue::Text(other.to_string())),
            },
            FieldKind::Boolean => match raw {
                Value::Bool(b) => Some(FieldValue::Boolean(*b)),
                Value::String(s) => match s.trim() {
                    "" => None,
                    "true" => Some(FieldValue::Boolean(true)),
                    "false" => Some(FieldValue::Boolean(false)),
                    _ => Some(FieldValue::Text(s.clone())),
                },
                other => Some(FieldValue::Text(other.to_string())),
            },
            FieldKind::Date => match raw {
                Value::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                            Ok(d) => Some(FieldValue::Date(d)),
                            Err(_) => Some(FieldValue::Text(s.clone())),
                        }
                    }
                }
                other => Some(FieldValue::Text(other.to_string())),
            },
        }
    }

    /// Validate a draft against this schema
    ///
    /// Total: never panics, reports one message per invalid field.
    /// Absent optional fields are valid; absent required fields are not.
    pub fn validate(&self, draft: &StepDraft) -> ValidationReport {
        let mut report = ValidationReport::default();

        for field in &self.fields {
            let error = match draft.get(&field.name) {
                None => {
                    if field.required {
                        Some("is required".to_string())
                    } else {
                        None
                    }
                }
                Some(value) => Self::check_value(field, value),
            };

            if let Some(message) = error {
                report.field_errors.insert(field.name.clone(), message);
            }
        }

        report
    }

    /// Re-shape an externally supplied draft (restored snapshot or
    /// template prefill) to this schema
    ///
    /// Unknown field names or kind-incompatible values mean the draft
    /// came from an incompatible source; the caller falls back to
    /// defaults in that case. Values merely failing validation rules
    /// (an in-progress edit) conform fine.
    pub fn conform(&self, draft: &StepDraft) -> Result<StepDraft, EngineError> {
        let mut conformed = StepDraft::new();

        for (name, value) in draft.iter() {
            let field = self.field(name).ok_or_else(|| {
                EngineError::ValidationError(format!("Unknown field in draft: {}", name))
            })?;

            match Self::coerce(&field.kind, &value.to_json()) {
                Some(coerced) => {
                    if let Some(message) = Self::kind_error(&field.kind, &coerced) {
                        return Err(EngineError::ValidationError(format!(
                            "Field '{}' {}",
                            name, message
                        )));
                    }
                    conformed.insert(name, coerced);
                }
                None => {
                    // Coerced to absent; leave the field out
                }
            }
        }

        Ok(conformed)
    }

    /// First error for a present value: kind conformance, then rules
    fn check_value(field: &FieldSpec, value: &FieldValue) -> Option<String> {
        if let Some(message) = Self::kind_error(&field.kind, value) {
            return Some(message);
        }

        for rule in &field.rules {
            let message = match rule {
                ValidationRule::NonEmpty => match value.as_text() {
                    Some(s) if s.trim().is_empty() => Some("must not be empty".to_string()),
                    _ => None,
                },
                ValidationRule::Uuid => match value.as_text() {
                    Some(s) if Uuid::parse_str(s).is_err() => {
                        Some("must be a valid UUID".to_string())
                    }
                    _ => None,
                },
                ValidationRule::Min(min) => match value.as_number() {
                    Some(n) if n < *min => Some(format!("must be at least {}", min)),
                    _ => None,
                },
                ValidationRule::Max(max) => match value.as_number() {
                    Some(n) if n > *max => Some(format!("must be at most {}", max)),
                    _ => None,
                },
            };

            if message.is_some() {
                return message;
            }
        }

        None
    }

    /// Check that a value matches its declared kind
    fn kind_error(kind: &FieldKind, value: &FieldValue) -> Option<String> {
        match kind {
            FieldKind::Text => {
                if value.as_text().is_none() {
                    Some("must be text".to_string())
                } else {
                    None
                }
            }
            FieldKind::Choice(options) => match value.as_text() {
                Some(s) if options.iter().any(|o| o == s) => None,
                _ => Some(format!("must be one of: {}", options.join(", "))),
            },
            FieldKind::Integer => {
                if value.as_integer().is_none() {
                    Some("must be a whole number".to_string())
                } else {
                    None
                }
            }
            FieldKind::Number => {
                if value.as_number().is_none() {
                    Some("must be a number".to_string())
                } else {
                    None
                }
            }
            FieldKind::Boolean => {
                if value.as_boolean().is_none() {
                    Some("must be true or false".to_string())
                } else {
                    None
                }
            }
            FieldKind::Date => {
                if value.as_date().is_none() {
                    Some("must be a date (YYYY-MM-DD)".to_string())
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact_schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldSpec::new("name", FieldKind::Text)
                .required()
                .with_rule(ValidationRule::NonEmpty),
            FieldSpec::new("headcount", FieldKind::Integer)
                .with_rule(ValidationRule::Min(0.0)),
            FieldSpec::new(
                "phase",
                FieldKind::Choice(vec!["advance".to_string(), "strike".to_string()]),
            )
            .with_default(FieldValue::Text("advance".to_string())),
        ])
    }

    #[test]
    fn test_defaults_only_declared_fields_present() {
        let draft = contact_schema().defaults();

        assert_eq!(draft.get("phase"), Some(&FieldValue::Text("advance".to_string())));
        assert_eq!(draft.get("name"), None);
        assert_eq!(draft.get("headcount"), None);
    }

    #[test]
    fn test_validate_required_and_rules() {
        let schema = contact_schema();
        let mut draft = schema.defaults();

        // Required field absent
        let report = schema.validate(&draft);
        assert!(!report.is_valid());
        assert_eq!(report.field_errors.get("name").unwrap(), "is required");

        // Whitespace-only text fails NonEmpty
        draft.insert("name", FieldValue::Text("   ".to_string()));
        let report = schema.validate(&draft);
        assert_eq!(
            report.field_errors.get("name").unwrap(),
            "must not be empty"
        );

        // Negative headcount fails Min
        draft.insert("name", FieldValue::Text("FOH crew".to_string()));
        draft.insert("headcount", FieldValue::Integer(-5));
        let report = schema.validate(&draft);
        assert_eq!(
            report.field_errors.get("headcount").unwrap(),
            "must be at least 0"
        );

        draft.insert("headcount", FieldValue::Integer(3));
        assert!(schema.validate(&draft).is_valid());
    }

    #[test]
    fn test_validate_is_pure() {
        let schema = contact_schema();
        let draft = schema.defaults();
        let before = draft.clone();

        let _ = schema.validate(&draft);
        let _ = schema.validate(&draft);

        assert_eq!(draft, before);
    }

    #[test]
    fn test_validate_choice_kind() {
        let schema = contact_schema();
        let mut draft = schema.defaults();
        draft.insert("name", FieldValue::Text("crew".to_string()));
        draft.insert("phase", FieldValue::Text("teardown".to_string()));

        let report = schema.validate(&draft);
        assert_eq!(
            report.field_errors.get("phase").unwrap(),
            "must be one of: advance, strike"
        );
    }

    #[test]
    fn test_validate_uuid_rule() {
        let schema = FieldSchema::new(vec![FieldSpec::new("venue_id", FieldKind::Text)
            .required()
            .with_rule(ValidationRule::Uuid)]);

        let mut draft = StepDraft::new();
        draft.insert("venue_id", FieldValue::Text("not-a-uuid".to_string()));
        let report = schema.validate(&draft);
        assert_eq!(
            report.field_errors.get("venue_id").unwrap(),
            "must be a valid UUID"
        );

        draft.insert(
            "venue_id",
            FieldValue::Text("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string()),
        );
        assert!(schema.validate(&draft).is_valid());
    }

    #[test]
    fn test_coerce_empty_string_numeric_is_absent() {
        // A cleared string-typed numeric input must become absent, not NaN
        assert_eq!(FieldSchema::coerce(&FieldKind::Integer, &json!("")), None);
        assert_eq!(FieldSchema::coerce(&FieldKind::Number, &json!(" ")), None);
        assert_eq!(FieldSchema::coerce(&FieldKind::Date, &json!("")), None);
        assert_eq!(FieldSchema::coerce(&FieldKind::Boolean, &json!("")), None);
    }

    #[test]
    fn test_coerce_absent_optional_is_valid() {
        let schema = FieldSchema::new(vec![FieldSpec::new("headcount", FieldKind::Integer)]);
        let draft = StepDraft::new();
        assert!(schema.validate(&draft).is_valid());
    }

    #[test]
    fn test_coerce_parses_string_inputs() {
        assert_eq!(
            FieldSchema::coerce(&FieldKind::Integer, &json!("42")),
            Some(FieldValue::Integer(42))
        );
        assert_eq!(
            FieldSchema::coerce(&FieldKind::Number, &json!("2.5")),
            Some(FieldValue::Number(2.5))
        );
        assert_eq!(
            FieldSchema::coerce(&FieldKind::Boolean, &json!("true")),
            Some(FieldValue::Boolean(true))
        );
        assert_eq!(
            FieldSchema::coerce(&FieldKind::Date, &json!("2024-06-01")),
            Some(FieldValue::Date(
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
            ))
        );
    }

    #[test]
    fn test_coerce_unparseable_kept_for_validation() {
        // Garbage input stays verbatim so validate reports a kind error
        let coerced = FieldSchema::coerce(&FieldKind::Integer, &json!("abc")).unwrap();
        assert_eq!(coerced, FieldValue::Text("abc".to_string()));

        let schema = FieldSchema::new(vec![FieldSpec::new("headcount", FieldKind::Integer)]);
        let mut draft = StepDraft::new();
        draft.insert("headcount", coerced);
        let report = schema.validate(&draft);
        assert_eq!(
            report.field_errors.get("headcount").unwrap(),
            "must be a whole number"
        );
    }

    #[test]
    fn test_merge_unions_fields() {
        let content = FieldSchema::new(vec![FieldSpec::new("content_location", FieldKind::Text)]);
        let media = FieldSchema::new(vec![FieldSpec::new("media_location", FieldKind::Text)]);

        let merged = content.merge(media).unwrap();
        assert!(merged.field("content_location").is_some());
        assert!(merged.field("media_location").is_some());
        assert_eq!(merged.fields().len(), 2);
    }

    #[test]
    fn test_merge_reports_union_of_errors() {
        let a = FieldSchema::new(vec![FieldSpec::new("a", FieldKind::Text).required()]);
        let b = FieldSchema::new(vec![FieldSpec::new("b", FieldKind::Integer).required()]);
        let merged = a.merge(b).unwrap();

        let report = merged.validate(&StepDraft::new());
        assert_eq!(report.field_errors.len(), 2);
        assert!(report.field_errors.contains_key("a"));
        assert!(report.field_errors.contains_key("b"));
    }

    #[test]
    fn test_merge_rejects_field_collision() {
        let a = FieldSchema::new(vec![FieldSpec::new("location", FieldKind::Text)]);
        let b = FieldSchema::new(vec![FieldSpec::new("location", FieldKind::Text)]);

        let result = a.merge(b);
        match result {
            Err(EngineError::DefinitionError(msg)) => {
                assert!(msg.contains("location"));
            }
            _ => panic!("Expected DefinitionError"),
        }
    }

    #[test]
    fn test_conform_accepts_rule_failures() {
        // Values failing rules (an in-progress edit) still conform
        let schema = FieldSchema::new(vec![FieldSpec::new("venue_id", FieldKind::Text)
            .with_rule(ValidationRule::Uuid)]);

        let mut draft = StepDraft::new();
        draft.insert("venue_id", FieldValue::Text("half-typed".to_string()));

        let conformed = schema.conform(&draft).unwrap();
        assert_eq!(
            conformed.get("venue_id"),
            Some(&FieldValue::Text("half-typed".to_string()))
        );
    }

    #[test]
    fn test_conform_rejects_unknown_field() {
        let schema = contact_schema();
        let mut draft = StepDraft::new();
        draft.insert("rider_notes", FieldValue::Text("from another template".to_string()));

        assert!(schema.conform(&draft).is_err());
    }

    #[test]
    fn test_conform_rejects_kind_mismatch() {
        let schema = contact_schema();
        let mut draft = StepDraft::new();
        draft.insert("headcount", FieldValue::Text("lots".to_string()));

        assert!(schema.conform(&draft).is_err());
    }

    #[test]
    fn test_schema_serialization() {
        let schema = contact_schema();
        let serialized = serde_json::to_string(&schema).unwrap();
        let deserialized: FieldSchema = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, schema);
    }
}
