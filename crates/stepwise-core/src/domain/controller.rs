//! Step controllers bind a field schema to a live editable draft
//!
//! A controller owns the draft of exactly one step while that step is
//! current. Every accepted edit yields an [`EditOutcome`] carrying both
//! the updated draft and its validity, so the data store and the
//! navigation gate always observe the same change cycle.

use tracing::warn;

use crate::domain::field_schema::{FieldSchema, ValidationReport};
use crate::domain::wizard_data::StepDraft;
use crate::EngineError;

/// The result of one field edit: updated draft and validity, together
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Draft after the edit
    pub draft: StepDraft,

    /// Whether the draft now passes its schema
    pub valid: bool,

    /// Per-field error messages for the invalid fields
    pub report: ValidationReport,
}

/// Binds a field schema to an editable draft and tracks validity
#[derive(Debug, Clone)]
pub struct StepController {
    schema: FieldSchema,
    draft: StepDraft,
    report: ValidationReport,
}

impl StepController {
    /// Initialize a controller from a previous draft, or from schema
    /// defaults when the step was never visited
    ///
    /// A previous draft that does not conform to the schema (residue of
    /// an incompatible template) falls back to defaults rather than
    /// failing the wizard.
    pub fn initialize(schema: FieldSchema, previous: Option<&StepDraft>) -> Self {
        let draft = match previous {
            Some(existing) => match schema.conform(existing) {
                Ok(conformed) => conformed,
                Err(error) => {
                    warn!("Draft does not match step schema, using defaults: {}", error);
                    schema.defaults()
                }
            },
            None => schema.defaults(),
        };

        let report = schema.validate(&draft);
        Self {
            schema,
            draft,
            report,
        }
    }

    /// Apply one field edit and revalidate
    ///
    /// Pure update of the previous draft: only the named field changes.
    /// Raw input is coerced through the schema; coercion to absent
    /// clears the field.
    pub fn apply_field_change(
        &mut self,
        field: &str,
        raw: &serde_json::Value,
    ) -> Result<EditOutcome, EngineError> {
        let spec = self.schema.field(field).ok_or_else(|| {
            EngineError::ValidationError(format!("Unknown field: {}", field))
        })?;

        let value = FieldSchema::coerce(&spec.kind, raw);
        self.draft.set(field, value);
        self.report = self.schema.validate(&self.draft);

        Ok(EditOutcome {
            draft: self.draft.clone(),
            valid: self.report.is_valid(),
            report: self.report.clone(),
        })
    }

    /// Current draft
    #[inline]
    pub fn draft(&self) -> &StepDraft {
        &self.draft
    }

    /// Whether the current draft passes its schema
    #[inline]
    pub fn current_validity(&self) -> bool {
        self.report.is_valid()
    }

    /// Latest validation report
    #[inline]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}
