use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::step::StepId;
use crate::types::FieldValue;

/// The in-progress, possibly-invalid value of one wizard step
///
/// Shaped by the step's field schema. Written only through field-level
/// edits; an untouched draft carries the schema's declared defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDraft {
    values: BTreeMap<String, FieldValue>,
}

impl StepDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value
    #[inline]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Set a field value
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Set or clear a field value; `None` makes the field absent
    pub fn set(&mut self, name: impl Into<String>, value: Option<FieldValue>) {
        match value {
            Some(v) => {
                self.values.insert(name.into(), v);
            }
            None => {
                self.values.remove(&name.into());
            }
        }
    }

    /// True when no field is present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of present fields
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate present fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }
}

/// Aggregate: the latest draft of every visited step, keyed by step id
///
/// Owned exclusively by one running wizard instance. Absent entries mean
/// the step was never visited. Serialized wholesale for auto-save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardData {
    drafts: BTreeMap<StepId, StepDraft>,
}

impl WizardData {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a step's latest draft
    #[inline]
    pub fn get(&self, step_id: &StepId) -> Option<&StepDraft> {
        self.drafts.get(step_id)
    }

    /// Store a step's draft, last-write-wins
    pub fn set(&mut self, step_id: StepId, draft: StepDraft) {
        self.drafts.insert(step_id, draft);
    }

    /// Full copy of the aggregate, used for auto-save and submission
    pub fn snapshot(&self) -> WizardData {
        self.clone()
    }

    /// Step ids with a stored draft
    pub fn step_ids(&self) -> impl Iterator<Item = &StepId> {
        self.drafts.keys()
    }

    /// True when no step has a draft
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Number of steps with a stored draft
    #[inline]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }
}
