//! Batch submission of a completed wizard
//!
//! On finish, the submitter walks the wizard's steps in declaration
//! order and turns each present, non-empty draft into domain-record
//! creations against the record store. Creations run sequentially so
//! later records can reference ids generated by earlier ones. The first
//! failure aborts the remaining batch; records already created are left
//! as committed (no compensating deletes).

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::domain::repository::RecordStore;
use crate::domain::step::{BindingSource, RecordMapping, StepDefinition, StepId};
use crate::domain::wizard_data::{StepDraft, WizardData};
use crate::types::{CreatedRecord, RecordFields};
use crate::EngineError;

/// Ids generated so far within one submission batch
#[derive(Debug, Default)]
pub struct SubmissionContext {
    created: Vec<(StepId, CreatedRecord)>,
}

impl SubmissionContext {
    /// Generated id of the most recent record a step created in a table
    pub fn created_id(&self, step: &StepId, table: &str) -> Option<&str> {
        self.created
            .iter()
            .rev()
            .find(|(s, r)| s == step && r.table == table)
            .map(|(_, r)| r.id.as_str())
    }

    fn push(&mut self, step: StepId, record: CreatedRecord) {
        self.created.push((step, record));
    }
}

/// Reference to one record created during submission
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRecordRef {
    /// Step whose mapping created the record
    pub step: StepId,

    /// Table the record was created in
    pub table: String,

    /// Store-generated id
    pub id: String,
}

/// What a successful submission created, in creation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReport {
    /// Created records, in creation order
    pub created: Vec<CreatedRecordRef>,
}

/// Performs the ordered record creations of a finished wizard
pub struct CompletionSubmitter {
    record_store: Arc<dyn RecordStore>,
}

impl CompletionSubmitter {
    /// Create a submitter over the given record store
    pub fn new(record_store: Arc<dyn RecordStore>) -> Self {
        Self { record_store }
    }

    /// Submit a wizard snapshot
    ///
    /// Iterates steps in declaration order, skipping steps whose draft
    /// is absent or empty. Aborts on the first creation failure and
    /// wraps the error with the failing step and table.
    pub async fn submit(
        &self,
        steps: &[StepDefinition],
        snapshot: &WizardData,
    ) -> Result<SubmissionReport, EngineError> {
        let mut context = SubmissionContext::default();
        let mut report = SubmissionReport::default();

        for step in steps {
            let draft = match snapshot.get(&step.id) {
                Some(draft) if !draft.is_empty() => draft,
                _ => continue,
            };

            for mapping in &step.mappings {
                let fields = Self::resolve_fields(&step.id, mapping, draft, &context)?;

                debug!(
                    "Creating '{}' record for step {}",
                    mapping.table, step.id.0
                );

                let record = self
                    .record_store
                    .create(&mapping.table, fields)
                    .await
                    .map_err(|e| {
                        error!(
                            "Record creation failed at step {} table '{}': {}",
                            step.id.0, mapping.table, e
                        );
                        EngineError::SubmissionFailed {
                            step: step.id.0.clone(),
                            table: mapping.table.clone(),
                            reason: e.to_string(),
                        }
                    })?;

                report.created.push(CreatedRecordRef {
                    step: step.id.clone(),
                    table: record.table.clone(),
                    id: record.id.clone(),
                });
                context.push(step.id.clone(), record);
            }
        }

        info!("Submission created {} records", report.created.len());
        Ok(report)
    }

    /// Resolve a mapping's column bindings against the step draft and
    /// the ids created earlier in this batch
    ///
    /// Absent draft fields are left out of the record; a dangling
    /// created-id reference fails the submission with full context.
    fn resolve_fields(
        step_id: &StepId,
        mapping: &RecordMapping,
        draft: &StepDraft,
        context: &SubmissionContext,
    ) -> Result<RecordFields, EngineError> {
        let mut fields = RecordFields::new();

        for binding in &mapping.bindings {
            match &binding.source {
                BindingSource::Field(name) => {
                    if let Some(value) = draft.get(name) {
                        fields.insert(binding.column.clone(), value.to_json());
                    }
                }
                BindingSource::CreatedId { step, table } => {
                    let id = context.created_id(step, table).ok_or_else(|| {
                        EngineError::SubmissionFailed {
                            step: step_id.0.clone(),
                            table: mapping.table.clone(),
                            reason: format!(
                                "No '{}' record was created by step {} earlier in this batch",
                                table, step.0
                            ),
                        }
                    })?;
                    fields.insert(binding.column.clone(), Value::String(id.to_string()));
                }
                BindingSource::Literal(value) => {
                    fields.insert(binding.column.clone(), value.clone());
                }
            }
        }

        Ok(fields)
    }
}
