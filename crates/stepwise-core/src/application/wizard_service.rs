//! The running wizard instance
//!
//! [`WizardService`] walks one user through an ordered step sequence:
//! it owns the wizard data aggregate, the navigation gate, and the
//! controller of the current step. Edits arrive as explicit
//! [`FieldEdit`] messages rather than UI callbacks, so a run can be
//! replayed deterministically in tests. Every accepted edit triggers a
//! best-effort auto-save of the full snapshot; finishing runs the
//! ordered submission batch and is the only path to `Completed`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::submitter::{CompletionSubmitter, SubmissionReport};
use crate::domain::controller::{EditOutcome, StepController};
use crate::domain::field_schema::ValidationReport;
use crate::domain::gate::{NavigationGate, WizardRunState, WizardStatus};
use crate::domain::repository::{DraftRepository, RecordStore};
use crate::domain::step::{StepDefinition, StepId, WizardDefinition, WizardInstanceId};
use crate::domain::template::WorkflowTemplate;
use crate::domain::wizard_data::{StepDraft, WizardData};
use crate::EngineError;

/// One field edit, addressed to a step
///
/// Only the currently rendered step may be edited; the engine is
/// single-focus by design.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    /// Step the edit targets
    pub step_id: StepId,

    /// Field being edited
    pub field: String,

    /// Raw value as reported by the embedding layer
    pub value: serde_json::Value,
}

/// A running wizard instance
///
/// Must be driven from within a tokio runtime: auto-saves are spawned
/// as detached tasks so they never delay the interaction that triggered
/// them.
pub struct WizardService {
    definition: WizardDefinition,
    instance_id: WizardInstanceId,
    data: WizardData,
    gate: NavigationGate,
    controller: StepController,
    draft_repo: Arc<dyn DraftRepository>,
    submitter: CompletionSubmitter,
}

impl WizardService {
    /// Start a fresh wizard instance
    pub fn start(
        definition: WizardDefinition,
        draft_repo: Arc<dyn DraftRepository>,
        record_store: Arc<dyn RecordStore>,
    ) -> Result<Self, EngineError> {
        Self::with_data(
            definition,
            WizardInstanceId::new(),
            WizardData::new(),
            draft_repo,
            record_store,
        )
    }

    /// Resume a wizard instance from its auto-saved snapshot
    ///
    /// A missing snapshot starts fresh under the given instance id.
    pub async fn resume(
        definition: WizardDefinition,
        instance_id: WizardInstanceId,
        draft_repo: Arc<dyn DraftRepository>,
        record_store: Arc<dyn RecordStore>,
    ) -> Result<Self, EngineError> {
        let data = draft_repo.load(&instance_id).await?.unwrap_or_default();
        Self::with_data(definition, instance_id, data, draft_repo, record_store)
    }

    fn with_data(
        definition: WizardDefinition,
        instance_id: WizardInstanceId,
        data: WizardData,
        draft_repo: Arc<dyn DraftRepository>,
        record_store: Arc<dyn RecordStore>,
    ) -> Result<Self, EngineError> {
        definition.validate()?;

        let gate = NavigationGate::new(definition.step_ids());
        let first = &definition.steps[0];
        let controller = StepController::initialize(first.schema.clone(), data.get(&first.id));

        let mut service = Self {
            definition,
            instance_id,
            data,
            gate,
            controller,
            draft_repo,
            submitter: CompletionSubmitter::new(record_store),
        };

        // The gate mirrors the controller's report from the start, so a
        // step with no required fields is immediately passable
        let current = service.gate.current_step().clone();
        service
            .gate
            .record_validity(current, service.controller.current_validity());

        Ok(service)
    }

    /// Apply one field edit to the current step
    ///
    /// The updated draft and its validity are stored in the same change
    /// cycle, then the full snapshot is auto-saved without being
    /// awaited.
    pub fn apply_edit(&mut self, edit: FieldEdit) -> Result<EditOutcome, EngineError> {
        let current = self.gate.current_step().clone();
        if edit.step_id != current {
            return Err(EngineError::NavigationBlocked(format!(
                "Only the current step ({}) may be edited",
                current.0
            )));
        }
        if self.gate.status() != WizardStatus::InProgress {
            return Err(EngineError::NavigationBlocked(
                "The wizard is no longer accepting edits".to_string(),
            ));
        }

        let outcome = self.controller.apply_field_change(&edit.field, &edit.value)?;

        self.data.set(current.clone(), outcome.draft.clone());
        self.gate.record_validity(current, outcome.valid);
        self.gate.mark_edited();
        self.autosave();

        Ok(outcome)
    }

    /// Move to the next step; blocked while the current step is invalid
    pub fn next(&mut self) -> Result<usize, EngineError> {
        let index = self.gate.advance()?;
        self.enter_current_step();
        debug!("Advanced to step {}", self.gate.current_step().0);
        Ok(index)
    }

    /// Move to the previous step; always allowed above the first step
    pub fn prev(&mut self) -> Result<usize, EngineError> {
        let index = self.gate.retreat()?;
        self.enter_current_step();
        debug!("Returned to step {}", self.gate.current_step().0);
        Ok(index)
    }

    /// Seed the run from a template, replacing all drafts
    ///
    /// Refused once any step has been edited manually, unless the
    /// caller confirms the overwrite explicitly.
    pub fn load_template(
        &mut self,
        template: &WorkflowTemplate,
        overwrite: bool,
    ) -> Result<(), EngineError> {
        if self.gate.edited() && !overwrite {
            return Err(EngineError::TemplateError(format!(
                "Template {} would overwrite manual edits",
                template.id.0
            )));
        }

        self.data = template.instantiate(&self.definition);
        self.gate.seed_from_template()?;
        self.enter_current_step();
        self.autosave();

        info!("Seeded wizard {} from template {}", self.instance_id.0, template.id.0);
        Ok(())
    }

    /// Finish the wizard: run the submission batch
    ///
    /// Legal only from the last step with that step valid. On success
    /// the instance is `Completed` and accepts no further transitions;
    /// on failure it reverts to `InProgress` so the caller can retry.
    /// The batch itself is never cancelled mid-flight.
    pub async fn finish(&mut self) -> Result<SubmissionReport, EngineError> {
        self.gate.begin_submission()?;
        info!("Submitting wizard instance {}", self.instance_id.0);

        let snapshot = self.data.snapshot();
        match self.submitter.submit(&self.definition.steps, &snapshot).await {
            Ok(report) => {
                self.gate.complete_submission();
                info!(
                    "Wizard instance {} completed with {} records",
                    self.instance_id.0,
                    report.created.len()
                );
                Ok(report)
            }
            Err(error) => {
                self.gate.abort_submission();
                Err(error)
            }
        }
    }

    /// Fire-and-forget snapshot persistence; failures are logged only
    fn autosave(&self) {
        let repo = Arc::clone(&self.draft_repo);
        let instance_id = self.instance_id.clone();
        let snapshot = self.data.snapshot();

        tokio::spawn(async move {
            if let Err(error) = repo.save(&instance_id, &snapshot).await {
                warn!("Auto-save failed for instance {}: {}", instance_id.0, error);
            }
        });
    }

    /// Swap the controller to the current step, restoring its draft and
    /// mirroring its validity into the gate
    fn enter_current_step(&mut self) {
        let step = &self.definition.steps[self.gate.current_index()];
        self.controller = StepController::initialize(step.schema.clone(), self.data.get(&step.id));
        self.gate
            .record_validity(step.id.clone(), self.controller.current_validity());
    }

    /// Instance identifier, keys the auto-saved snapshot
    #[inline]
    pub fn instance_id(&self) -> &WizardInstanceId {
        &self.instance_id
    }

    /// The wizard definition this instance runs
    #[inline]
    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    /// Definition of the current step
    pub fn current_step(&self) -> &StepDefinition {
        &self.definition.steps[self.gate.current_index()]
    }

    /// Index of the current step
    #[inline]
    pub fn current_index(&self) -> usize {
        self.gate.current_index()
    }

    /// Draft of the current step
    #[inline]
    pub fn current_draft(&self) -> &StepDraft {
        self.controller.draft()
    }

    /// Validation report of the current step
    #[inline]
    pub fn current_report(&self) -> &ValidationReport {
        self.controller.report()
    }

    /// Instance status; `Submitting` is the UI's "saving" flag
    #[inline]
    pub fn status(&self) -> WizardStatus {
        self.gate.status()
    }

    /// Snapshot of the navigation state
    pub fn run_state(&self) -> WizardRunState {
        self.gate.run_state()
    }

    /// Snapshot of all step drafts
    pub fn snapshot(&self) -> WizardData {
        self.data.snapshot()
    }
}
