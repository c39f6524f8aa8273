use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::step::StepId;
use crate::EngineError;

/// Wizard instance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStatus {
    /// The wizard is being filled in
    InProgress,

    /// A submission batch is running; navigation is disabled
    Submitting,

    /// The wizard finished successfully; terminal
    Completed,
}

/// Read-only snapshot of a wizard's navigation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardRunState {
    /// Index of the current step in the definition's step order
    pub current_step_index: usize,

    /// Steps the user has reached at least once
    pub visited_steps: BTreeSet<StepId>,

    /// Latest controller-reported validity per step
    pub validity_by_step: BTreeMap<StepId, bool>,

    /// Instance status
    pub status: WizardStatus,
}

/// Enforces the wizard's navigation rules
///
/// Forward movement requires the current step to be valid; backward
/// movement is unconditional so earlier mistakes stay fixable. The
/// validity map is re-derived from controller reports, never settable
/// from outside.
#[derive(Debug, Clone)]
pub struct NavigationGate {
    steps: Vec<StepId>,
    current: usize,
    visited: BTreeSet<StepId>,
    validity: BTreeMap<StepId, bool>,
    status: WizardStatus,
    edited: bool,
}

impl NavigationGate {
    /// Create a gate positioned at the first of the given steps
    pub fn new(steps: Vec<StepId>) -> Self {
        let mut visited = BTreeSet::new();
        if let Some(first) = steps.first() {
            visited.insert(first.clone());
        }
        Self {
            steps,
            current: 0,
            visited,
            validity: BTreeMap::new(),
            status: WizardStatus::InProgress,
            edited: false,
        }
    }

    /// Index of the current step
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Id of the current step
    pub fn current_step(&self) -> &StepId {
        &self.steps[self.current]
    }

    /// True when the current step is the last one
    #[inline]
    pub fn at_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Instance status
    #[inline]
    pub fn status(&self) -> WizardStatus {
        self.status
    }

    /// True once any step has been edited manually in this run
    #[inline]
    pub fn edited(&self) -> bool {
        self.edited
    }

    /// Latest reported validity for a step; unreported steps are invalid
    pub fn is_step_valid(&self, step_id: &StepId) -> bool {
        self.validity.get(step_id).copied().unwrap_or(false)
    }

    /// Record a controller's validity report for a step
    ///
    /// This is the only way validity changes: the map mirrors the most
    /// recent report and is never independently settable.
    pub fn record_validity(&mut self, step_id: StepId, valid: bool) {
        self.validity.insert(step_id, valid);
    }

    /// Mark that a manual edit happened in this run
    pub fn mark_edited(&mut self) {
        self.edited = true;
    }

    /// Move forward one step
    ///
    /// Legal only while in progress, not on the last step, and with the
    /// current step reported valid.
    pub fn advance(&mut self) -> Result<usize, EngineError> {
        self.ensure_in_progress()?;

        if self.at_last_step() {
            return Err(EngineError::NavigationBlocked(
                "Already at the last step".to_string(),
            ));
        }

        let current_id = self.current_step().clone();
        if !self.is_step_valid(&current_id) {
            return Err(EngineError::NavigationBlocked(format!(
                "Step {} must be valid before moving on",
                current_id.0
            )));
        }

        self.current += 1;
        self.visited.insert(self.current_step().clone());
        Ok(self.current)
    }

    /// Move back one step; always legal above index 0
    pub fn retreat(&mut self) -> Result<usize, EngineError> {
        self.ensure_in_progress()?;

        if self.current == 0 {
            return Err(EngineError::NavigationBlocked(
                "Already at the first step".to_string(),
            ));
        }

        self.current -= 1;
        Ok(self.current)
    }

    /// Re-seed the run from a template: all steps become visited but
    /// unvalidated, and the first step becomes current
    pub fn seed_from_template(&mut self) -> Result<(), EngineError> {
        self.ensure_in_progress()?;

        self.current = 0;
        self.visited = self.steps.iter().cloned().collect();
        self.validity.clear();
        self.edited = false;
        Ok(())
    }

    /// Enter the submitting state
    ///
    /// Legal only from the last step with that step valid.
    pub fn begin_submission(&mut self) -> Result<(), EngineError> {
        self.ensure_in_progress()?;

        if !self.at_last_step() {
            return Err(EngineError::NavigationBlocked(
                "Finish is only available from the last step".to_string(),
            ));
        }

        let current_id = self.current_step().clone();
        if !self.is_step_valid(&current_id) {
            return Err(EngineError::NavigationBlocked(format!(
                "Step {} must be valid before finishing",
                current_id.0
            )));
        }

        self.status = WizardStatus::Submitting;
        Ok(())
    }

    /// Mark the submission batch as succeeded; the instance is done
    pub fn complete_submission(&mut self) {
        self.status = WizardStatus::Completed;
    }

    /// Revert to in-progress after a failed submission so the caller
    /// can retry
    pub fn abort_submission(&mut self) {
        if self.status == WizardStatus::Submitting {
            self.status = WizardStatus::InProgress;
        }
    }

    /// Snapshot of the run state for embedders
    pub fn run_state(&self) -> WizardRunState {
        WizardRunState {
            current_step_index: self.current,
            visited_steps: self.visited.clone(),
            validity_by_step: self.validity.clone(),
            status: self.status,
        }
    }

    fn ensure_in_progress(&self) -> Result<(), EngineError> {
        match self.status {
            WizardStatus::InProgress => Ok(()),
            WizardStatus::Submitting => Err(EngineError::NavigationBlocked(
                "A submission is in progress".to_string(),
            )),
            WizardStatus::Completed => Err(EngineError::NavigationBlocked(
                "The wizard is already completed".to_string(),
            )),
        }
    }
}
