//! Pre-built wizard templates
//!
//! Templates are read-only reference data: a named, pre-filled starting
//! point that seeds a new [`WizardData`] before the wizard starts. The
//! catalog is injected into the engine rather than looked up through a
//! process-wide singleton, so embedders and tests can substitute their
//! own template sets.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::step::{StepId, WizardDefinition};
use crate::domain::wizard_data::{StepDraft, WizardData};

/// Value object: Template ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// A named, pre-filled starting point for a wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Unique identifier
    pub id: TemplateId,

    /// Human-readable name
    pub name: String,

    /// Description of what the template prepares
    pub description: Option<String>,

    /// Caller-defined grouping tag, e.g. a lifecycle phase name
    pub tag: String,

    /// Ordered prefilled drafts, keyed by the step they seed
    pub steps: Vec<(StepId, StepDraft)>,
}

impl WorkflowTemplate {
    /// Build a fresh [`WizardData`] from this template's prefills
    ///
    /// Drafts are deep-copied: later edits to the returned data never
    /// mutate the template. A template referencing unknown steps or
    /// carrying drafts that do not conform to their step schema is
    /// malformed; instantiation then falls back to an empty aggregate
    /// instead of applying the template partially.
    pub fn instantiate(&self, definition: &WizardDefinition) -> WizardData {
        let mut data = WizardData::new();

        for (step_id, prefill) in &self.steps {
            let step = match definition.step(step_id) {
                Some(step) => step,
                None => {
                    warn!(
                        "Template {} references unknown step {}, ignoring template",
                        self.id.0, step_id.0
                    );
                    return WizardData::new();
                }
            };

            match step.schema.conform(prefill) {
                Ok(draft) => data.set(step_id.clone(), draft),
                Err(error) => {
                    warn!(
                        "Template {} prefill for step {} is malformed, ignoring template: {}",
                        self.id.0, step_id.0, error
                    );
                    return WizardData::new();
                }
            }
        }

        data
    }
}

/// Injected, read-only catalog of workflow templates
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<WorkflowTemplate>,
}

impl TemplateCatalog {
    /// Create a catalog from a fixed template set
    pub fn new(templates: Vec<WorkflowTemplate>) -> Self {
        Self { templates }
    }

    /// All templates, in catalog order
    pub fn list(&self) -> impl Iterator<Item = &WorkflowTemplate> {
        self.templates.iter()
    }

    /// Templates carrying the given tag, in catalog order
    pub fn list_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a WorkflowTemplate> {
        self.templates.iter().filter(move |t| t.tag == tag)
    }

    /// Look up a template by id
    pub fn get(&self, id: &TemplateId) -> Option<&WorkflowTemplate> {
        self.templates.iter().find(|t| &t.id == id)
    }
}
