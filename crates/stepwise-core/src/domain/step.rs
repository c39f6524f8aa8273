use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::field_schema::FieldSchema;
use crate::EngineError;

/// Value object: Step ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub String);

/// Value object: Wizard (definition) ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WizardId(pub String);

/// Value object: Wizard instance ID, keys auto-saved snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WizardInstanceId(pub String);

impl WizardInstanceId {
    /// Generate a fresh instance id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for WizardInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a record column's value comes from at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingSource {
    /// The named field of the owning step's draft; absent fields are
    /// simply left out of the record
    Field(String),
    /// The generated id of a record created earlier in the same batch
    CreatedId {
        /// Step that created the referenced record
        step: StepId,
        /// Table the referenced record was created in
        table: String,
    },
    /// A fixed value
    Literal(serde_json::Value),
}

/// Binds one record column to its value source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    /// Column name in the target table
    pub column: String,

    /// Source of the column's value
    pub source: BindingSource,
}

impl FieldBinding {
    /// Bind a column to a draft field of the same step
    pub fn field(column: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            source: BindingSource::Field(field.into()),
        }
    }

    /// Bind a column to the generated id of an earlier creation
    pub fn created_id(
        column: impl Into<String>,
        step: StepId,
        table: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            source: BindingSource::CreatedId {
                step,
                table: table.into(),
            },
        }
    }

    /// Bind a column to a fixed value
    pub fn literal(column: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            column: column.into(),
            source: BindingSource::Literal(value),
        }
    }
}

/// Maps a step's draft onto one domain-record creation
///
/// One step may carry several mappings when it edits related records at
/// once (e.g. content, database, and media archival rows). Mappings run
/// in declaration order within their step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMapping {
    /// Target table identifier at the persistence boundary
    pub table: String,

    /// Column bindings for the created record
    pub bindings: Vec<FieldBinding>,
}

/// Represents a step in a wizard definition
///
/// Immutable once a wizard instance starts; owned by the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// ID of the step, unique within its wizard
    pub id: StepId,

    /// Human-readable title of the step
    pub title: String,

    /// Description of the step
    pub description: Option<String>,

    /// Schema describing the step's draft shape and validation
    pub schema: FieldSchema,

    /// Record creations derived from this step's draft at completion
    pub mappings: Vec<RecordMapping>,
}

/// Represents a parsed and validated wizard definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardDefinition {
    /// ID of the wizard
    pub id: WizardId,

    /// Human-readable name of the wizard
    pub name: String,

    /// Description of the wizard
    pub description: Option<String>,

    /// The steps in this wizard, in navigation and submission order
    pub steps: Vec<StepDefinition>,
}

impl WizardDefinition {
    /// Validate the wizard definition
    pub fn validate(&self) -> Result<(), EngineError> {
        // Check for empty steps
        if self.steps.is_empty() {
            return Err(EngineError::DefinitionError(
                "Wizard must have at least one step".to_string(),
            ));
        }

        // Check for step ID uniqueness
        let mut step_ids = std::collections::HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(&step.id) {
                return Err(EngineError::DefinitionError(format!(
                    "Duplicate step ID: {}",
                    step.id.0
                )));
            }
        }

        // Check for field name uniqueness within each step schema
        for step in &self.steps {
            let mut field_names = std::collections::HashSet::new();
            for field in step.schema.fields() {
                if !field_names.insert(&field.name) {
                    return Err(EngineError::DefinitionError(format!(
                        "Duplicate field '{}' in step {}",
                        field.name, step.id.0
                    )));
                }
            }
        }

        // Check that field bindings name fields of their own step and
        // that created-id bindings only reference earlier creations
        for (step_index, step) in self.steps.iter().enumerate() {
            for (mapping_index, mapping) in step.mappings.iter().enumerate() {
                for binding in &mapping.bindings {
                    match &binding.source {
                        BindingSource::Field(field) => {
                            if step.schema.field(field).is_none() {
                                return Err(EngineError::DefinitionError(format!(
                                    "Step {} binds unknown field: {}",
                                    step.id.0, field
                                )));
                            }
                        }
                        BindingSource::CreatedId { step: ref_step, table } => {
                            // Earlier step, or an earlier mapping of the same step
                            let produced =
                                self.steps.iter().enumerate().any(|(i, earlier)| {
                                    earlier.id == *ref_step
                                        && earlier.mappings.iter().enumerate().any(|(j, m)| {
                                            m.table == *table
                                                && (i < step_index
                                                    || (i == step_index && j < mapping_index))
                                        })
                                });
                            if !produced {
                                return Err(EngineError::DefinitionError(format!(
                                    "Step {} references id of '{}' in step {} which is not created earlier in the batch",
                                    step.id.0, table, ref_step.0
                                )));
                            }
                        }
                        BindingSource::Literal(_) => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Ordered step ids of this definition
    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id.clone()).collect()
    }

    /// Look up a step definition by id
    pub fn step(&self, id: &StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| &s.id == id)
    }
}
