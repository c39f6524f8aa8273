//! # Stepwise Core
//!
//! Core engine of the Stepwise wizard platform: a reusable step-wizard
//! workflow engine for breaking a complex data-entry flow into ordered,
//! independently validated steps.
//!
//! ## Architecture
//!
//! The engine follows Domain-Driven Design principles:
//!
//! - **Domain Layer**: field schemas and validation, step and wizard
//!   definitions, the per-step draft controller, the navigation gate
//!   state machine, workflow templates, and the persistence boundary
//!   traits.
//! - **Application Layer**: the [`WizardService`] orchestrating one
//!   running instance, and the [`CompletionSubmitter`] turning a
//!   finished wizard's snapshot into ordered record creations.
//!
//! Persistence is injected: embedders supply a [`DraftRepository`] for
//! auto-saved snapshots and a [`RecordStore`] for record creation. The
//! `stepwise-state-inmemory` crate provides in-memory implementations;
//! the `testing` feature of this crate ships lightweight ones for unit
//! tests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use stepwise_core::domain::field_schema::{FieldKind, FieldSchema, FieldSpec, ValidationRule};
//! use stepwise_core::domain::repository::memory::{MemoryDraftRepository, MemoryRecordStore};
//! use stepwise_core::domain::step::{
//!     FieldBinding, RecordMapping, StepDefinition, StepId, WizardDefinition, WizardId,
//! };
//! use stepwise_core::{FieldEdit, WizardService};
//!
//! # async fn example() -> Result<(), stepwise_core::EngineError> {
//! let definition = WizardDefinition {
//!     id: WizardId("onboarding".to_string()),
//!     name: "Onboarding".to_string(),
//!     description: None,
//!     steps: vec![StepDefinition {
//!         id: StepId("profile".to_string()),
//!         title: "Profile".to_string(),
//!         description: None,
//!         schema: FieldSchema::new(vec![FieldSpec::new("name", FieldKind::Text)
//!             .required()
//!             .with_rule(ValidationRule::NonEmpty)]),
//!         mappings: vec![RecordMapping {
//!             table: "profiles".to_string(),
//!             bindings: vec![FieldBinding::field("name", "name")],
//!         }],
//!     }],
//! };
//!
//! let mut wizard = WizardService::start(
//!     definition,
//!     Arc::new(MemoryDraftRepository::new()),
//!     Arc::new(MemoryRecordStore::new()),
//! )?;
//!
//! wizard.apply_edit(FieldEdit {
//!     step_id: StepId("profile".to_string()),
//!     field: "name".to_string(),
//!     value: json!("Ada"),
//! })?;
//!
//! let report = wizard.finish().await?;
//! assert_eq!(report.created.len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Application layer
pub mod application;

/// Domain layer
pub mod domain;

/// Error types
pub mod error;

/// Shared value types
pub mod types;

pub use application::submitter::{CompletionSubmitter, SubmissionReport};
pub use application::wizard_service::{FieldEdit, WizardService};
pub use domain::controller::{EditOutcome, StepController};
pub use domain::field_schema::{
    FieldKind, FieldSchema, FieldSpec, ValidationReport, ValidationRule,
};
pub use domain::gate::{WizardRunState, WizardStatus};
pub use domain::repository::{DraftRepository, RecordStore};
pub use domain::step::{
    BindingSource, FieldBinding, RecordMapping, StepDefinition, StepId, WizardDefinition,
    WizardId, WizardInstanceId,
};
pub use domain::template::{TemplateCatalog, TemplateId, WorkflowTemplate};
pub use domain::wizard_data::{StepDraft, WizardData};
pub use error::EngineError;
pub use types::{CreatedRecord, FieldValue, RecordFields};
