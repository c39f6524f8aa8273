//! Domain layer - core wizard models, entities, and rules

/// Step controllers binding schemas to live drafts
pub mod controller;

/// Declarative field schemas and validation
pub mod field_schema;

/// Navigation/validation gate state machine
pub mod gate;

/// Persistence boundary traits
pub mod repository;

/// Step and wizard definitions
pub mod step;

/// Workflow templates and the template catalog
pub mod template;

/// Step drafts and the wizard data aggregate
pub mod wizard_data;
