//! Application layer - orchestration of running wizard instances

/// Batch submission of completed wizards
pub mod submitter;

/// The running wizard instance service
pub mod wizard_service;
