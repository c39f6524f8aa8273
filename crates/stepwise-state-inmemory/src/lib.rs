//! In-memory state store implementation for the Stepwise Platform
//!
//! This crate provides in-memory implementations of the persistence
//! traits defined in the stepwise-core crate. It is primarily useful
//! for development, testing, and simple deployments where durable
//! persistence is not required.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

pub mod repositories;
pub use repositories::{InMemoryDraftRepository, InMemoryRecordStore};

use stepwise_core::{CreatedRecord, DraftRepository, RecordStore, WizardData};

/// Provider for in-memory state stores
///
/// Repositories created from the same provider share storage, so a
/// wizard saved through one handle can be resumed through another.
pub struct InMemoryStateStoreProvider {
    snapshots: Arc<RwLock<HashMap<String, WizardData>>>,
    records: Arc<RwLock<Vec<CreatedRecord>>>,
}

impl InMemoryStateStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create repositories for use with the wizard engine
    pub fn create_repositories(&self) -> (Arc<dyn DraftRepository>, Arc<dyn RecordStore>) {
        let draft_repo = Arc::new(InMemoryDraftRepository::new(self.snapshots.clone()));
        let record_store = Arc::new(InMemoryRecordStore::new(self.records.clone()));
        (draft_repo, record_store)
    }

    /// A draft repository handle with the provider's shared storage
    pub fn draft_repository(&self) -> InMemoryDraftRepository {
        InMemoryDraftRepository::new(self.snapshots.clone())
    }

    /// A record store handle with the provider's shared storage
    pub fn record_store(&self) -> InMemoryRecordStore {
        InMemoryRecordStore::new(self.records.clone())
    }
}

impl Default for InMemoryStateStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
