use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use stepwise_core::{
    CreatedRecord, DraftRepository, EngineError, RecordFields, RecordStore, WizardData,
    WizardInstanceId,
};

/// In-memory implementation of the draft repository
///
/// Snapshots live in a shared map keyed by instance id, so multiple
/// handles created from the same provider observe the same state.
pub struct InMemoryDraftRepository {
    snapshots: Arc<RwLock<HashMap<String, WizardData>>>,
}

impl InMemoryDraftRepository {
    /// Create a repository over the given shared snapshot map
    pub fn new(snapshots: Arc<RwLock<HashMap<String, WizardData>>>) -> Self {
        Self { snapshots }
    }

    /// Number of stored snapshots
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Drop the snapshot of a finished or abandoned instance
    pub async fn remove(&self, instance_id: &WizardInstanceId) -> Result<(), EngineError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.remove(&instance_id.0);
        Ok(())
    }
}

#[async_trait]
impl DraftRepository for InMemoryDraftRepository {
    async fn save(
        &self,
        instance_id: &WizardInstanceId,
        snapshot: &WizardData,
    ) -> Result<(), EngineError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(instance_id.0.clone(), snapshot.clone());
        debug!("Saved snapshot for wizard instance {}", instance_id.0);
        Ok(())
    }

    async fn load(
        &self,
        instance_id: &WizardInstanceId,
    ) -> Result<Option<WizardData>, EngineError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&instance_id.0).cloned())
    }
}

/// In-memory implementation of the record store
///
/// Records are kept in creation order and ids are fresh UUIDs, matching
/// what a real backend would generate.
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<CreatedRecord>>>,
}

impl InMemoryRecordStore {
    /// Create a record store over the given shared creation log
    pub fn new(records: Arc<RwLock<Vec<CreatedRecord>>>) -> Self {
        Self { records }
    }

    /// All created records, in creation order
    pub async fn created(&self) -> Vec<CreatedRecord> {
        self.records.read().await.clone()
    }

    /// Created records of one table, in creation order
    pub async fn created_in(&self, table: &str) -> Vec<CreatedRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.table == table)
            .cloned()
            .collect()
    }

    /// Look up a record by its generated id
    pub async fn find_by_id(&self, id: &str) -> Option<CreatedRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create(
        &self,
        table: &str,
        fields: RecordFields,
    ) -> Result<CreatedRecord, EngineError> {
        let record = CreatedRecord {
            id: Uuid::new_v4().to_string(),
            table: table.to_string(),
            fields,
        };

        let mut records = self.records.write().await;
        records.push(record.clone());
        debug!("Created '{}' record {}", table, record.id);

        Ok(record)
    }
}
