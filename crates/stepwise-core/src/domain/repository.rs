//! Repository traits for the Stepwise core
//!
//! This module defines the persistence boundaries the wizard engine
//! consumes. External crates implement these traits to provide real
//! backends; the engine treats both as opaque.

use async_trait::async_trait;

use crate::domain::step::WizardInstanceId;
use crate::domain::wizard_data::WizardData;
use crate::types::{CreatedRecord, RecordFields};
use crate::EngineError;

/// Restorable store for auto-saved wizard snapshots
///
/// Saves are best-effort: the engine fires them without awaiting and
/// only logs failures. Loads happen once, when a wizard resumes.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Persist the full snapshot under the given instance key
    async fn save(
        &self,
        instance_id: &WizardInstanceId,
        snapshot: &WizardData,
    ) -> Result<(), EngineError>;

    /// Load the snapshot stored under the given instance key
    async fn load(&self, instance_id: &WizardInstanceId)
        -> Result<Option<WizardData>, EngineError>;
}

/// Domain-record creation boundary used during batch submission
///
/// Creations are issued sequentially, never concurrently: later records
/// may reference ids generated by earlier ones.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create one record and return it with its generated id
    async fn create(
        &self,
        table: &str,
        fields: RecordFields,
    ) -> Result<CreatedRecord, EngineError>;
}

/// Memory implementations for testing
#[cfg(feature = "testing")]
pub mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, RwLock};
    use uuid::Uuid;

    /// In-memory implementation of the draft repository
    pub struct MemoryDraftRepository {
        snapshots: Arc<RwLock<HashMap<String, WizardData>>>,
    }

    impl MemoryDraftRepository {
        /// Create a new memory draft repository
        pub fn new() -> Self {
            Self {
                snapshots: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    impl Default for MemoryDraftRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DraftRepository for MemoryDraftRepository {
        async fn save(
            &self,
            instance_id: &WizardInstanceId,
            snapshot: &WizardData,
        ) -> Result<(), EngineError> {
            let mut snapshots = self.snapshots.write().map_err(|e| {
                EngineError::DraftStoreError(format!("Failed to acquire write lock: {}", e))
            })?;

            snapshots.insert(instance_id.0.clone(), snapshot.clone());

            Ok(())
        }

        async fn load(
            &self,
            instance_id: &WizardInstanceId,
        ) -> Result<Option<WizardData>, EngineError> {
            let snapshots = self.snapshots.read().map_err(|e| {
                EngineError::DraftStoreError(format!("Failed to acquire read lock: {}", e))
            })?;

            Ok(snapshots.get(&instance_id.0).cloned())
        }
    }

    /// In-memory implementation of the record store
    ///
    /// Keeps every creation in issue order so tests can assert batch
    /// ordering, and can be told to fail creations for specific tables.
    pub struct MemoryRecordStore {
        records: Arc<RwLock<Vec<CreatedRecord>>>,
        fail_tables: HashSet<String>,
    }

    impl MemoryRecordStore {
        /// Create a new memory record store
        pub fn new() -> Self {
            Self {
                records: Arc::new(RwLock::new(Vec::new())),
                fail_tables: HashSet::new(),
            }
        }

        /// Make creations targeting the given table fail
        pub fn fail_on(mut self, table: impl Into<String>) -> Self {
            self.fail_tables.insert(table.into());
            self
        }

        /// All created records, in creation order
        pub fn created(&self) -> Vec<CreatedRecord> {
            self.records.read().map(|r| r.clone()).unwrap_or_default()
        }
    }

    impl Default for MemoryRecordStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RecordStore for MemoryRecordStore {
        async fn create(
            &self,
            table: &str,
            fields: RecordFields,
        ) -> Result<CreatedRecord, EngineError> {
            if self.fail_tables.contains(table) {
                return Err(EngineError::RecordStoreError(format!(
                    "Creation rejected for table: {}",
                    table
                )));
            }

            let record = CreatedRecord {
                id: Uuid::new_v4().to_string(),
                table: table.to_string(),
                fields,
            };

            let mut records = self.records.write().map_err(|e| {
                EngineError::RecordStoreError(format!("Failed to acquire write lock: {}", e))
            })?;
            records.push(record.clone());

            Ok(record)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::step::StepId;
        use crate::domain::wizard_data::StepDraft;
        use crate::types::FieldValue;
        use serde_json::json;

        #[tokio::test]
        async fn test_draft_repository_round_trip() {
            let repo = MemoryDraftRepository::new();
            let instance = WizardInstanceId::new();

            assert!(repo.load(&instance).await.unwrap().is_none());

            let mut data = WizardData::new();
            let mut draft = StepDraft::new();
            draft.insert("name", FieldValue::Text("load-in".to_string()));
            data.set(StepId("crew".to_string()), draft);

            repo.save(&instance, &data).await.unwrap();
            assert_eq!(repo.load(&instance).await.unwrap(), Some(data));
        }

        #[tokio::test]
        async fn test_record_store_preserves_creation_order() {
            let store = MemoryRecordStore::new();
            let mut fields = RecordFields::new();
            fields.insert("n".to_string(), json!(1));

            store.create("first", fields.clone()).await.unwrap();
            store.create("second", fields).await.unwrap();

            let created = store.created();
            assert_eq!(created.len(), 2);
            assert_eq!(created[0].table, "first");
            assert_eq!(created[1].table, "second");
            assert_ne!(created[0].id, created[1].id);
        }

        #[tokio::test]
        async fn test_record_store_failure_injection() {
            let store = MemoryRecordStore::new().fail_on("broken");

            let result = store.create("broken", RecordFields::new()).await;
            match result {
                Err(EngineError::RecordStoreError(msg)) => {
                    assert!(msg.contains("broken"));
                }
                _ => panic!("Expected RecordStoreError"),
            }
            assert!(store.created().is_empty());
        }
    }
}
