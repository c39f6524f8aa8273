use std::sync::Arc;

use serde_json::json;
use stepwise_core::{
    DraftRepository, FieldBinding, FieldEdit, FieldKind, FieldSchema, FieldSpec, RecordFields,
    RecordMapping, RecordStore, StepDefinition, StepDraft, StepId, ValidationRule, WizardData,
    WizardDefinition, WizardId, WizardInstanceId, WizardService, WizardStatus,
};

use crate::InMemoryStateStoreProvider;

fn definition() -> WizardDefinition {
    WizardDefinition {
        id: WizardId("intake".to_string()),
        name: "Intake".to_string(),
        description: None,
        steps: vec![StepDefinition {
            id: StepId("contact".to_string()),
            title: "Contact".to_string(),
            description: None,
            schema: FieldSchema::new(vec![FieldSpec::new("email", FieldKind::Text)
                .required()
                .with_rule(ValidationRule::NonEmpty)]),
            mappings: vec![RecordMapping {
                table: "contacts".to_string(),
                bindings: vec![FieldBinding::field("email", "email")],
            }],
        }],
    }
}

#[tokio::test]
async fn test_repositories_share_provider_storage() {
    let provider = InMemoryStateStoreProvider::new();
    let (draft_repo, _) = provider.create_repositories();

    let instance = WizardInstanceId::new();
    let mut data = WizardData::new();
    let mut draft = StepDraft::new();
    draft.insert(
        "email",
        stepwise_core::FieldValue::Text("ada@example.org".to_string()),
    );
    data.set(StepId("contact".to_string()), draft);

    draft_repo.save(&instance, &data).await.unwrap();

    // A second handle from the same provider sees the snapshot
    let other = provider.draft_repository();
    assert_eq!(other.load(&instance).await.unwrap(), Some(data));
    assert_eq!(other.snapshot_count().await, 1);

    other.remove(&instance).await.unwrap();
    assert!(draft_repo.load(&instance).await.unwrap().is_none());
}

#[tokio::test]
async fn test_record_store_helpers() {
    let provider = InMemoryStateStoreProvider::new();
    let store = provider.record_store();

    let mut fields = RecordFields::new();
    fields.insert("email".to_string(), json!("ada@example.org"));
    let contact = store.create("contacts", fields).await.unwrap();
    store.create("notes", RecordFields::new()).await.unwrap();

    assert_eq!(store.created().await.len(), 2);
    assert_eq!(store.created_in("contacts").await.len(), 1);
    assert_eq!(
        store.find_by_id(&contact.id).await.unwrap().table,
        "contacts"
    );
    assert!(store.find_by_id("missing").await.is_none());
}

#[tokio::test]
async fn test_wizard_runs_against_provider_repositories() {
    let provider = InMemoryStateStoreProvider::new();
    let (draft_repo, record_store) = provider.create_repositories();

    let mut wizard = WizardService::start(definition(), draft_repo, record_store).unwrap();
    wizard
        .apply_edit(FieldEdit {
            step_id: StepId("contact".to_string()),
            field: "email".to_string(),
            value: json!("ada@example.org"),
        })
        .unwrap();

    // The detached auto-save lands in the provider's shared storage
    tokio::task::yield_now().await;
    let saved = provider
        .draft_repository()
        .load(wizard.instance_id())
        .await
        .unwrap();
    assert!(saved.is_some());

    let report = wizard.finish().await.unwrap();
    assert_eq!(wizard.status(), WizardStatus::Completed);
    assert_eq!(report.created.len(), 1);

    let created = provider.record_store().created().await;
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].table, "contacts");
    assert_eq!(created[0].fields.get("email").unwrap(), &json!("ada@example.org"));
}
