use medistock::{
    messages, GatewayOp, HistoryEntry, Item, ItemDraft, SortKey, SyncError, ValidationError,
};

use crate::support::{loaded, seeded, store};

#[tokio::test]
async fn whitespace_name_never_reaches_the_gateway() {
    let gateway = seeded(&[]);
    let store = store(&gateway);

    let error = store
        .add_item(&ItemDraft::new("   ", "5", "A1"), "nurse")
        .await
        .unwrap_err();

    assert_eq!(error, SyncError::Validation(ValidationError::EmptyName));
    assert_eq!(gateway.calls(GatewayOp::Write), 0);
    let state = store.state();
    assert!(state.items.is_empty());
    assert_eq!(
        state.error_message.as_deref(),
        Some("Medicine name cannot be empty")
    );
}

#[tokio::test]
async fn added_item_is_listed_and_audited() {
    let gateway = seeded(&[("Aspirin", 3, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();

    let added = store
        .add_item(&ItemDraft::new("Zinc", "40", "C3"), "pharmacist")
        .await
        .unwrap();

    let id = added.id.clone().unwrap();
    assert_eq!(store.state().items.len(), 2);
    assert_eq!(loaded(&store, "Zinc"), added);

    store.fetch_items(SortKey::Name).await.unwrap();
    assert_eq!(store.state().item(&id), Some(&added));

    let history = gateway.documents::<HistoryEntry>();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].medicine_id, id);
    assert_eq!(history[0].user, "pharmacist");
    assert_eq!(history[0].action, "Added Zinc");
}

#[tokio::test]
async fn delete_is_all_or_nothing() {
    let gateway = seeded(&[("Aspirin", 3, "A1"), ("Zinc", 1, "C3")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();
    let aspirin = loaded(&store, "Aspirin");

    gateway.fail_next(GatewayOp::Delete);
    assert!(store.delete_item(&aspirin).await.is_err());
    let state = store.state();
    assert_eq!(state.items.len(), 2);
    assert!(!state.is_deleting);
    assert_eq!(state.error_message.as_deref(), Some(messages::DELETE_ITEM));
    assert_eq!(gateway.len::<Item>(), 2);

    store.delete_item(&aspirin).await.unwrap();
    let state = store.state();
    assert_eq!(state.items.len(), 1);
    assert!(state.error_message.is_none());
    assert_eq!(gateway.len::<Item>(), 1);
    assert!(gateway.documents::<HistoryEntry>().is_empty());
}

#[tokio::test]
async fn bulk_delete_reports_nothing_and_keeps_failures() {
    let gateway = seeded(&[("Aspirin", 3, "A1"), ("Ibuprofen", 2, "B2"), ("Zinc", 1, "C3")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();
    let ibuprofen = loaded(&store, "Ibuprofen");
    gateway.fail_document(ibuprofen.id.clone().unwrap());

    let handles = store.delete_items(&[0, 1, 2, 9]);
    assert_eq!(handles.len(), 3);
    for handle in handles {
        handle.await.unwrap();
    }

    let state = store.state();
    assert_eq!(state.items, [ibuprofen]);
    assert!(state.error_message.is_none());
    assert_eq!(gateway.len::<Item>(), 1);
    assert_eq!(gateway.calls(GatewayOp::Delete), 3);
}

#[tokio::test]
async fn update_writes_whole_record() {
    let gateway = seeded(&[("Aspirin", 3, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();

    let mut edited = loaded(&store, "Aspirin");
    edited.name = "Aspirin 100mg".into();
    edited.aisle = "A2".into();
    store.update_item(&edited, "nurse").await.unwrap();

    let id = edited.id.as_deref().unwrap();
    assert_eq!(gateway.document::<Item>(id), Some(edited.clone()));
    assert_eq!(store.state().item(id), Some(&edited));
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 0);
}

#[tokio::test]
async fn unpersisted_item_rejections_are_published() {
    let gateway = seeded(&[]);
    let store = store(&gateway);
    let draft_only = Item::new("Aspirin", 1, "A1");

    let error = store.delete_item(&draft_only).await.unwrap_err();
    assert!(error.is_validation());
    assert_eq!(
        store.state().error_message.as_deref(),
        Some("delete requires a persisted medicine")
    );

    store.clear_error();
    let error = store.update_item(&draft_only, "nurse").await.unwrap_err();
    assert!(error.is_validation());
    assert_eq!(
        store.state().error_message.as_deref(),
        Some("update requires a persisted medicine")
    );
    assert_eq!(gateway.calls(GatewayOp::Write), 0);
    assert_eq!(gateway.calls(GatewayOp::Delete), 0);
}
