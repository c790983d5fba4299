use medistock::{
    messages, GatewayOp, HistoryEntry, Item, SortKey, SyncConfig, SyncError, ValidationError,
};

use crate::support::{loaded, seeded, settle, store, store_with, until};

#[tokio::test]
async fn increase_is_visible_before_the_gateway_answers() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");
    let id = item.id.clone().unwrap();
    let mut rx = store.subscribe();

    gateway.pause();
    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.increase_stock(&item, "nurse@example.com").await }
    });
    gateway.wait_for_calls(GatewayOp::UpdateFields, 1).await;

    let state = until(&mut rx, |state| state.is_updating).await;
    assert_eq!(state.item(&id).unwrap().stock, 11);
    assert_eq!(gateway.document::<Item>(&id).unwrap().stock, 10);

    gateway.resume();
    assert_eq!(pending.await.unwrap(), Ok(11));

    let state = store.state();
    assert_eq!(state.item(&id).unwrap().stock, 11);
    assert!(!state.is_updating);
    assert_eq!(gateway.document::<Item>(&id).unwrap().stock, 11);

    let history = gateway.documents::<HistoryEntry>();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].medicine_id, id);
    assert_eq!(history[0].user, "nurse@example.com");
    assert_eq!(history[0].action, "Increased stock of Aspirin by 1");
    assert_eq!(history[0].details, "Stock changed from 10 to 11");
}

#[tokio::test]
async fn failed_increase_rolls_back() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");
    let id = item.id.clone().unwrap();

    gateway.fail(GatewayOp::UpdateFields);
    gateway.pause();
    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.increase_stock(&item, "nurse").await }
    });
    gateway.wait_for_calls(GatewayOp::UpdateFields, 1).await;
    assert_eq!(store.state().item(&id).unwrap().stock, 11);

    gateway.resume();
    let rollback = pending.await.unwrap().unwrap_err();
    assert_eq!(rollback.stock, 10);
    assert!(!rollback.source.is_validation());

    let state = store.state();
    assert_eq!(state.item(&id).unwrap().stock, 10);
    assert_eq!(state.error_message.as_deref(), Some(messages::UPDATE_STOCK));
    assert!(!state.is_updating);
    assert!(gateway.documents::<HistoryEntry>().is_empty());
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 1);
}

#[tokio::test]
async fn adjustments_of_one_item_run_in_order() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");
    let id = item.id.clone().unwrap();

    gateway.pause();
    let first = tokio::spawn({
        let (store, item) = (store.clone(), item.clone());
        async move { store.increase_stock(&item, "nurse").await }
    });
    gateway.wait_for_calls(GatewayOp::UpdateFields, 1).await;
    let second = tokio::spawn({
        let (store, item) = (store.clone(), item.clone());
        async move { store.increase_stock(&item, "nurse").await }
    });
    settle().await;
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 1);

    gateway.resume();
    assert_eq!(first.await.unwrap(), Ok(11));
    assert_eq!(second.await.unwrap(), Ok(12));
    assert_eq!(gateway.document::<Item>(&id).unwrap().stock, 12);

    let details: Vec<_> = gateway
        .documents::<HistoryEntry>()
        .into_iter()
        .map(|entry| entry.details)
        .collect();
    assert_eq!(
        details,
        ["Stock changed from 10 to 11", "Stock changed from 11 to 12"]
    );
}

#[tokio::test]
async fn unsequenced_adjustments_overlap() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let config = SyncConfig::default().with_sequenced_stock_updates(false);
    let store = store_with(&gateway, config);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");

    gateway.pause();
    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let (store, item) = (store.clone(), item.clone());
            tokio::spawn(async move { store.increase_stock(&item, "nurse").await })
        })
        .collect();
    gateway.wait_for_calls(GatewayOp::UpdateFields, 2).await;
    gateway.resume();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    let id = item.id.as_deref().unwrap();
    let stored = gateway.document::<Item>(id).unwrap().stock;
    assert_eq!(loaded(&store, "Aspirin").stock, stored);
}

#[tokio::test]
async fn decrease_to_zero_then_rejected() {
    let gateway = seeded(&[("Aspirin", 1, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");

    assert_eq!(store.decrease_stock(&item, "nurse").await, Ok(0));
    // `item` still says 1; the loaded copy is what counts.
    let rollback = store.decrease_stock(&item, "nurse").await.unwrap_err();
    assert_eq!(rollback.stock, 0);
    assert_eq!(
        store.state().error_message,
        Some(rollback.source.to_string())
    );
    assert!(rollback.source.is_validation());
    assert_eq!(loaded(&store, "Aspirin").stock, 0);
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 1);
}

#[tokio::test]
async fn confirmed_value_survives_a_refresh_in_flight() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");
    let id = item.id.clone().unwrap();

    gateway.pause();
    let pending = tokio::spawn({
        let (store, item) = (store.clone(), item.clone());
        async move { store.increase_stock(&item, "nurse").await }
    });
    gateway.wait_for_calls(GatewayOp::UpdateFields, 1).await;

    // A reload lands while the write is in flight and still carries the old stock.
    store.delete_item_locally(&id);
    store.add_item_locally(item.clone());
    assert_eq!(store.state().item(&id).unwrap().stock, 10);

    gateway.resume();
    assert_eq!(pending.await.unwrap(), Ok(11));
    assert_eq!(gateway.document::<Item>(&id).unwrap().stock, 11);
    assert_eq!(store.state().item(&id).unwrap().stock, 11);
}

#[tokio::test]
async fn out_of_range_change_is_rejected_locally() {
    let gateway = seeded(&[("Aspirin", 10, "A1")]);
    let store = store(&gateway);
    store.fetch_items(SortKey::None).await.unwrap();
    let item = loaded(&store, "Aspirin");

    let rollback = store.adjust_stock(&item, i64::MAX, "nurse").await.unwrap_err();
    assert_eq!(rollback.stock, 10);
    assert!(matches!(
        rollback.source,
        SyncError::Validation(ValidationError::StockOverflow { current: 10, .. })
    ));
    let state = store.state();
    assert_eq!(state.item(item.id.as_deref().unwrap()).unwrap().stock, 10);
    assert!(!state.is_updating);
    assert_eq!(state.error_message, Some(rollback.source.to_string()));
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 0);
}

#[tokio::test]
async fn unpersisted_item_rejection_is_published() {
    let gateway = seeded(&[]);
    let store = store(&gateway);

    let rollback = store
        .increase_stock(&Item::new("Aspirin", 3, "A1"), "nurse")
        .await
        .unwrap_err();
    assert_eq!(rollback.stock, 3);
    assert_eq!(
        store.state().error_message.as_deref(),
        Some("adjust stock requires a persisted medicine")
    );
    assert_eq!(gateway.calls(GatewayOp::UpdateFields), 0);
}
