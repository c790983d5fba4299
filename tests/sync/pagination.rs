use medistock::{GatewayOp, SortKey, SyncConfig};

use crate::support::{numbered, seeded, settle, store, store_with};

fn names(store: &crate::support::Store) -> Vec<String> {
    store.state().items.into_iter().map(|item| item.name).collect()
}

#[tokio::test]
async fn first_page_follows_sort_key() {
    let gateway = seeded(&[("beta", 5, "A1"), ("Alpha", 1, "B2"), ("gamma", 3, "A1")]);
    let store = store(&gateway);

    store.fetch_items(SortKey::None).await.unwrap();
    assert_eq!(names(&store), ["beta", "Alpha", "gamma"]);

    store.fetch_items(SortKey::Name).await.unwrap();
    assert_eq!(names(&store), ["Alpha", "beta", "gamma"]);

    store.fetch_items(SortKey::Stock).await.unwrap();
    let stocks: Vec<_> = store.state().items.iter().map(|item| item.stock).collect();
    assert_eq!(stocks, [1, 3, 5]);

    for sort in SortKey::ALL {
        store.fetch_items(sort).await.unwrap();
        let state = store.state();
        assert_eq!(state.sort, sort);
        assert_eq!(state.items.len(), 3);
        assert!(!state.has_more_items);
    }
}

#[tokio::test]
async fn full_first_page_expects_more() {
    let gateway = numbered(45);
    let store = store(&gateway);

    store.fetch_items(SortKey::Name).await.unwrap();
    let state = store.state();
    assert_eq!(state.items.len(), 20);
    assert!(state.has_more_items);

    assert!(store.load_more_items(SortKey::Name).await.unwrap());
    assert!(store.load_more_items(SortKey::Name).await.unwrap());
    let state = store.state();
    assert_eq!(state.items.len(), 45);
    assert!(!state.has_more_items);
    assert_eq!(state.items[20].name, "Medicine 20");
    assert_eq!(state.items[44].name, "Medicine 44");
}

#[tokio::test]
async fn load_more_allows_one_request_in_flight() {
    let gateway = numbered(30);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();

    gateway.pause();
    let first = tokio::spawn({
        let store = store.clone();
        async move { store.load_more_items(SortKey::Name).await }
    });
    gateway.wait_for_calls(GatewayOp::QueryPage, 2).await;
    assert!(store.state().is_loading_more);

    assert!(!store.load_more_items(SortKey::Name).await.unwrap());
    assert!(!store.load_more_items(SortKey::Name).await.unwrap());
    settle().await;
    assert_eq!(gateway.calls(GatewayOp::QueryPage), 2);

    gateway.resume();
    assert!(first.await.unwrap().unwrap());
    let state = store.state();
    assert_eq!(state.items.len(), 30);
    assert!(!state.is_loading_more);
}

#[tokio::test]
async fn refetch_discards_load_more_in_flight() {
    let gateway = numbered(30);
    let store = store_with(&gateway, SyncConfig::default().with_item_page_size(10));
    store.fetch_items(SortKey::Name).await.unwrap();

    gateway.pause();
    let more = tokio::spawn({
        let store = store.clone();
        async move { store.load_more_items(SortKey::Name).await }
    });
    gateway.wait_for_calls(GatewayOp::QueryPage, 2).await;
    let refetch = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_items(SortKey::Name).await }
    });
    gateway.wait_for_calls(GatewayOp::QueryPage, 3).await;

    gateway.resume();
    assert!(!more.await.unwrap().unwrap());
    refetch.await.unwrap().unwrap();

    let state = store.state();
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.items[0].name, "Medicine 00");
    assert!(!state.is_loading_more);

    // The reset cursor still pages from the start of the refetched list.
    assert!(store.load_more_items(SortKey::Name).await.unwrap());
    assert_eq!(store.state().items[10].name, "Medicine 10");
}

#[tokio::test]
async fn failed_load_more_can_be_retried() {
    let gateway = numbered(25);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();

    gateway.fail_next(GatewayOp::QueryPage);
    assert!(store.load_more_items(SortKey::Name).await.is_err());
    let state = store.state();
    assert_eq!(state.items.len(), 20);
    assert!(!state.is_loading_more);
    assert!(state.error_message.is_some());

    store.clear_error();
    assert!(store.load_more_items(SortKey::Name).await.unwrap());
    assert_eq!(store.state().items.len(), 25);
}

#[tokio::test]
async fn filter_searches_loaded_items_only() {
    let gateway = numbered(25);
    let store = store(&gateway);
    store.fetch_items(SortKey::Name).await.unwrap();

    let state = store.state();
    assert_eq!(state.filtered_items("medicine 1").len(), 10);
    assert!(state.filtered_items("medicine 24").is_empty());
    assert_eq!(gateway.calls(GatewayOp::QueryPage), 1);
}
