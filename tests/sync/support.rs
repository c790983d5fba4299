//! Shared fixtures: a seeded gateway, a store over it, and state polling.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use medistock::{InMemoryGateway, InventoryState, InventoryStore, Item, SyncConfig};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

pub type Store = InventoryStore<InMemoryGateway>;

/// Route `tracing` output through the test harness. Set `RUST_LOG=debug` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A gateway holding `items` (name, stock, aisle) in insertion order.
pub fn seeded(items: &[(&str, i64, &str)]) -> Arc<InMemoryGateway> {
    let gateway = Arc::new(InMemoryGateway::new());
    for &(name, stock, aisle) in items {
        gateway.insert(Item::new(name, stock, aisle)).unwrap();
    }
    gateway
}

/// A gateway holding `count` items named "Medicine 00", "Medicine 01", ...
pub fn numbered(count: usize) -> Arc<InMemoryGateway> {
    let gateway = Arc::new(InMemoryGateway::new());
    for n in 0..count {
        gateway
            .insert(Item::new(format!("Medicine {n:02}"), n as i64, "A1"))
            .unwrap();
    }
    gateway
}

pub fn store(gateway: &Arc<InMemoryGateway>) -> Store {
    init_tracing();
    InventoryStore::with_gateway(gateway.clone())
}

pub fn store_with(gateway: &Arc<InMemoryGateway>, config: SyncConfig) -> Store {
    init_tracing();
    InventoryStore::new(gateway.clone(), config).unwrap()
}

/// The loaded item called `name`.
pub fn loaded(store: &Store, name: &str) -> Item {
    store
        .state()
        .items
        .into_iter()
        .find(|item| item.name == name)
        .unwrap_or_else(|| panic!("{name} is not loaded"))
}

/// Wait until the published state satisfies `check`.
pub async fn until(
    rx: &mut watch::Receiver<InventoryState>,
    check: impl FnMut(&InventoryState) -> bool,
) -> InventoryState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(check))
        .await
        .expect("state never matched")
        .expect("store dropped")
        .clone()
}

/// Give spawned tasks a chance to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}
