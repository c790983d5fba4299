use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use super::sequencer::KeyedSequencer;
use super::error::SyncError;
use super::state::InventoryState;
use crate::config::{ConfigError, SyncConfig};
use crate::gateway::Gateway;
use crate::records::{HistoryEntry, Item, ValidationError};

/// Owner of the inventory state and the only place it is mutated.
///
/// Cheap to clone; clones share the same state, gateway and stock sequencer.
pub struct InventoryStore<G: Gateway> {
    pub(super) gateway: Arc<G>,
    pub(super) config: SyncConfig,
    pub(super) state: Arc<watch::Sender<InventoryState>>,
    pub(super) stock_turns: Arc<KeyedSequencer>,
}

impl<G: Gateway> Clone for InventoryStore<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            stock_turns: self.stock_turns.clone(),
        }
    }
}

impl<G: Gateway> InventoryStore<G> {
    pub fn new(gateway: Arc<G>, config: SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(gateway, config))
    }

    /// A store with the default configuration.
    pub fn with_gateway(gateway: Arc<G>) -> Self {
        Self::assemble(gateway, SyncConfig::default())
    }

    fn assemble(gateway: Arc<G>, config: SyncConfig) -> Self {
        Self {
            gateway,
            config,
            state: Arc::new(watch::Sender::new(InventoryState::default())),
            stock_turns: Arc::new(KeyedSequencer::new()),
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// A receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<InventoryState> {
        self.state.subscribe()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> InventoryState {
        self.state.borrow().clone()
    }

    pub fn clear_error(&self) {
        self.mutate_if(|state| state.error_message.take().is_some());
    }

    /// Insert an item without touching the gateway, generating an id when
    /// it has none. Returns the id.
    pub fn add_item_locally(&self, mut item: Item) -> String {
        let id = match item.id.clone() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                item.id = Some(id.clone());
                id
            }
        };
        debug!(%id, "adding item locally");
        self.mutate(|state| state.items.push(item));
        id
    }

    /// Remove an item without touching the gateway.
    pub fn delete_item_locally(&self, id: &str) -> bool {
        self.mutate_if(|state| state.remove_item(id))
    }

    pub(super) fn mutate(&self, apply: impl FnOnce(&mut InventoryState)) {
        self.state.send_modify(apply);
    }

    /// Notifies observers only when `apply` returns true.
    pub(super) fn mutate_if(&self, apply: impl FnOnce(&mut InventoryState) -> bool) -> bool {
        self.state.send_if_modified(apply)
    }

    /// Publish a local rejection as the error message and hand it back.
    pub(super) fn reject(&self, error: ValidationError) -> SyncError {
        debug!(%error, "rejecting request");
        self.mutate(|state| state.error_message = Some(error.to_string()));
        error.into()
    }

    /// Persist an audit entry and show it if its item's history is loaded.
    ///
    /// A failed write is logged and does not fail the mutation it records.
    pub(super) async fn record_history(&self, mut entry: HistoryEntry) {
        match self.gateway.write(&entry).await {
            Ok(id) => {
                entry.id = Some(id);
                self.mutate_if(|state| state.prepend_history(entry));
            }
            Err(error) => {
                warn!(
                    medicine_id = %entry.medicine_id,
                    action = %entry.action,
                    %error,
                    "failed to record history entry"
                );
            }
        }
    }
}
