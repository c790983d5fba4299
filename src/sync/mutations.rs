use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::{messages, SyncError};
use super::store::InventoryStore;
use crate::gateway::Gateway;
use crate::records::{HistoryEntry, Item, ItemDraft, ValidationError};

impl<G: Gateway> InventoryStore<G> {
    /// Validate `draft` and persist it as a new item.
    ///
    /// Invalid input is rejected before any gateway call. On success the
    /// persisted item, carrying its new id, is appended to the loaded set.
    pub async fn add_item(&self, draft: &ItemDraft, user: &str) -> Result<Item, SyncError> {
        let mut item = match draft.validate() {
            Ok(item) => item,
            Err(error) => return Err(self.reject(error)),
        };

        self.mutate(|state| {
            state.is_loading = true;
            state.error_message = None;
        });
        let id = match self.gateway.write(&item).await {
            Ok(id) => id,
            Err(error) => {
                warn!(name = %item.name, %error, "failed to add item");
                self.mutate(|state| {
                    state.is_loading = false;
                    state.error_message = Some(messages::ADD_ITEM.to_string());
                });
                return Err(error.into());
            }
        };

        item.id = Some(id.clone());
        self.mutate(|state| {
            state.is_loading = false;
            if state.item(&id).is_none() {
                state.items.push(item.clone());
            }
        });
        info!(%id, name = %item.name, "item added");

        self.record_history(HistoryEntry::new(
            id.as_str(),
            user,
            format!("Added {}", item.name),
            format!(
                "New medicine added - Stock: {}, Aisle: {}",
                item.stock, item.aisle
            ),
        ))
        .await;
        Ok(item)
    }

    /// Write the whole record. The loaded copy is replaced only after the
    /// gateway confirms; a failed write leaves it untouched.
    pub async fn update_item(&self, item: &Item, user: &str) -> Result<(), SyncError> {
        let Some(id) = item.id.as_deref() else {
            return Err(self.reject(ValidationError::MissingId { operation: "update" }));
        };

        self.mutate(|state| {
            state.is_updating = true;
            state.error_message = None;
        });
        debug!(%id, "updating item");
        if let Err(error) = self.gateway.write(item).await {
            warn!(%id, %error, "failed to update item");
            self.mutate(|state| {
                state.is_updating = false;
                state.error_message = Some(messages::UPDATE_ITEM.to_string());
            });
            return Err(error.into());
        }

        self.mutate(|state| {
            state.is_updating = false;
            state.replace_item(id, item.clone());
        });
        info!(%id, "item updated");

        self.record_history(HistoryEntry::new(
            id,
            user,
            format!("Updated {}", item.name),
            "Updated medicine details",
        ))
        .await;
        Ok(())
    }

    /// Delete one item. It leaves the loaded set only once the gateway
    /// confirms the deletion.
    pub async fn delete_item(&self, item: &Item) -> Result<(), SyncError> {
        let Some(id) = item.id.as_deref() else {
            return Err(self.reject(ValidationError::MissingId { operation: "delete" }));
        };

        self.mutate(|state| {
            state.is_deleting = true;
            state.error_message = None;
        });
        debug!(%id, "deleting item");
        match self.gateway.delete::<Item>(id).await {
            Ok(()) => {
                self.mutate(|state| {
                    state.is_deleting = false;
                    state.remove_item(id);
                });
                info!(%id, "item deleted");
                Ok(())
            }
            Err(error) => {
                warn!(%id, %error, "failed to delete item");
                self.mutate(|state| {
                    state.is_deleting = false;
                    state.error_message = Some(messages::DELETE_ITEM.to_string());
                });
                Err(error.into())
            }
        }
    }

    /// Delete the loaded items at `indices`, one independent request each.
    ///
    /// Failures are logged and nothing else: no error message is set and the
    /// failed items stay loaded. Out-of-range indices and unpersisted items
    /// are skipped. The returned handles only signal completion.
    pub fn delete_items(&self, indices: &[usize]) -> Vec<JoinHandle<()>> {
        let targets: Vec<String> = {
            let state = self.state.borrow();
            indices
                .iter()
                .filter_map(|&index| match state.items.get(index) {
                    Some(Item { id: Some(id), .. }) => Some(id.clone()),
                    Some(_) => {
                        debug!(index, "skipping unpersisted item");
                        None
                    }
                    None => {
                        debug!(index, "skipping out of range index");
                        None
                    }
                })
                .collect()
        };

        debug!(count = targets.len(), "deleting items");
        targets
            .into_iter()
            .map(|id| {
                let store = self.clone();
                tokio::spawn(async move {
                    match store.gateway.delete::<Item>(&id).await {
                        Ok(()) => {
                            store.mutate_if(|state| state.remove_item(&id));
                            info!(%id, "item deleted");
                        }
                        Err(error) => warn!(%id, %error, "bulk delete left item in place"),
                    }
                })
            })
            .collect()
    }
}
