use tracing::{debug, info, warn};

use super::error::{messages, StockRollback, SyncError};
use super::store::InventoryStore;
use crate::gateway::{FieldPatch, Gateway};
use crate::records::{HistoryEntry, Item, ValidationError};

impl<G: Gateway> InventoryStore<G> {
    pub async fn increase_stock(&self, item: &Item, user: &str) -> Result<i64, StockRollback> {
        self.adjust_stock(item, 1, user).await
    }

    pub async fn decrease_stock(&self, item: &Item, user: &str) -> Result<i64, StockRollback> {
        self.adjust_stock(item, -1, user).await
    }

    /// Change the stock of `item` by `delta`, optimistically.
    ///
    /// The new value is visible in the state before the gateway is called.
    /// On success it is kept and one history entry is recorded; on failure
    /// the previous value is restored and returned inside the error.
    ///
    /// The new value is computed from the loaded copy of the item when there
    /// is one, otherwise from `item`. With
    /// [`sequence_stock_updates`](crate::SyncConfig::sequence_stock_updates)
    /// enabled, adjustments of the same item run one after another.
    pub async fn adjust_stock(
        &self,
        item: &Item,
        delta: i64,
        user: &str,
    ) -> Result<i64, StockRollback> {
        let Some(id) = item.id.as_deref() else {
            return Err(StockRollback {
                stock: item.stock,
                source: self.reject(ValidationError::MissingId {
                    operation: "adjust stock",
                }),
            });
        };

        let _turn = match self.config.sequence_stock_updates {
            true => Some(self.stock_turns.acquire(id).await),
            false => None,
        };

        // Read and optimistic write happen under one state lock.
        let mut previous = item.stock;
        let mut rejected = None;
        self.mutate_if(|state| {
            previous = state.item(id).map_or(item.stock, |loaded| loaded.stock);
            let error = match previous.checked_add(delta) {
                Some(updated) if updated >= 0 => None,
                Some(_) => Some(ValidationError::StockUnderflow {
                    name: item.name.clone(),
                    current: previous,
                    delta,
                }),
                None => Some(ValidationError::StockOverflow {
                    name: item.name.clone(),
                    current: previous,
                    delta,
                }),
            };
            if let Some(error) = error {
                state.error_message = Some(error.to_string());
                rejected = Some(error);
                return true;
            }
            if delta == 0 {
                return false;
            }
            state.set_stock(id, previous + delta);
            state.is_updating = true;
            true
        });
        if let Some(error) = rejected {
            debug!(%id, %error, "rejecting stock change");
            return Err(StockRollback {
                stock: previous,
                source: error.into(),
            });
        }
        if delta == 0 {
            return Ok(previous);
        }
        let updated = previous + delta;

        debug!(%id, previous, updated, "updating stock");
        let patch = FieldPatch::new().set("stock", updated);
        if let Err(error) = self.gateway.update_fields::<Item>(id, patch).await {
            warn!(%id, previous, attempted = updated, %error, "stock update failed, rolling back");
            self.mutate(|state| {
                state.set_stock(id, previous);
                state.is_updating = false;
                state.error_message = Some(messages::UPDATE_STOCK.to_string());
            });
            return Err(StockRollback {
                stock: previous,
                source: SyncError::Gateway(error),
            });
        }

        self.mutate(|state| {
            state.set_stock(id, updated);
            state.is_updating = false;
        });
        info!(%id, previous, updated, "stock updated");

        let direction = if delta > 0 { "Increased" } else { "Decreased" };
        self.record_history(HistoryEntry::new(
            id,
            user,
            format!("{direction} stock of {} by {}", item.name, delta.abs()),
            format!("Stock changed from {previous} to {updated}"),
        ))
        .await;
        Ok(updated)
    }
}
