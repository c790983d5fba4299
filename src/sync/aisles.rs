use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::error::{messages, SyncError};
use super::store::InventoryStore;
use super::subscription::Subscription;
use crate::gateway::Gateway;
use crate::records::Item;

/// The distinct aisle labels of `items`, sorted.
///
/// A pure projection: aisles are not stored anywhere on their own and must
/// be recomputed from the item set they came from.
pub fn derive_aisles<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .map(|item| item.aisle.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl<G: Gateway> InventoryStore<G> {
    /// Derive the aisle list from one snapshot of every item.
    pub async fn fetch_aisles(&self) -> Result<(), SyncError> {
        self.mutate(|state| {
            state.is_loading = true;
            state.error_message = None;
        });
        debug!("fetching aisles");
        match self.gateway.snapshot::<Item>(None).await {
            Ok(items) => {
                let aisles = derive_aisles(&items);
                self.mutate(|state| {
                    state.aisles = aisles;
                    state.is_loading = false;
                });
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to load aisles");
                self.mutate(|state| {
                    state.is_loading = false;
                    state.error_message = Some(messages::LOAD_AISLES.to_string());
                });
                Err(error.into())
            }
        }
    }

    /// Keep the aisle list current: it is recomputed from every snapshot
    /// the gateway pushes for the item collection.
    pub async fn watch_aisles(&self) -> Result<Subscription, SyncError> {
        let stream = self.gateway.watch_collection::<Item>(None).await.map_err(|error| {
            warn!(%error, "failed to watch aisles");
            error
        })?;
        Ok(Subscription::spawn(
            "aisles",
            self.state.clone(),
            stream,
            |state, items: Vec<Item>| {
                let aisles = derive_aisles(&items);
                if state.aisles == aisles {
                    return false;
                }
                state.aisles = aisles;
                true
            },
        ))
    }
}
