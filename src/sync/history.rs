use tracing::{debug, warn};

use super::error::{messages, SyncError};
use super::store::InventoryStore;
use crate::gateway::{Filter, Gateway, OrderBy, PageQuery};
use crate::records::{HistoryEntry, Item, ValidationError};

impl<G: Gateway> InventoryStore<G> {
    /// Load the newest page of `item`'s history, replacing whatever history
    /// is loaded.
    pub async fn fetch_history(&self, item: &Item) -> Result<(), SyncError> {
        let Some(id) = item.id.as_deref() else {
            return Err(self.reject(ValidationError::MissingId {
                operation: "fetch history",
            }));
        };

        let mut generation = 0;
        self.mutate(|state| {
            if state.history_for.as_deref() != Some(id) {
                state.history.clear();
                state.history_for = Some(id.to_string());
            }
            state.has_more_history = true;
            state.is_loading_more_history = false;
            state.error_message = None;
            generation = state.history_pager.reset();
        });

        let limit = self.config.history_page_size;
        debug!(%id, limit, "fetching history");
        match self.gateway.query_page::<HistoryEntry>(history_query(id, limit)).await {
            Ok(page) => {
                let has_more = page.is_full(limit);
                self.mutate_if(|state| {
                    if !state.history_pager.is_current(generation) {
                        return false;
                    }
                    state.history_pager.advance(page.cursor);
                    state.history = page.records;
                    state.has_more_history = has_more;
                    true
                });
                Ok(())
            }
            Err(error) => {
                warn!(%id, %error, "failed to load history");
                self.mutate_if(|state| {
                    if !state.history_pager.is_current(generation) {
                        return false;
                    }
                    state.error_message = Some(messages::LOAD_HISTORY.to_string());
                    true
                });
                Err(error.into())
            }
        }
    }

    /// Append the next, older, page of `item`'s history.
    ///
    /// Same guards as [`load_more_items`](Self::load_more_items), and a no-op
    /// when the loaded history belongs to another item.
    pub async fn load_more_history(&self, item: &Item) -> Result<bool, SyncError> {
        let Some(id) = item.id.as_deref() else {
            return Ok(false);
        };

        let mut ticket = None;
        self.mutate_if(|state| {
            if state.is_loading_more_history
                || !state.has_more_history
                || state.history_for.as_deref() != Some(id)
            {
                return false;
            }
            let Some(cursor) = state.history_pager.cursor().cloned() else {
                return false;
            };
            state.is_loading_more_history = true;
            ticket = Some((state.history_pager.generation(), cursor));
            true
        });
        let Some((generation, cursor)) = ticket else {
            return Ok(false);
        };

        let limit = self.config.history_page_size;
        debug!(%id, limit, "loading more history");
        let query = history_query(id, limit).after(Some(cursor));
        match self.gateway.query_page::<HistoryEntry>(query).await {
            Ok(page) => {
                let has_more = page.is_full(limit);
                let applied = self.mutate_if(|state| {
                    if !state.history_pager.is_current(generation) {
                        return false;
                    }
                    state.history_pager.advance(page.cursor);
                    state.history.extend(page.records);
                    state.has_more_history = has_more;
                    state.is_loading_more_history = false;
                    true
                });
                Ok(applied)
            }
            Err(error) => {
                warn!(%id, %error, "failed to load more history");
                self.mutate_if(|state| {
                    if !state.history_pager.is_current(generation) {
                        return false;
                    }
                    state.is_loading_more_history = false;
                    state.error_message = Some(messages::LOAD_HISTORY.to_string());
                    true
                });
                Err(error.into())
            }
        }
    }
}

fn history_query(id: &str, limit: usize) -> PageQuery {
    PageQuery::new(limit)
        .filter(Filter::eq("medicineId", id))
        .order_by(Some(OrderBy::desc("timestamp")))
}
