use tracing::{debug, info, warn};

use super::error::{messages, SyncError};
use super::store::InventoryStore;
use super::subscription::Subscription;
use crate::gateway::{Gateway, OrderBy, PageQuery};
use crate::records::{Item, SortKey};

impl<G: Gateway> InventoryStore<G> {
    /// Load the first page of items ordered by `sort`, replacing the loaded set.
    ///
    /// Any load-more still in flight is invalidated and its page discarded.
    pub async fn fetch_items(&self, sort: SortKey) -> Result<(), SyncError> {
        let mut generation = 0;
        self.mutate(|state| {
            state.is_loading = true;
            state.is_loading_more = false;
            state.has_more_items = true;
            state.error_message = None;
            state.sort = sort;
            generation = state.items_pager.reset();
        });

        let limit = self.config.item_page_size;
        debug!(?sort, limit, "fetching items");
        let query = PageQuery::new(limit).order_by(sort.field().map(OrderBy::asc));
        match self.gateway.query_page::<Item>(query).await {
            Ok(page) => {
                let has_more = page.is_full(limit);
                let count = page.records.len();
                let applied = self.mutate_if(|state| {
                    if !state.items_pager.is_current(generation) {
                        return false;
                    }
                    state.items_pager.advance(page.cursor);
                    state.items = page.records;
                    state.has_more_items = has_more;
                    state.is_loading = false;
                    true
                });
                if applied {
                    debug!(count, has_more, "items loaded");
                } else {
                    debug!("discarding superseded item page");
                }
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to load items");
                self.mutate_if(|state| {
                    if !state.items_pager.is_current(generation) {
                        return false;
                    }
                    state.is_loading = false;
                    state.error_message = Some(messages::LOAD_ITEMS.to_string());
                    true
                });
                Err(error.into())
            }
        }
    }

    /// Append the next page of items.
    ///
    /// Does nothing, and returns `Ok(false)`, while another page is loading,
    /// once the listing is exhausted, or before a first page has been fetched.
    pub async fn load_more_items(&self, sort: SortKey) -> Result<bool, SyncError> {
        let mut ticket = None;
        self.mutate_if(|state| {
            if state.is_loading_more || !state.has_more_items {
                return false;
            }
            let Some(cursor) = state.items_pager.cursor().cloned() else {
                return false;
            };
            state.is_loading_more = true;
            ticket = Some((state.items_pager.generation(), cursor));
            true
        });
        let Some((generation, cursor)) = ticket else {
            return Ok(false);
        };

        let limit = self.config.item_page_size;
        debug!(?sort, limit, "loading more items");
        let query = PageQuery::new(limit)
            .order_by(sort.field().map(OrderBy::asc))
            .after(Some(cursor));
        match self.gateway.query_page::<Item>(query).await {
            Ok(page) => {
                let has_more = page.is_full(limit);
                let applied = self.mutate_if(|state| {
                    if !state.items_pager.is_current(generation) {
                        return false;
                    }
                    state.items_pager.advance(page.cursor);
                    state.items.extend(page.records);
                    state.has_more_items = has_more;
                    state.is_loading_more = false;
                    true
                });
                if !applied {
                    debug!("discarding stale item page");
                }
                Ok(applied)
            }
            Err(error) => {
                warn!(%error, "failed to load more items");
                self.mutate_if(|state| {
                    if !state.items_pager.is_current(generation) {
                        return false;
                    }
                    state.is_loading_more = false;
                    state.error_message = Some(messages::LOAD_MORE_ITEMS.to_string());
                    true
                });
                Err(error.into())
            }
        }
    }

    /// Re-issue the last item fetch with its sort key.
    pub async fn retry(&self) -> Result<(), SyncError> {
        let sort = self.state.borrow().sort;
        info!(?sort, "retrying item fetch");
        self.fetch_items(sort).await
    }

    /// Keep the loaded copy of item `id` in step with the backend.
    ///
    /// Pushed versions replace the local record by id; an item that is not
    /// loaded is left alone.
    pub async fn subscribe_to_item(&self, id: &str) -> Result<Subscription, SyncError> {
        let stream = self.gateway.watch_document::<Item>(id).await.map_err(|error| {
            warn!(%id, %error, "failed to subscribe to item");
            error
        })?;
        let id = id.to_string();
        Ok(Subscription::spawn(
            "item",
            self.state.clone(),
            stream,
            move |state, mut item: Item| {
                item.id = Some(id.clone());
                state.replace_item(&id, item)
            },
        ))
    }
}
