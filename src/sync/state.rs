use super::pagination::Pager;
use crate::records::{HistoryEntry, Item, SortKey};

/// Observable inventory state.
///
/// Published whole through a `watch` channel; a value read from a
/// receiver is always a consistent snapshot.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub items: Vec<Item>,
    /// History of the item named by `history_for`, newest first.
    pub history: Vec<HistoryEntry>,
    pub history_for: Option<String>,
    pub aisles: Vec<String>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub has_more_items: bool,
    pub is_loading_more_history: bool,
    pub has_more_history: bool,
    pub is_deleting: bool,
    pub is_updating: bool,
    pub error_message: Option<String>,
    /// Sort key of the last item fetch.
    pub sort: SortKey,
    pub(crate) items_pager: Pager,
    pub(crate) history_pager: Pager,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            history: Vec::new(),
            history_for: None,
            aisles: Vec::new(),
            is_loading: false,
            is_loading_more: false,
            has_more_items: true,
            is_loading_more_history: false,
            has_more_history: true,
            is_deleting: false,
            is_updating: false,
            error_message: None,
            sort: SortKey::None,
            items_pager: Pager::default(),
            history_pager: Pager::default(),
        }
    }
}

impl InventoryState {
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id.as_deref() == Some(id))
    }

    /// Loaded items whose name contains `text`, ignoring case. An empty
    /// filter matches everything. Only the loaded set is searched.
    pub fn filtered_items(&self, text: &str) -> Vec<&Item> {
        let needle = text.to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn items_in_aisle(&self, aisle: &str) -> Vec<&Item> {
        self.items.iter().filter(|item| item.aisle == aisle).collect()
    }

    pub(crate) fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.id.as_deref() == Some(id))
    }

    /// Returns false when the item is not loaded or already has that stock.
    pub(crate) fn set_stock(&mut self, id: &str, stock: i64) -> bool {
        match self.item_mut(id) {
            Some(item) if item.stock != stock => {
                item.stock = stock;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn replace_item(&mut self, id: &str, replacement: Item) -> bool {
        match self.item_mut(id) {
            Some(item) if *item != replacement => {
                *item = replacement;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id.as_deref() != Some(id));
        self.items.len() != before
    }

    /// Show a freshly written entry if this item's history is on screen.
    pub(crate) fn prepend_history(&mut self, entry: HistoryEntry) -> bool {
        if self.history_for.as_deref() != Some(entry.medicine_id.as_str()) {
            return false;
        }
        self.history.insert(0, entry);
        true
    }
}
