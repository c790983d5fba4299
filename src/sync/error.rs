use thiserror::Error;

use crate::gateway::GatewayError;
use crate::records::ValidationError;

/// Error returned by [`InventoryStore`](crate::InventoryStore) operations.
///
/// The same failure is also written to
/// [`InventoryState::error_message`](crate::InventoryState::error_message)
/// as a user-facing message, so a view can render it without handling the
/// returned value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Rejected locally; the gateway was never called.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }
}

/// A failed stock adjustment, carrying the stock value the item was rolled
/// back to (not the value that was attempted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stock kept at {stock}: {source}")]
pub struct StockRollback {
    pub stock: i64,
    pub source: SyncError,
}

/// User-facing messages written into `InventoryState::error_message`.
pub mod messages {
    pub const LOAD_ITEMS: &str = "Failed to load medicines. Please try again.";
    pub const LOAD_MORE_ITEMS: &str = "Failed to load more medicines. Please try again.";
    pub const ADD_ITEM: &str = "Failed to add medicine. Please try again.";
    pub const UPDATE_ITEM: &str = "Failed to update medicine. Please try again.";
    pub const UPDATE_STOCK: &str = "Failed to update stock. Please try again.";
    pub const DELETE_ITEM: &str = "Failed to delete medicine. Please try again.";
    pub const LOAD_HISTORY: &str = "Failed to load history. Please try again.";
    pub const LOAD_AISLES: &str = "Failed to load aisles. Please try again.";
}
