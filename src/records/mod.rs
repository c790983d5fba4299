//! Domain records flowing between the gateway and the sync layer.

mod error;
mod history;
mod item;
mod sort;

pub use error::ValidationError;
pub use history::HistoryEntry;
pub use item::{Item, ItemDraft};
pub use sort::SortKey;
