//! Medicine inventory sync core.
//!
//! Keeps an observable, paginated view of a remote medicine collection in
//! memory, applies stock changes optimistically with rollback, and records
//! every mutation in an append-only history. The remote store is reached
//! through the [`Gateway`] trait; [`InMemoryGateway`] is the bundled
//! implementation.

// Lets `#[derive(Document)]` expand to `medistock::Document` inside this crate.
extern crate self as medistock;

pub mod auth;
pub mod config;
mod document;
pub mod gateway;
pub mod records;
mod sync;

pub use config::{ConfigError, SyncConfig};
pub use document::Document;
pub use gateway::{
    Cursor, Direction, DocumentStream, FieldPatch, Filter, Gateway, GatewayError, GatewayOp,
    InMemoryGateway, OrderBy, Page, PageQuery,
};
pub use medistock_macros::Document;
pub use records::{HistoryEntry, Item, ItemDraft, SortKey, ValidationError};
pub use sync::{
    derive_aisles, messages, InventoryState, InventoryStore, StockRollback, Subscription,
    SyncError,
};
