//! Sync - the paginated synchronization and optimistic-update layer.
//!
//! [`InventoryStore`] exclusively owns the in-memory medicines, history and
//! aisle list. Every mutation goes through it and is applied on a single
//! `tokio::sync::watch` channel, so observers always see a whole, renderable
//! [`InventoryState`] and never a half-applied one.
//!
//! ## Flow
//!
//! ```text
//!  presentation ──intent──► InventoryStore ──request──► Gateway
//!       ▲                        │   ▲                     │
//!       │                 optimistic  └──── response ◄─────┘
//!       │                   apply          reconcile / roll back
//!       │                        │            + history entry
//!       └──── watch::Receiver ◄──┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use medistock::{InMemoryGateway, InventoryStore, SortKey, SyncConfig};
//!
//! let store = InventoryStore::new(Arc::new(InMemoryGateway::new()), SyncConfig::default())?;
//! let mut state = store.subscribe();
//!
//! store.fetch_items(SortKey::Name).await?;
//! state.changed().await?;
//! for item in state.borrow().filtered_items("asp") {
//!     println!("{} ({})", item.name, item.stock);
//! }
//! ```

mod aisles;
mod error;
mod history;
mod items;
mod mutations;
mod pagination;
mod sequencer;
mod state;
mod stock;
mod store;
mod subscription;

pub use aisles::derive_aisles;
pub use error::{messages, StockRollback, SyncError};
pub use state::InventoryState;
pub use store::InventoryStore;
pub use subscription::Subscription;
