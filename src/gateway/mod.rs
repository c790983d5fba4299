//! Gateway - the remote document store, seen from the client.
//!
//! The sync layer never talks to a backend SDK directly. Everything it needs
//! goes through the [`Gateway`] trait, which is injected into
//! [`InventoryStore`](crate::InventoryStore) at construction time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 InventoryStore<G: Gateway>                  │
//! │  fetch / load-more / adjust / add / update / delete / watch │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Gateway trait                         │
//! │  query_page / snapshot / watch_collection / write           │
//! │  update_fields / delete / watch_document                    │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                      │
//!          ▼                                      ▼
//! ┌─────────────────┐                 ┌─────────────────────────┐
//! │ InMemoryGateway │                 │ hosted document store   │
//! │   (included)    │                 │      (external)         │
//! └─────────────────┘                 └─────────────────────────┘
//! ```

mod cursor;
mod in_memory;
mod query;

use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio_stream::Stream;

use crate::Document;

pub use cursor::Cursor;
pub use in_memory::{GatewayOp, InMemoryGateway};
pub use query::{Direction, FieldPatch, Filter, OrderBy, Page, PageQuery};

/// A long-lived stream of pushed values. Dropping it ends the subscription.
pub type DocumentStream<T> = Pin<Box<dyn Stream<Item = Result<T, GatewayError>> + Send>>;

/// Errors reported by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The record could not be encoded or decoded.
    #[error("gateway rejected record: {0}")]
    Validation(String),
    /// Network or server fault.
    #[error("gateway transport error: {0}")]
    Transport(String),
    /// A standing subscription could not be established.
    #[error("subscription could not be established: {0}")]
    Subscription(String),
}

/// Collection-scoped operations against the remote document store.
///
/// Every call is a suspension point. Timeouts and cancellation of in-flight
/// requests are the implementation's concern, not the caller's.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// One page of `D::COLLECTION`, optionally filtered and ordered, starting
    /// after `query.after`.
    async fn query_page<D: Document>(&self, query: PageQuery) -> Result<Page<D>, GatewayError>;

    /// Every document of `D::COLLECTION` matching `filter`.
    async fn snapshot<D: Document>(&self, filter: Option<Filter>) -> Result<Vec<D>, GatewayError>;

    /// The current snapshot of `D::COLLECTION`, then a new one after each change.
    async fn watch_collection<D: Document>(
        &self,
        filter: Option<Filter>,
    ) -> Result<DocumentStream<Vec<D>>, GatewayError>;

    /// Persist the whole document, generating an id when it has none.
    /// Returns the id the document is stored under.
    async fn write<D: Document>(&self, document: &D) -> Result<String, GatewayError>;

    /// Overwrite the given fields of an existing document.
    async fn update_fields<D: Document>(
        &self,
        id: &str,
        patch: FieldPatch,
    ) -> Result<(), GatewayError>;

    /// Remove a document.
    async fn delete<D: Document>(&self, id: &str) -> Result<(), GatewayError>;

    /// The current state of one document, then a new one after each change.
    async fn watch_document<D: Document>(
        &self,
        id: &str,
    ) -> Result<DocumentStream<D>, GatewayError>;
}
