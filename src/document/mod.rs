//! Documents - typed records addressed by collection and backend id.
//!
//! A document is the unit the gateway reads and writes. Its identifier is
//! assigned by the backend on first persist, so `id()` is optional: a
//! document without one has never been stored.
//!
//! ## Example
//!
//! ```ignore
//! use medistock::Document;
//!
//! #[derive(Serialize, Deserialize, Clone, Document)]
//! #[document(collection = "medicines")]
//! struct Item {
//!     #[serde(default, skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//! ```

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be stored through a [`Gateway`](crate::Gateway).
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this document type lives in (e.g. "medicines", "history").
    const COLLECTION: &'static str;

    /// The backend-assigned identifier, if this document has been persisted.
    fn id(&self) -> Option<&str>;

    /// Assign the backend identifier. Called once, when the gateway persists
    /// a document that had none.
    fn set_id(&mut self, id: String);

    /// Whether this document has ever been persisted.
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
