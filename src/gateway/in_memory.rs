//! InMemoryGateway - HashMap-backed document store for testing and development.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use super::{
    Cursor, Direction, DocumentStream, FieldPatch, Filter, Gateway, GatewayError, OrderBy, Page,
    PageQuery,
};
use crate::Document;

/// Gateway operations, used for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    QueryPage,
    Snapshot,
    WatchCollection,
    Write,
    UpdateFields,
    Delete,
    WatchDocument,
}

/// Internal stored representation of a document.
struct StoredDocument {
    id: String,
    seq: u64,
    value: Value,
}

/// Sortable projection of a field value. Strings compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum SortValue {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SortValue {
    fn of(document: &Value, field: &str) -> Self {
        match document.get(field) {
            None | Some(Value::Null) => SortValue::Missing,
            Some(Value::Bool(b)) => SortValue::Bool(*b),
            Some(Value::Number(n)) => SortValue::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::String(s)) => SortValue::Text(s.to_lowercase()),
            Some(other) => SortValue::Text(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Bool(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Text(_) => 3,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// What an in-memory cursor points at: the last record of a page.
#[derive(Debug, Serialize, Deserialize)]
struct Position {
    id: String,
    seq: u64,
    key: Option<SortValue>,
}

struct DocumentWatcher {
    collection: &'static str,
    id: String,
    tx: mpsc::UnboundedSender<Value>,
}

struct CollectionWatcher {
    collection: &'static str,
    filter: Option<Filter>,
    tx: mpsc::UnboundedSender<Vec<(String, Value)>>,
}

#[derive(Default)]
struct Failures {
    always: HashSet<GatewayOp>,
    next: HashMap<GatewayOp, usize>,
    documents: HashSet<String>,
}

struct Inner {
    storage: RwLock<HashMap<&'static str, Vec<StoredDocument>>>,
    next_seq: AtomicU64,
    document_watchers: Mutex<Vec<DocumentWatcher>>,
    collection_watchers: Mutex<Vec<CollectionWatcher>>,
    failures: Mutex<Failures>,
    calls: Mutex<HashMap<GatewayOp, usize>>,
    paused: watch::Sender<bool>,
}

/// In-memory gateway backed by a HashMap of collections.
///
/// Documents keep insertion order, which is the order returned when a query
/// has no `order_by`. Clone-friendly via Arc: clones share storage, watchers,
/// failure switches and call counters.
///
/// Besides serving as a local backend, it is the test double for the sync
/// layer:
/// - `fail` / `fail_next` / `fail_document` inject transport failures
/// - `pause` holds every call before it completes until `resume`
/// - `calls` / `wait_for_calls` report how often each operation was issued
#[derive(Clone)]
pub struct InMemoryGateway {
    inner: Arc<Inner>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Create a new empty gateway.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                storage: RwLock::new(HashMap::new()),
                next_seq: AtomicU64::new(1),
                document_watchers: Mutex::new(Vec::new()),
                collection_watchers: Mutex::new(Vec::new()),
                failures: Mutex::new(Failures::default()),
                calls: Mutex::new(HashMap::new()),
                paused,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Seeding and inspection (synchronous, bypass failures and the gate)
    // ------------------------------------------------------------------

    /// Store a document directly, returning its id.
    pub fn insert<D: Document>(&self, document: D) -> Result<String, GatewayError> {
        let id = self.store(document)?;
        self.notify(D::COLLECTION, &id);
        Ok(id)
    }

    /// All documents of a collection, in insertion order.
    pub fn documents<D: Document>(&self) -> Vec<D> {
        let Ok(storage) = self.inner.storage.read() else {
            return Vec::new();
        };
        storage
            .get(D::COLLECTION)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| decode::<D>(&doc.id, doc.value.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One document by id.
    pub fn document<D: Document>(&self, id: &str) -> Option<D> {
        let storage = self.inner.storage.read().ok()?;
        let doc = storage.get(D::COLLECTION)?.iter().find(|doc| doc.id == id)?;
        decode::<D>(&doc.id, doc.value.clone()).ok()
    }

    /// Number of documents in a collection.
    pub fn len<D: Document>(&self) -> usize {
        self.inner
            .storage
            .read()
            .map(|storage| storage.get(D::COLLECTION).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Failure injection
    // ------------------------------------------------------------------

    /// Fail every call of `op` until [`recover`](Self::recover).
    pub fn fail(&self, op: GatewayOp) {
        if let Ok(mut failures) = self.inner.failures.lock() {
            failures.always.insert(op);
        }
    }

    /// Fail only the next call of `op`.
    pub fn fail_next(&self, op: GatewayOp) {
        if let Ok(mut failures) = self.inner.failures.lock() {
            *failures.next.entry(op).or_insert(0) += 1;
        }
    }

    /// Fail every write, update or delete addressed to `id`.
    pub fn fail_document(&self, id: impl Into<String>) {
        if let Ok(mut failures) = self.inner.failures.lock() {
            failures.documents.insert(id.into());
        }
    }

    /// Clear every injected failure.
    pub fn recover(&self) {
        if let Ok(mut failures) = self.inner.failures.lock() {
            *failures = Failures::default();
        }
    }

    // ------------------------------------------------------------------
    // Pause gate
    // ------------------------------------------------------------------

    /// Hold every call after it has been counted until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.inner.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.inner.paused.send_replace(false);
    }

    // ------------------------------------------------------------------
    // Call tracking
    // ------------------------------------------------------------------

    /// How many times `op` has been issued.
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.inner
            .calls
            .lock()
            .map(|calls| calls.get(&op).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Wait until `op` has been issued at least `times` times.
    pub async fn wait_for_calls(&self, op: GatewayOp, times: usize) {
        while self.calls(op) < times {
            // Small sleep to avoid busy-waiting
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Count the call, wait out the pause gate, then apply injected failures.
    async fn enter(&self, op: GatewayOp, document_id: Option<&str>) -> Result<(), GatewayError> {
        if let Ok(mut calls) = self.inner.calls.lock() {
            *calls.entry(op).or_insert(0) += 1;
        }

        let mut paused = self.inner.paused.subscribe();
        paused
            .wait_for(|paused| !*paused)
            .await
            .map_err(|_| GatewayError::Transport("gateway shut down".into()))?;

        let mut failures = self.inner.failures.lock().map_err(poisoned)?;
        if failures.always.contains(&op) {
            return Err(GatewayError::Transport(format!("{:?} failed", op)));
        }
        if let Some(remaining) = failures.next.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GatewayError::Transport(format!("{:?} failed", op)));
            }
        }
        if let Some(id) = document_id {
            if failures.documents.contains(id) {
                return Err(GatewayError::Transport(format!("{:?} failed for {}", op, id)));
            }
        }
        Ok(())
    }

    fn store<D: Document>(&self, document: D) -> Result<String, GatewayError> {
        let value =
            serde_json::to_value(&document).map_err(|e| GatewayError::Validation(e.to_string()))?;
        let id = document
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        let mut storage = self.inner.storage.write().map_err(poisoned)?;
        let docs = storage.entry(D::COLLECTION).or_default();
        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.value = value,
            None => docs.push(StoredDocument {
                id: id.clone(),
                seq: self.inner.next_seq.fetch_add(1, AtomicOrdering::Relaxed),
                value,
            }),
        }
        Ok(id)
    }

    /// Matching documents as `(id, value)` pairs in query order.
    fn select(
        &self,
        collection: &'static str,
        filter: Option<&Filter>,
        order: Option<&OrderBy>,
    ) -> Result<Vec<(Position, Value)>, GatewayError> {
        let storage = self.inner.storage.read().map_err(poisoned)?;
        let mut selected: Vec<(Position, Value)> = storage
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.map_or(true, |f| f.matches(&doc.value)))
                    .map(|doc| {
                        let position = Position {
                            id: doc.id.clone(),
                            seq: doc.seq,
                            key: order.map(|o| SortValue::of(&doc.value, &o.field)),
                        };
                        (position, doc.value.clone())
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            selected.sort_by(|(a, _), (b, _)| compare_positions(a, b, order.direction));
        }
        Ok(selected)
    }

    /// Push the current state of `collection/id` to every interested watcher.
    fn notify(&self, collection: &'static str, id: &str) {
        let current = self.document_value(collection, id);

        if let Ok(mut watchers) = self.inner.document_watchers.lock() {
            watchers.retain(|watcher| {
                if watcher.collection != collection || watcher.id != id {
                    return !watcher.tx.is_closed();
                }
                match &current {
                    Some(value) => watcher.tx.send(value.clone()).is_ok(),
                    // A deleted document has nothing to push.
                    None => !watcher.tx.is_closed(),
                }
            });
        }

        if let Ok(mut watchers) = self.inner.collection_watchers.lock() {
            watchers.retain(|watcher| {
                if watcher.collection != collection {
                    return !watcher.tx.is_closed();
                }
                match self.collection_values(collection, watcher.filter.as_ref()) {
                    Ok(values) => watcher.tx.send(values).is_ok(),
                    Err(_) => !watcher.tx.is_closed(),
                }
            });
        }
    }

    fn document_value(&self, collection: &'static str, id: &str) -> Option<Value> {
        let storage = self.inner.storage.read().ok()?;
        storage
            .get(collection)?
            .iter()
            .find(|doc| doc.id == id)
            .map(|doc| doc.value.clone())
    }

    fn collection_values(
        &self,
        collection: &'static str,
        filter: Option<&Filter>,
    ) -> Result<Vec<(String, Value)>, GatewayError> {
        Ok(self
            .select(collection, filter, None)?
            .into_iter()
            .map(|(position, value)| (position.id, value))
            .collect())
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn query_page<D: Document>(&self, query: PageQuery) -> Result<Page<D>, GatewayError> {
        self.enter(GatewayOp::QueryPage, None).await?;

        let selected = self.select(D::COLLECTION, query.filter.as_ref(), query.order.as_ref())?;
        let direction = query
            .order
            .as_ref()
            .map_or(Direction::Ascending, |o| o.direction);

        let start = match &query.after {
            None => 0,
            Some(cursor) => {
                let after: Position = cursor.decode()?;
                match selected.iter().position(|(p, _)| p.id == after.id) {
                    Some(index) => index + 1,
                    // The cursor record is gone; resume after where it would sort.
                    None => selected
                        .iter()
                        .position(|(p, _)| {
                            compare_positions(p, &after, direction) == Ordering::Greater
                        })
                        .unwrap_or(selected.len()),
                }
            }
        };

        let page: Vec<(Position, Value)> =
            selected.into_iter().skip(start).take(query.limit).collect();

        let cursor = match page.last() {
            Some((position, _)) => Some(Cursor::encode(position)?),
            None => None,
        };

        let records = page
            .into_iter()
            .filter_map(|(position, value)| match decode::<D>(&position.id, value) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(collection = D::COLLECTION, id = %position.id, error = %err, "skipping undecodable document");
                    None
                }
            })
            .collect();

        Ok(Page { records, cursor })
    }

    async fn snapshot<D: Document>(&self, filter: Option<Filter>) -> Result<Vec<D>, GatewayError> {
        self.enter(GatewayOp::Snapshot, None).await?;
        let values = self.collection_values(D::COLLECTION, filter.as_ref())?;
        Ok(decode_all::<D>(values))
    }

    async fn watch_collection<D: Document>(
        &self,
        filter: Option<Filter>,
    ) -> Result<DocumentStream<Vec<D>>, GatewayError> {
        self.enter(GatewayOp::WatchCollection, None)
            .await
            .map_err(into_subscription_error)?;

        let (tx, rx) = mpsc::unbounded_channel();
        {
            // notify() takes this lock too; a racing write is pushed after registration.
            let mut watchers = self.inner.collection_watchers.lock().map_err(poisoned)?;
            let initial = self.collection_values(D::COLLECTION, filter.as_ref())?;
            let _ = tx.send(initial);
            watchers.push(CollectionWatcher {
                collection: D::COLLECTION,
                filter,
                tx,
            });
        }

        let stream = UnboundedReceiverStream::new(rx)
            .map(|values| Ok::<_, GatewayError>(decode_all::<D>(values)));
        Ok(Box::pin(stream))
    }

    async fn write<D: Document>(&self, document: &D) -> Result<String, GatewayError> {
        self.enter(GatewayOp::Write, document.id()).await?;
        let id = self.store(document.clone())?;
        self.notify(D::COLLECTION, &id);
        Ok(id)
    }

    async fn update_fields<D: Document>(
        &self,
        id: &str,
        patch: FieldPatch,
    ) -> Result<(), GatewayError> {
        self.enter(GatewayOp::UpdateFields, Some(id)).await?;
        {
            let mut storage = self.inner.storage.write().map_err(poisoned)?;
            let doc = storage
                .get_mut(D::COLLECTION)
                .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
                .ok_or_else(|| {
                    GatewayError::Transport(format!("no document {}/{}", D::COLLECTION, id))
                })?;
            patch.apply_to(&mut doc.value);
        }
        self.notify(D::COLLECTION, id);
        Ok(())
    }

    async fn delete<D: Document>(&self, id: &str) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Delete, Some(id)).await?;
        {
            let mut storage = self.inner.storage.write().map_err(poisoned)?;
            if let Some(docs) = storage.get_mut(D::COLLECTION) {
                docs.retain(|doc| doc.id != id);
            }
        }
        self.notify(D::COLLECTION, id);
        Ok(())
    }

    async fn watch_document<D: Document>(
        &self,
        id: &str,
    ) -> Result<DocumentStream<D>, GatewayError> {
        self.enter(GatewayOp::WatchDocument, None)
            .await
            .map_err(into_subscription_error)?;

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut watchers = self.inner.document_watchers.lock().map_err(poisoned)?;
            if let Some(current) = self.document_value(D::COLLECTION, id) {
                let _ = tx.send(current);
            }
            watchers.push(DocumentWatcher {
                collection: D::COLLECTION,
                id: id.to_string(),
                tx,
            });
        }

        let id = id.to_string();
        let stream = UnboundedReceiverStream::new(rx).map(move |value| decode::<D>(&id, value));
        Ok(Box::pin(stream))
    }
}

fn compare_positions(a: &Position, b: &Position, direction: Direction) -> Ordering {
    let by_key = match (&a.key, &b.key) {
        (Some(a), Some(b)) => a.compare(b),
        _ => Ordering::Equal,
    };
    let ordering = by_key.then(a.seq.cmp(&b.seq));
    match direction {
        Direction::Ascending => ordering,
        Direction::Descending => ordering.reverse(),
    }
}

fn decode<D: Document>(id: &str, value: Value) -> Result<D, GatewayError> {
    let mut document: D =
        serde_json::from_value(value).map_err(|e| GatewayError::Validation(e.to_string()))?;
    document.set_id(id.to_string());
    Ok(document)
}

fn decode_all<D: Document>(values: Vec<(String, Value)>) -> Vec<D> {
    values
        .into_iter()
        .filter_map(|(id, value)| decode::<D>(&id, value).ok())
        .collect()
}

fn poisoned<T>(_: T) -> GatewayError {
    GatewayError::Transport("lock poisoned".into())
}

fn into_subscription_error(err: GatewayError) -> GatewayError {
    match err {
        GatewayError::Transport(msg) => GatewayError::Subscription(msg),
        other => other,
    }
}
