use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use super::state::InventoryState;
use crate::gateway::DocumentStream;

/// Handle to a standing subscription that applies pushed updates to the
/// inventory state.
///
/// Once [`cancel`](Subscription::cancel) returns, no further update from this
/// subscription is applied. Dropping the handle cancels it.
#[must_use = "dropping a Subscription cancels it"]
#[derive(Debug)]
pub struct Subscription {
    name: &'static str,
    cancelled: Arc<AtomicBool>,
    state: Arc<watch::Sender<InventoryState>>,
    task: AbortHandle,
}

impl Subscription {
    /// Drive `stream` on a background task, applying each value with `apply`.
    /// `apply` returns whether it changed the state.
    pub(crate) fn spawn<T, F>(
        name: &'static str,
        state: Arc<watch::Sender<InventoryState>>,
        mut stream: DocumentStream<T>,
        apply: F,
    ) -> Self
    where
        T: Send + 'static,
        F: Fn(&mut InventoryState, T) -> bool + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn({
            let cancelled = cancelled.clone();
            let state = state.clone();
            async move {
                while let Some(next) = stream.next().await {
                    match next {
                        Ok(value) => {
                            state.send_if_modified(|current| {
                                // Checked under the state lock, so cancel() cannot slip in between.
                                if cancelled.load(Ordering::SeqCst) {
                                    return false;
                                }
                                apply(current, value)
                            });
                        }
                        Err(error) => {
                            warn!(subscription = name, %error, "skipping subscription update")
                        }
                    }
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                }
                debug!(subscription = name, "subscription stream ended");
            }
        });

        debug!(subscription = name, "subscription started");
        Self {
            name,
            cancelled,
            state,
            task: task.abort_handle(),
        }
    }

    /// Stop applying updates. Idempotent.
    ///
    /// Waits for an update that is being applied at this moment to finish,
    /// so the state observed after this call is final for this subscription.
    pub fn cancel(&self) {
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        self.state.send_if_modified(|_| {
            self.cancelled.store(true, Ordering::SeqCst);
            false
        });
        self.task.abort();
        debug!(subscription = self.name, "subscription cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
