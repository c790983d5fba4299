use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as TurnLock, OwnedMutexGuard};

/// Hands out one turn at a time per key.
///
/// Lazily creates one async lock per key and returns the same lock for
/// repeated lookups while it is held. Idle locks are pruned on the next
/// acquisition.
#[derive(Default)]
pub(crate) struct KeyedSequencer {
    turns: Mutex<HashMap<String, Arc<TurnLock<()>>>>,
}

impl KeyedSequencer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for the turn on `key`. The turn ends when the guard is dropped.
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let turn = {
            // The map is never left half-updated, so a poisoned lock is still usable.
            let mut turns = self.turns.lock().unwrap_or_else(PoisonError::into_inner);
            turns.retain(|_, turn| Arc::strong_count(turn) > 1);
            turns
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(TurnLock::new(())))
                .clone()
        };
        turn.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.turns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
