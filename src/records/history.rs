use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::Document;

/// An append-only audit record describing one mutation of an [`Item`](super::Item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
#[document(collection = "history")]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub medicine_id: String,
    pub user: String,
    pub action: String,
    pub details: String,
    /// Stored as microseconds since the epoch so the backend orders it numerically.
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        medicine_id: impl Into<String>,
        user: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            medicine_id: medicine_id.into(),
            user: user.into(),
            action: action.into(),
            details: details.into(),
            // Truncated to the stored precision so a round trip compares equal.
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp.trunc_subsecs(6);
        self
    }
}
