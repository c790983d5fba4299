//! Sync layer configuration.
//!
//! ```toml
//! item_page_size = 20
//! history_page_size = 10
//! sequence_stock_updates = true
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("{field} must be greater than zero")]
    ZeroPageSize { field: &'static str },
}

/// Tuning knobs for [`InventoryStore`](crate::InventoryStore).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Items requested per page of the medicine listing.
    pub item_page_size: usize,
    /// History entries requested per page of an item's audit trail.
    pub history_page_size: usize,
    /// Serialize stock adjustments per item id. When false, concurrent
    /// adjustments of one item race and the gateway keeps the last write.
    pub sequence_stock_updates: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            item_page_size: 20,
            history_page_size: 10,
            sequence_stock_updates: true,
        }
    }
}

impl SyncConfig {
    /// Parse from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_item_page_size(mut self, size: usize) -> Self {
        self.item_page_size = size;
        self
    }

    pub fn with_history_page_size(mut self, size: usize) -> Self {
        self.history_page_size = size;
        self
    }

    pub fn with_sequenced_stock_updates(mut self, enabled: bool) -> Self {
        self.sequence_stock_updates = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_page_size == 0 {
            return Err(ConfigError::ZeroPageSize {
                field: "item_page_size",
            });
        }
        if self.history_page_size == 0 {
            return Err(ConfigError::ZeroPageSize {
                field: "history_page_size",
            });
        }
        Ok(())
    }
}
