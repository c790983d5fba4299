use serde::{Deserialize, Serialize};

/// Sort order requested for the item listing. Single key, ascending only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    None,
    Name,
    Stock,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::None, SortKey::Name, SortKey::Stock];

    /// The document field the gateway orders by, if any.
    pub fn field(self) -> Option<&'static str> {
        match self {
            SortKey::None => None,
            SortKey::Name => Some("name"),
            SortKey::Stock => Some("stock"),
        }
    }
}
