use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::Document;

/// A medicine in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
#[document(collection = "medicines")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub stock: i64,
    pub aisle: String,
}

impl Item {
    /// A local draft record; it has no id until the gateway persists it.
    pub fn new(name: impl Into<String>, stock: i64, aisle: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            stock,
            aisle: aisle.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Raw form input for a new item, before validation.
///
/// Field error helpers return `None` while a field is still empty so a form
/// does not complain before the user has typed anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub stock: String,
    pub aisle: String,
}

impl ItemDraft {
    pub fn new(
        name: impl Into<String>,
        stock: impl Into<String>,
        aisle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stock: stock.into(),
            aisle: aisle.into(),
        }
    }

    pub fn name_error(&self) -> Option<ValidationError> {
        if self.name.is_empty() {
            return None;
        }
        self.validate_name().err()
    }

    pub fn stock_error(&self) -> Option<ValidationError> {
        if self.stock.is_empty() {
            return None;
        }
        self.validate_stock().err()
    }

    pub fn aisle_error(&self) -> Option<ValidationError> {
        if self.aisle.is_empty() {
            return None;
        }
        self.validate_aisle().err()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Trim and parse the draft into an unpersisted [`Item`].
    pub fn validate(&self) -> Result<Item, ValidationError> {
        let name = self.validate_name()?;
        let stock = self.validate_stock()?;
        let aisle = self.validate_aisle()?;
        Ok(Item::new(name, stock, aisle))
    }

    fn validate_name(&self) -> Result<&str, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(name)
    }

    fn validate_stock(&self) -> Result<i64, ValidationError> {
        let stock: i64 = self
            .stock
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidStock(self.stock.clone()))?;
        if stock < 0 {
            return Err(ValidationError::NegativeStock(stock));
        }
        Ok(stock)
    }

    fn validate_aisle(&self) -> Result<&str, ValidationError> {
        let aisle = self.aisle.trim();
        if aisle.is_empty() {
            return Err(ValidationError::EmptyAisle);
        }
        Ok(aisle)
    }
}
