use thiserror::Error;

/// Local, pre-network rejection of user input or of an operation that
/// needs a persisted record. Never sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Medicine name cannot be empty")]
    EmptyName,
    #[error("Stock must be a valid number")]
    InvalidStock(String),
    #[error("Stock must be a positive number")]
    NegativeStock(i64),
    #[error("Aisle cannot be empty")]
    EmptyAisle,
    #[error("{operation} requires a persisted medicine")]
    MissingId { operation: &'static str },
    #[error("stock of {name} cannot go below zero (current {current}, change {delta})")]
    StockUnderflow {
        name: String,
        current: i64,
        delta: i64,
    },
    #[error("stock of {name} is out of range (current {current}, change {delta})")]
    StockOverflow {
        name: String,
        current: i64,
        delta: i64,
    },
}
