use sled::transaction::TransactionError;
use std::convert::Infallible;

#[derive(thiserror::Error, Debug)]
pub enum MarketError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),
    #[error("User {user_id} does not own {resource}")]
    Unauthorized { resource: String, user_id: String },
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(i64),
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },
    #[error("Stock cannot be negative: current {current}, delta {delta}")]
    NegativeStock { current: u64, delta: i64 },
    #[error("Order in state {from} cannot move to {to}")]
    InvalidStatusTransition { from: String, to: String },
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("Failed to encode record: {0}")]
    Encode(#[from] minicbor::encode::Error<Infallible>),
    #[error("Failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
}

// Reasons a draft or request fails semantic validation
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Listing is not active")]
    InactiveListing,
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("Reveal listings require a name")]
    UnnamedReveal,
    #[error("Coordinates out of range: lat {lat}, lng {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("Total price overflows: {qty} x {unit_price}")]
    PriceOverflow { qty: u64, unit_price: u64 },
    #[error("Stock overflows: current {current}, delta {delta}")]
    StockOverflow { current: u64, delta: i64 },
    #[error("Identifier could not be generated: {0}")]
    Identifier(String),
}

/// Structural identity of a [`MarketError`], for callers mapping outcomes to
/// responses and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidInput,
    InvalidQuantity,
    InsufficientStock,
    NegativeStock,
    InvalidStatusTransition,
    DuplicateEntry,
    Storage,
}

impl ErrorKind {
    /// Only storage faults are worth retrying; everything else fails the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(..) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::NegativeStock { .. } => ErrorKind::NegativeStock,
            Self::InvalidStatusTransition { .. } => ErrorKind::InvalidStatusTransition,
            Self::DuplicateEntry(_) => ErrorKind::DuplicateEntry,
            // an undecodable record is a storage fault from the caller's view
            Self::Storage(_) | Self::Encode(_) | Self::Decode(_) => ErrorKind::Storage,
        }
    }
}

impl From<TransactionError<MarketError>> for MarketError {
    fn from(value: TransactionError<MarketError>) -> Self {
        match value {
            TransactionError::Abort(err) => err,
            TransactionError::Storage(err) => MarketError::Storage(err),
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_is_retryable() {
        assert!(ErrorKind::Storage.is_retryable());
        assert!(!ErrorKind::InsufficientStock.is_retryable());
        assert!(!ErrorKind::Unauthorized.is_retryable());
    }

    #[test]
    fn aborted_transaction_keeps_its_error() {
        let err: MarketError = TransactionError::Abort(MarketError::InvalidQuantity(0)).into();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
    }

    #[test]
    fn validation_errors_are_invalid_input() {
        let err: MarketError = ValidationError::InactiveListing.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
