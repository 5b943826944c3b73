//! Error types for the ledger.

use crate::TransferId;
use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A raw event carried an empty identifier.
    #[error("Transfer at index {index} has an empty id")]
    EmptyTransferId { index: usize },

    /// A raw event referenced an empty account identifier.
    #[error("Transfer {transfer_id} has an empty '{field}' account")]
    EmptyAccountId {
        transfer_id: TransferId,
        field: &'static str,
    },

    /// A raw event moved a negative value.
    #[error("Transfer {transfer_id} has negative value {value}")]
    NegativeValue { transfer_id: TransferId, value: String },

    /// The same event id appears twice in one batch.
    #[error("Duplicate transfer id in batch: {0}")]
    DuplicateTransferId(TransferId),

    /// The balance lookup failed.
    #[error("Balance lookup failed: {0}")]
    LookupFailed(String),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Stored or supplied amount is not an integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A record cannot be represented in or read back from the store.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LedgerError {
    /// Check if this error is retryable.
    ///
    /// Validation errors never are: the same batch fails the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::LookupFailed(_) | LedgerError::DatabaseError(_)
        )
    }

    /// Check if this error was raised while validating a batch.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::EmptyTransferId { .. }
                | LedgerError::EmptyAccountId { .. }
                | LedgerError::NegativeValue { .. }
                | LedgerError::DuplicateTransferId(_)
        )
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::EmptyTransferId { .. } => "EMPTY_TRANSFER_ID",
            LedgerError::EmptyAccountId { .. } => "EMPTY_ACCOUNT_ID",
            LedgerError::NegativeValue { .. } => "NEGATIVE_VALUE",
            LedgerError::DuplicateTransferId(_) => "DUPLICATE_TRANSFER_ID",
            LedgerError::LookupFailed(_) => "LOOKUP_FAILED",
            LedgerError::DatabaseError(_) => "DATABASE_ERROR",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::InvalidRecord(_) => "INVALID_RECORD",
            LedgerError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LedgerError::LookupFailed("connection refused".into()).is_retryable());
        assert!(LedgerError::DatabaseError("deadlock".into()).is_retryable());
        assert!(!LedgerError::DuplicateTransferId(TransferId::new("t1")).is_retryable());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = LedgerError::EmptyAccountId {
            transfer_id: TransferId::new("t1"),
            field: "from",
        };
        assert!(err.is_validation());
        assert_eq!(err.error_code(), "EMPTY_ACCOUNT_ID");
        assert_eq!(err.to_string(), "Transfer t1 has an empty 'from' account");
    }
}
