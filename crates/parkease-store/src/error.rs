//! Error types for parkease storage.

use parkease_core::BillingError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Document not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of document.
        entity: &'static str,
        /// The key that was looked up.
        id: String,
    },

    /// Document already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The kind of document.
        entity: &'static str,
        /// The conflicting key.
        id: String,
    },

    /// The vehicle already has an open session at this branch.
    #[error("vehicle already parked: {plate}")]
    VehicleAlreadyParked {
        /// The plate.
        plate: String,
    },

    /// The conditional `parked -> completed` write lost: the record is no
    /// longer parked.
    #[error("parking record already completed: {record_id}")]
    AlreadyCompleted {
        /// The record identifier.
        record_id: String,
    },

    /// The loyalty balance no longer covers the redemption.
    #[error("insufficient loyalty points: available={available}, requested={requested}")]
    InsufficientPoints {
        /// Points on the account.
        available: u64,
        /// Points the settlement tried to redeem.
        requested: u64,
    },

    /// The write would break a record invariant.
    #[error("invalid record transition: {0}")]
    InvalidTransition(String),
}

impl From<BillingError> for StoreError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::AlreadyCompleted { record_id } => Self::AlreadyCompleted { record_id },
            other => Self::InvalidTransition(other.to_string()),
        }
    }
}
