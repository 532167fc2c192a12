//! Error types for parkease.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::ids::IdError;

/// Result type for parkease operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors that can occur in parkease domain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    /// The reference instant precedes the entry instant.
    #[error("invalid interval: now ({now}) precedes entry ({entry})")]
    InvalidInterval {
        /// Entry instant of the session.
        entry: DateTime<Utc>,
        /// Reference instant used for billing.
        now: DateTime<Utc>,
    },

    /// The tariff's price per hour is negative or above the maximum.
    #[error("invalid tariff: price per hour {price_per_hour} is out of range")]
    InvalidTariff {
        /// The offending rate.
        price_per_hour: Decimal,
    },

    /// An intermediate amount does not fit in a `Decimal`.
    #[error("amount overflow while computing the bill")]
    AmountOverflow,

    /// The parking session was already paid.
    #[error("parking record already completed: {record_id}")]
    AlreadyCompleted {
        /// The record identifier.
        record_id: String,
    },

    /// The exit instant precedes the entry instant.
    #[error("exit time precedes entry time for record {record_id}")]
    ExitBeforeEntry {
        /// The record identifier.
        record_id: String,
    },

    /// Invalid identifier or plate.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
