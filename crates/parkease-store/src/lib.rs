//! Document storage layer for parkease.
//!
//! The [`Store`] trait is the seam to the hosted document database the
//! dashboard runs against. Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process maps behind a `parking_lot` lock, used by
//!   tests, development and single-node deployments
//! - `RocksStore` (feature `rocksdb-backend`): persistent storage with one
//!   column family per collection
//!
//! # Example
//!
//! ```
//! use parkease_core::{BranchId, ParkingRecord};
//! use parkease_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let branch: BranchId = "branch-1".parse().unwrap();
//!
//! let record = ParkingRecord::enter(branch.clone(), "ABC-123".parse().unwrap(), chrono::Utc::now());
//! store.record_entry(&record).unwrap();
//!
//! let active = store.list_records(&branch, None).unwrap();
//! assert_eq!(active.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use parkease_core::{
    Branch, BranchId, Completion, LoyaltyAccount, ParkingRecord, Plate, RecordId, RecordStatus,
    Tariff,
};

/// Payment write for one parking record.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Owning branch.
    pub branch_id: BranchId,
    /// The record being paid.
    pub record_id: RecordId,
    /// Exit time, total cost and redeemed points to write.
    pub completion: Completion,
}

/// The storage trait defining all document operations.
///
/// Records are owned by a branch and always addressed through it.
pub trait Store: Send + Sync {
    // =========================================================================
    // Branch Operations
    // =========================================================================

    /// Insert or update a branch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_branch(&self, branch: &Branch) -> Result<()>;

    /// Get a branch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>>;

    /// List every branch profile, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_branches(&self) -> Result<Vec<Branch>>;

    /// Delete a branch profile together with its tariff and parking records.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the branch doesn't exist.
    fn delete_branch(&self, id: &BranchId) -> Result<()>;

    // =========================================================================
    // Parking Record Operations
    // =========================================================================

    /// Insert a record as-is.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a record with the same ID exists.
    fn insert_record(&self, record: &ParkingRecord) -> Result<()>;

    /// Get a record of a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_record(&self, branch_id: &BranchId, record_id: &RecordId)
        -> Result<Option<ParkingRecord>>;

    /// List a branch's records, newest entry first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_records(
        &self,
        branch_id: &BranchId,
        status: Option<RecordStatus>,
    ) -> Result<Vec<ParkingRecord>>;

    // =========================================================================
    // Tariff Operations
    // =========================================================================

    /// Get the tariff configured for a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_tariff(&self, branch_id: &BranchId) -> Result<Option<Tariff>>;

    /// Set the tariff for a branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_tariff(&self, branch_id: &BranchId, tariff: &Tariff) -> Result<()>;

    // =========================================================================
    // Loyalty Operations
    // =========================================================================

    /// Get the loyalty account of a plate.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_loyalty(&self, plate: &Plate) -> Result<Option<LoyaltyAccount>>;

    /// Insert or update a loyalty account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_loyalty(&self, account: &LoyaltyAccount) -> Result<()>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Insert a freshly parked record unless the plate is already parked at
    /// the same branch.
    ///
    /// # Errors
    ///
    /// - `StoreError::VehicleAlreadyParked` if the plate has an open session.
    /// - `StoreError::AlreadyExists` if the record ID is taken.
    fn record_entry(&self, record: &ParkingRecord) -> Result<()>;

    /// Complete a parked record and debit redeemed points atomically.
    ///
    /// The write is conditional on the record still being parked, so two
    /// confirmations of the same session cannot both succeed.
    ///
    /// Returns the completed record.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the record doesn't exist.
    /// - `StoreError::AlreadyCompleted` if the record is no longer parked.
    /// - `StoreError::InsufficientPoints` if the plate's balance is too low.
    fn complete_parking(&self, settlement: &Settlement) -> Result<ParkingRecord>;
}

/// Check a settlement against the current record and loyalty account.
///
/// Returns the completed record and the debited account (if any points are
/// redeemed). Shared by the backends so both enforce the same rules.
pub(crate) fn apply_settlement(
    record: Option<ParkingRecord>,
    account: Option<LoyaltyAccount>,
    settlement: &Settlement,
) -> Result<(ParkingRecord, Option<LoyaltyAccount>)> {
    let mut record = record.ok_or_else(|| StoreError::NotFound {
        entity: "parking record",
        id: settlement.record_id.to_string(),
    })?;

    if !record.is_parked() {
        return Err(StoreError::AlreadyCompleted {
            record_id: record.id.to_string(),
        });
    }

    let requested = settlement.completion.points_redeemed;
    let account = if requested > 0 {
        let mut account = account.ok_or(StoreError::InsufficientPoints {
            available: 0,
            requested,
        })?;
        if account.points < requested {
            return Err(StoreError::InsufficientPoints {
                available: account.points,
                requested,
            });
        }
        account.points -= requested;
        Some(account)
    } else {
        None
    };

    record.complete(settlement.completion.clone())?;
    Ok((record, account))
}
