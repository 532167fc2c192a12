//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Branch profiles, keyed by `branch_id`.
    pub const BRANCHES: &str = "branches";

    /// Parking records, keyed by `branch_id || 0x00 || record_id` (ULID).
    pub const RECORDS: &str = "records";

    /// Branch tariffs, keyed by `branch_id`.
    pub const TARIFFS: &str = "tariffs";

    /// Loyalty accounts, keyed by normalised plate.
    pub const LOYALTY: &str = "loyalty";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::BRANCHES, cf::RECORDS, cf::TARIFFS, cf::LOYALTY]
}
