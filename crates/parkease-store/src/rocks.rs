//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Single-key writes go straight to the database; compound operations run
//! under a write mutex and commit through one `WriteBatch`.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use parkease_core::{
    Branch, BranchId, LoyaltyAccount, ParkingRecord, Plate, RecordId, RecordStatus, Tariff,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{apply_settlement, Settlement, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!(path = %path.as_ref().display(), "Opened RocksDB store");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Collect `(key, record)` pairs of a branch in key (entry) order.
    fn scan_records(&self, branch_id: &BranchId) -> Result<Vec<(Vec<u8>, ParkingRecord)>> {
        let cf = self.cf(cf::RECORDS)?;
        let prefix = keys::record_prefix(branch_id);

        let mut out = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            out.push((key.to_vec(), Self::deserialize(&value)?));
        }
        Ok(out)
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Branch Operations
    // =========================================================================

    fn put_branch(&self, branch: &Branch) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.put(cf::BRANCHES, &keys::branch_key(&branch.id), branch)
    }

    fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>> {
        self.get(cf::BRANCHES, &keys::branch_key(id))
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        let cf = self.cf(cf::BRANCHES)?;
        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                Self::deserialize(&value)
            })
            .collect()
    }

    fn delete_branch(&self, id: &BranchId) -> Result<()> {
        let _guard = self.write_lock.lock();

        if self.get_branch(id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "branch",
                id: id.to_string(),
            });
        }

        let branches_cf = self.cf(cf::BRANCHES)?;
        let tariffs_cf = self.cf(cf::TARIFFS)?;
        let records_cf = self.cf(cf::RECORDS)?;

        let records = self.scan_records(id)?;
        let mut batch = WriteBatch::default();
        batch.delete_cf(&branches_cf, keys::branch_key(id));
        batch.delete_cf(&tariffs_cf, keys::branch_key(id));
        for (key, _) in &records {
            batch.delete_cf(&records_cf, key);
        }
        self.write(batch)?;

        tracing::debug!(branch_id = %id, records = records.len(), "Deleted branch");
        Ok(())
    }

    // =========================================================================
    // Parking Record Operations
    // =========================================================================

    fn insert_record(&self, record: &ParkingRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        let key = keys::record_key(&record.branch_id, &record.id);

        if self.get::<ParkingRecord>(cf::RECORDS, &key)?.is_some() {
            return Err(StoreError::AlreadyExists {
                entity: "parking record",
                id: record.id.to_string(),
            });
        }
        self.put(cf::RECORDS, &key, record)
    }

    fn get_record(
        &self,
        branch_id: &BranchId,
        record_id: &RecordId,
    ) -> Result<Option<ParkingRecord>> {
        self.get(cf::RECORDS, &keys::record_key(branch_id, record_id))
    }

    fn list_records(
        &self,
        branch_id: &BranchId,
        status: Option<RecordStatus>,
    ) -> Result<Vec<ParkingRecord>> {
        Ok(self
            .scan_records(branch_id)?
            .into_iter()
            .rev()
            .map(|(_, record)| record)
            .filter(|record| status.map_or(true, |s| record.status() == s))
            .collect())
    }

    // =========================================================================
    // Tariff Operations
    // =========================================================================

    fn get_tariff(&self, branch_id: &BranchId) -> Result<Option<Tariff>> {
        self.get(cf::TARIFFS, &keys::branch_key(branch_id))
    }

    fn put_tariff(&self, branch_id: &BranchId, tariff: &Tariff) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.put(cf::TARIFFS, &keys::branch_key(branch_id), tariff)
    }

    // =========================================================================
    // Loyalty Operations
    // =========================================================================

    fn get_loyalty(&self, plate: &Plate) -> Result<Option<LoyaltyAccount>> {
        self.get(cf::LOYALTY, &keys::loyalty_key(plate))
    }

    fn put_loyalty(&self, account: &LoyaltyAccount) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.put(cf::LOYALTY, &keys::loyalty_key(&account.plate), account)
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn record_entry(&self, record: &ParkingRecord) -> Result<()> {
        let _guard = self.write_lock.lock();

        let already_parked = self
            .scan_records(&record.branch_id)?
            .iter()
            .any(|(_, existing)| existing.is_parked() && existing.plate == record.plate);
        if already_parked {
            return Err(StoreError::VehicleAlreadyParked {
                plate: record.plate.to_string(),
            });
        }

        let key = keys::record_key(&record.branch_id, &record.id);
        if self.get::<ParkingRecord>(cf::RECORDS, &key)?.is_some() {
            return Err(StoreError::AlreadyExists {
                entity: "parking record",
                id: record.id.to_string(),
            });
        }
        self.put(cf::RECORDS, &key, record)
    }

    fn complete_parking(&self, settlement: &Settlement) -> Result<ParkingRecord> {
        let _guard = self.write_lock.lock();

        let record_key = keys::record_key(&settlement.branch_id, &settlement.record_id);
        let record: Option<ParkingRecord> = self.get(cf::RECORDS, &record_key)?;
        let account = match &record {
            Some(r) => self.get_loyalty(&r.plate)?,
            None => None,
        };

        let (completed, debited) = apply_settlement(record, account, settlement)?;

        let records_cf = self.cf(cf::RECORDS)?;
        let loyalty_cf = self.cf(cf::LOYALTY)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&records_cf, &record_key, Self::serialize(&completed)?);
        if let Some(account) = &debited {
            batch.put_cf(
                &loyalty_cf,
                keys::loyalty_key(&account.plate),
                Self::serialize(account)?,
            );
        }
        self.write(batch)?;

        Ok(completed)
    }
}
