//! In-memory storage implementation.
//!
//! All collections live behind a single `RwLock`, so compound operations
//! (entry uniqueness, payment settlement, branch deletion) are atomic with
//! respect to every other call.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use parkease_core::{
    Branch, BranchId, LoyaltyAccount, ParkingRecord, Plate, RecordId, RecordStatus, Tariff,
};

use crate::error::{Result, StoreError};
use crate::{apply_settlement, Settlement, Store};

#[derive(Default)]
struct Collections {
    branches: BTreeMap<BranchId, Branch>,
    records: BTreeMap<(BranchId, RecordId), ParkingRecord>,
    tariffs: HashMap<BranchId, Tariff>,
    loyalty: HashMap<Plate, LoyaltyAccount>,
}

impl Collections {
    fn branch_records<'a>(
        &'a self,
        branch_id: &BranchId,
    ) -> impl DoubleEndedIterator<Item = &'a ParkingRecord> + 'a {
        let start = (branch_id.clone(), RecordId::from_bytes([0; 16]));
        let end = (branch_id.clone(), RecordId::from_bytes([0xff; 16]));
        self.records.range(start..=end).map(|(_, record)| record)
    }
}

/// Storage backed by in-process maps.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    // =========================================================================
    // Branch Operations
    // =========================================================================

    fn put_branch(&self, branch: &Branch) -> Result<()> {
        self.inner
            .write()
            .branches
            .insert(branch.id.clone(), branch.clone());
        Ok(())
    }

    fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>> {
        Ok(self.inner.read().branches.get(id).cloned())
    }

    fn list_branches(&self) -> Result<Vec<Branch>> {
        Ok(self.inner.read().branches.values().cloned().collect())
    }

    fn delete_branch(&self, id: &BranchId) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.branches.remove(id).is_none() {
            return Err(StoreError::NotFound {
                entity: "branch",
                id: id.to_string(),
            });
        }
        inner.tariffs.remove(id);
        inner.records.retain(|(branch_id, _), _| branch_id != id);
        Ok(())
    }

    // =========================================================================
    // Parking Record Operations
    // =========================================================================

    fn insert_record(&self, record: &ParkingRecord) -> Result<()> {
        let mut inner = self.inner.write();
        let key = (record.branch_id.clone(), record.id);
        if inner.records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity: "parking record",
                id: record.id.to_string(),
            });
        }
        inner.records.insert(key, record.clone());
        Ok(())
    }

    fn get_record(
        &self,
        branch_id: &BranchId,
        record_id: &RecordId,
    ) -> Result<Option<ParkingRecord>> {
        Ok(self
            .inner
            .read()
            .records
            .get(&(branch_id.clone(), *record_id))
            .cloned())
    }

    fn list_records(
        &self,
        branch_id: &BranchId,
        status: Option<RecordStatus>,
    ) -> Result<Vec<ParkingRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .branch_records(branch_id)
            .rev()
            .filter(|record| status.map_or(true, |s| record.status() == s))
            .cloned()
            .collect())
    }

    // =========================================================================
    // Tariff Operations
    // =========================================================================

    fn get_tariff(&self, branch_id: &BranchId) -> Result<Option<Tariff>> {
        Ok(self.inner.read().tariffs.get(branch_id).cloned())
    }

    fn put_tariff(&self, branch_id: &BranchId, tariff: &Tariff) -> Result<()> {
        self.inner
            .write()
            .tariffs
            .insert(branch_id.clone(), tariff.clone());
        Ok(())
    }

    // =========================================================================
    // Loyalty Operations
    // =========================================================================

    fn get_loyalty(&self, plate: &Plate) -> Result<Option<LoyaltyAccount>> {
        Ok(self.inner.read().loyalty.get(plate).cloned())
    }

    fn put_loyalty(&self, account: &LoyaltyAccount) -> Result<()> {
        self.inner
            .write()
            .loyalty
            .insert(account.plate.clone(), account.clone());
        Ok(())
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn record_entry(&self, record: &ParkingRecord) -> Result<()> {
        let mut inner = self.inner.write();
        let already_parked = inner
            .branch_records(&record.branch_id)
            .any(|existing| existing.is_parked() && existing.plate == record.plate);
        if already_parked {
            return Err(StoreError::VehicleAlreadyParked {
                plate: record.plate.to_string(),
            });
        }

        let key = (record.branch_id.clone(), record.id);
        if inner.records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                entity: "parking record",
                id: record.id.to_string(),
            });
        }
        inner.records.insert(key, record.clone());
        Ok(())
    }

    fn complete_parking(&self, settlement: &Settlement) -> Result<ParkingRecord> {
        let mut inner = self.inner.write();
        let key = (settlement.branch_id.clone(), settlement.record_id);

        let record = inner.records.get(&key).cloned();
        let account = record
            .as_ref()
            .and_then(|r| inner.loyalty.get(&r.plate).cloned());

        let (completed, debited) = apply_settlement(record, account, settlement)?;

        if let Some(account) = debited {
            inner.loyalty.insert(account.plate.clone(), account);
        }
        inner.records.insert(key, completed.clone());
        Ok(completed)
    }
}
