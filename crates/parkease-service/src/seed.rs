//! Demo data bootstrap.
//!
//! Populates one branch with the sample lot used in demos: the standard
//! tariff, four parked vehicles, two paid sessions and three loyalty
//! accounts. Vehicles are only parked into a branch that has no parking
//! records yet, and the paid sessions have fixed IDs, so seeding the same
//! branch again writes nothing new even after seeded vehicles have left.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use ulid::Ulid;

use parkease_core::{
    Branch, BranchId, Completion, LoyaltyAccount, ParkingRecord, Plate, RecordId, SessionState,
    Tariff,
};
use parkease_store::{Store, StoreError};

/// Parked vehicles, as (plate, minutes since entry).
const PARKED: [(&str, i64); 4] = [
    ("ABC-123", 150),
    ("XYZ-789", 60),
    ("DEF-456", 30),
    ("GHI-101", 300),
];

/// Paid sessions, as (plate, entry, exit, total cost in cents).
const COMPLETED: [(&str, &str, &str, i64); 2] = [
    ("OLD-001", "2023-10-26T10:00:00Z", "2023-10-26T12:30:00Z", 625),
    ("OLD-002", "2023-10-26T11:00:00Z", "2023-10-26T11:45:00Z", 188),
];

/// Loyalty balances, as (plate, points).
const LOYALTY: [(&str, u64); 3] = [("ABC-123", 150), ("XYZ-789", 25), ("GHI-101", 500)];

/// Number of documents written by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Branch profile created.
    pub branch_created: bool,
    /// Tariff created.
    pub tariff_created: bool,
    /// Parking records created.
    pub records_created: usize,
    /// Loyalty accounts created.
    pub loyalty_created: usize,
}

/// Seed `branch_id` with demo data as of `now`.
///
/// Existing documents are left untouched. The parked vehicles are skipped
/// when the branch already holds any parking record.
///
/// # Errors
///
/// Returns an error if a store operation fails.
pub fn seed_demo_data(
    store: &dyn Store,
    branch_id: &BranchId,
    now: DateTime<Utc>,
) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if store.get_branch(branch_id)?.is_none() {
        let mut branch = Branch::new(branch_id.clone(), format!("{branch_id}@demo.parkease"));
        branch.parking_lot_name = Some("Demo Lot".to_string());
        branch.max_capacity = 50;
        store.put_branch(&branch)?;
        report.branch_created = true;
    }

    if store.get_tariff(branch_id)?.is_none() {
        store.put_tariff(branch_id, &Tariff::standard())?;
        report.tariff_created = true;
    }

    if store.list_records(branch_id, None)?.is_empty() {
        for (seq, (plate, minutes)) in (0u128..).zip(PARKED) {
            let entry_time = now - Duration::minutes(minutes);
            let record = seeded_record(branch_id, plate, entry_time, seq, SessionState::Parked)?;
            match store.record_entry(&record) {
                Ok(()) => report.records_created += 1,
                Err(StoreError::VehicleAlreadyParked { .. } | StoreError::AlreadyExists { .. }) => {}
                Err(e) => return Err(e),
            }
        }
    }

    for (seq, (plate, entry, exit, cents)) in (100u128..).zip(COMPLETED) {
        let entry_time = parse_instant(entry)?;
        let state = SessionState::Completed(Completion {
            exit_time: parse_instant(exit)?,
            total_cost: Decimal::new(cents, 2),
            points_redeemed: 0,
        });
        let record = seeded_record(branch_id, plate, entry_time, seq, state)?;
        match store.insert_record(&record) {
            Ok(()) => report.records_created += 1,
            Err(StoreError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    for (plate, points) in LOYALTY {
        let plate = parse_plate(plate)?;
        if store.get_loyalty(&plate)?.is_none() {
            store.put_loyalty(&LoyaltyAccount::new(plate, points))?;
            report.loyalty_created += 1;
        }
    }

    tracing::info!(
        branch_id = %branch_id,
        records_created = report.records_created,
        loyalty_created = report.loyalty_created,
        "Demo data seeded"
    );

    Ok(report)
}

fn seeded_record(
    branch_id: &BranchId,
    plate: &str,
    entry_time: DateTime<Utc>,
    seq: u128,
    state: SessionState,
) -> Result<ParkingRecord, StoreError> {
    let millis = u64::try_from(entry_time.timestamp_millis()).unwrap_or(0);
    Ok(ParkingRecord {
        id: RecordId::from_ulid(Ulid::from_parts(millis, seq)),
        branch_id: branch_id.clone(),
        plate: parse_plate(plate)?,
        entry_time,
        state,
    })
}

fn parse_plate(plate: &str) -> Result<Plate, StoreError> {
    plate
        .parse()
        .map_err(|e| StoreError::InvalidTransition(format!("seed plate {plate}: {e}")))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, StoreError> {
    s.parse()
        .map_err(|e| StoreError::InvalidTransition(format!("seed instant {s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkease_core::RecordStatus;
    use parkease_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        "2024-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn seeds_sample_lot() {
        let store = MemoryStore::new();
        let branch: BranchId = "demo".parse().unwrap();

        let report = seed_demo_data(&store, &branch, now()).unwrap();
        assert!(report.branch_created);
        assert!(report.tariff_created);
        assert_eq!(report.records_created, 6);
        assert_eq!(report.loyalty_created, 3);

        let parked = store.list_records(&branch, Some(RecordStatus::Parked)).unwrap();
        assert_eq!(parked.len(), 4);
        let abc = parked.iter().find(|r| r.plate.as_str() == "ABC-123").unwrap();
        assert_eq!(abc.entry_time, now() - Duration::minutes(150));

        let completed = store
            .list_records(&branch, Some(RecordStatus::Completed))
            .unwrap();
        let costs: Vec<_> = completed.iter().filter_map(ParkingRecord::total_cost).collect();
        assert!(costs.contains(&dec!(6.25)));
        assert!(costs.contains(&dec!(1.88)));

        let ghi = store.get_loyalty(&"GHI-101".parse().unwrap()).unwrap().unwrap();
        assert_eq!(ghi.points, 500);
    }

    #[test]
    fn seeding_twice_writes_nothing_new() {
        let store = MemoryStore::new();
        let branch: BranchId = "demo".parse().unwrap();
        seed_demo_data(&store, &branch, now()).unwrap();

        let again = seed_demo_data(&store, &branch, now() + Duration::minutes(5)).unwrap();
        assert_eq!(again, SeedReport::default());
        assert_eq!(store.list_records(&branch, None).unwrap().len(), 6);
    }

    #[test]
    fn reseeding_does_not_repark_departed_vehicles() {
        let store = MemoryStore::new();
        let branch: BranchId = "demo".parse().unwrap();
        seed_demo_data(&store, &branch, now()).unwrap();

        let abc = store
            .list_records(&branch, Some(RecordStatus::Parked))
            .unwrap()
            .into_iter()
            .find(|r| r.plate.as_str() == "ABC-123")
            .unwrap();
        store
            .complete_parking(&parkease_store::Settlement {
                branch_id: branch.clone(),
                record_id: abc.id,
                completion: Completion {
                    exit_time: now(),
                    total_cost: dec!(6.25),
                    points_redeemed: 0,
                },
            })
            .unwrap();

        let again = seed_demo_data(&store, &branch, now() + Duration::days(1)).unwrap();
        assert_eq!(again.records_created, 0);

        let parked = store.list_records(&branch, Some(RecordStatus::Parked)).unwrap();
        assert_eq!(parked.len(), 3);
        assert!(parked.iter().all(|r| r.plate.as_str() != "ABC-123"));
        assert_eq!(store.list_records(&branch, None).unwrap().len(), 6);
    }

    #[test]
    fn existing_balances_are_kept() {
        let store = MemoryStore::new();
        let plate: Plate = "ABC-123".parse().unwrap();
        store.put_loyalty(&LoyaltyAccount::new(plate.clone(), 7)).unwrap();

        seed_demo_data(&store, &"demo".parse().unwrap(), now()).unwrap();
        assert_eq!(store.get_loyalty(&plate).unwrap().unwrap().points, 7);
    }
}
