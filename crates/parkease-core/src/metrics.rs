//! Occupancy metrics for branch dashboards.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ParkingRecord;

/// Live occupancy of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyMetrics {
    /// Vehicles currently parked.
    pub vehicles_parked: usize,

    /// Mean parked time of the vehicles currently parked, in whole seconds.
    pub average_parked_seconds: i64,

    /// Mean parked time rendered as `"{h}h {m}m"`.
    pub average_parked_display: String,
}

impl OccupancyMetrics {
    /// Compute metrics over the parked records in `records` as of `now`.
    ///
    /// Completed records are ignored.
    #[must_use]
    pub fn compute(records: &[ParkingRecord], now: DateTime<Utc>) -> Self {
        let parked: Vec<&ParkingRecord> = records.iter().filter(|r| r.is_parked()).collect();

        let average_parked_seconds = if parked.is_empty() {
            0
        } else {
            let total: i64 = parked.iter().map(|r| r.elapsed(now).num_seconds()).sum();
            total / i64::try_from(parked.len()).unwrap_or(i64::MAX)
        };

        Self {
            vehicles_parked: parked.len(),
            average_parked_seconds,
            average_parked_display: format_hours_minutes(Duration::seconds(
                average_parked_seconds,
            )),
        }
    }
}

fn format_hours_minutes(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
}
