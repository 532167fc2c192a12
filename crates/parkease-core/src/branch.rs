//! Branch (parking lot operator) types for parkease.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BranchId, ParkingRecord};

/// Profile of one parking lot, owned by a single operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// The branch ID (identity-provider subject of the operator).
    pub id: BranchId,

    /// Operator e-mail.
    pub email: String,

    /// Operator display name.
    #[serde(default)]
    pub username: Option<String>,

    /// Name of the parking lot.
    #[serde(default)]
    pub parking_lot_name: Option<String>,

    /// Number of spots on the lot.
    #[serde(default)]
    pub max_capacity: u32,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// Create a branch profile.
    #[must_use]
    pub fn new(id: BranchId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            username: None,
            parking_lot_name: None,
            max_capacity: 0,
            created_at: Utc::now(),
        }
    }

    /// Name shown on dashboards: the lot name, falling back to the e-mail.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.parking_lot_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Aggregated view of a branch for the administration overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    /// The branch ID.
    pub branch_id: BranchId,

    /// Display name.
    pub parking_lot_name: String,

    /// Vehicles currently parked.
    pub occupied_spots: usize,

    /// Configured capacity.
    pub max_capacity: u32,

    /// Sum of all completed totals.
    pub revenue: Decimal,
}

impl BranchSummary {
    /// Aggregate a branch's records.
    #[must_use]
    pub fn from_records(branch: &Branch, records: &[ParkingRecord]) -> Self {
        let occupied_spots = records.iter().filter(|r| r.is_parked()).count();
        let revenue = records.iter().filter_map(ParkingRecord::total_cost).sum();

        Self {
            branch_id: branch.id.clone(),
            parking_lot_name: branch.display_name().to_string(),
            occupied_spots,
            max_capacity: branch.max_capacity,
            revenue,
        }
    }
}
