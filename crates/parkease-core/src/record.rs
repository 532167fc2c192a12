//! Parking record types for parkease.
//!
//! A record is created when a vehicle enters and mutated exactly once, at
//! payment, from `parked` to `completed`. Completion data (exit time, total
//! cost) exists only inside [`SessionState::Completed`], so a parked record
//! cannot carry a cost and a completed one cannot lack it.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};
use crate::{BranchId, Plate, RecordId};

/// One vehicle's parking session, active or completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordDocument", into = "RecordDocument")]
pub struct ParkingRecord {
    /// Record identifier (ULID, time-ordered).
    pub id: RecordId,

    /// The branch that owns the record.
    pub branch_id: BranchId,

    /// The vehicle plate.
    pub plate: Plate,

    /// When the vehicle entered.
    pub entry_time: DateTime<Utc>,

    /// Session state.
    pub state: SessionState,
}

/// State of a parking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The vehicle is still on the lot.
    Parked,

    /// The session was paid.
    Completed(Completion),
}

/// Data written when a session is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// When the vehicle left (payment time).
    pub exit_time: DateTime<Utc>,

    /// Amount charged, rounded to cents.
    pub total_cost: Decimal,

    /// Loyalty points redeemed against the charge.
    pub points_redeemed: u64,
}

/// Status discriminant of a record, as stored and queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Vehicle is parked.
    Parked,
    /// Session is paid.
    Completed,
}

impl ParkingRecord {
    /// Create a parked record for a vehicle entering now.
    #[must_use]
    pub fn enter(branch_id: BranchId, plate: Plate, entry_time: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::generate(),
            branch_id,
            plate,
            entry_time,
            state: SessionState::Parked,
        }
    }

    /// Status discriminant.
    #[must_use]
    pub const fn status(&self) -> RecordStatus {
        match self.state {
            SessionState::Parked => RecordStatus::Parked,
            SessionState::Completed(_) => RecordStatus::Completed,
        }
    }

    /// Whether the vehicle is still parked.
    #[must_use]
    pub const fn is_parked(&self) -> bool {
        matches!(self.state, SessionState::Parked)
    }

    /// Completion data, if the session was paid.
    #[must_use]
    pub const fn completion(&self) -> Option<&Completion> {
        match &self.state {
            SessionState::Parked => None,
            SessionState::Completed(c) => Some(c),
        }
    }

    /// Exit time, present only for completed records.
    #[must_use]
    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.completion().map(|c| c.exit_time)
    }

    /// Total cost, present only for completed records.
    #[must_use]
    pub fn total_cost(&self) -> Option<Decimal> {
        self.completion().map(|c| c.total_cost)
    }

    /// Transition `parked -> completed`.
    ///
    /// # Errors
    ///
    /// - `BillingError::AlreadyCompleted` if the record was already paid.
    /// - `BillingError::ExitBeforeEntry` if `exit_time` precedes the entry.
    pub fn complete(&mut self, completion: Completion) -> Result<()> {
        if !self.is_parked() {
            return Err(BillingError::AlreadyCompleted {
                record_id: self.id.to_string(),
            });
        }
        if completion.exit_time < self.entry_time {
            return Err(BillingError::ExitBeforeEntry {
                record_id: self.id.to_string(),
            });
        }
        self.state = SessionState::Completed(completion);
        Ok(())
    }

    /// Time spent on the lot so far (or in total, once completed).
    ///
    /// Clamped at zero when `now` precedes the entry.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let end = self.exit_time().unwrap_or(now);
        (end - self.entry_time).max(Duration::zero())
    }
}

/// Render a duration as `"{h}h {m}m {s}s"`, the active-parking table format.
#[must_use]
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

/// Flat document shape shared by JSON responses and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordDocument {
    id: RecordId,
    branch_id: BranchId,
    plate: Plate,
    entry_time: DateTime<Utc>,
    status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    points_redeemed: Option<u64>,
}

impl TryFrom<RecordDocument> for ParkingRecord {
    type Error = String;

    fn try_from(doc: RecordDocument) -> std::result::Result<Self, Self::Error> {
        let state = match (doc.status, doc.exit_time, doc.total_cost) {
            (RecordStatus::Parked, None, None) if doc.points_redeemed.is_none() => {
                SessionState::Parked
            }
            (RecordStatus::Parked, ..) => {
                return Err(format!(
                    "record {}: parked records carry no exit data",
                    doc.id
                ))
            }
            (RecordStatus::Completed, Some(exit_time), Some(total_cost)) => {
                if total_cost < Decimal::ZERO {
                    return Err(format!("record {}: negative total cost", doc.id));
                }
                if exit_time < doc.entry_time {
                    return Err(format!("record {}: exit precedes entry", doc.id));
                }
                SessionState::Completed(Completion {
                    exit_time,
                    total_cost,
                    points_redeemed: doc.points_redeemed.unwrap_or(0),
                })
            }
            (RecordStatus::Completed, ..) => {
                return Err(format!(
                    "record {}: completed records need exit time and total cost",
                    doc.id
                ))
            }
        };

        Ok(Self {
            id: doc.id,
            branch_id: doc.branch_id,
            plate: doc.plate,
            entry_time: doc.entry_time,
            state,
        })
    }
}

impl From<ParkingRecord> for RecordDocument {
    fn from(record: ParkingRecord) -> Self {
        let status = record.status();
        let (exit_time, total_cost, points_redeemed) = match record.state {
            SessionState::Parked => (None, None, None),
            SessionState::Completed(c) => {
                (Some(c.exit_time), Some(c.total_cost), Some(c.points_redeemed))
            }
        };
        Self {
            id: record.id,
            branch_id: record.branch_id,
            plate: record.plate,
            entry_time: record.entry_time,
            status,
            exit_time,
            total_cost,
            points_redeemed,
        }
    }
}
