//! Core types and billing for parkease.
//!
//! This crate provides the domain types shared by the parkease store,
//! service and client:
//!
//! - **Identifiers**: `BranchId`, `RecordId`, `TariffId`, `Plate`
//! - **Records**: `ParkingRecord`, `SessionState`, `Completion`
//! - **Pricing**: `Tariff`, `LoyaltyAccount`
//! - **Billing**: `BillingCalculator`, `BillingResult`
//! - **Branches**: `Branch`, `BranchSummary`, `OccupancyMetrics`
//!
//! # Billing
//!
//! A session is charged `hours parked * price per hour`, minus
//! `points redeemed * 0.01`, floored at zero. Money is `Decimal`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod billing;
pub mod branch;
pub mod error;
pub mod ids;
pub mod loyalty;
pub mod metrics;
pub mod record;
pub mod tariff;

pub use billing::{BillingCalculator, BillingResult, POINT_VALUE};
pub use branch::{Branch, BranchSummary};
pub use error::{BillingError, Result};
pub use ids::{BranchId, IdError, Plate, RecordId, TariffId};
pub use loyalty::LoyaltyAccount;
pub use metrics::OccupancyMetrics;
pub use record::{format_elapsed, Completion, ParkingRecord, RecordStatus, SessionState};
pub use tariff::{Tariff, MAX_RATE_PER_HOUR, STANDARD_RATE_PER_HOUR, STANDARD_TARIFF_NAME};
