//! Request and response types for the parkease client.
//!
//! Documents (records, tariffs, branches) are the core types themselves;
//! the structs here are the envelopes the service wraps them in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parkease_core::{
    BillingResult, Branch, BranchId, BranchSummary, OccupancyMetrics, ParkingRecord, Tariff,
};

/// Service health.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when serving.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Branch profile fields supplied at registration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BranchProfile {
    /// E-mail, used when the token carries none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Operator display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Name of the parking lot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_lot_name: Option<String>,
    /// Number of spots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
}

/// Admin request creating a branch for an existing identity.
#[derive(Debug, Clone, Serialize)]
pub struct CreateBranchRequest {
    /// Identity-provider subject of the operator account.
    pub branch_id: String,
    /// Operator e-mail.
    pub email: String,
    /// Operator display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Name of the parking lot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_lot_name: Option<String>,
    /// Number of spots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,
}

/// Occupancy dashboard of the caller's branch.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardResponse {
    /// The caller's branch.
    pub branch_id: BranchId,
    /// Live occupancy.
    pub metrics: OccupancyMetrics,
    /// Tariff in force.
    pub tariff: Tariff,
    /// When the metrics were computed.
    pub computed_at: DateTime<Utc>,
}

/// Tariff in force for a branch.
#[derive(Debug, Clone, Deserialize)]
pub struct TariffResponse {
    /// The tariff.
    pub tariff: Tariff,
    /// Whether the branch falls back to the service default.
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetTariffRequest<'a> {
    pub name: &'a str,
    pub price_per_hour: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct EntryRequest<'a> {
    pub plate: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentRequest {
    pub points_to_redeem: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetPointsRequest {
    pub points: u64,
}

/// A parked vehicle with its elapsed time.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveRecord {
    /// The record.
    pub record: ParkingRecord,
    /// Seconds parked so far.
    pub elapsed_seconds: i64,
    /// Elapsed time as `"{h}h {m}m {s}s"`.
    pub elapsed_display: String,
}

/// Vehicles currently parked, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveParkingResponse {
    /// Parked records.
    pub records: Vec<ActiveRecord>,
    /// Reference instant of the elapsed times.
    pub as_of: DateTime<Utc>,
}

/// One page of completed sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage {
    /// Records on this page, most recent exit first.
    pub records: Vec<ParkingRecord>,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Total pages (at least 1).
    pub total_pages: usize,
    /// Total completed records.
    pub total_records: usize,
}

/// Billing quote for an active session.
#[derive(Debug, Clone, Deserialize)]
pub struct BillResponse {
    /// The record being quoted.
    pub record: ParkingRecord,
    /// Tariff applied.
    pub tariff: Tariff,
    /// Calculation breakdown.
    pub billing: BillingResult,
    /// Final amount rounded to cents.
    pub amount_due: Decimal,
    /// Elapsed time as `"{h}h {m}m {s}s"`.
    pub elapsed_display: String,
    /// Reference instant of the quote.
    pub quoted_at: DateTime<Utc>,
}

/// Result of a confirmed payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    /// The completed record.
    pub record: ParkingRecord,
    /// Calculation breakdown at exit.
    pub billing: BillingResult,
    /// Amount charged, rounded to cents.
    pub amount_charged: Decimal,
}

/// A plate's loyalty balance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoyaltyBalance {
    /// Normalised plate.
    pub plate: String,
    /// Redeemable points.
    pub points: u64,
}

/// Inputs to the rate suggester.
#[derive(Debug, Clone, Serialize)]
pub struct RateSuggestionRequest {
    /// Entry time of the vehicle.
    pub entry_time: DateTime<Utc>,
    /// Parking duration in hours (at least 0.1).
    pub duration_hours: f64,
    /// Free-text historical data (at least 10 characters).
    pub historical_data: String,
}

/// Suggested hourly rate.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSuggestion {
    /// Rate rounded to cents.
    pub suggested_rate: Decimal,
    /// The model's reasoning.
    pub reasoning: String,
}

/// Summaries of every branch except the caller's.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchListResponse {
    /// Branch summaries.
    pub branches: Vec<BranchSummary>,
}

/// A branch's profile, aggregates and active records.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchDetailResponse {
    /// The profile.
    pub branch: Branch,
    /// Aggregates.
    pub summary: BranchSummary,
    /// Live occupancy.
    pub metrics: OccupancyMetrics,
    /// Vehicles currently parked.
    pub active_records: Vec<ParkingRecord>,
}

/// Confirmation of a deleted branch.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteBranchResponse {
    /// Always true.
    pub deleted: bool,
    /// The deleted branch.
    pub branch_id: BranchId,
}

/// API error response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
