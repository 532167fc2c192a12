//! Parking session handlers: entry, active list, history, billing, payment.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parkease_core::{
    format_elapsed, BillingResult, BranchId, Completion, ParkingRecord, Plate, RecordId,
    RecordStatus, Tariff,
};
use parkease_store::Settlement;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::events::{RecordEvent, RecordEventKind};
use crate::state::AppState;

/// Default history page size.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Largest history page size.
pub const MAX_PER_PAGE: usize = 100;

// ============================================================================
// Entry
// ============================================================================

/// Record entry request.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    /// Vehicle plate.
    pub plate: String,
}

/// Record a vehicle entering the caller's lot.
pub async fn record_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<EntryRequest>,
) -> Result<(StatusCode, Json<ParkingRecord>), ApiError> {
    let plate: Plate = body.plate.parse()?;
    let record = ParkingRecord::enter(auth.branch_id.clone(), plate, state.clock.now());

    state.store.record_entry(&record)?;

    tracing::info!(
        branch_id = %auth.branch_id,
        record_id = %record.id,
        plate = %record.plate,
        "Vehicle entered"
    );

    state.events.publish(RecordEvent {
        kind: RecordEventKind::Entered,
        record: record.clone(),
    });

    Ok((StatusCode::CREATED, Json(record)))
}

// ============================================================================
// Active Parking
// ============================================================================

/// A parked record with its running time.
#[derive(Debug, Serialize)]
pub struct ActiveRecord {
    /// The record.
    pub record: ParkingRecord,
    /// Whole seconds parked so far.
    pub elapsed_seconds: i64,
    /// Elapsed time as `"{h}h {m}m {s}s"`.
    pub elapsed_display: String,
}

/// Active parking response.
#[derive(Debug, Serialize)]
pub struct ActiveParkingResponse {
    /// Parked records, newest first.
    pub records: Vec<ActiveRecord>,
    /// Instant the elapsed times refer to.
    pub as_of: DateTime<Utc>,
}

/// List vehicles currently parked at the caller's lot.
pub async fn list_active(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ActiveParkingResponse>, ApiError> {
    let now = state.clock.now();
    let records = state
        .store
        .list_records(&auth.branch_id, Some(RecordStatus::Parked))?
        .into_iter()
        .map(|record| {
            let elapsed = record.elapsed(now);
            ActiveRecord {
                elapsed_seconds: elapsed.num_seconds(),
                elapsed_display: format_elapsed(elapsed),
                record,
            }
        })
        .collect();

    Ok(Json(ActiveParkingResponse {
        records,
        as_of: now,
    }))
}

// ============================================================================
// History
// ============================================================================

/// History query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// 1-based page number.
    #[serde(default)]
    pub page: Option<usize>,
    /// Records per page.
    #[serde(default)]
    pub per_page: Option<usize>,
}

/// One page of records.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Records on this page.
    pub records: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
    /// Number of records across all pages.
    pub total_records: usize,
}

/// Slice `items` into the requested page.
///
/// `page` below 1 is treated as 1; `per_page` is clamped to
/// `1..=MAX_PER_PAGE`. A page past the end is empty.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_records = items.len();
    let total_pages = total_records.div_ceil(per_page).max(1);

    let records = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Page {
        records,
        page,
        per_page,
        total_pages,
        total_records,
    }
}

/// Completed sessions of the caller's lot, most recent exit first.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Page<ParkingRecord>>, ApiError> {
    let mut records = state
        .store
        .list_records(&auth.branch_id, Some(RecordStatus::Completed))?;
    records.sort_by(|a, b| b.exit_time().cmp(&a.exit_time()));

    Ok(Json(paginate(
        records,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    )))
}

// ============================================================================
// Billing & Payment
// ============================================================================

/// Bill query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BillQuery {
    /// Points the driver wants to redeem.
    #[serde(default)]
    pub points_to_redeem: i64,
}

/// Billing quote response.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    /// The parked record.
    pub record: ParkingRecord,
    /// Tariff applied.
    pub tariff: Tariff,
    /// Calculator output.
    pub billing: BillingResult,
    /// Final amount rounded to cents.
    pub amount_due: Decimal,
    /// Elapsed time as `"{h}h {m}m {s}s"`.
    pub elapsed_display: String,
    /// Instant the quote refers to.
    pub quoted_at: DateTime<Utc>,
}

/// Quote the bill of a parked vehicle without side effects.
pub async fn get_bill(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(record_id): Path<String>,
    Query(query): Query<BillQuery>,
) -> Result<Json<BillResponse>, ApiError> {
    let now = state.clock.now();
    let record = load_record(&state, &auth.branch_id, &record_id)?;
    let (tariff, billing) = quote(&state, &record, query.points_to_redeem, now)?;

    Ok(Json(BillResponse {
        amount_due: billing.amount_due(),
        elapsed_display: format_elapsed(record.elapsed(now)),
        record,
        tariff,
        billing,
        quoted_at: now,
    }))
}

/// Payment request.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentRequest {
    /// Points the driver wants to redeem.
    #[serde(default)]
    pub points_to_redeem: i64,
}

/// Payment response.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// The completed record.
    pub record: ParkingRecord,
    /// Calculator output at payment time.
    pub billing: BillingResult,
    /// Amount charged, rounded to cents.
    pub amount_charged: Decimal,
}

/// Confirm payment: complete the session and debit redeemed points.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(record_id): Path<String>,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let now = state.clock.now();
    let record = load_record(&state, &auth.branch_id, &record_id)?;
    let (_, billing) = quote(&state, &record, body.points_to_redeem, now)?;
    let amount_charged = billing.amount_due();

    let completed = state.store.complete_parking(&Settlement {
        branch_id: auth.branch_id.clone(),
        record_id: record.id,
        completion: Completion {
            exit_time: now,
            total_cost: amount_charged,
            points_redeemed: billing.points_redeemed,
        },
    })?;

    tracing::info!(
        branch_id = %auth.branch_id,
        record_id = %completed.id,
        plate = %completed.plate,
        amount = %amount_charged,
        points_redeemed = billing.points_redeemed,
        "Payment confirmed"
    );

    state.events.publish(RecordEvent {
        kind: RecordEventKind::Completed,
        record: completed.clone(),
    });

    Ok(Json(PaymentResponse {
        record: completed,
        billing,
        amount_charged,
    }))
}

fn load_record(
    state: &AppState,
    branch_id: &BranchId,
    record_id: &str,
) -> Result<ParkingRecord, ApiError> {
    let record_id: RecordId = record_id.parse()?;
    state
        .store
        .get_record(branch_id, &record_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Parking record not found: {record_id}")))
}

fn quote(
    state: &AppState,
    record: &ParkingRecord,
    points_requested: i64,
    now: DateTime<Utc>,
) -> Result<(Tariff, BillingResult), ApiError> {
    if !record.is_parked() {
        return Err(ApiError::AlreadyCompleted(record.id.to_string()));
    }

    let (tariff, _) = state.tariff_for(&record.branch_id)?;
    let points_available = state.points_for(&record.plate)?;
    let billing = state.calculator.calculate(
        record.entry_time,
        now,
        tariff.price_per_hour,
        points_available,
        points_requested,
    )?;

    Ok((tariff, billing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_first_page() {
        let page = paginate((1..=25).collect(), 1, 10);
        assert_eq!(page.records, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_records, 25);
    }

    #[test]
    fn paginate_last_partial_page() {
        let page = paginate((1..=25).collect(), 3, 10);
        assert_eq!(page.records, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn paginate_past_end_is_empty() {
        let page = paginate((1..=5).collect::<Vec<i32>>(), 4, 10);
        assert!(page.records.is_empty());
        assert_eq!(page.page, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn paginate_empty_has_one_page() {
        let page = paginate(Vec::<i32>::new(), 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_records, 0);
    }

    #[test]
    fn paginate_clamps_inputs() {
        let page = paginate((1..=300).collect::<Vec<i32>>(), 0, 1_000);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.records.len(), MAX_PER_PAGE);

        let page = paginate((1..=3).collect::<Vec<i32>>(), 1, 0);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total_pages, 3);
    }
}
