//! Dashboard handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use parkease_core::{BranchId, OccupancyMetrics, RecordStatus, Tariff};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Dashboard response.
#[derive(Debug, Serialize)]
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

/// Occupancy metrics of the caller's branch.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let now = state.clock.now();
    let parked = state
        .store
        .list_records(&auth.branch_id, Some(RecordStatus::Parked))?;
    let (tariff, _) = state.tariff_for(&auth.branch_id)?;

    Ok(Json(DashboardResponse {
        metrics: OccupancyMetrics::compute(&parked, now),
        branch_id: auth.branch_id,
        tariff,
        computed_at: now,
    }))
}
