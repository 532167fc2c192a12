//! Branch administration handlers (admin capability required).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use parkease_core::{Branch, BranchId, BranchSummary, OccupancyMetrics, ParkingRecord};

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Branch list response.
#[derive(Debug, Serialize)]
pub struct BranchListResponse {
    /// Summaries of every branch except the caller's.
    pub branches: Vec<BranchSummary>,
}

/// Create branch request.
#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    /// Identity-provider subject of the operator account.
    pub branch_id: String,
    /// Operator e-mail.
    pub email: String,
    /// Operator display name.
    #[serde(default)]
    pub username: Option<String>,
    /// Name of the parking lot.
    #[serde(default)]
    pub parking_lot_name: Option<String>,
    /// Number of spots.
    #[serde(default)]
    pub max_capacity: Option<u32>,
}

/// Branch detail response.
#[derive(Debug, Serialize)]
pub struct BranchDetailResponse {
    /// The profile.
    pub branch: Branch,
    /// Aggregates.
    pub summary: BranchSummary,
    /// Live occupancy.
    pub metrics: OccupancyMetrics,
    /// Vehicles currently parked, newest first.
    pub active_records: Vec<ParkingRecord>,
}

/// Delete branch response.
#[derive(Debug, Serialize)]
pub struct DeleteBranchResponse {
    /// Always true.
    pub deleted: bool,
    /// The deleted branch.
    pub branch_id: BranchId,
}

/// List every other branch with its occupancy and revenue.
pub async fn list_branches(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<BranchListResponse>, ApiError> {
    let mut branches = Vec::new();
    for branch in state.store.list_branches()? {
        if branch.id == admin.branch_id {
            continue;
        }
        let records = state.store.list_records(&branch.id, None)?;
        branches.push(BranchSummary::from_records(&branch, &records));
    }

    Ok(Json(BranchListResponse { branches }))
}

/// Create a branch profile for an existing identity.
pub async fn create_branch(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(body): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<Branch>), ApiError> {
    let branch_id: BranchId = body.branch_id.parse()?;

    if body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("An e-mail address is required".into()));
    }
    if state.store.get_branch(&branch_id)?.is_some() {
        return Err(ApiError::Conflict(format!("Branch already exists: {branch_id}")));
    }

    let mut branch = Branch::new(branch_id, body.email.trim());
    branch.username = body.username;
    branch.parking_lot_name = body.parking_lot_name;
    branch.max_capacity = body.max_capacity.unwrap_or(0);

    state.store.put_branch(&branch)?;

    tracing::info!(admin = %admin.branch_id, branch_id = %branch.id, "Branch created");

    Ok((StatusCode::CREATED, Json(branch)))
}

/// A branch's profile, aggregates and active records.
pub async fn get_branch(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(branch_id): Path<String>,
) -> Result<Json<BranchDetailResponse>, ApiError> {
    let branch_id: BranchId = branch_id.parse()?;
    let branch = state
        .store
        .get_branch(&branch_id)?
        .ok_or_else(|| ApiError::NotFound(format!("Branch not found: {branch_id}")))?;

    let records = state.store.list_records(&branch_id, None)?;
    let summary = BranchSummary::from_records(&branch, &records);
    let metrics = OccupancyMetrics::compute(&records, state.clock.now());
    let active_records = records.into_iter().filter(ParkingRecord::is_parked).collect();

    Ok(Json(BranchDetailResponse {
        branch,
        summary,
        metrics,
        active_records,
    }))
}

/// Delete a branch profile and its parking records.
pub async fn delete_branch(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(branch_id): Path<String>,
) -> Result<Json<DeleteBranchResponse>, ApiError> {
    let branch_id: BranchId = branch_id.parse()?;

    if branch_id == admin.branch_id {
        return Err(ApiError::BadRequest("Cannot delete your own branch".into()));
    }

    state.store.delete_branch(&branch_id)?;

    tracing::info!(admin = %admin.branch_id, branch_id = %branch_id, "Branch deleted");

    Ok(Json(DeleteBranchResponse {
        deleted: true,
        branch_id,
    }))
}
