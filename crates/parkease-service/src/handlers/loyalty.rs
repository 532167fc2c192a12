//! Loyalty balance handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use parkease_core::{LoyaltyAccount, Plate};

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Set balance request.
#[derive(Debug, Deserialize)]
pub struct SetPointsRequest {
    /// New balance.
    pub points: u64,
}

/// Get a plate's loyalty balance. Plates without an account have 0 points.
pub async fn get_loyalty(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(plate): Path<String>,
) -> Result<Json<LoyaltyAccount>, ApiError> {
    let plate: Plate = plate.parse()?;
    let points = state.points_for(&plate)?;
    Ok(Json(LoyaltyAccount::new(plate, points)))
}

/// Set a plate's loyalty balance.
pub async fn set_loyalty(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(plate): Path<String>,
    Json(body): Json<SetPointsRequest>,
) -> Result<Json<LoyaltyAccount>, ApiError> {
    let plate: Plate = plate.parse()?;
    let account = LoyaltyAccount::new(plate, body.points);
    state.store.put_loyalty(&account)?;

    tracing::info!(
        admin = %admin.branch_id,
        plate = %account.plate,
        points = account.points,
        "Loyalty balance set"
    );

    Ok(Json(account))
}
