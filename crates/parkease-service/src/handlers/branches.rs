//! Branch profile handlers for the signed-in operator.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use parkease_core::Branch;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Register branch request.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterBranchRequest {
    /// E-mail, when the token carries none.
    #[serde(default)]
    pub email: Option<String>,
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

/// Register the caller's branch profile.
pub async fn register_branch(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RegisterBranchRequest>,
) -> Result<(StatusCode, Json<Branch>), ApiError> {
    if state.store.get_branch(&auth.branch_id)?.is_some() {
        return Err(ApiError::Conflict("Branch already registered".into()));
    }

    let email = auth
        .email
        .clone()
        .or(body.email)
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("An e-mail address is required".into()))?;

    let mut branch = Branch::new(auth.branch_id.clone(), email);
    branch.username = body.username;
    branch.parking_lot_name = body.parking_lot_name;
    branch.max_capacity = body.max_capacity.unwrap_or(0);

    state.store.put_branch(&branch)?;

    tracing::info!(branch_id = %auth.branch_id, "Branch registered");

    Ok((StatusCode::CREATED, Json(branch)))
}

/// Get the caller's branch profile.
pub async fn get_branch(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Branch>, ApiError> {
    let branch = state
        .store
        .get_branch(&auth.branch_id)?
        .ok_or_else(|| ApiError::NotFound("Branch not found".into()))?;

    Ok(Json(branch))
}
