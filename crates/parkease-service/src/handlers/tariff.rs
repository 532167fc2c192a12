//! Branch tariff handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parkease_core::Tariff;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Tariff response.
#[derive(Debug, Serialize)]
pub struct TariffResponse {
    /// Tariff in force.
    pub tariff: Tariff,
    /// Whether the branch falls back to the configured default.
    pub is_default: bool,
}

/// Set tariff request.
#[derive(Debug, Deserialize)]
pub struct SetTariffRequest {
    /// Display name.
    pub name: String,
    /// Price per hour.
    pub price_per_hour: Decimal,
}

/// Get the caller's tariff.
pub async fn get_tariff(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<TariffResponse>, ApiError> {
    let (tariff, is_default) = state.tariff_for(&auth.branch_id)?;
    Ok(Json(TariffResponse { tariff, is_default }))
}

/// Set the caller's tariff.
pub async fn set_tariff(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SetTariffRequest>,
) -> Result<Json<TariffResponse>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Tariff name is required".into()));
    }

    let mut tariff = Tariff::new(name, body.price_per_hour)?;
    if let Some(existing) = state.store.get_tariff(&auth.branch_id)? {
        tariff.id = existing.id;
    }

    state.store.put_tariff(&auth.branch_id, &tariff)?;

    tracing::info!(
        branch_id = %auth.branch_id,
        price_per_hour = %tariff.price_per_hour,
        "Tariff updated"
    );

    Ok(Json(TariffResponse {
        tariff,
        is_default: false,
    }))
}
