//! AI rate suggestion handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::llm::RateSuggestionInput;
use crate::state::AppState;

/// Shortest duration accepted, in hours.
pub const MIN_DURATION_HOURS: f64 = 0.1;

/// Shortest historical data accepted, in characters.
pub const MIN_HISTORICAL_DATA_CHARS: usize = 10;

/// Rate suggestion request.
#[derive(Debug, Deserialize)]
pub struct SuggestRateRequest {
    /// Entry time of the vehicle (RFC 3339).
    pub entry_time: DateTime<Utc>,
    /// Parking duration in hours.
    pub duration_hours: f64,
    /// Historical parking data.
    pub historical_data: String,
}

/// Rate suggestion response.
#[derive(Debug, Serialize)]
pub struct SuggestRateResponse {
    /// Suggested hourly rate, rounded to cents.
    pub suggested_rate: Decimal,
    /// The model's reasoning.
    pub reasoning: String,
}

impl SuggestRateRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !self.duration_hours.is_finite() || self.duration_hours < MIN_DURATION_HOURS {
            return Err(ApiError::BadRequest(format!(
                "duration_hours must be at least {MIN_DURATION_HOURS}"
            )));
        }
        if self.historical_data.trim().chars().count() < MIN_HISTORICAL_DATA_CHARS {
            return Err(ApiError::BadRequest(format!(
                "historical_data must be at least {MIN_HISTORICAL_DATA_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// Ask the text-generation model for an hourly rate.
pub async fn suggest_rate(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SuggestRateRequest>,
) -> Result<Json<SuggestRateResponse>, ApiError> {
    body.validate()?;

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Rate suggestion is not configured".into()))?;

    let input = RateSuggestionInput {
        entry_time: body.entry_time,
        duration_hours: body.duration_hours,
        historical_data: body.historical_data,
    };

    let output = llm.suggest_rate(&input).await.map_err(|e| {
        tracing::warn!(branch_id = %auth.branch_id, error = %e, "Rate suggestion failed");
        ApiError::ExternalService("Rate suggestion failed".into())
    })?;

    let suggested_rate = Decimal::try_from(output.suggested_rate)
        .map_err(|_| ApiError::ExternalService("Model returned an unusable rate".into()))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    tracing::info!(
        branch_id = %auth.branch_id,
        suggested_rate = %suggested_rate,
        "Rate suggested"
    );

    Ok(Json(SuggestRateResponse {
        suggested_rate,
        reasoning: output.reasoning,
    }))
}
