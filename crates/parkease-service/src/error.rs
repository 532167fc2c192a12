//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use parkease_core::{BillingError, IdError};
use parkease_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient permissions.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Well-formed input rejected by a domain rule.
    #[error("{message}")]
    Validation {
        /// Machine-readable error code.
        code: &'static str,
        /// Error message.
        message: String,
    },

    /// Conflict - resource already exists or invalid state transition.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The parking session was already paid.
    #[error("parking record already completed: {0}")]
    AlreadyCompleted(String),

    /// The loyalty balance does not cover the redemption.
    #[error("insufficient loyalty points: available={available}, requested={requested}")]
    InsufficientPoints {
        /// Points on the account.
        available: u64,
        /// Points requested.
        requested: u64,
    },

    /// The document store rejected or failed the write.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Validation { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, *code, message.clone(), None)
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::AlreadyCompleted(record_id) => (
                StatusCode::CONFLICT,
                "already_completed",
                format!("Parking record {record_id} is already completed"),
                None,
            ),
            Self::InsufficientPoints {
                available,
                requested,
            } => (
                StatusCode::CONFLICT,
                "insufficient_points",
                self.to_string(),
                Some(serde_json::json!({
                    "available": available,
                    "requested": requested
                })),
            ),
            Self::PersistenceFailure(msg) => {
                tracing::error!(error = %msg, "Store operation failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "persistence_failure",
                    "The record store is unavailable".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                "external_service_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::AlreadyExists { entity, id } => {
                Self::Conflict(format!("{entity} already exists: {id}"))
            }
            StoreError::VehicleAlreadyParked { plate } => {
                Self::Conflict(format!("Vehicle {plate} is already parked"))
            }
            StoreError::AlreadyCompleted { record_id } => Self::AlreadyCompleted(record_id),
            StoreError::InsufficientPoints {
                available,
                requested,
            } => Self::InsufficientPoints {
                available,
                requested,
            },
            StoreError::InvalidTransition(message) => Self::Validation {
                code: "invalid_transition",
                message,
            },
            StoreError::Database(msg) | StoreError::Serialization(msg) => {
                Self::PersistenceFailure(msg)
            }
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidInterval { .. } | BillingError::ExitBeforeEntry { .. } => {
                Self::Validation {
                    code: "invalid_interval",
                    message: err.to_string(),
                }
            }
            BillingError::InvalidTariff { .. } => Self::Validation {
                code: "invalid_tariff",
                message: err.to_string(),
            },
            BillingError::AmountOverflow => Self::Validation {
                code: "amount_overflow",
                message: err.to_string(),
            },
            BillingError::AlreadyCompleted { record_id } => Self::AlreadyCompleted(record_id),
            BillingError::InvalidId(id_err) => id_err.into(),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::InvalidPlate => Self::Validation {
                code: "invalid_plate",
                message: err.to_string(),
            },
            IdError::InvalidUuid | IdError::InvalidUlid | IdError::InvalidBranchId => {
                Self::BadRequest(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_unavailable() {
        let response = ApiError::from(StoreError::Database("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn lost_completion_race_is_conflict() {
        let err = ApiError::from(StoreError::AlreadyCompleted {
            record_id: "01H".into(),
        });
        assert!(matches!(err, ApiError::AlreadyCompleted(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn billing_errors_are_unprocessable() {
        let err = ApiError::from(BillingError::InvalidTariff {
            price_per_hour: rust_decimal::Decimal::NEGATIVE_ONE,
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn amount_overflow_is_unprocessable() {
        let err = ApiError::from(BillingError::AmountOverflow);
        assert!(matches!(
            err,
            ApiError::Validation {
                code: "amount_overflow",
                ..
            }
        ));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_plate_has_its_own_code() {
        let err = ApiError::from(IdError::InvalidPlate);
        assert!(matches!(
            err,
            ApiError::Validation {
                code: "invalid_plate",
                ..
            }
        ));
    }
}
