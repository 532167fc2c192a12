//! ParkEase HTTP client implementation.

use reqwest::{Client, Method, RequestBuilder, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;

use parkease_core::{Branch, ParkingRecord, RecordId};

use crate::error::{ClientError, Result};
use crate::types::{
    ActiveParkingResponse, ApiErrorResponse, BillResponse, BranchDetailResponse,
    BranchListResponse, BranchProfile, CreateBranchRequest, DashboardResponse,
    DeleteBranchResponse, EntryRequest, HealthResponse, HistoryPage, LoyaltyBalance,
    PaymentRequest, PaymentResponse, RateSuggestion, RateSuggestionRequest, SetPointsRequest,
    SetTariffRequest, TariffResponse,
};

/// ParkEase API client.
///
/// Every request is sent with the operator's identity token.
#[derive(Debug, Clone)]
pub struct ParkEaseClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl ParkEaseClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://parkease:8080"`)
    /// * `token` - Identity token of the signed-in operator
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Configuration` if the URL does not parse or the
    /// HTTP client cannot be built.
    pub fn with_options(
        base_url: impl AsRef<str>,
        token: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref().trim_end_matches('/'))
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "invalid base URL: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Replace the identity token, e.g. after a refresh.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(self.url(&["health"]))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // ------------------------------------------------------------------
    // Branch profile
    // ------------------------------------------------------------------

    /// Register the caller's branch profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn register_branch(&self, profile: &BranchProfile) -> Result<Branch> {
        Self::send(self.request(Method::POST, &["v1", "branches"]).json(profile))
            .await
    }

    /// The caller's branch profile.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the branch was never registered.
    pub async fn get_branch(&self) -> Result<Branch> {
        Self::send(self.request(Method::GET, &["v1", "branches", "me"]))
            .await
    }

    /// Occupancy metrics of the caller's branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn dashboard(&self) -> Result<DashboardResponse> {
        Self::send(self.request(Method::GET, &["v1", "dashboard"]))
            .await
    }

    /// The caller's tariff.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_tariff(&self) -> Result<TariffResponse> {
        Self::send(self.request(Method::GET, &["v1", "tariff"])).await
    }

    /// Set the caller's tariff.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is negative or the request fails.
    pub async fn set_tariff(&self, name: &str, price_per_hour: Decimal) -> Result<TariffResponse> {
        let body = SetTariffRequest {
            name,
            price_per_hour,
        };
        Self::send(self.request(Method::PUT, &["v1", "tariff"]).json(&body))
            .await
    }

    // ------------------------------------------------------------------
    // Parking sessions
    // ------------------------------------------------------------------

    /// Record a vehicle entering the caller's lot.
    ///
    /// # Errors
    ///
    /// Returns an error if the plate is invalid, already parked, or the
    /// request fails.
    pub async fn record_entry(&self, plate: &str) -> Result<ParkingRecord> {
        let body = EntryRequest { plate };
        Self::send(
            self.request(Method::POST, &["v1", "parking", "entries"])
                .json(&body),
        )
        .await
    }

    /// Vehicles currently parked at the caller's lot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_active(&self) -> Result<ActiveParkingResponse> {
        Self::send(self.request(Method::GET, &["v1", "parking", "active"]))
            .await
    }

    /// One page of completed sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_history(&self, page: usize, per_page: usize) -> Result<HistoryPage> {
        Self::send(
            self.request(Method::GET, &["v1", "parking", "history"])
                .query(&[("page", page), ("per_page", per_page)]),
        )
        .await
    }

    /// Quote the bill of an active session without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AlreadyCompleted` for a paid session, or an
    /// error if the request fails.
    pub async fn get_bill(&self, record_id: &RecordId, points_to_redeem: i64) -> Result<BillResponse> {
        let id = record_id.to_string();
        Self::send(
            self.request(Method::GET, &["v1", "parking", id.as_str(), "bill"])
                .query(&[("points_to_redeem", points_to_redeem)]),
        )
        .await
    }

    /// Confirm payment and complete the session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AlreadyCompleted` if the session was paid
    /// already, `ClientError::InsufficientPoints` if the balance changed
    /// underneath the payment, or an error if the request fails.
    pub async fn confirm_payment(
        &self,
        record_id: &RecordId,
        points_to_redeem: i64,
    ) -> Result<PaymentResponse> {
        let id = record_id.to_string();
        let body = PaymentRequest { points_to_redeem };

        let result = Self::send(
            self.request(Method::POST, &["v1", "parking", id.as_str(), "pay"])
                .json(&body),
        )
        .await;

        if let Err(e) = &result {
            tracing::warn!(record_id = %id, error = %e, "Payment confirmation failed");
        }
        result
    }

    // ------------------------------------------------------------------
    // Loyalty
    // ------------------------------------------------------------------

    /// A plate's loyalty balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the plate is invalid or the request fails.
    pub async fn get_loyalty(&self, plate: &str) -> Result<LoyaltyBalance> {
        Self::send(self.request(Method::GET, &["v1", "loyalty", plate]))
            .await
    }

    /// Set a plate's loyalty balance (admin capability required).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Forbidden` without the admin capability, or an
    /// error if the request fails.
    pub async fn set_loyalty(&self, plate: &str, points: u64) -> Result<LoyaltyBalance> {
        let body = SetPointsRequest { points };
        Self::send(
            self.request(Method::PUT, &["v1", "loyalty", plate])
                .json(&body),
        )
        .await
    }

    /// Ask the service for an hourly rate suggestion.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are rejected, the suggester is not
    /// configured, or the request fails.
    pub async fn suggest_rate(&self, request: &RateSuggestionRequest) -> Result<RateSuggestion> {
        Self::send(
            self.request(Method::POST, &["v1", "rates", "suggest"])
                .json(request),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Summaries of every other branch.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Forbidden` without the admin capability, or an
    /// error if the request fails.
    pub async fn list_branches(&self) -> Result<BranchListResponse> {
        Self::send(self.request(Method::GET, &["v1", "admin", "branches"]))
            .await
    }

    /// Create a branch profile for an existing identity.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Forbidden` without the admin capability, or an
    /// error if the branch exists or the request fails.
    pub async fn create_branch(&self, request: &CreateBranchRequest) -> Result<Branch> {
        Self::send(
            self.request(Method::POST, &["v1", "admin", "branches"])
                .json(request),
        )
        .await
    }

    /// A branch's profile, aggregates and active records.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown branch, or an error if
    /// the request fails.
    pub async fn branch_detail(&self, branch_id: &str) -> Result<BranchDetailResponse> {
        Self::send(self.request(Method::GET, &["v1", "admin", "branches", branch_id]))
            .await
    }

    /// Delete a branch and its parking records.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for an unknown branch, or an error if
    /// the request fails.
    pub async fn delete_branch(&self, branch_id: &str) -> Result<DeleteBranchResponse> {
        Self::send(self.request(Method::DELETE, &["v1", "admin", "branches", branch_id]))
            .await
    }

    /// Build a URL from percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.url(segments))
            .bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: std::result::Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let message = api_error.error.message;

                // Map specific error codes to typed errors
                match api_error.error.code.as_str() {
                    "unauthorized" => Err(ClientError::Unauthorized),
                    "forbidden" => Err(ClientError::Forbidden),
                    "not_found" => Err(ClientError::NotFound(message)),
                    "already_completed" => Err(ClientError::AlreadyCompleted(message)),
                    "insufficient_points" => {
                        let detail = |key: &str| {
                            api_error
                                .error
                                .details
                                .as_ref()
                                .and_then(|d| d.get(key))
                                .and_then(serde_json::Value::as_u64)
                                .unwrap_or(0)
                        };
                        Err(ClientError::InsufficientPoints {
                            available: detail("available"),
                            requested: detail("requested"),
                        })
                    }
                    code => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("parkease-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = ParkEaseClient::new("http://localhost:8080", "token").unwrap();
        assert_eq!(
            client.url(&["health"]).as_str(),
            "http://localhost:8080/health"
        );
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = ParkEaseClient::new("http://localhost:8080/", "token").unwrap();
        assert_eq!(
            client.url(&["v1", "tariff"]).as_str(),
            "http://localhost:8080/v1/tariff"
        );
    }

    #[test]
    fn client_keeps_base_path() {
        let client = ParkEaseClient::new("http://gateway/parkease", "token").unwrap();
        assert_eq!(
            client.url(&["v1", "dashboard"]).as_str(),
            "http://gateway/parkease/v1/dashboard"
        );
    }

    #[test]
    fn path_segments_are_encoded() {
        let client = ParkEaseClient::new("http://localhost:8080", "token").unwrap();
        assert_eq!(
            client.url(&["v1", "loyalty", "AB 123"]).as_str(),
            "http://localhost:8080/v1/loyalty/AB%20123"
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = ParkEaseClient::new("not a url", "token").unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
