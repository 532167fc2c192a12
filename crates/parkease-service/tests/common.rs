//! Common test utilities for parkease integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use parkease_core::{BranchId, ParkingRecord};
use parkease_service::auth::JwtClaims;
use parkease_service::{create_router, AppState, Clock, ServiceConfig};
use parkease_store::{MemoryStore, Store};

pub const SHARED_SECRET: &str = "test-shared-secret";
pub const ISSUER: &str = "https://auth.parkease.test";
pub const AUDIENCE: &str = "parkease";

/// Fixed "now" of every harness.
pub fn now() -> DateTime<Utc> {
    "2024-03-01T12:00:00Z".parse().unwrap()
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct access to the store behind the server.
    pub store: Arc<MemoryStore>,
    /// The branch of the default operator.
    pub branch_id: BranchId,
}

impl TestHarness {
    /// Create a new test harness with a fresh store.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness after adjusting the default test configuration.
    pub fn with_config(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        Self::build(adjust, false)
    }

    /// Create a harness served over a real socket, needed for WebSocket routes.
    pub fn with_http_transport() -> Self {
        Self::build(|_| {}, true)
    }

    fn build(adjust: impl FnOnce(&mut ServiceConfig), http_transport: bool) -> Self {
        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            auth_issuer: ISSUER.into(),
            auth_audience: AUDIENCE.into(),
            auth_shared_secret: Some(SHARED_SECRET.into()),
            ..ServiceConfig::default()
        };
        adjust(&mut config);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config).with_clock(Clock::Fixed(now()));
        let router: Router = create_router(state);

        let server = if http_transport {
            TestServer::builder().http_transport().build(router)
        } else {
            TestServer::new(router)
        }
        .expect("Failed to create test server");

        Self {
            server,
            store,
            branch_id: "branch-north".parse().unwrap(),
        }
    }

    /// Authorization header name.
    pub fn auth_name() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    /// Bearer header for the default operator.
    pub fn user_auth(&self) -> HeaderValue {
        bearer(&mint_token(self.branch_id.as_str(), None, None))
    }

    /// Bearer header for another, unrelated operator.
    pub fn other_user_auth() -> HeaderValue {
        bearer(&mint_token("branch-south", None, None))
    }

    /// Bearer header for an administrator with the given subject.
    pub fn admin_auth(subject: &str) -> HeaderValue {
        bearer(&mint_token(subject, Some("admin"), None))
    }

    /// Park a vehicle at the default branch, `minutes` before the harness clock.
    pub fn park(&self, plate: &str, minutes: i64) -> ParkingRecord {
        let record = ParkingRecord::enter(
            self.branch_id.clone(),
            plate.parse().unwrap(),
            now() - Duration::minutes(minutes),
        );
        self.store.record_entry(&record).unwrap();
        record
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint an HS256 token accepted by the harness.
pub fn mint_token(subject: &str, role: Option<&str>, admin: Option<bool>) -> String {
    let claims = JwtClaims {
        sub: subject.into(),
        aud: Some(serde_json::json!(AUDIENCE)),
        iss: ISSUER.into(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iat: Utc::now().timestamp(),
        email: Some(format!("{subject}@parkease.test")),
        role: role.map(String::from),
        admin,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SHARED_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// Wrap a token in a bearer header value.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value")
}
