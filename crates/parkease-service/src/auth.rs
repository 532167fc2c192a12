//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - a branch operator authenticated by an identity-provider token
//! - `AdminUser` - an operator whose token carries the admin capability
//!
//! Tokens are RS256 JWTs validated against the provider's JWKS, or HS256
//! JWTs signed with a shared secret when `AUTH_SHARED_SECRET` is set (auth
//! emulators and local setups).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use parkease_core::BranchId;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Timeout for JWKS fetch requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated branch operator.
///
/// The token subject is the branch ID: each operator account owns exactly
/// one branch.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's branch.
    pub branch_id: BranchId,
    /// E-mail claim, if present.
    pub email: Option<String>,
    /// Whether the token carries the admin capability.
    pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Extract the Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = validate_jwt(token, state).await?;

        let branch_id = claims.sub.parse::<BranchId>().map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a valid branch ID");
            ApiError::Unauthorized
        })?;

        Ok(Self {
            branch_id,
            is_admin: claims.has_admin_capability(&state.config.admin_role),
            email: claims.email,
        })
    }
}

/// An authenticated operator with the admin capability.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            tracing::warn!(branch_id = %user.branch_id, "Admin capability required");
            return Err(ApiError::Forbidden);
        }

        Ok(Self(user))
    }
}

/// JWT claims of an identity-provider token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (branch ID).
    pub sub: String,
    /// Audience (can be string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    #[serde(default)]
    pub iat: i64,
    /// E-mail of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role custom claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Admin custom claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

impl JwtClaims {
    /// Whether the claims grant the admin capability.
    #[must_use]
    pub fn has_admin_capability(&self, admin_role: &str) -> bool {
        self.admin == Some(true) || self.role.as_deref() == Some(admin_role)
    }
}

/// Validate a JWT with the configured key material.
async fn validate_jwt(token: &str, state: &AppState) -> Result<JwtClaims, ApiError> {
    let config = &state.config;

    let (decoding_key, mut validation) = if let Some(secret) = &config.auth_shared_secret {
        (
            DecodingKey::from_secret(secret.as_bytes()),
            Validation::new(Algorithm::HS256),
        )
    } else {
        // Decode the header to get the key ID
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode JWT header");
            ApiError::Unauthorized
        })?;
        let key = state
            .jwks
            .decoding_key(header.kid.as_deref(), &config.auth_jwks_url)
            .await?;
        (key, Validation::new(Algorithm::RS256))
    };

    validation.set_audience(&[&config.auth_audience]);
    validation.set_issuer(&[&config.auth_issuer]);

    let token_data = decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}

// ============================================================================
// JWKS Client
// ============================================================================

/// JWKS (JSON Web Key Set) response structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of JWK keys.
    pub keys: Vec<Jwk>,
}

/// Single JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256").
    pub alg: Option<String>,
    /// RSA public key modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public key exponent (base64url encoded).
    pub e: Option<String>,
}

struct CachedKeys {
    by_kid: HashMap<String, DecodingKey>,
    default_key: Option<DecodingKey>,
    last_updated: Instant,
}

impl CachedKeys {
    fn is_expired(&self) -> bool {
        self.last_updated.elapsed() >= JWKS_CACHE_DURATION
    }

    fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        match kid {
            Some(kid) => self.by_kid.get(kid).cloned(),
            None => self.default_key.clone(),
        }
    }
}

/// Cache of the identity provider's signing keys.
pub struct JwksCache {
    client: reqwest::Client,
    keys: RwLock<CachedKeys>,
}

impl JwksCache {
    /// Create an empty cache; keys are fetched on first use.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            keys: RwLock::new(CachedKeys {
                by_kid: HashMap::new(),
                default_key: None,
                // Force an initial fetch
                last_updated: Instant::now()
                    .checked_sub(JWKS_CACHE_DURATION)
                    .unwrap_or_else(Instant::now),
            }),
        }
    }

    /// Get a decoding key from cache or fetch from the JWKS endpoint.
    async fn decoding_key(&self, kid: Option<&str>, jwks_url: &str) -> Result<DecodingKey, ApiError> {
        {
            let cached = self.keys.read().await;
            if !cached.is_expired() {
                if let Some(key) = cached.lookup(kid) {
                    return Ok(key);
                }
            }
        }

        // Cache miss or expired - fetch JWKS
        let jwks = self.fetch(jwks_url).await?;

        let mut cached = self.keys.write().await;
        cached.by_kid.clear();
        cached.default_key = None;
        cached.last_updated = Instant::now();

        for jwk in &jwks.keys {
            if let Some(decoding_key) = jwk_to_decoding_key(jwk) {
                if let Some(key_kid) = &jwk.kid {
                    cached.by_kid.insert(key_kid.clone(), decoding_key.clone());
                }
                if cached.default_key.is_none() {
                    cached.default_key = Some(decoding_key);
                }
            }
        }

        cached.lookup(kid).ok_or(ApiError::Unauthorized)
    }

    async fn fetch(&self, jwks_url: &str) -> Result<Jwks, ApiError> {
        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let response = self.client.get(jwks_url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %jwks_url, "Failed to fetch JWKS");
            ApiError::ExternalService("Failed to fetch authentication keys".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                url = %jwks_url,
                "JWKS fetch returned non-success status"
            );
            return Err(ApiError::ExternalService(
                "Failed to fetch authentication keys".into(),
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            ApiError::ExternalService("Failed to parse authentication keys".into())
        })?;

        tracing::info!(keys_count = %jwks.keys.len(), "JWKS fetched successfully");

        Ok(jwks)
    }
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a JWK to a `DecodingKey`.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    // Only support RSA keys for now
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    DecodingKey::from_rsa_components(n, e).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Option<&str>, admin: Option<bool>) -> JwtClaims {
        JwtClaims {
            sub: "branch-1".into(),
            aud: None,
            iss: "issuer".into(),
            exp: 0,
            iat: 0,
            email: None,
            role: role.map(String::from),
            admin,
        }
    }

    #[test]
    fn admin_capability_from_role_claim() {
        assert!(claims(Some("admin"), None).has_admin_capability("admin"));
        assert!(!claims(Some("operator"), None).has_admin_capability("admin"));
        assert!(claims(Some("superuser"), None).has_admin_capability("superuser"));
    }

    #[test]
    fn admin_capability_from_flag_claim() {
        assert!(claims(None, Some(true)).has_admin_capability("admin"));
        assert!(!claims(None, Some(false)).has_admin_capability("admin"));
        assert!(!claims(None, None).has_admin_capability("admin"));
    }

    #[test]
    fn non_rsa_jwk_is_skipped() {
        let jwk = Jwk {
            kty: "EC".into(),
            kid: Some("k1".into()),
            alg: None,
            n: None,
            e: None,
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }
}
