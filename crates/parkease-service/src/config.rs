//! Service configuration.

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use parkease_core::{Tariff, POINT_VALUE, STANDARD_RATE_PER_HOUR, STANDARD_TARIFF_NAME};

/// Default Gemini endpoint.
pub const DEFAULT_LLM_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default text-generation model.
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/parkease").
    pub data_dir: String,

    /// Expected JWT issuer.
    pub auth_issuer: String,

    /// Expected JWT audience (default: "parkease").
    pub auth_audience: String,

    /// JWKS endpoint for RS256 token validation.
    pub auth_jwks_url: String,

    /// Shared secret for HS256 tokens. When set, JWKS is not consulted.
    pub auth_shared_secret: Option<String>,

    /// Value of the `role` claim that grants admin capability.
    pub admin_role: String,

    /// Text-generation API base URL.
    pub llm_api_url: String,

    /// Text-generation API key (optional; rate suggestion is disabled without it).
    pub llm_api_key: Option<String>,

    /// Text-generation model name.
    pub llm_model: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Tariff applied to branches without one.
    pub default_tariff: Tariff,

    /// Currency value of one loyalty point.
    pub point_value: Decimal,

    /// Branch to seed with demo data at startup.
    pub seed_demo_branch: Option<String>,
}

/// Gemini secrets file structure.
#[derive(Debug, Deserialize)]
struct GeminiSecrets {
    api_key: String,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let (llm_api_key, llm_api_url, llm_model) = load_gemini_secrets();

        Self {
            listen_addr: env_or("LISTEN_ADDR", defaults.listen_addr),
            data_dir: env_or("DATA_DIR", defaults.data_dir),
            auth_issuer: env_or("AUTH_ISSUER", defaults.auth_issuer),
            auth_audience: env_or("AUTH_AUDIENCE", defaults.auth_audience),
            auth_jwks_url: env_or("AUTH_JWKS_URL", defaults.auth_jwks_url),
            auth_shared_secret: std::env::var("AUTH_SHARED_SECRET").ok(),
            admin_role: env_or("ADMIN_ROLE", defaults.admin_role),
            llm_api_url: llm_api_url.unwrap_or(defaults.llm_api_url),
            llm_api_key,
            llm_model: llm_model.unwrap_or(defaults.llm_model),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            default_tariff: load_default_tariff(),
            point_value: env_parse::<Decimal>("POINT_VALUE")
                .filter(|v| !v.is_sign_negative())
                .unwrap_or(defaults.point_value),
            seed_demo_branch: std::env::var("SEED_DEMO_BRANCH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Build the fallback tariff from `DEFAULT_TARIFF_NAME` / `DEFAULT_TARIFF_RATE`.
fn load_default_tariff() -> Tariff {
    let name = std::env::var("DEFAULT_TARIFF_NAME").unwrap_or_else(|_| STANDARD_TARIFF_NAME.into());
    let rate = env_parse("DEFAULT_TARIFF_RATE").unwrap_or(STANDARD_RATE_PER_HOUR);

    Tariff::new(name, rate).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid default tariff, using the standard rate");
        Tariff::standard()
    })
}

/// Load Gemini secrets from file or environment.
///
/// Returns `(api_key, api_url, model)`.
fn load_gemini_secrets() -> (Option<String>, Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/gemini.json",
        "parkease/.secrets/gemini.json",
        "../.secrets/gemini.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<GeminiSecrets>(path) {
            tracing::info!(path = %path, "Loaded Gemini secrets from file");
            return (
                Some(secrets.api_key),
                secrets.api_url.or_else(|| std::env::var("LLM_API_URL").ok()),
                secrets.model.or_else(|| std::env::var("LLM_MODEL").ok()),
            );
        }
    }

    tracing::debug!("Gemini secrets file not found, using environment variables");
    (
        std::env::var("LLM_API_KEY").ok(),
        std::env::var("LLM_API_URL").ok(),
        std::env::var("LLM_MODEL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/parkease".into(),
            auth_issuer: "https://securetoken.google.com/parkease".into(),
            auth_audience: "parkease".into(),
            auth_jwks_url:
                "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
                    .into(),
            auth_shared_secret: None,
            admin_role: "admin".into(),
            llm_api_url: DEFAULT_LLM_API_URL.into(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            default_tariff: Tariff::standard(),
            point_value: POINT_VALUE,
            seed_demo_branch: None,
        }
    }
}
