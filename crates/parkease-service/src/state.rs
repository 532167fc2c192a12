//! Application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use parkease_core::{BillingCalculator, BranchId, LoyaltyAccount, Plate, Tariff};
use parkease_store::{Store, StoreError};

use crate::auth::JwksCache;
use crate::config::ServiceConfig;
use crate::events::EventBus;
use crate::llm::LlmClient;

/// Source of the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock time.
    System,
    /// A frozen instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// The current instant.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Billing calculator configured with the point value.
    pub calculator: BillingCalculator,

    /// Live record events.
    pub events: EventBus,

    /// Text-generation client for rate suggestions (optional).
    pub llm: Option<Arc<LlmClient>>,

    /// Time source.
    pub clock: Clock,

    /// Identity-provider signing keys.
    pub(crate) jwks: Arc<JwksCache>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let llm = config.llm_api_key.as_ref().and_then(|key| {
            match LlmClient::new(&config.llm_api_url, key, &config.llm_model) {
                Ok(client) => {
                    tracing::info!(model = %config.llm_model, "Rate suggestion enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create text-generation client");
                    None
                }
            }
        });

        if llm.is_none() {
            tracing::warn!("Text generation not configured - rate suggestions will not be available");
        }

        Self {
            store,
            calculator: BillingCalculator::with_point_value(config.point_value),
            config,
            events: EventBus::default(),
            llm,
            clock: Clock::System,
            jwks: Arc::new(JwksCache::new()),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Check if rate suggestion is configured.
    #[must_use]
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// The tariff in force for a branch, and whether it is the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub fn tariff_for(&self, branch_id: &BranchId) -> Result<(Tariff, bool), StoreError> {
        Ok(match self.store.get_tariff(branch_id)? {
            Some(tariff) => (tariff, false),
            None => (self.config.default_tariff.clone(), true),
        })
    }

    /// Redeemable points of a plate (zero without an account).
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub fn points_for(&self, plate: &Plate) -> Result<u64, StoreError> {
        let account = self.store.get_loyalty(plate)?;
        Ok(LoyaltyAccount::available(account.as_ref()))
    }
}
