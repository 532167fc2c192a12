//! ParkEase HTTP API Service.
//!
//! This crate provides the HTTP API for parking lot operators, including:
//!
//! - Vehicle entry, active sessions and history
//! - Billing quotes and payment confirmation with loyalty redemption
//! - Branch administration
//! - AI-assisted rate suggestion
//! - A live WebSocket feed of record changes
//!
//! # Authentication
//!
//! Every `/v1` route expects an identity-provider JWT whose subject is the
//! caller's branch ID. Administration routes additionally require the admin
//! capability (`role` claim equal to the configured admin role, or
//! `admin: true`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the Axum handler trait

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod llm;
pub mod routes;
pub mod seed;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use events::{EventBus, RecordEvent, RecordEventKind};
pub use llm::{LlmClient, LlmError};
pub use routes::create_router;
pub use seed::{seed_demo_data, SeedReport};
pub use state::{AppState, Clock};
