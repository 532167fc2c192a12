//! Text-generation integration for parking rate suggestions.
//!
//! The model is asked for a JSON object matching a response schema, so the
//! reply parses directly into [`RateSuggestionOutput`].

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmError};
pub use types::{RateSuggestionInput, RateSuggestionOutput};
