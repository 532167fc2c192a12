//! Gemini `generateContent` API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input of a rate suggestion.
#[derive(Debug, Clone)]
pub struct RateSuggestionInput {
    /// Entry time of the vehicle.
    pub entry_time: DateTime<Utc>,
    /// Parking duration in hours.
    pub duration_hours: f64,
    /// Free-form historical parking data.
    pub historical_data: String,
}

impl RateSuggestionInput {
    /// Render the strategist prompt.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "You are an expert parking rate strategist. You analyze parking data and suggest optimal rates.\n\n\
             Consider the entry time, duration, and historical data to suggest a rate that maximizes \
             revenue while efficiently managing parking space demand.\n\n\
             Entry Time: {}\n\
             Duration (Hours): {}\n\
             Historical Data: {}\n\n\
             Provide the suggested rate and a brief explanation of your reasoning.\n\n\
             Ensure the suggestedRate field is a number.",
            self.entry_time.to_rfc3339(),
            self.duration_hours,
            self.historical_data,
        )
    }
}

/// Structured model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSuggestionOutput {
    /// Suggested hourly rate.
    pub suggested_rate: f64,
    /// Explanation of the factors considered.
    pub reasoning: String,
}

/// `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns.
    pub contents: Vec<Content>,
    /// Output constraints.
    pub generation_config: GenerationConfig,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Author role ("user" or "model").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Text.
    #[serde(default)]
    pub text: String,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Response MIME type.
    pub response_mime_type: String,
    /// JSON schema of the response.
    pub response_schema: serde_json::Value,
}

impl GenerationConfig {
    /// Constrain output to a [`RateSuggestionOutput`] object.
    #[must_use]
    pub fn rate_suggestion() -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
            response_schema: serde_json::json!({
                "type": "OBJECT",
                "properties": {
                    "suggestedRate": {
                        "type": "NUMBER",
                        "description": "The suggested parking rate based on the input data."
                    },
                    "reasoning": {
                        "type": "STRING",
                        "description": "The reasoning behind the suggested rate, explaining the factors considered."
                    }
                },
                "required": ["suggestedRate", "reasoning"]
            }),
        }
    }
}

/// `generateContent` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Candidate completions.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    #[must_use]
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// A candidate completion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// API error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error detail.
    pub error: ApiErrorDetail,
}

/// API error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// HTTP status code.
    #[serde(default)]
    pub code: u16,
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Status name (e.g. "INVALID_ARGUMENT").
    #[serde(default)]
    pub status: Option<String>,
}
