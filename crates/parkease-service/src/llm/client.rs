//! Gemini API client implementation.

use reqwest::Client;
use std::time::Duration;

use super::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, RateSuggestionInput, RateSuggestionOutput,
};

/// Error type for text-generation operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error.
    #[error("text generation API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The model reply did not match the response schema.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API URL (e.g., `"https://generativelanguage.googleapis.com"`)
    /// * `api_key` - API key
    /// * `model` - Model name (e.g., `"gemini-2.0-flash"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Ask the model for a parking rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// reply does not parse as a rate suggestion.
    pub async fn suggest_rate(
        &self,
        input: &RateSuggestionInput,
    ) -> Result<RateSuggestionOutput, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: input.prompt(),
                }],
            }],
            generation_config: GenerationConfig::rate_suggestion(),
        };

        tracing::debug!(model = %self.model, "Requesting rate suggestion");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: GenerateContentResponse = self.handle_response(response).await?;
        parse_suggestion(&body)
    }

    /// Handle API response, parsing JSON or extracting error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, LlmError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error.error.message,
            }),
            Err(_) => Err(LlmError::Api {
                status: status.as_u16(),
                message: format!("HTTP {status}"),
            }),
        }
    }
}

/// Extract the structured suggestion from a model reply.
fn parse_suggestion(body: &GenerateContentResponse) -> Result<RateSuggestionOutput, LlmError> {
    let text = body
        .first_text()
        .ok_or_else(|| LlmError::InvalidResponse("no candidate text".into()))?;

    let output: RateSuggestionOutput = serde_json::from_str(text.trim())
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    if !output.suggested_rate.is_finite() || output.suggested_rate < 0.0 {
        return Err(LlmError::InvalidResponse(format!(
            "suggested rate {} is not a non-negative number",
            output.suggested_rate
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input() -> RateSuggestionInput {
        RateSuggestionInput {
            entry_time: "2024-03-01T09:00:00Z".parse().unwrap(),
            duration_hours: 2.5,
            historical_data: "Weekdays 9-17 are 90% full at 2.50/h".into(),
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn prompt_embeds_inputs() {
        let prompt = input().prompt();
        assert!(prompt.contains("Entry Time: 2024-03-01T09:00:00+00:00"));
        assert!(prompt.contains("Duration (Hours): 2.5"));
        assert!(prompt.contains("Historical Data: Weekdays 9-17"));
    }

    #[test]
    fn parse_rejects_negative_rate() {
        let body: GenerateContentResponse =
            serde_json::from_value(reply(r#"{"suggestedRate": -1, "reasoning": "x"}"#)).unwrap();
        assert!(matches!(
            parse_suggestion(&body),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_candidates() {
        let body: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(parse_suggestion(&body).is_err());
    }

    #[tokio::test]
    async fn suggest_rate_sends_key_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(
                r#"{"suggestedRate": 3.25, "reasoning": "Peak demand"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::new(server.uri(), "secret", "gemini-test").unwrap();
        let output = client.suggest_rate(&input()).await.unwrap();

        assert!((output.suggested_rate - 3.25).abs() < f64::EPSILON);
        assert_eq!(output.reasoning, "Peak demand");
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let client = LlmClient::new(server.uri(), "bad", "gemini-test").unwrap();
        let err = client.suggest_rate(&input()).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
