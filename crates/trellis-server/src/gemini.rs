//! Gemini implementation of the PlanOracle
//!
//! Calls the `generateContent` REST endpoint with the system instructions
//! as `system_instruction` and the request context as a single user turn.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use trellis_core::{OracleError, PlanOracle};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    /// API key sent as the `key` query parameter
    api_key: String,

    /// Model name, e.g. "gemini-2.5-flash"
    model: String,

    /// Base URL of the REST API
    api_base_url: String,

    /// HTTP client
    client: Client,
}

impl GeminiOracle {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, api_base_url: impl Into<String>) -> ServerResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServerError::OracleClientError(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            api_base_url: api_base_url.into(),
            client,
        })
    }

    /// Build the client from configuration; a missing API key is an error
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        Self::new(
            config.require_api_key()?,
            config.gemini_model.clone(),
            config.gemini_api_base_url.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base_url, self.model)
    }
}

#[async_trait]
impl PlanOracle for GeminiOracle {
    async fn propose(&self, system_instructions: &str, context: &str) -> Result<String, OracleError> {
        let body = json!({
            "system_instruction": {
                "parts": [{ "text": system_instructions }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": context }]
            }]
        });

        debug!(model = %self.model, context_bytes = context.len(), "Calling Gemini");
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Gemini returned an error status");
            // The status code stays in the text so failures can be classified
            return Err(OracleError::Transport(format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                error_body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Transport(format!("Invalid Gemini response: {}", e.without_url())))?;

        extract_text(&payload)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(payload: &Value) -> Result<String, OracleError> {
    let parts = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| OracleError::Transport("Gemini response has no candidates".to_string()))?;

    let text: String = parts.iter().filter_map(|part| part["text"].as_str()).collect();
    if text.is_empty() {
        let reason = payload["candidates"][0]["finishReason"].as_str().unwrap_or("unknown");
        return Err(OracleError::Transport(format!("Gemini returned no text (finish reason: {})", reason)));
    }
    Ok(text)
}
