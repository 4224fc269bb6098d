//! HTTP backend abstraction for the Gemini API.
//!
//! The client only ever POSTs a JSON body and reads a JSON body back, so
//! the seam is a single method. Production uses reqwest; tests use the
//! mockall-generated `MockHttpBackend`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can POST JSON to the Gemini API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// POST `body` to `url` and return the decoded JSON response.
    ///
    /// Non-success statuses become [`GeminiError::ApiRequestFailed`].
    async fn post_json(&self, url: &str, body: &serde_json::Value)
    -> GeminiResult<serde_json::Value>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_key: String,
}

/// Error envelope returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl ReqwestBackend {
    /// Create a reqwest backend from the client configuration.
    ///
    /// Fails with [`GeminiError::MissingApiKey`] when no key is configured.
    pub fn new(config: &GeminiConfig) -> GeminiResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, api_key })
    }
}

/// Pull the human-readable message out of an API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> GeminiResult<serde_json::Value> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiRequestFailed {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(response.json().await?)
    }
}
