//! Internal error types for Gemini operations.
//!
//! These errors are internal to `medreport-gemini` and are mapped to
//! `ServiceError` at the port boundary.

use thiserror::Error;

/// Result type alias for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors related to Gemini API operations.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key was configured.
    #[error("Gemini API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// API request failed with an HTTP error status.
    #[error("Gemini API request failed with status {status}: {message}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// Error message from the response body, if any
        message: String,
    },

    /// The response had no text part.
    #[error("No response from AI")]
    MissingText,

    /// The response had no inline audio.
    #[error("No audio data returned")]
    MissingAudio,

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_error_message() {
        let error = GeminiError::ApiRequestFailed {
            status: 403,
            message: "API key not valid".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("API key not valid"));
    }

    #[test]
    fn test_missing_audio_error_message() {
        assert_eq!(GeminiError::MissingAudio.to_string(), "No audio data returned");
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: GeminiError = parse.into();
        assert!(matches!(error, GeminiError::JsonParse(_)));
    }
}
