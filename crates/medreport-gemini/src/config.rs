//! Public configuration for the Gemini client.

use std::time::Duration;

/// Model used for report analysis and term explanations.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Model used for speech synthesis.
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Prebuilt voice used for speech synthesis.
pub const DEFAULT_VOICE: &str = "Kore";

/// Configuration for the Gemini client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use medreport_gemini::GeminiConfig;
/// use std::time::Duration;
///
/// let config = GeminiConfig::new()
///     .with_api_key("secret")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API
    pub(crate) base_url: String,
    /// API key sent with every request
    pub(crate) api_key: Option<String>,
    /// Model for analysis and explanations
    pub(crate) text_model: String,
    /// Model for speech synthesis
    pub(crate) speech_model: String,
    /// Prebuilt voice name
    pub(crate) voice: String,
    /// Sampling temperature for report analysis
    pub(crate) analysis_temperature: f64,
    /// Sampling temperature for term explanations
    pub(crate) explanation_temperature: f64,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            analysis_temperature: 0.4,
            explanation_temperature: 0.7,
            user_agent: concat!("medreport-gemini/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the API.
    ///
    /// Defaults to `https://generativelanguage.googleapis.com/v1beta`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set an optional API key.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Model used for analysis and explanations.
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Model used for speech synthesis.
    #[must_use]
    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 120 seconds; analysing a photographed report is slow.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API key, if one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
