//! CLI bootstrap - the composition root.
//!
//! The Gemini client is built here and handed to the handlers through the
//! service ports, so handlers never name a concrete adapter.

use std::sync::Arc;

use medreport_core::{ReportAnalyzer, SpeechSynthesizer, TermExplainer};
use medreport_gemini::{DefaultGeminiClient, GeminiConfig};

use crate::error::CliError;
use crate::parser::Cli;

/// Legacy variable name still honoured for the API key.
const LEGACY_API_KEY_VAR: &str = "API_KEY";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Gemini API key.
    pub api_key: Option<String>,
    /// Optional API base URL override.
    pub base_url: Option<String>,
}

impl CliConfig {
    /// Build the configuration from parsed arguments and the environment.
    ///
    /// `--api-key` / `GEMINI_API_KEY` wins over `API_KEY`.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let api_key = cli
            .api_key
            .clone()
            .or_else(|| std::env::var(LEGACY_API_KEY_VAR).ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            api_key,
            base_url: cli.base_url.clone(),
        }
    }

    fn gemini_config(&self) -> GeminiConfig {
        let config = GeminiConfig::new().with_optional_api_key(self.api_key.clone());
        match &self.base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }
}

/// Services available to command handlers.
pub struct CliContext {
    pub analyzer: Arc<dyn ReportAnalyzer>,
    pub explainer: Arc<dyn TermExplainer>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl CliContext {
    /// Compose a context from individual services.
    #[must_use]
    pub fn from_services(
        analyzer: Arc<dyn ReportAnalyzer>,
        explainer: Arc<dyn TermExplainer>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            analyzer,
            explainer,
            speech,
        }
    }
}

/// Wire the Gemini client into a [`CliContext`].
///
/// Fails with [`CliError::Config`] when no API key is available.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let client = Arc::new(DefaultGeminiClient::new(config.gemini_config())?);
    tracing::debug!(has_base_url_override = config.base_url.is_some(), "Gemini client ready");

    Ok(CliContext::from_services(
        Arc::clone(&client) as Arc<dyn ReportAnalyzer>,
        Arc::clone(&client) as Arc<dyn TermExplainer>,
        client as Arc<dyn SpeechSynthesizer>,
    ))
}
