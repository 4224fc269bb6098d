//! Gemini client implementing the medreport service ports.

use async_trait::async_trait;
use medreport_core::{
    AnalysisResult, DataUrl, ReportAnalyzer, ServiceError, SpeechSynthesizer, TermExplainer,
    ports::EXPLANATION_FALLBACK,
};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::http::{HttpBackend, ReqwestBackend};
use crate::prompts::{ANALYSIS_INSTRUCTION, ANALYSIS_SYSTEM_PROMPT, term_explanation_prompt};
use crate::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SpeechConfig,
};

// ============================================================================
// Type Aliases
// ============================================================================

/// Gemini client using the reqwest HTTP backend.
pub type DefaultGeminiClient = GeminiClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the Gemini `generateContent` API.
///
/// Generic over the HTTP backend so tests can substitute a mock. Use
/// [`DefaultGeminiClient`] in production code and consume it through the
/// core ports.
pub struct GeminiClient<B: HttpBackend> {
    backend: B,
    config: GeminiConfig,
}

impl DefaultGeminiClient {
    /// Create a client with the given configuration.
    ///
    /// Fails when no API key is configured or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let backend = ReqwestBackend::new(&config)?;
        Ok(Self { backend, config })
    }
}

impl<B: HttpBackend> GeminiClient<B> {
    /// Create a client over a custom backend.
    pub const fn with_backend(config: GeminiConfig, backend: B) -> Self {
        Self { backend, config }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let url = self.endpoint(model);
        let body = serde_json::to_value(request)?;
        tracing::debug!(%url, "Sending generateContent request");
        let response = self.backend.post_json(&url, &body).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Analyze a report image given as a data URL.
    pub async fn analyze(&self, image_data_url: &str) -> GeminiResult<AnalysisResult> {
        let image = DataUrl::parse(image_data_url);
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(image.mime_type(), image.payload()),
                Part::text(ANALYSIS_INSTRUCTION),
            ])],
            system_instruction: Some(Content::system(ANALYSIS_SYSTEM_PROMPT)),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.analysis_temperature),
                response_mime_type: Some("application/json".to_string()),
                ..GenerationConfig::default()
            }),
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        let text = response.text().ok_or(GeminiError::MissingText)?;
        let result: AnalysisResult = serde_json::from_str(strip_code_fence(&text))?;

        tracing::info!(
            health_score = result.health_score,
            indicators = result.indicators.len(),
            actions = result.action_plan.len(),
            "Report analysed"
        );
        Ok(result)
    }

    /// Explain a medical term. An empty answer yields the fallback sentence.
    pub async fn explain(&self, term: &str) -> GeminiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(term_explanation_prompt(term))])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.explanation_temperature),
                ..GenerationConfig::default()
            }),
        };

        let response = self.generate(&self.config.text_model, &request).await?;
        Ok(response.text().map_or_else(
            || EXPLANATION_FALLBACK.to_string(),
            |text| text.trim().to_string(),
        ))
    }

    /// Synthesize speech, returning base64 PCM16 (mono, 24 kHz).
    pub async fn synthesize(&self, text: &str) -> GeminiResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(text)])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(self.config.voice.clone())),
                ..GenerationConfig::default()
            }),
        };

        let response = self.generate(&self.config.speech_model, &request).await?;
        let audio = response.inline_data().ok_or(GeminiError::MissingAudio)?;
        tracing::debug!(base64_len = audio.len(), "Received synthesized speech");
        Ok(audio.to_string())
    }
}

/// Remove a surrounding Markdown code fence, if the model added one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

// ============================================================================
// Port implementations
// ============================================================================

#[async_trait]
impl<B: HttpBackend> ReportAnalyzer for GeminiClient<B> {
    async fn analyze_report(&self, image_data_url: &str) -> Result<AnalysisResult, ServiceError> {
        self.analyze(image_data_url).await.map_err(|e| {
            tracing::error!(error = %e, "Gemini analysis error");
            ServiceError::Analysis(e.to_string())
        })
    }
}

#[async_trait]
impl<B: HttpBackend> TermExplainer for GeminiClient<B> {
    async fn explain_term(&self, term: &str) -> Result<String, ServiceError> {
        self.explain(term).await.map_err(|e| {
            tracing::error!(error = %e, term, "Term explanation error");
            ServiceError::Explanation(e.to_string())
        })
    }
}

#[async_trait]
impl<B: HttpBackend> SpeechSynthesizer for GeminiClient<B> {
    async fn synthesize_speech(&self, text: &str) -> Result<String, ServiceError> {
        self.synthesize(text).await.map_err(|e| {
            tracing::error!(error = %e, "Speech generation error");
            ServiceError::Speech(e.to_string())
        })
    }
}
