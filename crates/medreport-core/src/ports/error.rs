//! Errors surfaced by the service ports.
//!
//! Adapters keep their own detailed error types and map them into
//! [`ServiceError`] at the port boundary. The detail string is for logs;
//! [`ServiceError::user_message`] is what the user sees.

use thiserror::Error;

/// Shown when a report could not be analysed.
pub const ANALYSIS_FAILED_MESSAGE: &str = "无法读取报告，请确保文件清晰或稍后重试。";

/// Shown when a term explanation could not be produced.
pub const EXPLANATION_FAILED_MESSAGE: &str = "解释服务暂时不可用，请稍后再试。";

/// Shown when speech could not be synthesized.
pub const SPEECH_FAILED_MESSAGE: &str = "语音生成失败";

/// Failure of a remote service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Report analysis failed (transport, empty response, or unparseable JSON).
    #[error("Report analysis failed: {0}")]
    Analysis(String),

    /// Term explanation failed.
    #[error("Term explanation failed: {0}")]
    Explanation(String),

    /// Speech synthesis failed or returned no audio payload.
    #[error("Speech synthesis failed: {0}")]
    Speech(String),
}

impl ServiceError {
    /// The generic, user-facing message for this failure.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Analysis(_) => ANALYSIS_FAILED_MESSAGE,
            Self::Explanation(_) => EXPLANATION_FAILED_MESSAGE,
            Self::Speech(_) => SPEECH_FAILED_MESSAGE,
        }
    }

    /// Internal detail, for logging.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Analysis(detail) | Self::Explanation(detail) | Self::Speech(detail) => detail,
        }
    }
}
