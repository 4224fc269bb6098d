//! CLI-specific error types and mappings.
//!
//! This module provides the CLI error type and maps service and playback
//! failures to exit codes and user-facing messages.

use medreport_core::ServiceError;
use medreport_gemini::GeminiError;
use medreport_voice::PlaybackError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A remote service call failed. Holds the user-facing message.
    #[error("{0}")]
    Service(String),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio playback failed. Holds the user-facing message.
    #[error("{0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Service(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Playback(_) => 70, // EX_SOFTWARE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err.user_message().to_string())
    }
}

impl From<GeminiError> for CliError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => Self::Config(err.to_string()),
            other => Self::Service(other.to_string()),
        }
    }
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        Self::Playback(err.user_message().to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
