#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod http;
mod prompts;
mod wire;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultGeminiClient, GeminiClient};

// Configuration
pub use config::{DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VOICE, GeminiConfig};

// Errors
pub use error::{GeminiError, GeminiResult};

// Transport seam
pub use http::{HttpBackend, ReqwestBackend};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio as _;
