//! Text-to-speech port.

use async_trait::async_trait;

use super::ServiceError;

/// Synthesizes speech for a piece of text.
///
/// Implementations must be `Send + Sync` so the playback controller can
/// hold them behind an `Arc` and await them from any task.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return the audio as base64 text.
    ///
    /// The payload is headerless signed 16-bit little-endian PCM, mono,
    /// 24 000 Hz. Fails with [`ServiceError::Speech`] when the service errors
    /// or the response carries no audio.
    async fn synthesize_speech(&self, text: &str) -> Result<String, ServiceError>;
}
