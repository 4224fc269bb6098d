//! Playback error types.

use medreport_core::ServiceError;

/// Shown to the user for any playback failure.
pub const PLAYBACK_FAILED_MESSAGE: &str = "语音播放失败，请稍后重试";

/// Reasons a speech payload cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum MalformedAudioError {
    /// The payload is not valid base64.
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The byte count does not split into whole 16-bit samples.
    #[error("byte length {0} is not a whole number of 16-bit samples")]
    OddByteLength(usize),

    /// The sample count does not split into whole frames.
    #[error("{samples} samples do not divide into frames of {channels} channels")]
    PartialFrame { samples: usize, channels: u16 },

    /// Channel count of zero.
    #[error("channel count must be positive")]
    ZeroChannels,

    /// Sample rate of zero.
    #[error("sample rate must be positive")]
    ZeroSampleRate,
}

/// Errors that can occur while fetching, decoding, or playing speech.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// The speech payload could not be decoded.
    #[error("Malformed audio: {0}")]
    MalformedAudio(#[from] MalformedAudioError),

    /// The speech service call failed.
    #[error("Speech fetch failed: {0}")]
    Fetch(#[from] ServiceError),

    /// The output context could not be created, resumed, or started.
    #[error("Audio output unavailable: {0}")]
    HardwareUnavailable(String),

    /// The source had already finished or been stopped.
    #[error("Audio source already ended")]
    SourceEnded,

    /// The dedicated audio thread exited unexpectedly.
    #[error("Audio thread died unexpectedly")]
    AudioThreadDied,

    /// The controller was torn down.
    #[error("Playback controller has been disposed")]
    Disposed,
}

impl PlaybackError {
    /// The message shown to the user.
    ///
    /// All playback failures share one generic message; the detail only goes
    /// to the logs.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        PLAYBACK_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_audio_wraps_reason() {
        let err: PlaybackError = MalformedAudioError::OddByteLength(3).into();
        assert!(matches!(
            err,
            PlaybackError::MalformedAudio(MalformedAudioError::OddByteLength(3))
        ));
        assert!(err.to_string().contains("16-bit"));
    }

    #[test]
    fn service_errors_become_fetch_failures() {
        let err: PlaybackError = ServiceError::Speech("No audio data returned".into()).into();
        assert!(matches!(err, PlaybackError::Fetch(_)));
        assert_eq!(err.user_message(), PLAYBACK_FAILED_MESSAGE);
    }
}
