//! Audio output abstractions for the playback controller.
//!
//! These traits decouple the [`PlaybackController`](crate::controller::PlaybackController)
//! from any specific audio backend:
//!
//! | Implementor | Where used |
//! |---|---|
//! | `RodioBackend` (feature `rodio`) | CLI: rodio playback on a dedicated audio thread |
//! | Test fakes | State-machine tests, no hardware required |
//!
//! The model follows a browser-style audio graph: a long-lived
//! [`OutputContext`] (the device connection, which may start suspended) and
//! short-lived [`OutputSource`]s, one per played buffer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlaybackError;
use crate::pcm::DecodedAudioBuffer;

/// One-shot callback fired when a source plays to its end.
///
/// Never fired for a source halted through [`OutputSource::stop`].
pub type EndedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Power state of an output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Ready to produce sound.
    Running,
    /// Created but not yet allowed to play (autoplay restrictions, power saving).
    Suspended,
    /// Released; cannot be used again.
    Closed,
}

/// Factory for output contexts.
pub trait OutputBackend: Send + Sync {
    /// Open a new output context for audio at `sample_rate`.
    ///
    /// Fails with [`PlaybackError::HardwareUnavailable`] when no output
    /// device can be used.
    fn open(&self, sample_rate: u32) -> Result<Arc<dyn OutputContext>, PlaybackError>;
}

/// A connection to the audio output device.
///
/// # Object safety
/// Every method takes `&self` so the context can be shared as
/// `Arc<dyn OutputContext>`; implementations use interior mutability.
#[async_trait]
pub trait OutputContext: Send + Sync {
    /// Current power state.
    fn state(&self) -> ContextState;

    /// Bring a suspended context to [`ContextState::Running`].
    async fn resume(&self) -> Result<(), PlaybackError>;

    /// Start playing `buffer` and return a handle to the new source.
    ///
    /// `on_ended` must be invoked asynchronously (never from inside
    /// `start`) and only when playback reaches the end on its own.
    fn start(
        &self,
        buffer: DecodedAudioBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn OutputSource>, PlaybackError>;

    /// Release the device. Later calls are no-ops.
    fn close(&self);
}

/// A single playing buffer.
pub trait OutputSource: Send {
    /// Halt output immediately.
    ///
    /// Returns [`PlaybackError::SourceEnded`] if the source already finished
    /// or was stopped before.
    fn stop(&mut self) -> Result<(), PlaybackError>;
}
