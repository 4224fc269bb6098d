//! Playback controller: reads text aloud through the speech service.
//!
//! The controller is a small state machine:
//!
//! ```text
//!   Idle ──play──► Loading ──audio started──► Playing
//!    ▲               │  │                        │
//!    │   error/empty │  │ play/stop (cancel)     │ stop / play (toggle) / natural end
//!    └───────────────┴──┴────────────────────────┘
//! ```
//!
//! Every `play` mints a generation token. Anything that completes
//! asynchronously (the speech fetch, a context resume, a hardware end
//! callback) compares its captured token with the current one before
//! touching state, so a late response cannot resurrect playback the user
//! already stopped.
//!
//! The state lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use medreport_core::SpeechSynthesizer;

use crate::error::PlaybackError;
use crate::output::{ContextState, EndedCallback, OutputBackend, OutputContext, OutputSource};
use crate::pcm::{self, DecodedAudioBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};

// ── Status and events ──────────────────────────────────────────────

/// Current state of the playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    /// Nothing playing, nothing requested.
    Idle,

    /// Waiting for synthesized speech.
    Loading,

    /// Audio is playing.
    Playing,
}

/// Events emitted by the controller to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Status changed.
    StatusChanged(PlaybackStatus),

    /// Audio played to its end.
    Finished,

    /// Playback failed. `message` is meant for the user.
    Failed { message: String },
}

/// What a call to [`PlaybackController::play`] did.
#[derive(Debug)]
pub enum PlayOutcome {
    /// Audio started playing.
    Started,

    /// The call stopped the active playback (toggle).
    Stopped,

    /// The request was cancelled, either by this call (a second `play`
    /// while loading) or by a newer `stop`/`play` while it was in flight.
    Cancelled,

    /// The speech payload held no audio frames; nothing was played.
    Empty,

    /// Blank text; nothing was requested.
    Ignored,

    /// Playback failed. A [`PlaybackEvent::Failed`] has been emitted.
    Failed(PlaybackError),
}

// ── Configuration ──────────────────────────────────────────────────

/// Format of the audio returned by the speech service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Sample rate of the PCM payload (Hz).
    pub sample_rate: u32,

    /// Interleaved channel count of the PCM payload.
    pub channels: u16,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: SPEECH_CHANNELS,
        }
    }
}

// ── Internal state ─────────────────────────────────────────────────

/// The active output graph: one source on the shared context.
struct PlaybackSession {
    /// Generation token of the `play` call that created it.
    id: u64,
    source: Box<dyn OutputSource>,
}

struct ControllerState {
    status: PlaybackStatus,
    /// Bumped by every `play`, `stop` and `dispose`.
    generation: u64,
    /// Created on first `play`, reused afterwards.
    context: Option<Arc<dyn OutputContext>>,
    session: Option<PlaybackSession>,
    disposed: bool,
}

/// State shared with hardware completion callbacks.
struct Shared {
    state: Mutex<ControllerState>,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PlaybackEvent) {
        // The receiver may have been dropped; events are best-effort.
        let _ = self.event_tx.send(event);
    }

    fn set_status(&self, state: &mut ControllerState, status: PlaybackStatus) {
        if state.status == status {
            return;
        }
        tracing::debug!(from = ?state.status, to = ?status, "Playback status changed");
        state.status = status;
        self.emit(PlaybackEvent::StatusChanged(status));
    }

    /// Halt the active session (if any), invalidate in-flight requests, go idle.
    fn halt(&self, state: &mut ControllerState) {
        state.generation += 1;
        if let Some(mut session) = state.session.take() {
            // An ended source refuses to stop; that is not a failure.
            if let Err(e) = session.source.stop() {
                tracing::debug!(session = session.id, error = %e, "Source was already stopped");
            }
        }
        self.set_status(state, PlaybackStatus::Idle);
    }

    fn fail(&self, state: &mut ControllerState, error: PlaybackError) -> PlayOutcome {
        tracing::error!(error = %error, "Audio playback error");
        state.session = None;
        self.set_status(state, PlaybackStatus::Idle);
        self.emit(PlaybackEvent::Failed {
            message: error.user_message().to_string(),
        });
        PlayOutcome::Failed(error)
    }

    /// Build the end-of-playback callback for session `session_id`.
    fn ended_callback(shared: Weak<Self>, session_id: u64) -> EndedCallback {
        Box::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.lock();
            if state.session.as_ref().map(|s| s.id) != Some(session_id) {
                tracing::debug!(session_id, "Ignoring completion from a replaced session");
                return;
            }
            state.session = None;
            shared.set_status(&mut state, PlaybackStatus::Idle);
            shared.emit(PlaybackEvent::Finished);
            tracing::debug!(session_id, "Playback finished naturally");
        })
    }
}

// ── Playback controller ────────────────────────────────────────────

/// Owns the audio output graph and drives speech playback.
///
/// One instance per screen (or CLI command); it is not a process-wide
/// singleton. Dropping the controller disposes it.
pub struct PlaybackController {
    shared: Arc<Shared>,
    speech: Arc<dyn SpeechSynthesizer>,
    backend: Arc<dyn OutputBackend>,
    config: PlaybackConfig,
}

impl PlaybackController {
    /// Create a controller.
    ///
    /// Returns the controller and a receiver for [`PlaybackEvent`]s. No
    /// audio hardware is touched until the first [`play`](Self::play).
    #[must_use]
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        backend: Arc<dyn OutputBackend>,
        config: PlaybackConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState {
                status: PlaybackStatus::Idle,
                generation: 0,
                context: None,
                session: None,
                disposed: false,
            }),
            event_tx,
        });

        let controller = Self {
            shared,
            speech,
            backend,
            config,
        };

        (controller, event_rx)
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.shared.lock().status
    }

    /// Whether a playback session currently holds an output source.
    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.shared.lock().session.is_some()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.lock().disposed
    }

    #[must_use]
    pub const fn config(&self) -> PlaybackConfig {
        self.config
    }

    // ── Operations ─────────────────────────────────────────────────

    /// Read `text` aloud, or toggle/cancel an earlier request.
    ///
    /// - While playing: stops playback and returns [`PlayOutcome::Stopped`].
    /// - While loading: cancels the pending request and returns
    ///   [`PlayOutcome::Cancelled`].
    /// - While idle: fetches speech, decodes it and starts playback.
    ///
    /// Errors never escape: a failure resets the controller to idle, emits
    /// one [`PlaybackEvent::Failed`], and comes back as [`PlayOutcome::Failed`].
    pub async fn play(&self, text: &str) -> PlayOutcome {
        if text.trim().is_empty() {
            tracing::warn!("Ignoring play request with empty text");
            return PlayOutcome::Ignored;
        }

        let (token, context) = {
            let mut state = self.shared.lock();

            if state.disposed {
                return self.shared.fail(&mut state, PlaybackError::Disposed);
            }

            match state.status {
                PlaybackStatus::Playing => {
                    tracing::debug!("Play requested while playing, stopping instead");
                    self.shared.halt(&mut state);
                    return PlayOutcome::Stopped;
                }
                PlaybackStatus::Loading => {
                    tracing::debug!("Play requested while loading, cancelling pending request");
                    self.shared.halt(&mut state);
                    return PlayOutcome::Cancelled;
                }
                PlaybackStatus::Idle => {}
            }

            state.generation += 1;
            let token = state.generation;
            self.shared.set_status(&mut state, PlaybackStatus::Loading);

            match self.acquire_context(&mut state) {
                Ok(context) => (token, context),
                Err(e) => return self.shared.fail(&mut state, e),
            }
        };

        if context.state() == ContextState::Suspended {
            tracing::debug!("Resuming suspended output context");
            if let Err(e) = context.resume().await {
                return self.complete_request(token, context.as_ref(), Err(e));
            }
        }

        if !self.is_current(token) {
            tracing::debug!(token, "Request superseded before fetching speech");
            return PlayOutcome::Cancelled;
        }

        tracing::info!(chars = text.chars().count(), "Requesting synthesized speech");
        let decoded = self.fetch_and_decode(text).await;
        self.complete_request(token, context.as_ref(), decoded)
    }

    /// Stop playback and invalidate any in-flight request.
    ///
    /// Idempotent: a no-op when already idle.
    pub fn stop(&self) {
        let mut state = self.shared.lock();
        self.shared.halt(&mut state);
    }

    /// Halt playback and release the output context.
    ///
    /// Runs at most once; also invoked on drop.
    pub fn dispose(&self) {
        let mut state = self.shared.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;

        self.shared.halt(&mut state);

        if let Some(context) = state.context.take() {
            context.close();
            tracing::info!("Released audio output context");
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn is_current(&self, token: u64) -> bool {
        let state = self.shared.lock();
        state.generation == token && state.status == PlaybackStatus::Loading
    }

    /// Reuse the context, or open one if there is none (or it was closed
    /// underneath us).
    fn acquire_context(
        &self,
        state: &mut ControllerState,
    ) -> Result<Arc<dyn OutputContext>, PlaybackError> {
        if let Some(context) = &state.context {
            if context.state() != ContextState::Closed {
                return Ok(Arc::clone(context));
            }
            tracing::warn!("Output context was closed externally, reopening");
        }

        let context = self.backend.open(self.config.sample_rate)?;
        tracing::info!(sample_rate = self.config.sample_rate, "Opened audio output context");
        state.context = Some(Arc::clone(&context));
        Ok(context)
    }

    async fn fetch_and_decode(&self, text: &str) -> Result<DecodedAudioBuffer, PlaybackError> {
        let payload = self.speech.synthesize_speech(text).await?;
        let buffer = pcm::decode_base64(&payload, self.config.sample_rate, self.config.channels)?;
        Ok(buffer)
    }

    /// Apply the result of request `token`, unless it has been superseded.
    fn complete_request(
        &self,
        token: u64,
        context: &dyn OutputContext,
        result: Result<DecodedAudioBuffer, PlaybackError>,
    ) -> PlayOutcome {
        let mut state = self.shared.lock();

        if state.generation != token || state.status != PlaybackStatus::Loading {
            tracing::debug!(token, "Discarding stale speech response");
            return PlayOutcome::Cancelled;
        }

        let buffer = match result {
            Ok(buffer) => buffer,
            Err(e) => return self.shared.fail(&mut state, e),
        };

        if buffer.is_empty() {
            tracing::info!("Speech payload held no audio frames, nothing to play");
            self.shared.set_status(&mut state, PlaybackStatus::Idle);
            return PlayOutcome::Empty;
        }

        let duration = buffer.duration();
        let on_ended = Shared::ended_callback(Arc::downgrade(&self.shared), token);
        match context.start(buffer, on_ended) {
            Ok(source) => {
                state.session = Some(PlaybackSession { id: token, source });
                self.shared.set_status(&mut state, PlaybackStatus::Playing);
                tracing::info!(duration_ms = duration.as_millis(), "Speech playback started");
                PlayOutcome::Started
            }
            Err(e) => self.shared.fail(&mut state, e),
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}
