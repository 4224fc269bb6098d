//! Integration tests for the `PlaybackController` state machine.
//!
//! A scripted speech service and an in-memory output backend stand in for
//! the network and the audio hardware. The speech service can be gated so a
//! test can act while a request is in flight, and the output context hands
//! out its completion callbacks so a test decides when audio "ends".
//!
//! # What is tested
//!
//! - Initial idle state, idempotent `stop`
//! - Toggle (play while playing) and cancel (play while loading)
//! - Stale speech responses and stale completion callbacks are ignored
//! - End-to-end: 1 s of 24 kHz speech plays and finishes
//! - Failures reset to idle with one notification
//! - Suspended contexts are resumed; contexts are reused
//! - `dispose` halts playback and closes the context exactly once

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use medreport_core::{ServiceError, SpeechSynthesizer};
use medreport_voice::{
    ContextState, DecodedAudioBuffer, EndedCallback, MalformedAudioError, OutputBackend,
    OutputContext, OutputSource, PLAYBACK_FAILED_MESSAGE, PlayOutcome, PlaybackConfig,
    PlaybackController, PlaybackError, PlaybackEvent, PlaybackStatus,
};
use tokio::sync::{Notify, mpsc};

const SUMMARY: &str = "您的身体状况总体良好";

// ── Fake speech service ────────────────────────────────────────────

struct FakeSpeech {
    reply: Result<String, ServiceError>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeSpeech {
    fn replying(reply: Result<String, ServiceError>) -> Self {
        Self {
            reply,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold every response until `gate` is notified.
    fn gated(reply: Result<String, ServiceError>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::replying(reply)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize_speech(&self, _text: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

// ── Fake output hardware ───────────────────────────────────────────

#[derive(Default)]
struct SourceProbe {
    stops: AtomicUsize,
    ended: AtomicBool,
}

struct FakeSource {
    probe: Arc<SourceProbe>,
}

impl OutputSource for FakeSource {
    fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.probe.ended.swap(true, Ordering::SeqCst) {
            return Err(PlaybackError::SourceEnded);
        }
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeContext {
    state: Mutex<ContextState>,
    resume_fails: bool,
    resumes: AtomicUsize,
    closes: AtomicUsize,
    callbacks: Mutex<Vec<Option<EndedCallback>>>,
    sources: Mutex<Vec<Arc<SourceProbe>>>,
    buffers: Mutex<Vec<DecodedAudioBuffer>>,
}

impl FakeContext {
    fn new(state: ContextState) -> Self {
        Self {
            state: Mutex::new(state),
            resume_fails: false,
            resumes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            callbacks: Mutex::new(Vec::new()),
            sources: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
        }
    }

    fn starts(&self) -> usize {
        self.sources.lock().unwrap().len()
    }

    fn source(&self, index: usize) -> Arc<SourceProbe> {
        Arc::clone(&self.sources.lock().unwrap()[index])
    }

    /// Let source `index` play to its end.
    fn finish(&self, index: usize) {
        self.source(index).ended.store(true, Ordering::SeqCst);
        let callback = self.callbacks.lock().unwrap()[index].take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

#[async_trait]
impl OutputContext for FakeContext {
    fn state(&self) -> ContextState {
        *self.state.lock().unwrap()
    }

    async fn resume(&self) -> Result<(), PlaybackError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        if self.resume_fails {
            return Err(PlaybackError::HardwareUnavailable("resume refused".into()));
        }
        *self.state.lock().unwrap() = ContextState::Running;
        Ok(())
    }

    fn start(
        &self,
        buffer: DecodedAudioBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn OutputSource>, PlaybackError> {
        let probe = Arc::new(SourceProbe::default());
        self.sources.lock().unwrap().push(Arc::clone(&probe));
        self.callbacks.lock().unwrap().push(Some(on_ended));
        self.buffers.lock().unwrap().push(buffer);
        Ok(Box::new(FakeSource { probe }))
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = ContextState::Closed;
    }
}

struct FakeBackend {
    context: Arc<FakeContext>,
    opens: AtomicUsize,
}

impl OutputBackend for FakeBackend {
    fn open(&self, _sample_rate: u32) -> Result<Arc<dyn OutputContext>, PlaybackError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.context) as Arc<dyn OutputContext>)
    }
}

// ── Harness ────────────────────────────────────────────────────────

struct Harness {
    controller: Arc<PlaybackController>,
    rx: mpsc::UnboundedReceiver<PlaybackEvent>,
    speech: Arc<FakeSpeech>,
    backend: Arc<FakeBackend>,
    context: Arc<FakeContext>,
}

impl Harness {
    fn with(speech: FakeSpeech, context: FakeContext) -> Self {
        let speech = Arc::new(speech);
        let context = Arc::new(context);
        let backend = Arc::new(FakeBackend {
            context: Arc::clone(&context),
            opens: AtomicUsize::new(0),
        });
        let (controller, rx) = PlaybackController::new(
            Arc::clone(&speech) as Arc<dyn SpeechSynthesizer>,
            Arc::clone(&backend) as Arc<dyn OutputBackend>,
            PlaybackConfig::default(),
        );
        Self {
            controller: Arc::new(controller),
            rx,
            speech,
            backend,
            context,
        }
    }

    fn new(speech: FakeSpeech) -> Self {
        Self::with(speech, FakeContext::new(ContextState::Running))
    }

    fn opens(&self) -> usize {
        self.backend.opens.load(Ordering::SeqCst)
    }

    /// Start `play` on a separate task and wait until it reports loading.
    async fn spawn_play(&mut self) -> tokio::task::JoinHandle<PlayOutcome> {
        let controller = Arc::clone(&self.controller);
        let handle = tokio::spawn(async move { controller.play(SUMMARY).await });
        loop {
            match self.rx.recv().await {
                Some(PlaybackEvent::StatusChanged(PlaybackStatus::Loading)) => break,
                Some(_) => {}
                None => panic!("event channel closed"),
            }
        }
        tokio::task::yield_now().await;
        handle
    }

    fn drain(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(e) = self.rx.try_recv() {
            events.push(e);
        }
        events
    }
}

/// `seconds` of a quiet sawtooth as base64 PCM16 at 24 kHz mono.
fn speech_payload(seconds: usize) -> String {
    let bytes: Vec<u8> = (0..24_000 * seconds)
        .map(|i| i16::try_from(i % 200).unwrap() * 50)
        .flat_map(i16::to_le_bytes)
        .collect();
    STANDARD.encode(bytes)
}

fn statuses(events: &[PlaybackEvent]) -> Vec<PlaybackStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::StatusChanged(s) => Some(*s),
            _ => None,
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────

#[test]
fn initial_state_is_idle_without_hardware() {
    let h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert!(!h.controller.has_active_session());
    assert_eq!(h.opens(), 0);
}

#[tokio::test]
async fn plays_summary_end_to_end() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));

    let outcome = h.controller.play(SUMMARY).await;
    assert!(matches!(outcome, PlayOutcome::Started));
    assert_eq!(h.controller.status(), PlaybackStatus::Playing);
    assert!(h.controller.has_active_session());
    assert_eq!(
        statuses(&h.drain()),
        [PlaybackStatus::Loading, PlaybackStatus::Playing]
    );

    {
        let buffers = h.context.buffers.lock().unwrap();
        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers[0].frame_count(), 24_000);
        assert_eq!(buffers[0].sample_rate(), 24_000);
        assert_eq!(buffers[0].channel_count(), 1);
        assert_eq!(buffers[0].duration(), std::time::Duration::from_secs(1));
    }

    h.context.finish(0);

    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert!(!h.controller.has_active_session());
    assert_eq!(
        h.drain(),
        [
            PlaybackEvent::StatusChanged(PlaybackStatus::Idle),
            PlaybackEvent::Finished
        ]
    );
}

#[tokio::test]
async fn stop_is_idempotent() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));
    h.drain();

    h.controller.stop();
    h.controller.stop();

    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert!(!h.controller.has_active_session());
    assert_eq!(h.context.source(0).stops.load(Ordering::SeqCst), 1);
    assert_eq!(statuses(&h.drain()), [PlaybackStatus::Idle]);
}

#[tokio::test]
async fn play_while_playing_toggles_off_without_fetching() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(outcome, PlayOutcome::Stopped));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(h.speech.calls(), 1);
    assert_eq!(h.context.starts(), 1);
    assert_eq!(h.context.source(0).stops.load(Ordering::SeqCst), 1);
    assert!(!h.drain().contains(&PlaybackEvent::Finished));
}

#[tokio::test]
async fn response_after_stop_is_discarded() {
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(FakeSpeech::gated(Ok(speech_payload(1)), Arc::clone(&gate)));

    let pending = h.spawn_play().await;
    h.controller.stop();
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);

    gate.notify_waiters();
    let outcome = pending.await.unwrap();

    assert!(matches!(outcome, PlayOutcome::Cancelled));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(h.context.starts(), 0);
    assert!(!h.controller.has_active_session());
}

#[tokio::test]
async fn play_while_loading_cancels_the_request() {
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(FakeSpeech::gated(Ok(speech_payload(1)), Arc::clone(&gate)));

    let pending = h.spawn_play().await;
    let second = h.controller.play(SUMMARY).await;
    assert!(matches!(second, PlayOutcome::Cancelled));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);

    gate.notify_waiters();
    assert!(matches!(pending.await.unwrap(), PlayOutcome::Cancelled));

    assert_eq!(h.speech.calls(), 1);
    assert_eq!(h.context.starts(), 0);
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
}

#[tokio::test]
async fn newer_request_wins_over_stale_one() {
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(FakeSpeech::gated(Ok(speech_payload(1)), Arc::clone(&gate)));

    let first = h.spawn_play().await;
    h.controller.stop();
    let second = h.spawn_play().await;

    gate.notify_waiters();
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert!(matches!(first, PlayOutcome::Cancelled));
    assert!(matches!(second, PlayOutcome::Started));
    assert_eq!(h.context.starts(), 1);
    assert_eq!(h.controller.status(), PlaybackStatus::Playing);
}

#[tokio::test]
async fn completion_of_a_replaced_session_is_ignored() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));

    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Stopped));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));
    h.drain();

    // The first source reports its end late.
    h.context.finish(0);
    assert_eq!(h.controller.status(), PlaybackStatus::Playing);
    assert!(h.controller.has_active_session());
    assert!(h.drain().is_empty());

    h.context.finish(1);
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert!(h.drain().contains(&PlaybackEvent::Finished));
}

#[tokio::test]
async fn fetch_failure_resets_to_idle_with_one_notification() {
    let mut h = Harness::new(FakeSpeech::replying(Err(ServiceError::Speech(
        "No audio data returned".into(),
    ))));

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(outcome, PlayOutcome::Failed(PlaybackError::Fetch(_))));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(
        h.drain(),
        [
            PlaybackEvent::StatusChanged(PlaybackStatus::Loading),
            PlaybackEvent::StatusChanged(PlaybackStatus::Idle),
            PlaybackEvent::Failed {
                message: PLAYBACK_FAILED_MESSAGE.to_string()
            },
        ]
    );
    assert_eq!(h.context.starts(), 0);
}

#[tokio::test]
async fn malformed_payload_fails_playback() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(STANDARD.encode([1u8, 2, 3]))));

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(
        outcome,
        PlayOutcome::Failed(PlaybackError::MalformedAudio(
            MalformedAudioError::OddByteLength(3)
        ))
    ));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    let failures = h
        .drain()
        .into_iter()
        .filter(|e| matches!(e, PlaybackEvent::Failed { .. }))
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn empty_payload_plays_nothing() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(String::new())));

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(outcome, PlayOutcome::Empty));
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(h.context.starts(), 0);
    assert_eq!(
        statuses(&h.drain()),
        [PlaybackStatus::Loading, PlaybackStatus::Idle]
    );
}

#[tokio::test]
async fn suspended_context_is_resumed_before_playing() {
    let h = Harness::with(
        FakeSpeech::replying(Ok(speech_payload(1))),
        FakeContext::new(ContextState::Suspended),
    );

    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));
    assert_eq!(h.context.resumes.load(Ordering::SeqCst), 1);
    assert_eq!(h.context.state(), ContextState::Running);
}

#[tokio::test]
async fn resume_failure_is_reported() {
    let mut context = FakeContext::new(ContextState::Suspended);
    context.resume_fails = true;
    let mut h = Harness::with(FakeSpeech::replying(Ok(speech_payload(1))), context);

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(
        outcome,
        PlayOutcome::Failed(PlaybackError::HardwareUnavailable(_))
    ));
    assert_eq!(h.speech.calls(), 0);
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert!(h.drain().iter().any(|e| matches!(e, PlaybackEvent::Failed { .. })));
}

#[tokio::test]
async fn output_context_is_reused_across_plays() {
    let h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));

    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));
    h.context.finish(0);
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));

    assert_eq!(h.opens(), 1);
    assert_eq!(h.context.starts(), 2);
}

#[tokio::test]
async fn dispose_halts_playback_and_closes_once() {
    let h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));

    h.controller.dispose();
    h.controller.dispose();

    assert!(h.controller.is_disposed());
    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(h.context.source(0).stops.load(Ordering::SeqCst), 1);
    assert_eq!(h.context.closes.load(Ordering::SeqCst), 1);

    let Harness {
        controller, context, ..
    } = h;
    drop(controller);
    assert_eq!(context.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dispose_tolerates_a_source_that_already_ended() {
    let h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));

    // The source ended but its callback has not run yet.
    h.context.source(0).ended.store(true, Ordering::SeqCst);
    h.controller.dispose();

    assert_eq!(h.controller.status(), PlaybackStatus::Idle);
    assert_eq!(h.context.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dispose_while_loading_discards_the_response() {
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(FakeSpeech::gated(Ok(speech_payload(1)), Arc::clone(&gate)));

    let pending = h.spawn_play().await;
    h.controller.dispose();
    gate.notify_waiters();

    assert!(matches!(pending.await.unwrap(), PlayOutcome::Cancelled));
    assert_eq!(h.context.starts(), 0);
    assert_eq!(h.context.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn play_after_dispose_fails() {
    let mut h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    h.controller.dispose();

    let outcome = h.controller.play(SUMMARY).await;

    assert!(matches!(outcome, PlayOutcome::Failed(PlaybackError::Disposed)));
    assert_eq!(h.speech.calls(), 0);
    assert_eq!(h.opens(), 0);
    assert!(matches!(
        h.drain().last(),
        Some(PlaybackEvent::Failed { .. })
    ));
}

#[tokio::test]
async fn dropping_the_controller_disposes_it() {
    let h = Harness::new(FakeSpeech::replying(Ok(speech_payload(1))));
    assert!(matches!(h.controller.play(SUMMARY).await, PlayOutcome::Started));

    let Harness {
        controller, context, ..
    } = h;
    drop(controller);

    assert_eq!(context.source(0).stops.load(Ordering::SeqCst), 1);
    assert_eq!(context.closes.load(Ordering::SeqCst), 1);
}
