//! Local speaker output through `rodio`.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it lives on a
//! dedicated OS thread for the lifetime of the context. The
//! [`RodioContext`] handed to the controller is a `Send + Sync` proxy that
//! asks that thread for sinks over a channel. Sinks themselves are `Send`
//! and are driven directly from the caller's side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, mpsc};
use std::thread;

use async_trait::async_trait;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::error::PlaybackError;
use crate::output::{ContextState, EndedCallback, OutputBackend, OutputContext, OutputSource};
use crate::pcm::DecodedAudioBuffer;

/// Opens [`RodioContext`]s on the default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioBackend;

impl OutputBackend for RodioBackend {
    fn open(&self, sample_rate: u32) -> Result<Arc<dyn OutputContext>, PlaybackError> {
        // rodio resamples each source to the device rate on its own.
        tracing::debug!(sample_rate, "Opening rodio output");
        Ok(Arc::new(RodioContext::spawn()?))
    }
}

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Create a fresh sink on the output stream.
    CreateSink {
        reply: mpsc::Sender<Result<Sink, PlaybackError>>,
    },

    /// Drop the output stream and exit.
    Shutdown,
}

// ── Context (Send + Sync proxy) ────────────────────────────────────

/// Handle to the audio thread that owns the output stream.
pub struct RodioContext {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    closed: AtomicBool,
}

impl RodioContext {
    /// Spawn the audio thread and open the default output device.
    ///
    /// Device errors are reported back over a one-shot init channel.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), PlaybackError>>();

        let thread = thread::Builder::new()
            .name("medreport-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| {
                PlaybackError::HardwareUnavailable(format!("failed to spawn audio thread: {e}"))
            })?;

        init_rx.recv().map_err(|_| PlaybackError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Mutex::new(Some(thread)),
            closed: AtomicBool::new(false),
        })
    }

    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, PlaybackError>>) -> AudioCommand,
    ) -> Result<T, PlaybackError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| PlaybackError::AudioThreadDied)?;
        rx.recv().map_err(|_| PlaybackError::AudioThreadDied)?
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), PlaybackError>>) {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(PlaybackError::HardwareUnavailable(e.to_string())));
                return;
            }
        };

        tracing::info!("Audio output initialized on default device");
        let _ = init_tx.send(Ok(()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::CreateSink { reply } => {
                    let sink = Sink::try_new(&handle)
                        .map_err(|e| PlaybackError::HardwareUnavailable(e.to_string()));
                    let _ = reply.send(sink);
                }
                AudioCommand::Shutdown => break,
            }
        }

        tracing::debug!("Audio thread exiting");
    }
}

#[async_trait]
impl OutputContext for RodioContext {
    fn state(&self) -> ContextState {
        if self.closed.load(Ordering::SeqCst) {
            ContextState::Closed
        } else {
            ContextState::Running
        }
    }

    async fn resume(&self) -> Result<(), PlaybackError> {
        match self.state() {
            ContextState::Closed => Err(PlaybackError::HardwareUnavailable(
                "output context is closed".into(),
            )),
            _ => Ok(()),
        }
    }

    fn start(
        &self,
        buffer: DecodedAudioBuffer,
        on_ended: EndedCallback,
    ) -> Result<Box<dyn OutputSource>, PlaybackError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PlaybackError::HardwareUnavailable(
                "output context is closed".into(),
            ));
        }

        let sink = Arc::new(self.send_and_recv(|reply| AudioCommand::CreateSink { reply })?);
        sink.append(SamplesBuffer::new(
            buffer.channel_count(),
            buffer.sample_rate(),
            buffer.interleaved(),
        ));

        let stopped = Arc::new(AtomicBool::new(false));
        spawn_completion_watcher(Arc::clone(&sink), Arc::clone(&stopped), on_ended)?;

        Ok(Box::new(RodioSource { sink, stopped }))
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for RodioContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// Block a helper thread until the sink drains, then report a natural end.
///
/// A source halted through [`RodioSource::stop`] has its `stopped` flag set
/// first, so the callback is skipped.
fn spawn_completion_watcher(
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
    on_ended: EndedCallback,
) -> Result<(), PlaybackError> {
    thread::Builder::new()
        .name("medreport-audio-watch".into())
        .spawn(move || {
            sink.sleep_until_end();
            if !stopped.swap(true, Ordering::SeqCst) {
                on_ended();
            }
        })
        .map(|_| ())
        .map_err(|e| PlaybackError::HardwareUnavailable(format!("failed to spawn watcher: {e}")))
}

// ── Source ─────────────────────────────────────────────────────────

struct RodioSource {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

impl OutputSource for RodioSource {
    fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Err(PlaybackError::SourceEnded);
        }
        self.sink.stop();
        Ok(())
    }
}
