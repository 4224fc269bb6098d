//! Speak command handler.
//!
//! Drives a [`PlaybackController`] until the audio finishes, fails, or the
//! user presses Ctrl-C. The controller is disposed on every exit path.

use std::sync::Arc;

use medreport_voice::{
    OutputBackend, PlayOutcome, PlaybackConfig, PlaybackController, PlaybackEvent,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the speak command.
pub async fn execute(ctx: &CliContext, text: &str) -> Result<(), CliError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CliError::Arguments("请输入要朗读的文字".to_string()));
    }
    read_aloud(ctx, text).await
}

/// Read `text` aloud on the default output device.
#[cfg(feature = "playback")]
pub async fn read_aloud(ctx: &CliContext, text: &str) -> Result<(), CliError> {
    play_until_done(ctx, Arc::new(medreport_voice::RodioBackend), text).await
}

/// Read `text` aloud on the default output device.
///
/// This build has no audio output, so this always fails.
#[cfg(not(feature = "playback"))]
#[allow(clippy::unused_async)]
pub async fn read_aloud(_ctx: &CliContext, _text: &str) -> Result<(), CliError> {
    Err(CliError::Config(
        "this build has no audio output; rebuild with `--features playback`".to_string(),
    ))
}

/// Play `text` through `backend` and wait for the playback to end.
pub async fn play_until_done(
    ctx: &CliContext,
    backend: Arc<dyn OutputBackend>,
    text: &str,
) -> Result<(), CliError> {
    let (controller, mut events) =
        PlaybackController::new(Arc::clone(&ctx.speech), backend, PlaybackConfig::default());

    eprintln!("正在生成语音...");
    let outcome = tokio::select! {
        outcome = controller.play(text) => outcome,
        _ = tokio::signal::ctrl_c() => {
            controller.dispose();
            eprintln!("已取消");
            return Ok(());
        }
    };

    match outcome {
        PlayOutcome::Started => eprintln!("正在播放，按 Ctrl-C 停止"),
        PlayOutcome::Failed(e) => {
            controller.dispose();
            return Err(e.into());
        }
        PlayOutcome::Empty => {
            eprintln!("没有可播放的语音");
            controller.dispose();
            return Ok(());
        }
        PlayOutcome::Stopped | PlayOutcome::Cancelled | PlayOutcome::Ignored => {
            controller.dispose();
            return Ok(());
        }
    }

    let result = loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(PlaybackEvent::Finished) | None => break Ok(()),
                Some(PlaybackEvent::Failed { message }) => break Err(CliError::Playback(message)),
                Some(PlaybackEvent::StatusChanged(status)) => {
                    tracing::debug!(?status, "Playback status changed");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                controller.stop();
                eprintln!("已停止播放");
                break Ok(());
            }
        }
    };

    controller.dispose();
    result
}
