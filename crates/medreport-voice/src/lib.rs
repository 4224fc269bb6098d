#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod controller;
pub mod error;
pub mod output;
pub mod pcm;

#[cfg(feature = "rodio")]
pub mod rodio_output;

pub use controller::{
    PlayOutcome, PlaybackConfig, PlaybackController, PlaybackEvent, PlaybackStatus,
};
pub use error::{MalformedAudioError, PLAYBACK_FAILED_MESSAGE, PlaybackError};
pub use output::{ContextState, EndedCallback, OutputBackend, OutputContext, OutputSource};
pub use pcm::{DecodedAudioBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};

#[cfg(feature = "rodio")]
pub use rodio_output::{RodioBackend, RodioContext};
