//! Headerless PCM16 decoding.
//!
//! The speech service returns raw signed 16-bit little-endian samples,
//! interleaved frame by frame, wrapped in base64. Decoding is a pure
//! transform: base64 text → bytes → one `f32` plane per channel, each sample
//! divided by 32 768 so it lands in `[-1.0, 1.0)`. No resampling or clipping.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::MalformedAudioError;

/// Sample rate of synthesized speech (Hz).
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of synthesized speech.
pub const SPEECH_CHANNELS: u16 = 1;

/// Divisor mapping `i16` onto `[-1.0, 1.0)`.
const I16_SCALE: f32 = 32_768.0;

/// Decoded audio, stored channel-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudioBuffer {
    /// One plane per channel, each `frame_count` samples long.
    planes: Vec<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl DecodedAudioBuffer {
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn channel_count(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }

    /// True for a zero-frame buffer (plays as nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Samples of one channel, or `None` if `index` is out of range.
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    /// Playing time of the buffer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.sample_rate))
    }

    /// Frame-major (interleaved) copy of the samples, as most output
    /// backends expect.
    #[must_use]
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.planes.len());
        for frame in 0..frames {
            for plane in &self.planes {
                out.push(plane[frame]);
            }
        }
        out
    }
}

/// Decode a base64 PCM16 payload.
///
/// Leading and trailing whitespace is ignored; anything else that is not
/// standard padded base64 is rejected.
pub fn decode_base64(
    payload: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudioBuffer, MalformedAudioError> {
    let bytes = STANDARD.decode(payload.trim())?;
    decode_pcm16(&bytes, sample_rate, channels)
}

/// Decode raw PCM16 LE bytes into per-channel `f32` planes.
///
/// Sample `n` of the input belongs to frame `n / channels`, channel
/// `n % channels`.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<DecodedAudioBuffer, MalformedAudioError> {
    if channels == 0 {
        return Err(MalformedAudioError::ZeroChannels);
    }
    if sample_rate == 0 {
        return Err(MalformedAudioError::ZeroSampleRate);
    }
    if bytes.len() % 2 != 0 {
        return Err(MalformedAudioError::OddByteLength(bytes.len()));
    }

    let channel_count = usize::from(channels);
    let samples = bytes.len() / 2;
    if samples % channel_count != 0 {
        return Err(MalformedAudioError::PartialFrame { samples, channels });
    }

    let frame_count = samples / channel_count;
    let mut planes: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();
    for (index, pair) in bytes.chunks_exact(2).enumerate() {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        planes[index % channel_count].push(f32::from(sample) / I16_SCALE);
    }

    tracing::trace!(frame_count, channels, sample_rate, "Decoded PCM16 payload");

    Ok(DecodedAudioBuffer {
        planes,
        sample_rate,
        channels,
    })
}
