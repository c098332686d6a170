//! Raw PCM decoding for synthesized speech
//!
//! The Gemini TTS endpoint returns headerless 16-bit signed little-endian
//! PCM at 24 kHz mono, wrapped in base64. This module turns that payload
//! into normalized f32 samples ready for the output device.

use base64::Engine;

use crate::{Error, Result};

/// Sample rate of synthesized speech (matches the TTS service contract)
pub const SAMPLE_RATE: u32 = 24000;

/// Channel count of synthesized speech
pub const CHANNELS: u16 = 1;

/// Decode a base64 speech payload into raw PCM bytes
///
/// # Errors
///
/// Returns [`Error::InvalidPayload`] if the payload is empty or not valid
/// base64
pub fn decode_payload(raw: &str) -> Result<Vec<u8>> {
    if raw.is_empty() {
        return Err(Error::InvalidPayload("empty payload".to_string()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| Error::InvalidPayload(e.to_string()))
}

/// Convert little-endian i16 PCM bytes to normalized f32 samples
///
/// Each byte pair becomes one sample in `[-1.0, 1.0]`. A trailing odd byte
/// is dropped rather than rejected, matching conventional PCM tolerance.
#[must_use]
pub fn pcm_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

/// A decoded, playable mono audio buffer
#[derive(Debug, Clone)]
pub struct AudioSampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSampleBuffer {
    /// Build a buffer from raw PCM bytes at the given rate and channel count
    #[must_use]
    pub fn from_pcm(bytes: &[u8], sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: pcm_to_samples(bytes),
            sample_rate,
            channels,
        }
    }

    /// Build a buffer directly from f32 samples at the speech sample rate
    #[must_use]
    pub const fn from_samples(samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
        }
    }

    /// Borrow the normalized samples
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning its samples
    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Number of samples
    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Playback duration at rate 1.0
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(
            self.samples.len() as f64 / f64::from(self.sample_rate) / f64::from(self.channels),
        )
    }
}

/// Convert f32 samples to WAV bytes for export
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
