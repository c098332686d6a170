//! Speech synthesis orchestration
//!
//! Ties the Gemini TTS call to the local playback pipeline: one user action
//! becomes remote call, base64 decode, PCM conversion, and playback start.

use crate::audio::{AudioPlayback, AudioSampleBuffer, CHANNELS, SAMPLE_RATE, decode_payload};
use crate::gemini::{GeminiClient, Voice};
use crate::Result;

/// Synthesizes text and plays it through the output device
pub struct SpeechService {
    client: GeminiClient,
    playback: AudioPlayback,
}

impl SpeechService {
    /// Create a service bound to the default output device
    ///
    /// # Errors
    ///
    /// Returns error if the audio device cannot be opened
    pub fn new(client: GeminiClient) -> Result<Self> {
        Ok(Self {
            client,
            playback: AudioPlayback::new()?,
        })
    }

    /// Create a service over an existing playback instance
    #[must_use]
    pub const fn with_playback(client: GeminiClient, playback: AudioPlayback) -> Self {
        Self { client, playback }
    }

    /// Synthesize `text` and decode it into a playable buffer
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails or the payload is not valid base64
    pub async fn synthesize_buffer(&self, text: &str, voice: Voice) -> Result<AudioSampleBuffer> {
        let payload = self.client.synthesize(text, voice).await?;
        let bytes = decode_payload(&payload)?;
        tracing::debug!(bytes = bytes.len(), voice = %voice, "decoded speech payload");
        Ok(AudioSampleBuffer::from_pcm(&bytes, SAMPLE_RATE, CHANNELS))
    }

    /// Synthesize `text` and start playing it
    ///
    /// Returns once playback has started, not when it finishes; any session
    /// already playing is stopped first. Completion can be observed through
    /// [`Self::is_playing`].
    ///
    /// # Errors
    ///
    /// Returns error if synthesis, decoding, or playback startup fails; no
    /// session is left behind on failure
    pub async fn generate_and_play(
        &mut self,
        text: &str,
        voice: Voice,
        speed: f32,
        pitch: f32,
    ) -> Result<()> {
        let buffer = self.synthesize_buffer(text, voice).await?;
        self.playback.play(buffer, speed, pitch)
    }

    /// Whether a playback session is currently emitting audio
    pub fn is_playing(&mut self) -> bool {
        self.playback.is_playing()
    }

    /// Cancel the active playback session, if any
    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Block until the active session finishes
    pub fn wait(&mut self) {
        self.playback.wait();
    }

    /// The underlying playback pipeline
    pub const fn playback_mut(&mut self) -> &mut AudioPlayback {
        &mut self.playback
    }
}
