//! Gemini Deck - multi-panel console for the Gemini generative API
//!
//! This library provides the core functionality behind the `gemdeck` binary:
//! - Quick Q&A, multi-turn chat, document analysis, and grounded web search
//! - Image editing (inline image in, inline image out)
//! - Text-to-speech synthesis and local PCM playback
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      CLI                            │
//! │  ask │ chat │ analyze │ search │ edit-image │ speak │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Gemini client                       │
//! │   generateContent │ grounding │ modalities          │
//! └────────────────────┬────────────────────────────────┘
//!                      │ base64 PCM (speak only)
//! ┌────────────────────▼────────────────────────────────┐
//! │             Audio playback pipeline                 │
//! │   decode │ i16 → f32 │ single-slot session │ cpal   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod gemini;
pub mod speech;

pub use audio::{
    AudioPlayback, AudioSampleBuffer, AudioSink, FakeSink, SessionState, decode_payload,
    pcm_to_samples, samples_to_wav,
};
pub use config::Config;
pub use error::{Error, Result};
pub use gemini::{ChatSession, EditedImage, GeminiClient, GroundedAnswer, SourceLink, Voice};
pub use speech::SpeechService;
