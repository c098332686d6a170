//! Audio playback pipeline
//!
//! Decodes base64 raw-PCM speech payloads into normalized samples and plays
//! them through a single-slot session on the system output device.

mod pcm;
mod playback;
mod sink;

pub use pcm::{
    AudioSampleBuffer, CHANNELS, SAMPLE_RATE, decode_payload, pcm_to_samples, samples_to_wav,
};
pub use playback::{AudioPlayback, PlaybackSession, SessionState, effective_rate};
pub use sink::{AudioSink, Completion, CpalSink, FakeSink, SinkEvent, SinkStream};
