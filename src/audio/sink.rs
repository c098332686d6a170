//! Output device capability
//!
//! Playback goes through the [`AudioSink`] trait so the pipeline never
//! depends on a concrete audio backend: [`CpalSink`] binds the default
//! system output device, [`FakeSink`] records activity in memory for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use super::pcm::{AudioSampleBuffer, SAMPLE_RATE};
use crate::{Error, Result};

/// Completion signal shared between a playback session and its sink stream
///
/// Fired exactly once, from the sink, when the cursor runs past the end of
/// the buffer. Cancellation never fires it: stopping a session drops the
/// stream before the end is reached.
#[derive(Clone, Default)]
pub struct Completion {
    done: Arc<AtomicBool>,
    on_complete: Arc<Mutex<Option<Box<dyn FnOnce() + Send>>>>,
}

impl Completion {
    /// Create a completion signal with an optional callback
    #[must_use]
    pub fn new(on_complete: Option<Box<dyn FnOnce() + Send>>) -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
            on_complete: Arc::new(Mutex::new(on_complete)),
        }
    }

    /// Mark playback as naturally finished and run the callback once
    pub fn signal(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut slot) = self.on_complete.lock() {
            if let Some(callback) = slot.take() {
                callback();
            }
        }
    }

    /// Whether playback reached the end of the buffer
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}

/// A live output stream; dropping it halts output immediately
pub trait SinkStream {}

/// Buffer-based audio output capability
pub trait AudioSink {
    /// Start emitting the buffer at the given rate multiplier
    ///
    /// The sink fires `completion` when the end of the buffer is reached.
    /// Output stops when the returned stream is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the output device cannot be acquired or the stream
    /// cannot be built
    fn start(
        &self,
        buffer: AudioSampleBuffer,
        rate: f64,
        completion: Completion,
    ) -> Result<Box<dyn SinkStream>>;
}

/// Plays buffers on the default system output device
pub struct CpalSink {
    #[allow(dead_code)]
    device: Device,
    config: StreamConfig,
}

impl CpalSink {
    /// Open the default output device at the speech sample rate
    ///
    /// # Errors
    ///
    /// Returns error if no output device or suitable config is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .or_else(|| {
                // Fallback: try stereo
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2
                        && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                        && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
                })
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio output initialized"
        );

        Ok(Self { device, config })
    }
}

/// Wrapper keeping a cpal stream alive for the session's lifetime
struct CpalStream(#[allow(dead_code)] cpal::Stream);

impl SinkStream for CpalStream {}

impl AudioSink for CpalSink {
    fn start(
        &self,
        buffer: AudioSampleBuffer,
        rate: f64,
        completion: Completion,
    ) -> Result<Box<dyn SinkStream>> {
        let config = self.config.clone();
        let channels = config.channels as usize;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device".to_string()))?;

        // A non-positive rate would never advance the cursor
        let rate = rate.max(0.01);

        let samples = buffer.into_samples();
        let mut pos = 0.0_f64;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        let idx = pos as usize;

                        let value = if idx < samples.len() {
                            #[allow(
                                clippy::cast_possible_truncation,
                                clippy::cast_precision_loss
                            )]
                            let frac = (pos - idx as f64) as f32;
                            let current = samples[idx];
                            let next = samples.get(idx + 1).copied().unwrap_or(0.0);
                            frac.mul_add(next - current, current)
                        } else {
                            completion.signal();
                            0.0
                        };

                        for out in frame.iter_mut() {
                            *out = value;
                        }

                        if idx < samples.len() {
                            pos += rate;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        Ok(Box::new(CpalStream(stream)))
    }
}

/// What a [`FakeSink`] observed, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// A stream started with the given sequence number
    Started(usize),
    /// The stream with the given sequence number was dropped
    Dropped(usize),
}

#[derive(Default)]
struct FakeInner {
    next_id: usize,
    events: Vec<SinkEvent>,
    rates: Vec<f64>,
    completions: Vec<Completion>,
}

/// In-memory sink recording starts, drops, and rates for tests
#[derive(Clone, Default)]
pub struct FakeSink {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakeSink {
    /// Create an empty fake sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The start/drop events observed so far
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.inner.lock().map(|i| i.events.clone()).unwrap_or_default()
    }

    /// The rate multiplier of each started stream, in order
    #[must_use]
    pub fn rates(&self) -> Vec<f64> {
        self.inner.lock().map(|i| i.rates.clone()).unwrap_or_default()
    }

    /// Fire the completion signal of the most recently started stream
    pub fn finish_last(&self) {
        let completion = self
            .inner
            .lock()
            .ok()
            .and_then(|i| i.completions.last().cloned());
        if let Some(completion) = completion {
            completion.signal();
        }
    }
}

struct FakeStream {
    id: usize,
    inner: Arc<Mutex<FakeInner>>,
}

impl SinkStream for FakeStream {}

impl Drop for FakeStream {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.events.push(SinkEvent::Dropped(self.id));
        }
    }
}

impl AudioSink for FakeSink {
    fn start(
        &self,
        _buffer: AudioSampleBuffer,
        rate: f64,
        completion: Completion,
    ) -> Result<Box<dyn SinkStream>> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| Error::Audio("fake sink poisoned".to_string()))?;

        let id = inner.next_id;
        inner.next_id += 1;
        inner.events.push(SinkEvent::Started(id));
        inner.rates.push(rate);
        inner.completions.push(completion);

        Ok(Box::new(FakeStream {
            id,
            inner: Arc::clone(&self.inner),
        }))
    }
}
