//! Single-slot playback sessions
//!
//! The output device is an exclusive resource: at most one session plays at
//! a time, and starting a new one stops whatever came before it. A session
//! moves `Idle -> Playing -> {Completed | Stopped}`; both end states are
//! terminal.

use std::time::Duration;

use super::pcm::AudioSampleBuffer;
use super::sink::{AudioSink, Completion, CpalSink, SinkStream};
use crate::Result;

/// Cents per semitone for detune conversion
const CENTS_PER_SEMITONE: f32 = 100.0;

/// Poll interval while waiting for playback to finish
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Lifecycle of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has started
    Idle,
    /// Audio is being emitted
    Playing,
    /// Playback reached the natural end of the buffer
    Completed,
    /// Playback was cancelled before the end of the buffer
    Stopped,
}

/// One in-flight or finished playback
pub struct PlaybackSession {
    state: SessionState,
    stream: Option<Box<dyn SinkStream>>,
    completion: Completion,
    detune_cents: f32,
    wall_duration: Duration,
}

impl PlaybackSession {
    /// Current state, observing natural completion
    pub fn state(&mut self) -> SessionState {
        if self.state == SessionState::Playing && self.completion.is_done() {
            self.state = SessionState::Completed;
            self.stream = None;
        }
        self.state
    }

    /// Detune applied to this session, in cents
    #[must_use]
    pub const fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    /// Expected wall-clock duration after speed and detune scaling
    #[must_use]
    pub const fn wall_duration(&self) -> Duration {
        self.wall_duration
    }

    /// Cancel playback; a no-op once the session is terminal
    pub fn stop(&mut self) {
        if self.state() == SessionState::Playing {
            self.stream = None;
            self.state = SessionState::Stopped;
            tracing::debug!("playback session stopped");
        }
    }
}

/// Combined rate multiplier for a speed factor and a detune in cents
///
/// Detune shifts pitch by `2^(cents / 1200)`, the same scaling the Web
/// Audio `detune` parameter applies on top of `playbackRate`.
#[must_use]
pub fn effective_rate(speed: f32, detune_cents: f32) -> f64 {
    f64::from(speed) * 2.0_f64.powf(f64::from(detune_cents) / 1200.0)
}

/// Owns the output device slot and the active session, if any
pub struct AudioPlayback {
    sink: Box<dyn AudioSink>,
    session: Option<PlaybackSession>,
}

impl AudioPlayback {
    /// Create a playback instance bound to the default output device
    ///
    /// # Errors
    ///
    /// Returns error if the audio device cannot be opened
    pub fn new() -> Result<Self> {
        Ok(Self::with_sink(Box::new(CpalSink::new()?)))
    }

    /// Create a playback instance over an arbitrary sink
    #[must_use]
    pub fn with_sink(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            session: None,
        }
    }

    /// Start playing a buffer, replacing any active session
    ///
    /// `speed` is a rate multiplier (UI range 0.5 to 2.0), `pitch` a shift
    /// in semitones (UI range -12 to 12); neither is validated here. The
    /// previous session, if still playing, is stopped before the new stream
    /// starts. Returns as soon as playback has begun.
    ///
    /// # Errors
    ///
    /// Returns error if the sink cannot start the stream; no session is
    /// left behind on failure
    pub fn play(&mut self, buffer: AudioSampleBuffer, speed: f32, pitch: f32) -> Result<()> {
        self.play_with(buffer, speed, pitch, None)
    }

    /// Like [`Self::play`], invoking `on_complete` if the buffer plays to
    /// its natural end; cancellation does not invoke it
    ///
    /// # Errors
    ///
    /// Returns error if the sink cannot start the stream
    pub fn play_with(
        &mut self,
        buffer: AudioSampleBuffer,
        speed: f32,
        pitch: f32,
        on_complete: Option<Box<dyn FnOnce() + Send>>,
    ) -> Result<()> {
        // Single-slot device: stop before start
        self.stop();
        self.session = None;

        let detune_cents = pitch * CENTS_PER_SEMITONE;
        let rate = effective_rate(speed, detune_cents);
        let wall_duration = if rate > 0.0 {
            buffer.duration().div_f64(rate)
        } else {
            Duration::ZERO
        };

        tracing::debug!(
            samples = buffer.len(),
            speed,
            detune_cents,
            rate,
            "starting playback"
        );

        let completion = Completion::new(on_complete);
        let stream = self.sink.start(buffer, rate, completion.clone())?;

        self.session = Some(PlaybackSession {
            state: SessionState::Playing,
            stream: Some(stream),
            completion,
            detune_cents,
            wall_duration,
        });

        Ok(())
    }

    /// Stop the active session, if any; idempotent
    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    /// Current session state, `Idle` when nothing has played
    pub fn state(&mut self) -> SessionState {
        self.session
            .as_mut()
            .map_or(SessionState::Idle, PlaybackSession::state)
    }

    /// Whether a session is currently emitting audio
    pub fn is_playing(&mut self) -> bool {
        self.state() == SessionState::Playing
    }

    /// The current session, if one exists
    #[must_use]
    pub const fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Block until the active session completes or its expected duration
    /// (plus a grace period) elapses
    pub fn wait(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.state != SessionState::Playing {
            return;
        }

        let completion = session.completion.clone();
        let timeout = session.wall_duration + Duration::from_millis(500);
        let start = std::time::Instant::now();

        while !completion.is_done() {
            if start.elapsed() > timeout {
                break;
            }
            std::thread::sleep(WAIT_POLL);
        }

        // Let the device drain its last buffer
        std::thread::sleep(Duration::from_millis(100));
        self.state();
    }
}
