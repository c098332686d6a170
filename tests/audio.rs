//! Audio pipeline integration tests
//!
//! Exercises the decode-to-playback path end to end without audio hardware,
//! using the in-memory sink.

use std::io::Cursor;
use std::time::Duration;

use base64::Engine;

use gemini_deck::audio::{
    AudioPlayback, AudioSampleBuffer, FakeSink, SAMPLE_RATE, SessionState, SinkEvent,
    decode_payload, pcm_to_samples, samples_to_wav,
};

/// Base64-encode raw bytes the way the TTS service does
fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[test]
fn payload_to_samples_known_scenario() {
    // int16 values 16384, -16384 little-endian
    let payload = encode(&[0x00, 0x40, 0x00, 0xC0]);

    let bytes = decode_payload(&payload).unwrap();
    let samples = pcm_to_samples(&bytes);

    assert_eq!(samples, vec![0.5, -0.5]);
}

#[test]
fn empty_payload_is_invalid_and_starts_no_session() {
    let sink = FakeSink::new();
    let mut playback = AudioPlayback::with_sink(Box::new(sink.clone()));

    let result = decode_payload("");
    assert!(result.is_err());

    // Nothing reached the sink and the pipeline stayed idle
    assert!(sink.events().is_empty());
    assert_eq!(playback.state(), SessionState::Idle);
}

#[test]
fn even_length_payload_yields_half_as_many_samples() {
    let bytes: Vec<u8> = (0..=255).collect();
    let payload = encode(&bytes);

    let decoded = decode_payload(&payload).unwrap();
    let samples = pcm_to_samples(&decoded);

    assert_eq!(samples.len(), decoded.len() / 2);
    assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn odd_length_payload_truncates_without_error() {
    let payload = encode(&[0x00, 0x40, 0xAB]);

    let decoded = decode_payload(&payload).unwrap();
    let samples = pcm_to_samples(&decoded);

    assert_eq!(samples, vec![0.5]);
}

#[test]
fn decoded_payload_plays_through_pipeline() {
    let sink = FakeSink::new();
    let mut playback = AudioPlayback::with_sink(Box::new(sink.clone()));

    let payload = encode(&[0x00, 0x40, 0x00, 0xC0]);
    let bytes = decode_payload(&payload).unwrap();
    let buffer = AudioSampleBuffer::from_pcm(&bytes, SAMPLE_RATE, 1);

    playback.play(buffer, 1.0, 0.0).unwrap();
    assert!(playback.is_playing());

    sink.finish_last();
    assert_eq!(playback.state(), SessionState::Completed);
}

#[test]
fn replaying_enforces_stop_before_start() {
    let sink = FakeSink::new();
    let mut playback = AudioPlayback::with_sink(Box::new(sink.clone()));

    let buffer = AudioSampleBuffer::from_samples(vec![0.0; 4800]);
    playback.play(buffer.clone(), 1.0, 0.0).unwrap();
    playback.play(buffer.clone(), 1.0, 0.0).unwrap();
    playback.play(buffer, 1.0, 0.0).unwrap();

    // Every stream was dropped before its successor started
    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::Started(0),
            SinkEvent::Dropped(0),
            SinkEvent::Started(1),
            SinkEvent::Dropped(1),
            SinkEvent::Started(2),
        ]
    );
}

#[test]
fn speed_two_halves_wall_duration_and_pitch_twelve_is_1200_cents() {
    let sink = FakeSink::new();
    let mut playback = AudioPlayback::with_sink(Box::new(sink.clone()));

    // Two seconds of audio
    let buffer = AudioSampleBuffer::from_samples(vec![0.0; 2 * SAMPLE_RATE as usize]);
    playback.play(buffer, 2.0, 0.0).unwrap();
    assert_eq!(
        playback.session().unwrap().wall_duration(),
        Duration::from_secs(1)
    );

    let buffer = AudioSampleBuffer::from_samples(vec![0.0; SAMPLE_RATE as usize]);
    playback.play(buffer, 1.0, 12.0).unwrap();
    let session = playback.session().unwrap();
    assert!((session.detune_cents() - 1200.0).abs() < f32::EPSILON);
    // +12 semitones doubles the effective rate
    assert!((sink.rates()[1] - 2.0).abs() < 1e-6);
}

#[test]
fn stop_is_a_no_op_on_idle_and_completed_sessions() {
    let sink = FakeSink::new();
    let mut playback = AudioPlayback::with_sink(Box::new(sink.clone()));

    // Idle
    playback.stop();
    assert_eq!(playback.state(), SessionState::Idle);
    assert!(sink.events().is_empty());

    // Completed
    let buffer = AudioSampleBuffer::from_samples(vec![0.0; 240]);
    playback.play(buffer, 1.0, 0.0).unwrap();
    sink.finish_last();
    assert_eq!(playback.state(), SessionState::Completed);
    playback.stop();
    assert_eq!(playback.state(), SessionState::Completed);
}

#[test]
fn wav_export_roundtrip() {
    let payload = encode(&[0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F]);
    let bytes = decode_payload(&payload).unwrap();
    let samples = pcm_to_samples(&bytes);

    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let cursor = Cursor::new(wav_data);
    let mut reader = hound::WavReader::new(cursor).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), samples.len());
}
