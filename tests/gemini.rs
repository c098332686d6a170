//! Gemini wire-type integration tests
//!
//! Verifies request shapes and response extraction against captured API
//! payloads, without network access.

use gemini_deck::gemini::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Modality,
    SpeechConfig, ThinkingConfig, Tool, Voice,
};

#[test]
fn speech_request_matches_api_shape() {
    let request = GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: vec![gemini_deck::gemini::Part::text("Hello there")],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: vec![Modality::Audio],
            speech_config: Some(SpeechConfig::for_voice(Voice::Fenrir)),
            ..GenerationConfig::default()
        }),
        tools: vec![],
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "contents": [{ "parts": [{ "text": "Hello there" }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": "Fenrir" }
                    }
                }
            }
        })
    );
}

#[test]
fn thinking_request_carries_budget() {
    let request = GenerateContentRequest {
        contents: vec![Content::user_text("summarize this")],
        generation_config: Some(GenerationConfig {
            thinking_config: Some(ThinkingConfig {
                thinking_budget: 32768,
            }),
            ..GenerationConfig::default()
        }),
        tools: vec![],
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(
        json["generationConfig"]["thinkingConfig"]["thinkingBudget"],
        32768
    );
}

#[test]
fn grounded_request_enables_google_search() {
    let request = GenerateContentRequest {
        contents: vec![Content::user_text("latest rust release")],
        generation_config: None,
        tools: vec![Tool::google_search()],
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["tools"], serde_json::json!([{ "googleSearch": {} }]));
}

#[test]
fn tts_response_payload_feeds_the_audio_pipeline() {
    // A captured-style TTS response: inline base64 PCM, no text parts
    let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "inlineData": {
                        "mimeType": "audio/L16;codec=pcm;rate=24000",
                        "data": "AEAAwA=="
                    }
                }]
            }
        }]
    }))
    .unwrap();

    let payload = response.first_inline_data().unwrap().data.clone();
    let bytes = gemini_deck::audio::decode_payload(&payload).unwrap();
    let samples = gemini_deck::audio::pcm_to_samples(&bytes);

    assert_eq!(samples, vec![0.5, -0.5]);
}

#[test]
fn grounded_response_skips_chunks_without_web_source() {
    let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "grounded answer" }] },
            "groundingMetadata": {
                "groundingChunks": [
                    { "web": { "uri": "https://a.example", "title": "A" } },
                    {},
                    { "web": { "uri": "https://b.example", "title": null } }
                ]
            }
        }]
    }))
    .unwrap();

    let sources = response.web_sources();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].uri.as_deref(), Some("https://a.example"));
    assert_eq!(sources[1].title, None);
}

#[test]
fn unknown_response_fields_are_ignored() {
    let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "hi", "thought": false }] },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": { "totalTokenCount": 5 }
    }))
    .unwrap();

    assert_eq!(response.text().unwrap(), "hi");
}

#[test]
fn voice_presets_roundtrip_through_display() {
    for voice in Voice::ALL {
        let parsed: Voice = voice.to_string().parse().unwrap();
        assert_eq!(parsed, voice);
    }
    assert_eq!(Voice::default(), Voice::Kore);
}
