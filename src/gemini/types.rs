//! Wire types for the Gemini `generateContent` endpoint
//!
//! Only the fields this crate sends or reads are modeled; everything else
//! in the API response is ignored during deserialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Prebuilt TTS voice presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voice {
    /// Balanced default voice
    #[default]
    Kore,
    /// Bright, upbeat voice
    Puck,
    /// Deep, informative voice
    Charon,
    /// Intense, excitable voice
    Fenrir,
    /// Breezy, melodic voice
    Aoede,
}

impl Voice {
    /// All known presets
    pub const ALL: [Self; 5] = [Self::Kore, Self::Puck, Self::Charon, Self::Fenrir, Self::Aoede];

    /// The preset name expected by the API
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kore => "Kore",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
            Self::Aoede => "Aoede",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown voice '{s}' (expected one of: Kore, Puck, Charon, Fenrir, Aoede)"
                ))
            })
    }
}

/// Response modality requested from the model
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
    Audio,
}

/// A `generateContent` request body
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// A turn of content: a role plus its parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn with one text part
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn with one text part
    #[must_use]
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// A content part: text or inline binary data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// A plain text part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// An inline-data part (base64 payload plus MIME type)
    #[must_use]
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Self::default()
        }
    }
}

/// Base64-encoded binary data with its MIME type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Generation options
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<Modality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Thinking-mode budget
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

/// Speech synthesis options
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl SpeechConfig {
    /// Speech config for a voice preset
    #[must_use]
    pub fn for_voice(voice: Voice) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice.as_str().to_string(),
                },
            },
        }
    }
}

/// A tool made available to the model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    /// The built-in Google Search grounding tool
    #[must_use]
    pub const fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

/// Marker object enabling search grounding
#[derive(Debug, Serialize)]
pub struct GoogleSearch {}

/// A `generateContent` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One response candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Grounding citations attached to a candidate
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// One grounding citation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

/// A web source backing a grounding chunk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text.join(""))
        }
    }

    /// First inline-data part of the first candidate, if any
    #[must_use]
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }

    /// Web sources from the first candidate's grounding metadata
    #[must_use]
    pub fn web_sources(&self) -> Vec<WebSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_parses_case_insensitively() {
        assert_eq!("kore".parse::<Voice>().unwrap(), Voice::Kore);
        assert_eq!("PUCK".parse::<Voice>().unwrap(), Voice::Puck);
        assert_eq!(" Aoede ".parse::<Voice>().unwrap(), Voice::Aoede);
        assert!("alloy".parse::<Voice>().is_err());
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Audio],
                thinking_config: None,
                speech_config: Some(SpeechConfig::for_voice(Voice::Kore)),
            }),
            tools: vec![],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
        // Empty tools list is omitted entirely
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn search_tool_serializes_as_marker_object() {
        let json = serde_json::to_value(Tool::google_search()).unwrap();
        assert_eq!(json, serde_json::json!({ "googleSearch": {} }));
    }

    #[test]
    fn response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Hello, " }, { "text": "world" }]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.text().unwrap(), "Hello, world");
        assert!(response.first_inline_data().is_none());
        assert!(response.web_sources().is_empty());
    }

    #[test]
    fn response_extracts_inline_audio() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
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

        let inline = response.first_inline_data().unwrap();
        assert_eq!(inline.data, "AEAAwA==");
        assert!(inline.mime_type.starts_with("audio/"));
    }

    #[test]
    fn response_extracts_grounding_sources() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "answer" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://example.com", "title": "Example" } },
                        { "web": null }
                    ]
                }
            }]
        }))
        .unwrap();

        let sources = response.web_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].uri.as_deref(), Some("https://example.com"));
        assert_eq!(sources[0].title.as_deref(), Some("Example"));
    }

    #[test]
    fn empty_response_yields_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(response.text().is_none());
        assert!(response.first_inline_data().is_none());
    }
}
