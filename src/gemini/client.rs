//! Gemini API client
//!
//! One thin client over the `generateContent` endpoint, with a method per
//! panel operation: quick Q&A, chat, document analysis, grounded search,
//! image editing, and speech synthesis.

use base64::Engine;

use super::types::{
    Content, GenerateContentRequest, GenerationConfig, Modality, Part, SpeechConfig,
    ThinkingConfig, Tool, Voice,
};
use crate::{Error, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Thinking-mode token budget for document analysis
const THINKING_BUDGET: u32 = 32768;

/// Model identifiers, one per operation
#[derive(Debug, Clone)]
pub struct Models {
    /// Quick low-latency Q&A
    pub quick: String,
    /// Multi-turn chat and grounded search
    pub chat: String,
    /// Document analysis, standard mode
    pub analyze: String,
    /// Document analysis, thinking mode
    pub analyze_thinking: String,
    /// Image editing
    pub image: String,
    /// Speech synthesis
    pub tts: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            quick: "gemini-flash-lite-latest".to_string(),
            chat: "gemini-2.5-flash".to_string(),
            analyze: "gemini-2.5-flash".to_string(),
            analyze_thinking: "gemini-2.5-pro".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
            tts: "gemini-2.5-flash-preview-tts".to_string(),
        }
    }
}

/// A grounded search answer with its source citations
#[derive(Debug)]
pub struct GroundedAnswer {
    /// The answer text
    pub text: String,
    /// Web sources cited by the model
    pub sources: Vec<SourceLink>,
}

/// One web citation backing a grounded answer
#[derive(Debug, Clone)]
pub struct SourceLink {
    /// Page title, or the URI when no title was returned
    pub title: String,
    /// Source URI
    pub uri: String,
}

/// An edited image returned by the model
#[derive(Debug)]
pub struct EditedImage {
    /// MIME type of the image bytes
    pub mime_type: String,
    /// Decoded image bytes
    pub bytes: Vec<u8>,
}

/// Client for the Gemini `generateContent` API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    models: Models,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_models(api_key, Models::default())
    }

    /// Create a new client with custom model identifiers
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn with_models(api_key: String, models: Models) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Gemini API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            models,
        })
    }

    /// Quick low-latency answer to a single prompt
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no text
    pub async fn quick_response(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            ..GenerateContentRequest::default()
        };

        let response = self.generate(&self.models.quick, &request).await?;
        response
            .text()
            .ok_or_else(|| Error::Remote("empty response".to_string()))
    }

    /// Summarize a document, optionally with extended thinking
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no text
    pub async fn analyze_document(&self, document: &str, thinking: bool) -> Result<String> {
        let model = if thinking {
            &self.models.analyze_thinking
        } else {
            &self.models.analyze
        };

        let generation_config = thinking.then(|| GenerationConfig {
            thinking_config: Some(ThinkingConfig {
                thinking_budget: THINKING_BUDGET,
            }),
            ..GenerationConfig::default()
        });

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(format!(
                "Analyze the following document and provide a comprehensive summary:\n\n{document}"
            ))],
            generation_config,
            tools: vec![],
        };

        let response = self.generate(model, &request).await?;
        response
            .text()
            .ok_or_else(|| Error::Remote("empty response".to_string()))
    }

    /// Answer a query grounded in Google Search results
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no text
    pub async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(query)],
            generation_config: None,
            tools: vec![Tool::google_search()],
        };

        let response = self.generate(&self.models.chat, &request).await?;
        let text = response
            .text()
            .ok_or_else(|| Error::Remote("empty response".to_string()))?;

        let sources = response
            .web_sources()
            .into_iter()
            .filter_map(|source| {
                let uri = source.uri.filter(|u| !u.is_empty())?;
                let title = source
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| uri.clone());
                Some(SourceLink { title, uri })
            })
            .collect();

        Ok(GroundedAnswer { text, sources })
    }

    /// Edit an image according to a prompt
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no image
    pub async fn edit_image(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<EditedImage> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::inline_data(mime_type, encoded), Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Image],
                ..GenerationConfig::default()
            }),
            tools: vec![],
        };

        let response = self.generate(&self.models.image, &request).await?;
        let inline = response
            .first_inline_data()
            .ok_or_else(|| Error::Remote("no image in response".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| Error::Remote(format!("undecodable image payload: {e}")))?;

        Ok(EditedImage {
            mime_type: inline.mime_type.clone(),
            bytes,
        })
    }

    /// Synthesize speech, returning the base64 PCM payload
    ///
    /// The payload is headerless 16-bit little-endian PCM at 24 kHz mono;
    /// decoding and playback belong to [`crate::audio`].
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no audio payload
    pub async fn synthesize(&self, text: &str, voice: Voice) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::text(text)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Audio],
                speech_config: Some(SpeechConfig::for_voice(voice)),
                ..GenerationConfig::default()
            }),
            tools: vec![],
        };

        let response = self.generate(&self.models.tts, &request).await?;
        response
            .first_inline_data()
            .map(|inline| inline.data.clone())
            .ok_or_else(|| Error::Remote("no audio payload in response".to_string()))
    }

    /// Begin a multi-turn chat session
    #[must_use]
    pub fn start_chat(&self) -> ChatSession {
        ChatSession {
            client: self.clone(),
            history: Vec::new(),
        }
    }

    /// POST a request to `{model}:generateContent`
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<super::types::GenerateContentResponse> {
        let url = format!("{API_BASE}/{model}:generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!("API error {status}: {body}")));
        }

        let parsed = response
            .json()
            .await
            .map_err(|e| Error::Remote(format!("parse error: {e}")))?;

        tracing::debug!(model, "generateContent call succeeded");
        Ok(parsed)
    }
}

/// A multi-turn conversation with in-memory history
///
/// History is not persisted anywhere; it lives and dies with the session.
pub struct ChatSession {
    client: GeminiClient,
    history: Vec<Content>,
}

impl ChatSession {
    /// Send a message and return the model's reply
    ///
    /// The full history is posted on every turn. On failure the user turn
    /// is rolled back so the history stays consistent.
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or returns no text
    pub async fn send(&mut self, message: &str) -> Result<String> {
        self.history.push(Content::user_text(message));

        let request = GenerateContentRequest {
            contents: self.history.clone(),
            ..GenerateContentRequest::default()
        };

        let reply = match self
            .client
            .generate(&self.client.models.chat, &request)
            .await
            .and_then(|r| {
                r.text()
                    .ok_or_else(|| Error::Remote("empty response".to_string()))
            }) {
            Ok(reply) => reply,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        self.history.push(Content::model_text(reply.clone()));
        Ok(reply)
    }

    /// Number of turns exchanged so far (user and model combined)
    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.history.len()
    }
}

/// Guess an image MIME type from a file extension
#[must_use]
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        // jpeg, jpg, and any unknown type default to jpeg
        _ => "image/jpeg",
    }
}
