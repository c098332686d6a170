//! Gemini API client and wire types

mod client;
mod types;

pub use client::{
    ChatSession, EditedImage, GeminiClient, GroundedAnswer, Models, SourceLink, mime_for_extension,
};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, GroundingChunk, GroundingMetadata, InlineData, Modality, Part,
    PrebuiltVoiceConfig, SpeechConfig, ThinkingConfig, Tool, Voice, VoiceConfig, WebSource,
};
