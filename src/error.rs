//! Error types for gemini-deck

use thiserror::Error;

/// Result type alias for gemini-deck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gemini-deck
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The Gemini API call failed or returned no usable payload
    #[error("remote error: {0}")]
    Remote(String),

    /// Speech payload could not be decoded from base64
    #[error("invalid audio payload: {0}")]
    InvalidPayload(String),

    /// Audio device or stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
