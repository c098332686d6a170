//! Configuration management for gemini-deck

use std::path::PathBuf;

use serde::Deserialize;

use crate::gemini::{Models, Voice};
use crate::{Error, Result};

/// gemini-deck configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key
    pub api_key: String,

    /// Path to data directory (saved audio, edited images)
    pub data_dir: PathBuf,

    /// Model identifier per operation
    pub models: Models,

    /// Speech defaults
    pub tts: TtsConfig,
}

/// Speech synthesis and playback defaults
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Voice preset
    pub voice: Voice,

    /// Playback speed multiplier (0.5 to 2.0)
    pub speed: f32,

    /// Pitch shift in semitones (-12 to 12)
    pub pitch: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: Voice::default(),
            speed: 1.0,
            pitch: 0.0,
        }
    }
}

/// On-disk config file shape (`config.toml` in the project config dir)
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_key: Option<String>,
    #[serde(default)]
    tts: TtsFile,
    #[serde(default)]
    models: ModelsFile,
}

#[derive(Debug, Default, Deserialize)]
struct TtsFile {
    voice: Option<String>,
    speed: Option<f32>,
    pitch: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelsFile {
    quick: Option<String>,
    chat: Option<String>,
    analyze: Option<String>,
    analyze_thinking: Option<String>,
    image: Option<String>,
    tts: Option<String>,
}

/// Return the config file path under the project config directory
fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "omni", "gemini-deck")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load the config file, warning and falling back to defaults on failure
fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(file) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                file
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

impl Config {
    /// Load configuration from environment and the optional config file
    ///
    /// The API key is taken from `GEMINI_API_KEY`, then `GOOGLE_API_KEY`,
    /// then the config file.
    ///
    /// # Errors
    ///
    /// Returns error if no API key can be found or a configured voice is
    /// unknown
    pub fn load() -> Result<Self> {
        let file = load_config_file();

        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .or(file.api_key)
            .ok_or_else(|| {
                Error::Config(
                    "no API key: set GEMINI_API_KEY or add api_key to config.toml".to_string(),
                )
            })?;

        // Determine data directory (~/.local/share/gemini-deck on Linux)
        let data_dir = directories::ProjectDirs::from("dev", "omni", "gemini-deck")
            .map_or_else(|| PathBuf::from("."), |d| d.data_dir().to_path_buf());
        std::fs::create_dir_all(&data_dir).ok();

        let defaults = Models::default();
        let models = Models {
            quick: std::env::var("GEMDECK_QUICK_MODEL")
                .ok()
                .or(file.models.quick)
                .unwrap_or(defaults.quick),
            chat: std::env::var("GEMDECK_CHAT_MODEL")
                .ok()
                .or(file.models.chat)
                .unwrap_or(defaults.chat),
            analyze: std::env::var("GEMDECK_ANALYZE_MODEL")
                .ok()
                .or(file.models.analyze)
                .unwrap_or(defaults.analyze),
            analyze_thinking: std::env::var("GEMDECK_THINKING_MODEL")
                .ok()
                .or(file.models.analyze_thinking)
                .unwrap_or(defaults.analyze_thinking),
            image: std::env::var("GEMDECK_IMAGE_MODEL")
                .ok()
                .or(file.models.image)
                .unwrap_or(defaults.image),
            tts: std::env::var("GEMDECK_TTS_MODEL")
                .ok()
                .or(file.models.tts)
                .unwrap_or(defaults.tts),
        };

        let tts_defaults = TtsConfig::default();
        let voice = match file.tts.voice {
            Some(name) => name.parse()?,
            None => tts_defaults.voice,
        };
        let tts = TtsConfig {
            voice,
            speed: file.tts.speed.unwrap_or(tts_defaults.speed),
            pitch: file.tts.pitch.unwrap_or(tts_defaults.pitch),
        };

        Ok(Self {
            api_key,
            data_dir,
            models,
            tts,
        })
    }
}
