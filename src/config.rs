//! Narrator configuration module.
//!
//! Contains the runtime configuration for narration: where chunks are
//! persisted, the session sample rate, chunking and preview limits, and the
//! inference settings forwarded to the engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generation::{DEFAULT_ETA_WINDOW, DEFAULT_MAX_CHUNK_CHARS, DEFAULT_PREVIEW_SECONDS};
use crate::types::InferenceSettings;

/// Default session sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Runtime configuration for narration.
///
/// This configuration is typically loaded from command-line arguments
/// or environment variables at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Directory of the persistent chunk store.
    /// If None, uses the platform-specific default cache location.
    pub store_path: Option<PathBuf>,

    /// Sample rate of the engine output in Hz.
    pub sample_rate: u32,

    /// Target maximum chunk length in characters.
    /// A single longer sentence still becomes one chunk.
    pub max_chunk_chars: usize,

    /// Seconds of audio kept in memory for instant preview.
    pub max_preview_seconds: u32,

    /// Number of recent chunk timings averaged for the ETA.
    pub eta_window: usize,

    /// Settings forwarded to the engine for every chunk.
    pub inference: InferenceSettings,
}

impl NarrateConfig {
    /// Creates a new NarrateConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a NarrateConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `NARRATOR_STORE_PATH` - Chunk store directory
    /// - `NARRATOR_SAMPLE_RATE` - Session sample rate in Hz (8000-192000)
    /// - `NARRATOR_MAX_CHUNK_CHARS` - Target chunk length in characters
    /// - `NARRATOR_PREVIEW_SECONDS` - Preview length in seconds
    /// - `NARRATOR_STEPS` - Inference steps per chunk (1-100)
    /// - `NARRATOR_SPEED` - Speaking rate multiplier (0.5-2.0)
    /// - `NARRATOR_SILENCE` - Silence after each chunk in seconds (0-5)
    ///
    /// Falls back to defaults for unset or out-of-range variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("NARRATOR_STORE_PATH") {
            config.store_path = Some(PathBuf::from(path));
        }

        if let Ok(rate_str) = std::env::var("NARRATOR_SAMPLE_RATE") {
            if let Ok(rate) = rate_str.parse::<u32>() {
                if (8000..=192_000).contains(&rate) {
                    config.sample_rate = rate;
                }
            }
        }

        if let Ok(chars_str) = std::env::var("NARRATOR_MAX_CHUNK_CHARS") {
            if let Ok(chars) = chars_str.parse::<usize>() {
                if chars > 0 {
                    config.max_chunk_chars = chars;
                }
            }
        }

        if let Ok(secs_str) = std::env::var("NARRATOR_PREVIEW_SECONDS") {
            if let Ok(secs) = secs_str.parse::<u32>() {
                config.max_preview_seconds = secs;
            }
        }

        if let Ok(steps_str) = std::env::var("NARRATOR_STEPS") {
            if let Ok(steps) = steps_str.parse::<u32>() {
                if (1..=100).contains(&steps) {
                    config.inference.inference_steps = steps;
                }
            }
        }

        if let Ok(speed_str) = std::env::var("NARRATOR_SPEED") {
            if let Ok(speed) = speed_str.parse::<f32>() {
                if (0.5..=2.0).contains(&speed) {
                    config.inference.speed = speed;
                }
            }
        }

        if let Ok(silence_str) = std::env::var("NARRATOR_SILENCE") {
            if let Ok(silence) = silence_str.parse::<f32>() {
                if (0.0..=5.0).contains(&silence) {
                    config.inference.silence_duration = silence;
                }
            }
        }

        config
    }

    /// Returns the effective store path, using platform defaults if not specified.
    pub fn effective_store_path(&self) -> PathBuf {
        if let Some(ref path) = self.store_path {
            path.clone()
        } else {
            default_store_path()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Some(format!(
                "sample_rate out of range: {} (8000-192000)",
                self.sample_rate
            ));
        }

        if self.max_chunk_chars == 0 {
            return Some("max_chunk_chars must be > 0".to_string());
        }

        if self.eta_window == 0 {
            return Some("eta_window must be > 0".to_string());
        }

        if let Err(e) = self.inference.validate() {
            return Some(e.message);
        }

        None
    }
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_preview_seconds: DEFAULT_PREVIEW_SECONDS,
            eta_window: DEFAULT_ETA_WINDOW,
            inference: InferenceSettings::default(),
        }
    }
}

/// Returns the platform-specific default chunk store path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/narrator/chunks
/// - Linux: ~/.cache/narrator/chunks
/// - Windows: C:\Users\<user>\AppData\Local\narrator\cache\chunks
fn default_store_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "narrator") {
        proj_dirs.cache_dir().join("chunks")
    } else {
        // Fallback to current directory
        PathBuf::from("./narrator-chunks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = NarrateConfig::new();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.max_chunk_chars, 300);
        assert_eq!(config.max_preview_seconds, 30);
        assert_eq!(config.eta_window, 5);
        assert_eq!(config.inference, InferenceSettings::default());
        assert!(config.validate().is_none());
    }

    #[test]
    fn config_validation() {
        let mut config = NarrateConfig::new();

        config.sample_rate = 100;
        assert!(config.validate().is_some());
        config.sample_rate = 24000;
        assert!(config.validate().is_none());

        config.max_chunk_chars = 0;
        assert!(config.validate().is_some());
        config.max_chunk_chars = 120;

        config.inference.speed = 3.0;
        let message = config.validate().unwrap();
        assert!(message.contains("speed"));
    }

    #[test]
    fn effective_store_path() {
        let config = NarrateConfig::new();
        assert!(!config.effective_store_path().as_os_str().is_empty());

        let config = NarrateConfig {
            store_path: Some(PathBuf::from("/var/tmp/narration")),
            ..NarrateConfig::default()
        };
        assert_eq!(
            config.effective_store_path(),
            PathBuf::from("/var/tmp/narration")
        );
    }

    #[test]
    fn from_env_defaults() {
        // No NARRATOR_* variables are set in the test environment
        let config = NarrateConfig::from_env();
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn serializes_round_trip() {
        let config = NarrateConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: NarrateConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
