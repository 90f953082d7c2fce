//! Error types for the narrator.
//!
//! Defines all error codes and types used by the chunk store, the generation
//! pipeline and the export paths for consistent error handling and reporting.

use std::fmt;

/// Error codes attached to every [`NarrateError`].
///
/// These codes allow hosts to programmatically handle specific error
/// conditions and to decide whether a failure is fatal to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Persistent storage could not be opened or created.
    /// Trigger: unwritable store directory, missing permissions.
    StoreUnavailable,

    /// A chunk, metadata entry or clear operation failed to persist.
    /// Trigger: disk full, I/O error during write or rename.
    StoreWriteFailed,

    /// A persisted chunk or metadata entry could not be read back.
    /// Trigger: I/O error, truncated or corrupt chunk file.
    StoreReadFailed,

    /// The inference engine failed or returned malformed samples.
    /// Trigger: engine error, non-finite samples.
    InferenceFailed,

    /// Export requested while no audio has been persisted.
    /// Trigger: zero chunks in the session, empty preview buffer.
    NoAudioAvailable,

    /// Input text is unusable.
    /// Trigger: empty or whitespace-only text.
    InvalidText,

    /// Inference settings are outside their valid ranges.
    InvalidSettings,

    /// A generation run is already active.
    GenerationInProgress,

    /// The recording is too long to frame in a 32-bit RIFF container.
    AudioTooLong,

    /// The exported container could not be written to its destination.
    /// Trigger: unwritable output path, disk full during export.
    ExportFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::StoreWriteFailed => "STORE_WRITE_FAILED",
            ErrorCode::StoreReadFailed => "STORE_READ_FAILED",
            ErrorCode::InferenceFailed => "INFERENCE_FAILED",
            ErrorCode::NoAudioAvailable => "NO_AUDIO_AVAILABLE",
            ErrorCode::InvalidText => "INVALID_TEXT",
            ErrorCode::InvalidSettings => "INVALID_SETTINGS",
            ErrorCode::GenerationInProgress => "GENERATION_IN_PROGRESS",
            ErrorCode::AudioTooLong => "AUDIO_TOO_LONG",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::StoreUnavailable => "The audio chunk store could not be opened",
            ErrorCode::StoreWriteFailed => "Failed to save audio to the chunk store",
            ErrorCode::StoreReadFailed => "Failed to read audio back from the chunk store",
            ErrorCode::InferenceFailed => "Speech synthesis failed",
            ErrorCode::NoAudioAvailable => "There is no generated audio to export",
            ErrorCode::InvalidText => "The text to narrate is empty",
            ErrorCode::InvalidSettings => "Inference settings are out of range",
            ErrorCode::GenerationInProgress => "A narration is already being generated",
            ErrorCode::AudioTooLong => "The recording is too long for a single WAV file",
            ErrorCode::ExportFailed => "Failed to write the exported audio file",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::StoreUnavailable => {
                "Check that the store directory exists and is writable, \
                 or point NARRATOR_STORE_PATH at another location"
            }
            ErrorCode::StoreWriteFailed => {
                "Free some disk space and generate again; partial audio has been discarded"
            }
            ErrorCode::StoreReadFailed => {
                "Retry the export; if it keeps failing, clear the store and generate again"
            }
            ErrorCode::InferenceFailed => {
                "Try a shorter text, fewer inference steps, or reload the voice model"
            }
            ErrorCode::NoAudioAvailable => "Generate audio before exporting",
            ErrorCode::InvalidText => "Provide some text containing at least one word",
            ErrorCode::InvalidSettings => {
                "Use 1-100 inference steps, a speed between 0.5 and 2.0 \
                 and a silence duration between 0 and 5 seconds"
            }
            ErrorCode::GenerationInProgress => {
                "Wait for the current narration to finish or cancel it first"
            }
            ErrorCode::AudioTooLong => "Split the text into several narrations and export each",
            ErrorCode::ExportFailed => {
                "Check that the output location is writable and has free space, then export again"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for narrator operations.
#[derive(Debug)]
pub struct NarrateError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl NarrateError {
    /// Creates a new NarrateError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new NarrateError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a STORE_UNAVAILABLE error.
    pub fn store_unavailable(
        path: impl fmt::Display,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::StoreUnavailable,
            format!("Cannot open chunk store at {}", path),
            source,
        )
    }

    /// Creates a STORE_WRITE_FAILED error.
    pub fn store_write_failed(
        what: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::StoreWriteFailed,
            format!("Failed to write {}", what.into()),
            source,
        )
    }

    /// Creates a STORE_READ_FAILED error.
    pub fn store_read_failed(what: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StoreReadFailed,
            format!("Failed to read {}", what.into()),
        )
    }

    /// Creates an INFERENCE_FAILED error.
    pub fn inference_failed(chunk_index: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InferenceFailed,
            format!("Inference failed on chunk {}: {}", chunk_index, reason.into()),
        )
    }

    /// Creates a NO_AUDIO_AVAILABLE error.
    pub fn no_audio() -> Self {
        Self::new(ErrorCode::NoAudioAvailable, "No audio chunks to export")
    }

    /// Creates an INVALID_TEXT error for empty input.
    pub fn empty_text() -> Self {
        Self::new(ErrorCode::InvalidText, "Text cannot be empty")
    }

    /// Creates an INVALID_SETTINGS error.
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSettings, reason)
    }

    /// Creates a GENERATION_IN_PROGRESS error.
    pub fn generation_in_progress() -> Self {
        Self::new(
            ErrorCode::GenerationInProgress,
            "Cannot start a new narration while one is running",
        )
    }

    /// Creates an AUDIO_TOO_LONG error.
    pub fn audio_too_long(sample_count: u64) -> Self {
        Self::new(
            ErrorCode::AudioTooLong,
            format!(
                "{} samples exceed the 4 GiB limit of a WAV container",
                sample_count
            ),
        )
    }

    /// Creates an EXPORT_FAILED error.
    pub fn export_failed(
        what: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::ExportFailed,
            format!("Failed to export {}", what.into()),
            source,
        )
    }
}

impl fmt::Display for NarrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for NarrateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using NarrateError.
pub type Result<T> = std::result::Result<T, NarrateError>;
