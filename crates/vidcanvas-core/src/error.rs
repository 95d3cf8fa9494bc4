//! Error types for vidcanvas core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Lifecycle errors
    #[error("Player not initialized: call init() with a canvas and source first")]
    NotInitialized,

    #[error("Canvas has no 2D drawing context")]
    DrawingContextUnavailable,

    #[error("Failed to create media element: {0}")]
    MediaCreation(String),

    // Playback errors
    #[error("Playback request rejected: {reason}")]
    PlaybackRejected { reason: String },

    // Platform errors
    #[error("Streaming decoder error: {0}")]
    Decoder(String),

    #[error("Fullscreen not available: {0}")]
    Fullscreen(String),

    #[error("Frame draw failed: {0}")]
    Render(String),

    #[error("Frame scheduling failed: {0}")]
    Scheduler(String),

    // Configuration errors
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a playback rejection error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Error::PlaybackRejected {
            reason: reason.into(),
        }
    }

    /// Returns true if the caller may retry the same operation later.
    ///
    /// A rejected `play()` is usually an autoplay policy block and succeeds
    /// once it is retried from a user gesture.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PlaybackRejected { .. } | Error::Fullscreen(_))
    }

    /// Returns the error code exposed to JavaScript callers
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotInitialized => "NOT_INITIALIZED",
            Error::DrawingContextUnavailable => "NO_DRAWING_CONTEXT",
            Error::MediaCreation(_) => "MEDIA_CREATION",
            Error::PlaybackRejected { .. } => "PLAYBACK_REJECTED",
            Error::Decoder(_) => "DECODER",
            Error::Fullscreen(_) => "FULLSCREEN",
            Error::Render(_) => "RENDER",
            Error::Scheduler(_) => "SCHEDULER",
            Error::UnknownEvent(_) => "UNKNOWN_EVENT",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
