//! Error types for the player control surface

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the media surface or the host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The host refused or could not start playback
    #[error("Playback request failed: {0}")]
    PlaybackError(String),

    /// Picture-in-picture was denied or the surface is not eligible
    #[error("Picture-in-picture request failed: {0}")]
    PictureInPictureError(String),

    /// Fullscreen was denied by the host (e.g. no user gesture)
    #[error("Fullscreen request failed: {0}")]
    FullscreenError(String),

    /// A local source could not be created or attached
    #[error("Source error: {0}")]
    SourceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl Error {
    /// Human readable reason without the variant prefix, used for notices.
    pub fn reason(&self) -> &str {
        match self {
            Error::PlaybackError(m)
            | Error::PictureInPictureError(m)
            | Error::FullscreenError(m)
            | Error::SourceError(m)
            | Error::ConfigError(m)
            | Error::Other(m) => m,
        }
    }
}
