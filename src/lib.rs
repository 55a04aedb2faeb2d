//! RFox Player Controls
//!
//! A custom media player control surface for Rust. It binds a fixed set of
//! controls (play/pause, mute, volume, seek track, speed, picture-in-picture,
//! fullscreen, file upload) to a host media element and keeps the widgets in
//! sync with playback state.
//!
//! # Features
//!
//! - **Notification driven**: widgets re-render only from media surface
//!   notifications, never ahead of the host confirming a change
//! - **Adapter-based platform**: the media element, display host and local
//!   file services are traits, with deterministic in-memory versions for tests
//! - **Non-fatal host denials**: refused picture-in-picture or fullscreen
//!   requests are logged or shown to the user, never propagated
//!
//! # Example
//!
//! ```
//! use rfplayer::platform::InMemoryPlatform;
//! use rfplayer::{PlayerConfig, PlayerController, PlayerEvent};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let platform = InMemoryPlatform::new();
//! let mut player = PlayerController::new(&platform, PlayerConfig::default())?;
//! platform.media.load_metadata(90.0);
//!
//! player.dispatch(PlayerEvent::TrackClick { offset_x: 50.0, track_width: 100.0 }).await;
//! assert_eq!(player.widgets().current_time, "00:45");
//! assert_eq!(player.widgets().total_time, "01:30");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

// Host capabilities (media element, PiP/fullscreen, local files)
pub mod platform;

pub mod controller;
pub mod event_loop;
pub mod keys;
pub mod scrub;
pub mod widgets;

pub use controller::{Control, EventOutcome, PlayerController, PlayerEvent};
pub use event_loop::PlayerHandle;
pub use widgets::{format_time, ControlWidgets};

/// Configuration for a player controller
///
/// The defaults match a typical web player:
/// - unmuting with no remembered level restores half volume
/// - arrow keys seek five seconds
///
/// # Examples
///
/// ```
/// let cfg = rfplayer::PlayerConfig::default();
/// assert_eq!(cfg.default_unmute_volume, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume restored on unmute when no positive level is remembered
    pub default_unmute_volume: f64,
    /// Seconds moved by the left/right arrow shortcuts
    pub seek_step_secs: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_unmute_volume: 0.5,
            seek_step_secs: 5.0,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let v = self.default_unmute_volume;
        if !(v > 0.0 && v <= 1.0) {
            return Err(Error::ConfigError(format!(
                "default_unmute_volume must be in (0, 1], got {}",
                v
            )));
        }
        if !(self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0) {
            return Err(Error::ConfigError(format!(
                "seek_step_secs must be positive, got {}",
                self.seek_step_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.default_unmute_volume, 0.5);
        assert_eq!(config.seek_step_secs, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = PlayerConfig::from_json(r#"{"seek_step_secs": 10}"#).unwrap();
        assert_eq!(config.seek_step_secs, 10.0);
        assert_eq!(config.default_unmute_volume, 0.5);

        let err = PlayerConfig::from_json(r#"{"default_unmute_volume": 1.5}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));

        assert!(PlayerConfig::from_json("not json").is_err());
    }
}
