//! Global keyboard shortcuts
//!
//! Routing is a pure function from a key code and the current focus to an
//! optional command, so it can be tested without a controller.

use serde::{Deserialize, Serialize};

/// Where keyboard focus sits when the key is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    /// Page body or the player itself
    #[default]
    Document,
    /// A button or other non-editing control
    Control,
    /// An input widget; shortcuts are suppressed so typing is not hijacked
    Input,
}

/// Player command bound to a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePlayback,
    ToggleMute,
    ToggleFullscreen,
    SeekForward,
    SeekBackward,
}

/// Routing result: the command and whether the host's default action
/// (page scroll for Space) must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRoute {
    pub command: KeyCommand,
    pub prevent_default: bool,
}

impl KeyRoute {
    fn new(command: KeyCommand) -> Self {
        KeyRoute {
            command,
            prevent_default: false,
        }
    }
}

/// Map a physical key code (`Space`, `KeyM`, `ArrowLeft`, ...) to a command.
///
/// Returns `None` for unbound keys and whenever focus is inside an input.
///
/// ```
/// use rfplayer::keys::{route_key, FocusTarget, KeyCommand};
///
/// let route = route_key("Space", FocusTarget::Document).unwrap();
/// assert_eq!(route.command, KeyCommand::TogglePlayback);
/// assert!(route.prevent_default);
/// assert!(route_key("Space", FocusTarget::Input).is_none());
/// ```
pub fn route_key(code: &str, focus: FocusTarget) -> Option<KeyRoute> {
    if focus == FocusTarget::Input {
        return None;
    }
    let route = match code {
        "Space" => KeyRoute {
            command: KeyCommand::TogglePlayback,
            prevent_default: true,
        },
        "KeyM" => KeyRoute::new(KeyCommand::ToggleMute),
        "KeyF" => KeyRoute::new(KeyCommand::ToggleFullscreen),
        "ArrowRight" => KeyRoute::new(KeyCommand::SeekForward),
        "ArrowLeft" => KeyRoute::new(KeyCommand::SeekBackward),
        _ => return None,
    };
    Some(route)
}
