//! The player controller: reactions to user input and media notifications.
//!
//! User gestures become media surface mutations. Widget updates flow the other
//! way, through listeners registered on the surface at construction, so the
//! UI never repaints ahead of the surface confirming a change. The only state
//! kept here is transient interaction memory: the scrub drag flag, the volume
//! to restore when unmuting and the local source this controller attached.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::keys::{route_key, FocusTarget, KeyCommand, KeyRoute};
use crate::platform::{
    DisplayHost, ElementId, FileHandle, LocalFiles, LocalSource, MediaEventKind, MediaSnapshot,
    MediaSurface, PlatformApi,
};
use crate::scrub::{pointer_fraction, ScrubState};
use crate::widgets::ControlWidgets;
use crate::{PlayerConfig, Result};

/// Clickable controls on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// The video surface itself
    Video,
    PlayPause,
    Mute,
    PictureInPicture,
    Fullscreen,
    /// Upload button; opens the platform file chooser
    Upload,
}

/// Every input the controller reacts to.
///
/// Pointer offsets are measured from the left edge of the seek track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    Click {
        control: Control,
    },
    VolumeInput {
        value: f64,
    },
    TrackPointerDown,
    TrackPointerMove {
        offset_x: f64,
        track_width: f64,
    },
    TrackPointerUp,
    TrackClick {
        offset_x: f64,
        track_width: f64,
    },
    SpeedChange {
        rate: f64,
    },
    KeyDown {
        code: String,
        #[serde(default)]
        focus: FocusTarget,
    },
    /// Result of the file chooser; `None` when the user picked nothing
    FileChosen {
        #[serde(default)]
        file: Option<FileHandle>,
    },
}

/// What the host should do with the original input after dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Suppress the host's default action (e.g. page scroll on Space)
    pub prevent_default: bool,
}

const RENDERED_KINDS: [MediaEventKind; 7] = [
    MediaEventKind::Play,
    MediaEventKind::Pause,
    MediaEventKind::VolumeChange,
    MediaEventKind::TimeUpdate,
    MediaEventKind::LoadedMetadata,
    MediaEventKind::DurationChange,
    MediaEventKind::RateChange,
];

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PlayerController {
    config: PlayerConfig,
    media: Arc<dyn MediaSurface>,
    display: Arc<dyn DisplayHost>,
    files: Arc<dyn LocalFiles>,
    container: ElementId,
    widgets: Arc<Mutex<ControlWidgets>>,
    scrub: ScrubState,
    remembered_volume: Option<f64>,
    loaded_source: Option<LocalSource>,
}

impl PlayerController {
    /// Bind a controller to the platform's media surface and subscribe one
    /// widget renderer per notification kind.
    pub fn new(platform: &dyn PlatformApi, config: PlayerConfig) -> Result<Self> {
        config.validate()?;
        let media = platform.media_surface();
        let initial = media.snapshot();
        let widgets = Arc::new(Mutex::new(ControlWidgets::new(&initial)));

        for kind in RENDERED_KINDS {
            let w = widgets.clone();
            media.subscribe(
                kind,
                Arc::new(move |s: &MediaSnapshot| lock(&w).render(kind, s)),
            );
        }

        Ok(PlayerController {
            config,
            display: platform.display_host(),
            files: platform.local_files(),
            container: platform.player_container(),
            remembered_volume: (initial.volume > 0.0).then_some(initial.volume),
            media,
            widgets,
            scrub: ScrubState::default(),
            loaded_source: None,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Copy of the current widget state
    pub fn widgets(&self) -> ControlWidgets {
        lock(&self.widgets).clone()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_dragging()
    }

    /// Route one input to its reaction
    pub async fn dispatch(&mut self, event: PlayerEvent) -> EventOutcome {
        let outcome = self.route(event).await;
        self.refresh_display_modes();
        outcome
    }

    async fn route(&mut self, event: PlayerEvent) -> EventOutcome {
        match event {
            PlayerEvent::Click { control } => self.click(control).await,
            PlayerEvent::VolumeInput { value } => self.set_volume(value),
            PlayerEvent::TrackPointerDown => self.pointer_down(),
            PlayerEvent::TrackPointerMove {
                offset_x,
                track_width,
            } => {
                self.pointer_move(offset_x, track_width);
            }
            PlayerEvent::TrackPointerUp => self.pointer_up(),
            PlayerEvent::TrackClick {
                offset_x,
                track_width,
            } => {
                self.seek_from_pointer(offset_x, track_width);
            }
            PlayerEvent::SpeedChange { rate } => {
                self.set_playback_rate(rate);
            }
            PlayerEvent::KeyDown { code, focus } => {
                let route = self.handle_key(&code, focus).await;
                return EventOutcome {
                    prevent_default: route.is_some_and(|r| r.prevent_default),
                };
            }
            PlayerEvent::FileChosen { file: Some(file) } => self.load_file(&file).await,
            PlayerEvent::FileChosen { file: None } => debug!("File chooser closed without a pick"),
        }
        EventOutcome::default()
    }

    pub async fn click(&mut self, control: Control) {
        match control {
            Control::Video | Control::PlayPause => self.toggle_playback().await,
            Control::Mute => self.toggle_mute(),
            Control::PictureInPicture => self.toggle_picture_in_picture().await,
            Control::Fullscreen => self.toggle_fullscreen().await,
            Control::Upload => self.files.open_chooser(),
        }
    }

    /// Play when paused, pause otherwise. The button icon changes only when
    /// the surface reports the transition.
    pub async fn toggle_playback(&mut self) {
        let res = if self.media.paused() {
            self.media.play().await
        } else {
            self.media.pause().await
        };
        if let Err(e) = res {
            warn!("Playback toggle failed: {}", e);
        }
    }

    /// Volume slider input. A level of 0 mutes, anything above unmutes.
    pub fn set_volume(&mut self, level: f64) {
        if level.is_nan() {
            warn!("Ignoring NaN volume input");
            return;
        }
        let level = level.clamp(0.0, 1.0);
        self.media.set_volume(level);
        self.media.set_muted(level == 0.0);
        // dragging to 0 forgets the level; unmuting then falls back to the default
        self.remembered_volume = (level > 0.0).then_some(level);
    }

    pub fn toggle_mute(&mut self) {
        if self.media.muted() {
            let restore = self
                .remembered_volume
                .filter(|v| *v > 0.0)
                .unwrap_or(self.config.default_unmute_volume);
            self.media.set_volume(restore);
            self.media.set_muted(false);
            self.remembered_volume = Some(restore);
        } else {
            let current = self.media.volume();
            if current > 0.0 {
                self.remembered_volume = Some(current);
            }
            self.media.set_muted(true);
            self.media.set_volume(0.0);
        }
    }

    /// Seek to `fraction` of the duration. Returns `false` without touching
    /// the surface while the duration is unknown.
    pub fn seek_to(&mut self, fraction: f64) -> bool {
        if fraction.is_nan() {
            return false;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        match self.media.snapshot().known_duration() {
            Some(duration) => {
                self.media.set_current_time(fraction * duration);
                true
            }
            None => {
                debug!("Seek to {:.3} skipped: duration unknown", fraction);
                false
            }
        }
    }

    pub fn seek_from_pointer(&mut self, offset_x: f64, track_width: f64) -> bool {
        match pointer_fraction(offset_x, track_width) {
            Some(f) => self.seek_to(f),
            None => false,
        }
    }

    pub fn pointer_down(&mut self) {
        self.scrub.press();
    }

    /// Seeks only while the pointer button is held over the track
    pub fn pointer_move(&mut self, offset_x: f64, track_width: f64) -> bool {
        if !self.scrub.is_dragging() {
            return false;
        }
        self.seek_from_pointer(offset_x, track_width)
    }

    pub fn pointer_up(&mut self) {
        self.scrub.release();
    }

    /// Relative seek; the host clamps out-of-range targets.
    pub fn seek_by(&mut self, seconds: f64) {
        let target = self.media.current_time() + seconds;
        self.media.set_current_time(target);
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> bool {
        if !(rate.is_finite() && rate > 0.0) {
            warn!("Ignoring invalid playback rate {}", rate);
            return false;
        }
        self.media.set_playback_rate(rate);
        true
    }

    /// Exit picture-in-picture if any element holds it, otherwise request it
    /// for this surface. Failures are logged and swallowed.
    pub async fn toggle_picture_in_picture(&mut self) {
        let res = if self.display.picture_in_picture_element().is_some() {
            self.display.exit_picture_in_picture().await
        } else if self.display.picture_in_picture_enabled() {
            self.display
                .request_picture_in_picture(self.media.element_id())
                .await
        } else {
            debug!("Picture-in-picture is not available on this host");
            Ok(())
        };
        if let Err(e) = res {
            error!("PiP Error: {}", e);
        }
        self.refresh_display_modes();
    }

    /// Enter fullscreen on the player container, or leave it. A denied
    /// request is shown to the user through the notice widget.
    pub async fn toggle_fullscreen(&mut self) {
        if self.display.fullscreen_element().is_none() {
            match self.display.request_fullscreen(self.container).await {
                Ok(()) => {
                    lock(&self.widgets).notice = None;
                }
                Err(e) => {
                    let message = format!(
                        "Error attempting to enable full-screen mode: {}",
                        e.reason()
                    );
                    warn!("{}", message);
                    lock(&self.widgets).notice = Some(message);
                }
            }
        } else if let Err(e) = self.display.exit_fullscreen().await {
            warn!("Failed to exit fullscreen: {}", e);
        }
        self.refresh_display_modes();
    }

    /// Swap the surface source for a local reference to `file` and start
    /// playback. Codec problems are the surface's concern.
    pub async fn load_file(&mut self, file: &FileHandle) {
        let source = match self.files.create_source(file) {
            Ok(s) => s,
            Err(e) => {
                error!("Could not open {}: {}", file.name, e);
                return;
            }
        };
        self.media.set_source(source);
        if let Some(previous) = self.loaded_source.replace(source) {
            self.files.revoke_source(previous);
        }
        if let Err(e) = self.media.play().await {
            warn!("Playback of {} did not start: {}", file.name, e);
        }
    }

    /// Global shortcut handling. Returns the route taken, or `None` when the
    /// key is unbound or focus is inside an input.
    pub async fn handle_key(&mut self, code: &str, focus: FocusTarget) -> Option<KeyRoute> {
        let route = route_key(code, focus)?;
        match route.command {
            KeyCommand::TogglePlayback => self.toggle_playback().await,
            KeyCommand::ToggleMute => self.toggle_mute(),
            KeyCommand::ToggleFullscreen => self.toggle_fullscreen().await,
            KeyCommand::SeekForward => self.seek_by(self.config.seek_step_secs),
            KeyCommand::SeekBackward => self.seek_by(-self.config.seek_step_secs),
        }
        Some(route)
    }

    /// Re-read which exclusive display modes this player holds.
    fn refresh_display_modes(&self) {
        let pip = self.display.picture_in_picture_element() == Some(self.media.element_id());
        let fullscreen = self.display.fullscreen_element() == Some(self.container);
        lock(&self.widgets).render_display_modes(pip, fullscreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::InMemoryPlatform;
    use crate::widgets::{PlayIcon, VolumeIcon};

    fn setup() -> (InMemoryPlatform, PlayerController) {
        let p = InMemoryPlatform::new();
        let c = PlayerController::new(&p, PlayerConfig::default()).unwrap();
        (p, c)
    }

    #[test]
    fn new_subscribes_a_renderer_per_notification() {
        let (p, _c) = setup();
        for kind in RENDERED_KINDS {
            assert_eq!(p.media.listener_count(kind), 1, "{kind:?}");
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let p = InMemoryPlatform::new();
        let cfg = PlayerConfig {
            default_unmute_volume: 0.0,
            ..Default::default()
        };
        assert!(PlayerController::new(&p, cfg).is_err());
    }

    #[tokio::test]
    async fn toggle_playback_renders_after_notification() {
        let (p, mut c) = setup();
        assert_eq!(c.widgets().play_button, PlayIcon::Play);
        c.toggle_playback().await;
        assert!(!p.media.paused());
        assert_eq!(c.widgets().play_button, PlayIcon::Pause);
        assert!(c.widgets().playing);
        c.toggle_playback().await;
        assert_eq!(c.widgets().play_button, PlayIcon::Play);
    }

    #[tokio::test]
    async fn rejected_play_keeps_ui_paused() {
        let (p, mut c) = setup();
        p.media.block_playback(Some("not allowed"));
        c.toggle_playback().await;
        assert!(p.media.paused());
        assert_eq!(c.widgets().play_button, PlayIcon::Play);
    }

    #[test]
    fn set_volume_couples_muted_to_zero() {
        let (p, mut c) = setup();
        for v in [0.0, 0.25, 1.0, 0.0, 0.6] {
            c.set_volume(v);
            let s = p.media.snapshot();
            assert_eq!(s.muted, v == 0.0);
            assert_eq!(s.volume, v);
            let silent = c.widgets().mute_button == VolumeIcon::Silent;
            assert_eq!(silent, s.muted || s.volume == 0.0);
            assert_eq!(c.widgets().volume_slider, v);
        }
    }

    #[test]
    fn toggle_mute_twice_restores_volume() {
        let (p, mut c) = setup();
        c.set_volume(0.35);
        c.toggle_mute();
        assert!(p.media.muted());
        assert_eq!(c.widgets().volume_slider, 0.0);
        assert_eq!(c.widgets().mute_button, VolumeIcon::Silent);
        c.toggle_mute();
        assert!(!p.media.muted());
        assert_eq!(p.media.volume(), 0.35);
        assert_eq!(c.widgets().volume_slider, 0.35);
        assert_eq!(c.widgets().mute_button, VolumeIcon::Audible);
    }

    #[test]
    fn repeated_mute_toggles_keep_the_volume() {
        let (p, mut c) = setup();
        c.set_volume(0.8);
        for _ in 0..5 {
            c.toggle_mute();
            c.toggle_mute();
        }
        assert_eq!(p.media.volume(), 0.8);
    }

    #[test]
    fn unmute_after_dragging_to_zero_uses_default() {
        let (p, mut c) = setup();
        c.set_volume(0.0);
        assert!(p.media.muted());
        c.toggle_mute();
        assert_eq!(p.media.volume(), 0.5);
        assert!(!p.media.muted());
    }

    #[test]
    fn seek_requires_known_duration() {
        let (p, mut c) = setup();
        p.media.set_current_time(3.0);
        assert!(!c.seek_to(0.5));
        assert_eq!(p.media.current_time(), 3.0);

        p.media.load_metadata(120.0);
        for (f, expected) in [(0.0, 0.0), (0.5, 60.0), (1.0, 120.0)] {
            assert!(c.seek_to(f));
            assert_eq!(p.media.current_time(), expected);
        }
    }

    #[test]
    fn seek_by_is_relative() {
        let (p, mut c) = setup();
        p.media.load_metadata(60.0);
        p.media.set_current_time(10.0);
        c.seek_by(5.0);
        assert_eq!(p.media.current_time(), 15.0);
        c.seek_by(-20.0);
        // in-memory host clamps
        assert_eq!(p.media.current_time(), 0.0);
    }

    #[test]
    fn invalid_rates_are_ignored() {
        let (p, mut c) = setup();
        assert!(!c.set_playback_rate(0.0));
        assert!(!c.set_playback_rate(-1.0));
        assert!(!c.set_playback_rate(f64::NAN));
        assert!(c.set_playback_rate(1.75));
        assert_eq!(p.media.snapshot().playback_rate, 1.75);
        assert_eq!(c.widgets().playback_speed, 1.75);
    }

    #[tokio::test]
    async fn dispatch_reports_prevent_default_for_space() {
        let (_p, mut c) = setup();
        let out = c
            .dispatch(PlayerEvent::KeyDown {
                code: "Space".into(),
                focus: FocusTarget::Document,
            })
            .await;
        assert!(out.prevent_default);
        let out = c
            .dispatch(PlayerEvent::KeyDown {
                code: "Space".into(),
                focus: FocusTarget::Input,
            })
            .await;
        assert!(!out.prevent_default);
    }
}
