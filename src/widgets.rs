//! Control widget set: the visual state of every player control.
//!
//! Each field is a projection of [`MediaSnapshot`] (or of the host's display
//! modes) and is only written by the `render_*` functions below, which the
//! controller subscribes to the matching media notification. That includes
//! the volume slider, so a volume or mute change made by the host moves it
//! just like one made through the controls.

use serde::Serialize;

use crate::platform::{MediaEventKind, MediaSnapshot};

/// Icon shown on the play/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayIcon {
    Play,
    Pause,
}

/// Icon shown on the mute button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIcon {
    Audible,
    Silent,
}

/// Visual state of the whole control bar
///
/// The picture-in-picture and fullscreen flags have no media notification.
/// The controller re-reads them from the display host after each input it
/// dispatches, so a mode the host leaves on its own (e.g. the user closing
/// the PiP window) shows up on the next input, not immediately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlWidgets {
    pub play_button: PlayIcon,
    /// Mirrors the `playing` class on the player container
    pub playing: bool,
    pub mute_button: VolumeIcon,
    /// Volume slider position in `[0, 1]`
    pub volume_slider: f64,
    /// Filled width of the progress bar, in percent
    pub progress_percent: f64,
    pub current_time: String,
    pub total_time: String,
    pub playback_speed: f64,
    pub picture_in_picture: bool,
    pub fullscreen: bool,
    /// Last user-visible message, e.g. a denied fullscreen request
    pub notice: Option<String>,
}

impl ControlWidgets {
    /// Render every widget from a snapshot.
    pub fn new(s: &MediaSnapshot) -> Self {
        let mut w = ControlWidgets {
            play_button: PlayIcon::Play,
            playing: false,
            mute_button: VolumeIcon::Audible,
            volume_slider: 0.0,
            progress_percent: 0.0,
            current_time: format_time(0.0),
            total_time: format_time(0.0),
            playback_speed: s.playback_rate,
            picture_in_picture: false,
            fullscreen: false,
            notice: None,
        };
        w.render_play_button(s);
        w.render_mute_button(s);
        w.render_volume_slider(s);
        w.render_progress(s);
        w.render_total_time(s);
        w
    }

    /// Re-render the widgets bound to `kind`
    pub fn render(&mut self, kind: MediaEventKind, s: &MediaSnapshot) {
        match kind {
            MediaEventKind::Play | MediaEventKind::Pause => self.render_play_button(s),
            MediaEventKind::VolumeChange => {
                self.render_mute_button(s);
                self.render_volume_slider(s);
            }
            MediaEventKind::TimeUpdate => self.render_progress(s),
            MediaEventKind::LoadedMetadata => self.render_total_time(s),
            MediaEventKind::DurationChange => {
                self.render_total_time(s);
                self.render_progress(s);
            }
            MediaEventKind::RateChange => self.render_speed(s),
        }
    }

    pub fn render_play_button(&mut self, s: &MediaSnapshot) {
        self.play_button = if s.paused { PlayIcon::Play } else { PlayIcon::Pause };
        self.playing = !s.paused;
    }

    pub fn render_mute_button(&mut self, s: &MediaSnapshot) {
        self.mute_button = if is_silent(s) {
            VolumeIcon::Silent
        } else {
            VolumeIcon::Audible
        };
    }

    /// A muted surface parks the slider at 0
    pub fn render_volume_slider(&mut self, s: &MediaSnapshot) {
        self.volume_slider = if s.muted { 0.0 } else { s.volume };
    }

    /// Progress bar width and elapsed label
    pub fn render_progress(&mut self, s: &MediaSnapshot) {
        self.progress_percent = progress_percent(s);
        self.current_time = format_time(s.current_time);
    }

    pub fn render_total_time(&mut self, s: &MediaSnapshot) {
        self.total_time = format_time(s.known_duration().unwrap_or(0.0));
    }

    pub fn render_speed(&mut self, s: &MediaSnapshot) {
        self.playback_speed = s.playback_rate;
    }

    pub fn render_display_modes(&mut self, picture_in_picture: bool, fullscreen: bool) {
        self.picture_in_picture = picture_in_picture;
        self.fullscreen = fullscreen;
    }
}

/// Muted and zero volume share a single silent visual state.
pub fn is_silent(s: &MediaSnapshot) -> bool {
    s.muted || s.volume == 0.0
}

/// Played fraction as a percentage; 0 while the duration is unknown or zero.
pub fn progress_percent(s: &MediaSnapshot) -> f64 {
    match s.known_duration() {
        Some(d) if d > 0.0 => (s.current_time / d * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// Format seconds as `MM:SS`.
///
/// Seconds are floor-truncated and both fields zero-padded to two digits.
/// Minutes are not wrapped at 60, so an hour renders as `60:00`. Unknown or
/// negative times render as `00:00`.
///
/// ```
/// assert_eq!(rfplayer::format_time(65.9), "01:05");
/// assert_eq!(rfplayer::format_time(3661.0), "61:01");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_and_does_not_wrap_minutes() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.0), "01:05");
        assert_eq!(format_time(3661.0), "61:01");
        assert_eq!(format_time(59.999), "00:59");
    }

    #[test]
    fn format_time_guards_unknown_values() {
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn silent_icon_covers_muted_and_zero_volume() {
        let mut s = MediaSnapshot::default();
        assert!(!is_silent(&s));
        s.volume = 0.0;
        assert!(is_silent(&s));
        s.volume = 0.7;
        s.muted = true;
        assert!(is_silent(&s));
    }

    #[test]
    fn progress_is_zero_without_duration() {
        let mut s = MediaSnapshot {
            current_time: 12.0,
            ..Default::default()
        };
        assert_eq!(progress_percent(&s), 0.0);
        s.duration = Some(f64::NAN);
        assert_eq!(progress_percent(&s), 0.0);
        s.duration = Some(48.0);
        assert_eq!(progress_percent(&s), 25.0);
    }

    #[test]
    fn render_dispatches_by_notification_kind() {
        let mut s = MediaSnapshot::default();
        let mut w = ControlWidgets::new(&s);
        assert_eq!(w.play_button, PlayIcon::Play);

        s.paused = false;
        s.current_time = 30.0;
        w.render(MediaEventKind::Play, &s);
        assert_eq!(w.play_button, PlayIcon::Pause);
        assert!(w.playing);
        // time label is only touched by time updates
        assert_eq!(w.current_time, "00:00");

        w.render(MediaEventKind::TimeUpdate, &s);
        assert_eq!(w.current_time, "00:30");

        s.duration = Some(125.0);
        w.render(MediaEventKind::LoadedMetadata, &s);
        assert_eq!(w.total_time, "02:05");

        s.playback_rate = 1.5;
        w.render(MediaEventKind::RateChange, &s);
        assert_eq!(w.playback_speed, 1.5);
    }

    #[test]
    fn volume_slider_follows_volume_notifications() {
        let mut s = MediaSnapshot::default();
        let mut w = ControlWidgets::new(&s);
        assert_eq!(w.volume_slider, s.volume);

        s.volume = 0.3;
        w.render(MediaEventKind::VolumeChange, &s);
        assert_eq!(w.volume_slider, 0.3);
        s.muted = true;
        w.render(MediaEventKind::VolumeChange, &s);
        assert_eq!(w.volume_slider, 0.0);
        assert_eq!(w.mute_button, VolumeIcon::Silent);
    }

    #[test]
    fn duration_reset_clears_total_and_progress() {
        let mut s = MediaSnapshot {
            current_time: 30.0,
            duration: Some(120.0),
            ..Default::default()
        };
        let mut w = ControlWidgets::new(&s);
        assert_eq!(w.total_time, "02:00");
        assert_eq!(w.progress_percent, 25.0);

        s.duration = None;
        s.current_time = 0.0;
        w.render(MediaEventKind::DurationChange, &s);
        assert_eq!(w.total_time, "00:00");
        assert_eq!(w.progress_percent, 0.0);
    }
}
