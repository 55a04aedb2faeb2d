//! The media surface capability: the host-provided playable element.
//!
//! The controller never owns playback. It reads a [`MediaSnapshot`], issues
//! property writes and async play/pause requests, and learns about state
//! transitions only through listeners registered with
//! [`MediaSurface::subscribe`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use super::files::LocalSource;
use super::ElementId;
use crate::{Error, Result};

/// Notifications a media surface emits on state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    /// Playback started
    Play,
    /// Playback paused (including reaching the end)
    Pause,
    /// Volume or muted flag changed
    VolumeChange,
    /// Current time advanced or was set
    TimeUpdate,
    /// Duration became known for the current source
    LoadedMetadata,
    /// Duration was reset, e.g. because the source was replaced
    DurationChange,
    /// Playback rate changed
    RateChange,
}

/// Point-in-time view of the surface state handed to listeners
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSnapshot {
    /// Current position in seconds
    pub current_time: f64,
    /// Duration in seconds, `None` until metadata is loaded
    pub duration: Option<f64>,
    pub paused: bool,
    pub muted: bool,
    /// Volume in `[0, 1]`
    pub volume: f64,
    /// Playback rate, always `> 0`
    pub playback_rate: f64,
    /// Currently attached source, if any
    pub source: Option<LocalSource>,
}

impl Default for MediaSnapshot {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            paused: true,
            muted: false,
            volume: 1.0,
            playback_rate: 1.0,
            source: None,
        }
    }
}

impl MediaSnapshot {
    /// Duration usable for arithmetic: known, finite and non-negative.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d >= 0.0)
    }
}

/// Listener invoked with the post-transition snapshot
pub type MediaListener = Arc<dyn Fn(&MediaSnapshot) + Send + Sync>;

/// Host media element abstraction.
///
/// `play` and `pause` are deferred requests that may be rejected by the host;
/// the remaining setters are plain property writes whose effects are observed
/// through notifications.
pub trait MediaSurface: Send + Sync {
    /// Identity used by the host's exclusive display modes
    fn element_id(&self) -> ElementId;

    /// Read the current state
    fn snapshot(&self) -> MediaSnapshot;

    fn play(&self) -> BoxFuture<'_, Result<()>>;
    fn pause(&self) -> BoxFuture<'_, Result<()>>;

    fn set_volume(&self, volume: f64);
    fn set_muted(&self, muted: bool);
    fn set_current_time(&self, seconds: f64);
    fn set_playback_rate(&self, rate: f64);

    /// Replace the source. Duration becomes unknown until metadata loads.
    fn set_source(&self, source: LocalSource);

    /// Register a listener for one kind of notification
    fn subscribe(&self, kind: MediaEventKind, listener: MediaListener);

    // --- Convenience readers (default implementations) ---

    fn paused(&self) -> bool {
        self.snapshot().paused
    }

    fn muted(&self) -> bool {
        self.snapshot().muted
    }

    fn volume(&self) -> f64 {
        self.snapshot().volume
    }

    fn current_time(&self) -> f64 {
        self.snapshot().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.snapshot().duration
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deterministic in-memory surface used in tests and the demo binary.
///
/// Play requests resolve immediately unless playback has been blocked with
/// [`InMemoryMediaSurface::block_playback`]. Listeners are called after the
/// state lock is released so they may read the surface again.
pub struct InMemoryMediaSurface {
    id: ElementId,
    state: Mutex<MediaSnapshot>,
    listeners: Mutex<Vec<(MediaEventKind, MediaListener)>>,
    play_blocked: Mutex<Option<String>>,
}

impl InMemoryMediaSurface {
    pub fn new() -> Self {
        InMemoryMediaSurface {
            id: ElementId::next(),
            state: Mutex::new(MediaSnapshot::default()),
            listeners: Mutex::new(Vec::new()),
            play_blocked: Mutex::new(None),
        }
    }

    /// Make subsequent play requests fail with `reason` (`None` unblocks).
    pub fn block_playback(&self, reason: Option<&str>) {
        *lock(&self.play_blocked) = reason.map(str::to_string);
    }

    /// Simulate metadata arriving for the current source
    pub fn load_metadata(&self, duration: f64) {
        lock(&self.state).duration = Some(duration);
        self.emit(MediaEventKind::LoadedMetadata);
    }

    /// Advance the playback clock by `seconds` of wall time.
    ///
    /// Does nothing while paused. Reaching the end pauses the surface.
    pub fn advance(&self, seconds: f64) {
        let ended = {
            let mut s = lock(&self.state);
            if s.paused {
                return;
            }
            let mut t = s.current_time + seconds * s.playback_rate;
            let mut ended = false;
            if let Some(d) = s.known_duration() {
                if t >= d {
                    t = d;
                    ended = true;
                }
            }
            s.current_time = t;
            if ended {
                s.paused = true;
            }
            ended
        };
        self.emit(MediaEventKind::TimeUpdate);
        if ended {
            self.emit(MediaEventKind::Pause);
        }
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: MediaEventKind) -> usize {
        lock(&self.listeners).iter().filter(|(k, _)| *k == kind).count()
    }

    fn emit(&self, kind: MediaEventKind) {
        let snapshot = lock(&self.state).clone();
        let matching: Vec<MediaListener> = lock(&self.listeners)
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in matching {
            listener(&snapshot);
        }
    }
}

impl Default for InMemoryMediaSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSurface for InMemoryMediaSurface {
    fn element_id(&self) -> ElementId {
        self.id
    }

    fn snapshot(&self) -> MediaSnapshot {
        lock(&self.state).clone()
    }

    fn play(&self) -> BoxFuture<'_, Result<()>> {
        let blocked = lock(&self.play_blocked).clone();
        let res = match blocked {
            Some(reason) => Err(Error::PlaybackError(reason)),
            None => {
                let started = {
                    let mut s = lock(&self.state);
                    let was_paused = s.paused;
                    s.paused = false;
                    was_paused
                };
                if started {
                    self.emit(MediaEventKind::Play);
                }
                Ok(())
            }
        };
        futures::future::ready(res).boxed()
    }

    fn pause(&self) -> BoxFuture<'_, Result<()>> {
        let stopped = {
            let mut s = lock(&self.state);
            let was_playing = !s.paused;
            s.paused = true;
            was_playing
        };
        if stopped {
            self.emit(MediaEventKind::Pause);
        }
        futures::future::ready(Ok(())).boxed()
    }

    fn set_volume(&self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        let changed = {
            let mut s = lock(&self.state);
            let v = volume.clamp(0.0, 1.0);
            let changed = s.volume != v;
            s.volume = v;
            changed
        };
        if changed {
            self.emit(MediaEventKind::VolumeChange);
        }
    }

    fn set_muted(&self, muted: bool) {
        let changed = {
            let mut s = lock(&self.state);
            let changed = s.muted != muted;
            s.muted = muted;
            changed
        };
        if changed {
            self.emit(MediaEventKind::VolumeChange);
        }
    }

    fn set_current_time(&self, seconds: f64) {
        if seconds.is_nan() {
            return;
        }
        {
            let mut s = lock(&self.state);
            let mut t = seconds.max(0.0);
            if let Some(d) = s.known_duration() {
                t = t.min(d);
            }
            s.current_time = t;
        }
        self.emit(MediaEventKind::TimeUpdate);
    }

    fn set_playback_rate(&self, rate: f64) {
        if !(rate.is_finite() && rate > 0.0) {
            return;
        }
        let changed = {
            let mut s = lock(&self.state);
            let changed = s.playback_rate != rate;
            s.playback_rate = rate;
            changed
        };
        if changed {
            self.emit(MediaEventKind::RateChange);
        }
    }

    /// A new source starts paused at 0 with an unknown duration.
    fn set_source(&self, source: LocalSource) {
        let (was_playing, had_duration) = {
            let mut s = lock(&self.state);
            let was_playing = !s.paused;
            let had_duration = s.duration.take().is_some();
            s.source = Some(source);
            s.current_time = 0.0;
            s.paused = true;
            (was_playing, had_duration)
        };
        if was_playing {
            self.emit(MediaEventKind::Pause);
        }
        if had_duration {
            self.emit(MediaEventKind::DurationChange);
        }
        self.emit(MediaEventKind::TimeUpdate);
    }

    fn subscribe(&self, kind: MediaEventKind, listener: MediaListener) {
        lock(&self.listeners).push((kind, listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn in_memory_surface_transitions_state() {
        let m = InMemoryMediaSurface::new();
        assert!(m.paused());
        m.play().await.unwrap();
        assert!(!m.paused());
        m.pause().await.unwrap();
        assert!(m.paused());
    }

    #[tokio::test]
    async fn blocked_playback_is_rejected() {
        let m = InMemoryMediaSurface::new();
        m.block_playback(Some("autoplay denied"));
        let err = m.play().await.unwrap_err();
        assert_eq!(err, Error::PlaybackError("autoplay denied".into()));
        assert!(m.paused());
    }

    #[test]
    fn listeners_only_receive_their_kind() {
        let m = InMemoryMediaSurface::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        m.subscribe(
            MediaEventKind::VolumeChange,
            Arc::new(move |_: &MediaSnapshot| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        m.set_current_time(3.0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        m.set_volume(0.4);
        m.set_muted(true);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        // unchanged values do not notify
        m.set_volume(0.4);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn current_time_is_clamped_once_duration_is_known() {
        let m = InMemoryMediaSurface::new();
        m.set_current_time(-4.0);
        assert_eq!(m.current_time(), 0.0);
        m.load_metadata(30.0);
        m.set_current_time(45.0);
        assert_eq!(m.current_time(), 30.0);
    }

    #[tokio::test]
    async fn advancing_past_the_end_pauses() {
        let m = InMemoryMediaSurface::new();
        m.load_metadata(10.0);
        m.play().await.unwrap();
        m.advance(4.0);
        assert_eq!(m.current_time(), 4.0);
        m.advance(20.0);
        assert_eq!(m.current_time(), 10.0);
        assert!(m.paused());
    }

    #[test]
    fn swapping_source_forgets_the_duration() {
        use crate::platform::{FileHandle, InMemoryFiles, LocalFiles};

        let files = InMemoryFiles::new();
        let clip = FileHandle::new("clip.webm", Some("video/webm"), 64);
        let m = InMemoryMediaSurface::new();
        m.load_metadata(90.0);
        m.set_current_time(40.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        m.subscribe(
            MediaEventKind::DurationChange,
            Arc::new(move |snap: &MediaSnapshot| {
                s.lock().unwrap().push(snap.duration);
            }),
        );
        m.set_source(files.create_source(&clip).unwrap());
        assert_eq!(*seen.lock().unwrap(), vec![None]);
        assert_eq!(m.current_time(), 0.0);
        assert_eq!(m.duration(), None);

        // nothing to forget the second time
        m.set_source(files.create_source(&clip).unwrap());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
