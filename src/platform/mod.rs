//! Platform API surface: media element, display host services, local files
//!
//! This module contains the capability traits the controller is written
//! against, plus deterministic in-memory implementations used by tests and the
//! demo binary.

pub mod display;
pub mod files;
pub mod media;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub use display::{DisplayHost, InMemoryDisplayHost};
pub use files::{FileHandle, InMemoryFiles, LocalFiles, LocalSource};
pub use media::{InMemoryMediaSurface, MediaEventKind, MediaListener, MediaSnapshot, MediaSurface};

/// Identity of a host element (media surface or player container)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

static NEXT_ELEMENT: AtomicU64 = AtomicU64::new(1);

impl ElementId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        ElementId(NEXT_ELEMENT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A small composite trait bundling the collaborators a controller needs.
pub trait PlatformApi: Send + Sync {
    fn media_surface(&self) -> Arc<dyn MediaSurface>;
    fn display_host(&self) -> Arc<dyn DisplayHost>;
    fn local_files(&self) -> Arc<dyn LocalFiles>;
    /// The element wrapping video and controls; fullscreen targets this
    fn player_container(&self) -> ElementId;
}

/// In-memory platform wiring the deterministic implementations together.
///
/// The concrete handles are exposed so tests can drive the host side
/// (advance the clock, deny requests, hand PiP to another element).
pub struct InMemoryPlatform {
    pub media: Arc<InMemoryMediaSurface>,
    pub display: Arc<InMemoryDisplayHost>,
    pub files: Arc<InMemoryFiles>,
    container: ElementId,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        InMemoryPlatform {
            media: Arc::new(InMemoryMediaSurface::new()),
            display: Arc::new(InMemoryDisplayHost::new()),
            files: Arc::new(InMemoryFiles::new()),
            container: ElementId::next(),
        }
    }
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for InMemoryPlatform {
    fn media_surface(&self) -> Arc<dyn MediaSurface> {
        self.media.clone()
    }

    fn display_host(&self) -> Arc<dyn DisplayHost> {
        self.display.clone()
    }

    fn local_files(&self) -> Arc<dyn LocalFiles> {
        self.files.clone()
    }

    fn player_container(&self) -> ElementId {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_platform_provides_fresh_surfaces() {
        let p = InMemoryPlatform::new();
        let media = p.media_surface();
        assert!(media.paused());
        assert_eq!(media.duration(), None);

        let display = p.display_host();
        assert!(display.picture_in_picture_enabled());
        assert_eq!(display.fullscreen_element(), None);

        assert_ne!(p.player_container(), media.element_id());
    }

    #[test]
    fn element_ids_are_unique() {
        let a = ElementId::next();
        let b = ElementId::next();
        assert_ne!(a, b);
    }
}
