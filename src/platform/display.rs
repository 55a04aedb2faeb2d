//! Host windowing services: picture-in-picture and fullscreen.
//!
//! Both modes are exclusive system-wide. At most one element holds each mode
//! at a time and every request may be denied by the host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};

use super::ElementId;
use crate::{Error, Result};

pub trait DisplayHost: Send + Sync {
    /// Whether the host supports picture-in-picture at all
    fn picture_in_picture_enabled(&self) -> bool;

    /// Element currently holding picture-in-picture, if any
    fn picture_in_picture_element(&self) -> Option<ElementId>;

    fn request_picture_in_picture(&self, element: ElementId) -> BoxFuture<'_, Result<()>>;

    fn exit_picture_in_picture(&self) -> BoxFuture<'_, Result<()>>;

    /// Element currently fullscreen, if any
    fn fullscreen_element(&self) -> Option<ElementId>;

    fn request_fullscreen(&self, element: ElementId) -> BoxFuture<'_, Result<()>>;

    fn exit_fullscreen(&self) -> BoxFuture<'_, Result<()>>;
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory host with switchable denials for tests
pub struct InMemoryDisplayHost {
    pip_enabled: AtomicBool,
    pip_element: Mutex<Option<ElementId>>,
    fullscreen_element: Mutex<Option<ElementId>>,
    deny_pip: Mutex<Option<String>>,
    deny_fullscreen: Mutex<Option<String>>,
    pip_requests: AtomicUsize,
    fullscreen_requests: AtomicUsize,
}

impl InMemoryDisplayHost {
    pub fn new() -> Self {
        InMemoryDisplayHost {
            pip_enabled: AtomicBool::new(true),
            pip_element: Mutex::new(None),
            fullscreen_element: Mutex::new(None),
            deny_pip: Mutex::new(None),
            deny_fullscreen: Mutex::new(None),
            pip_requests: AtomicUsize::new(0),
            fullscreen_requests: AtomicUsize::new(0),
        }
    }

    pub fn set_picture_in_picture_enabled(&self, enabled: bool) {
        self.pip_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Deny future picture-in-picture requests with `reason` (`None` allows).
    pub fn deny_picture_in_picture(&self, reason: Option<&str>) {
        *lock(&self.deny_pip) = reason.map(str::to_string);
    }

    /// Deny future fullscreen requests with `reason` (`None` allows).
    pub fn deny_fullscreen(&self, reason: Option<&str>) {
        *lock(&self.deny_fullscreen) = reason.map(str::to_string);
    }

    /// Hand picture-in-picture to some element directly, as another page
    /// component would.
    pub fn grant_picture_in_picture(&self, element: ElementId) {
        *lock(&self.pip_element) = Some(element);
    }

    /// Number of picture-in-picture requests received so far
    pub fn pip_requests(&self) -> usize {
        self.pip_requests.load(Ordering::SeqCst)
    }

    /// Number of fullscreen requests received so far
    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryDisplayHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayHost for InMemoryDisplayHost {
    fn picture_in_picture_enabled(&self) -> bool {
        self.pip_enabled.load(Ordering::SeqCst)
    }

    fn picture_in_picture_element(&self) -> Option<ElementId> {
        *lock(&self.pip_element)
    }

    fn request_picture_in_picture(&self, element: ElementId) -> BoxFuture<'_, Result<()>> {
        self.pip_requests.fetch_add(1, Ordering::SeqCst);
        let res = if !self.picture_in_picture_enabled() {
            Err(Error::PictureInPictureError("not supported".into()))
        } else if let Some(reason) = lock(&self.deny_pip).clone() {
            Err(Error::PictureInPictureError(reason))
        } else {
            *lock(&self.pip_element) = Some(element);
            Ok(())
        };
        futures::future::ready(res).boxed()
    }

    fn exit_picture_in_picture(&self) -> BoxFuture<'_, Result<()>> {
        let res = match lock(&self.pip_element).take() {
            Some(_) => Ok(()),
            None => Err(Error::PictureInPictureError(
                "no element is in picture-in-picture".into(),
            )),
        };
        futures::future::ready(res).boxed()
    }

    fn fullscreen_element(&self) -> Option<ElementId> {
        *lock(&self.fullscreen_element)
    }

    fn request_fullscreen(&self, element: ElementId) -> BoxFuture<'_, Result<()>> {
        self.fullscreen_requests.fetch_add(1, Ordering::SeqCst);
        let res = match lock(&self.deny_fullscreen).clone() {
            Some(reason) => Err(Error::FullscreenError(reason)),
            None => {
                *lock(&self.fullscreen_element) = Some(element);
                Ok(())
            }
        };
        futures::future::ready(res).boxed()
    }

    fn exit_fullscreen(&self) -> BoxFuture<'_, Result<()>> {
        let res = match lock(&self.fullscreen_element).take() {
            Some(_) => Ok(()),
            None => Err(Error::FullscreenError("document is not fullscreen".into())),
        };
        futures::future::ready(res).boxed()
    }
}
