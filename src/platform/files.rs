//! Local file selection and opaque playable references
//!
//! A chosen file never reaches the media surface as a path or URL string: the
//! host turns the handle into a [`LocalSource`], an opaque token that stays
//! valid until it is revoked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A file picked through the platform chooser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Display name reported by the chooser
    pub name: String,
    /// Declared media type, if the platform knows one. Never validated here.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, media_type: Option<&str>, size: u64) -> Self {
        FileHandle {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            size,
        }
    }
}

/// Opaque playable reference to a local file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalSource(u64);

/// Platform file services: the chooser dialog and local object references.
pub trait LocalFiles: Send + Sync {
    /// Ask the platform to show its file chooser. The pick arrives later as an
    /// input event.
    fn open_chooser(&self);

    /// Build a playable reference for `file`
    fn create_source(&self, file: &FileHandle) -> Result<LocalSource>;

    /// Release a reference created by `create_source`
    fn revoke_source(&self, source: LocalSource);
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory object registry that records chooser requests
pub struct InMemoryFiles {
    next: AtomicU64,
    live: Mutex<HashMap<LocalSource, FileHandle>>,
    chooser_opened: AtomicU64,
}

impl InMemoryFiles {
    pub fn new() -> Self {
        InMemoryFiles {
            next: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
            chooser_opened: AtomicU64::new(0),
        }
    }

    /// File behind a live reference
    pub fn resolve(&self, source: LocalSource) -> Option<FileHandle> {
        lock(&self.live).get(&source).cloned()
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    /// How many times the chooser dialog was requested
    pub fn chooser_opened(&self) -> u64 {
        self.chooser_opened.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFiles for InMemoryFiles {
    fn open_chooser(&self) {
        self.chooser_opened.fetch_add(1, Ordering::SeqCst);
    }

    fn create_source(&self, file: &FileHandle) -> Result<LocalSource> {
        if file.name.is_empty() {
            return Err(Error::SourceError("file handle has no name".into()));
        }
        let source = LocalSource(self.next.fetch_add(1, Ordering::SeqCst));
        lock(&self.live).insert(source, file.clone());
        Ok(source)
    }

    fn revoke_source(&self, source: LocalSource) {
        lock(&self.live).remove(&source);
    }
}
