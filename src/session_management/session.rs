use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::browser::BrowserProcess;
use crate::identity_rotation::Identity;

/// Owns a session's storage directory and removes it when released or dropped.
///
/// The drop path only exists for unwinding; normal code releases explicitly through
/// [`super::session_manager::SessionManager::close`].
#[derive(Debug)]
pub struct StorageGuard {
    path: PathBuf,
    released: bool,
}

impl StorageGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path, released: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively deletes the directory. A directory that is already gone counts as released.
    pub fn release(mut self) -> std::io::Result<()> {
        self.released = true;
        remove_storage(&self.path)
    }
}

impl Drop for StorageGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        warn!("Session storage {} dropped without close, removing", self.path.display());
        if let Err(e) = remove_storage(&self.path) {
            warn!("Failed to remove session storage {}: {}", self.path.display(), e);
        }
    }
}

pub(crate) fn remove_storage(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed session storage {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Session storage {} already removed", path.display());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// One isolated browser context bound to exactly one identity.
pub struct Session<P: BrowserProcess> {
    pub id: Uuid,
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub(crate) process: P,
    pub(crate) storage: StorageGuard,
}

impl<P: BrowserProcess> Session<P> {
    pub fn page(&self) -> &P::Page {
        self.process.page()
    }

    pub fn storage_dir(&self) -> &Path {
        self.storage.path()
    }
}
