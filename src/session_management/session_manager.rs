use chrono::Utc;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use uuid::Uuid;

use super::browser::{BrowserLauncher, BrowserOptions, BrowserProcess, Page, STEALTH_SCRIPTS};
use super::session::{remove_storage, Session, StorageGuard};
use super::SessionStats;
use crate::configuration::SessionConfig;
use crate::error_handling::types::SessionError;
use crate::identity_rotation::Identity;

/// Creates and tears down one isolated browser session per identity.
///
/// Each session gets a freshly created profile directory under `root_dir`, named
/// `<prefix>_<unix-timestamp>_<random-id>` so names never collide across runs. At most
/// one session is open at any time; [`SessionManager::open`] refuses to start a second
/// one until the first is passed to [`SessionManager::close`].
///
/// `open`/`close` form a scoped pair: `close` consumes the session, so it runs at most
/// once per session, and it always reclaims the directory even when the browser
/// already died.
pub struct SessionManager<L: BrowserLauncher> {
    launcher: L,
    options: BrowserOptions,
    root_dir: PathBuf,
    dir_prefix: String,
    open_session: Option<Uuid>,
    stats: SessionStats,
}

impl<L: BrowserLauncher> SessionManager<L> {
    pub fn new(launcher: L, config: &SessionConfig) -> Self {
        Self {
            launcher,
            options: BrowserOptions::from(config),
            root_dir: PathBuf::from(&config.root_dir),
            dir_prefix: config.dir_prefix.clone(),
            open_session: None,
            stats: SessionStats::default(),
        }
    }

    /// Starts a browser session for `identity`.
    ///
    /// On any failure the freshly created directory is removed before returning.
    pub async fn open(&mut self, identity: &Identity) -> Result<Session<L::Process>, SessionError> {
        if let Some(id) = self.open_session {
            error!("Refusing to open a session for {} while session {} is open", identity, id);
            return Err(SessionError::AlreadyOpen(id));
        }

        let storage = self.allocate_storage()?;
        debug!("Allocated session storage {}", storage.path().display());

        let launch = self.launcher.launch(storage.path(), &self.options);
        let outcome = tokio::time::timeout(self.options.launch_timeout, launch).await;
        let process = match outcome {
            Ok(Ok(process)) => process,
            Ok(Err(e)) => {
                error!("Failed to launch browser for {}: {}", identity, e);
                self.discard_storage(storage);
                return Err(e);
            }
            Err(_) => {
                let secs = self.options.launch_timeout.as_secs();
                error!("Browser launch for {} timed out after {}s", identity, secs);
                self.discard_storage(storage);
                return Err(SessionError::LaunchTimeout(secs));
            }
        };

        for script in STEALTH_SCRIPTS {
            if let Err(e) = process.page().add_init_script(script).await {
                warn!("Could not install init script: {}", e);
            }
        }

        let session = Session {
            id: Uuid::new_v4(),
            identity: identity.clone(),
            created_at: Utc::now(),
            process,
            storage,
        };

        self.open_session = Some(session.id);
        self.stats.opened += 1;
        info!(
            "Opened session {} for {} with storage {}",
            session.id,
            identity,
            session.storage_dir().display()
        );
        Ok(session)
    }

    /// Terminates the session's browser and deletes its storage.
    ///
    /// Best-effort: failures are logged and counted, never returned.
    pub async fn close(&mut self, session: Session<L::Process>) {
        let Session {
            id,
            identity,
            mut process,
            storage,
            ..
        } = session;
        info!("Closing session {} for {}", id, identity);

        if let Err(e) = process.terminate().await {
            warn!("Failed to terminate browser for session {}: {}", id, e);
            self.stats.cleanup_failures += 1;
        }
        drop(process);

        let path = storage.path().to_path_buf();
        match storage.release() {
            Ok(()) => debug!("Cleaned up session storage {}", path.display()),
            Err(e) => {
                warn!("Could not clean up session storage {}: {}", path.display(), e);
                self.stats.cleanup_failures += 1;
            }
        }

        if self.open_session == Some(id) {
            self.open_session = None;
        }
        self.stats.closed += 1;
    }

    /// Removes session directories left behind by earlier runs.
    ///
    /// Only entries whose name starts with the configured prefix are touched. The root
    /// itself is removed when it ends up empty. Returns the number of directories removed.
    pub fn sweep_stale_sessions(&self) -> usize {
        let entries = match std::fs::read_dir(&self.root_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No session root to sweep at {}: {}", self.root_dir.display(), e);
                return 0;
            }
        };

        let mut removed = 0usize;
        for entry in entries.flatten() {
            let path = entry.path();
            let matches_prefix = entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(&self.dir_prefix))
                .unwrap_or(false);
            if !matches_prefix || !path.is_dir() {
                continue;
            }
            match remove_storage(&path) {
                Ok(()) => {
                    info!("Cleaned up leftover session directory: {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Could not remove leftover session {}: {}", path.display(), e),
            }
        }

        let is_empty = std::fs::read_dir(&self.root_dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            match std::fs::remove_dir(&self.root_dir) {
                Ok(()) => debug!("Removed empty session root {}", self.root_dir.display()),
                Err(e) => debug!("Could not remove session root {}: {}", self.root_dir.display(), e),
            }
        }

        removed
    }

    pub fn has_open_session(&self) -> bool {
        self.open_session.is_some()
    }

    pub fn get_session_stats(&self) -> SessionStats {
        self.stats.clone()
    }

    fn allocate_storage(&mut self) -> Result<StorageGuard, SessionError> {
        std::fs::create_dir_all(&self.root_dir).map_err(|e| {
            error!("Failed to create session root {}: {}", self.root_dir.display(), e);
            SessionError::StorageSetupFailed(e.to_string())
        })?;

        let unique = Uuid::new_v4().simple().to_string();
        let name = format!("{}_{}_{}", self.dir_prefix, Utc::now().timestamp(), &unique[..8]);
        let path = self.root_dir.join(name);

        // create_dir (not create_dir_all) so a name collision fails instead of reusing a profile
        std::fs::create_dir(&path).map_err(|e| {
            error!("Failed to create session storage {}: {}", path.display(), e);
            self.stats.failed += 1;
            SessionError::StorageSetupFailed(e.to_string())
        })?;

        Ok(StorageGuard::new(path))
    }

    fn discard_storage(&mut self, storage: StorageGuard) {
        self.stats.failed += 1;
        let path = storage.path().to_path_buf();
        if let Err(e) = storage.release() {
            warn!("Could not remove storage {} after failed launch: {}", path.display(), e);
        }
    }
}
