//! Rendering process seam.
//!
//! A [`BrowserLauncher`] starts one isolated browser process per session, scoped to a
//! storage directory. The process exposes one [`Page`], which is also the [`Document`]
//! the field extractor reads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::configuration::SessionConfig;
use crate::error_handling::types::SessionError;
use crate::extraction::Document;

/// Scripts installed in every new document to hide automation markers.
pub const STEALTH_SCRIPTS: &[&str] = &[
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})",
    "delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array",
    "delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise",
    "delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol",
];

/// Fixed launch options shared by every session of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub launch_timeout: Duration,
}

impl From<&SessionConfig> for BrowserOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            headless: config.headless,
            window_width: config.window_width,
            window_height: config.window_height,
            chrome_executable: config.chrome_executable.as_ref().map(PathBuf::from),
            user_agent: config.user_agent.clone(),
            launch_timeout: Duration::from_secs(config.launch_timeout_secs),
        }
    }
}

/// Automation surface of a live page.
#[allow(async_fn_in_trait)]
pub trait Page: Document {
    /// Loads `url`, failing when the load does not complete within `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    /// Runs `script` in the context of the current document.
    async fn execute_script(&self, script: &str) -> Result<(), SessionError>;

    /// Registers `script` to run before any page script in every new document.
    async fn add_init_script(&self, script: &str) -> Result<(), SessionError>;

    async fn capture_screenshot(&self, path: &Path, full_page: bool) -> Result<(), SessionError>;
}

/// A running browser process bound to one storage directory.
#[allow(async_fn_in_trait)]
pub trait BrowserProcess {
    type Page: Page;

    fn page(&self) -> &Self::Page;

    /// Terminates the process. Must tolerate a process that already exited.
    async fn terminate(&mut self) -> Result<(), SessionError>;
}

#[allow(async_fn_in_trait)]
pub trait BrowserLauncher {
    type Process: BrowserProcess;

    async fn launch(
        &self,
        storage_dir: &Path,
        options: &BrowserOptions,
    ) -> Result<Self::Process, SessionError>;
}
