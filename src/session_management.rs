//! Session management core module.
//!
//! A session is one isolated browser process with its own profile directory, bound to
//! exactly one identity. Sessions are opened and closed strictly one at a time.
//!
//! - `browser`: traits for the rendering process and its page, plus launch options
//! - `chromium`: the Chromium implementation of those traits
//! - `session`: the [`Session`] handle and its storage guard
//! - `session_manager`: [`SessionManager`], the open/close pair

pub mod browser;
pub mod chromium;
pub mod session;
pub mod session_manager;

pub use browser::{BrowserLauncher, BrowserOptions, BrowserProcess, Page};
pub use chromium::ChromiumLauncher;
pub use session::Session;
pub use session_manager::SessionManager;

/// Counters describing session lifecycle activity since manager init.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    /// Sessions successfully opened.
    pub opened: u64,
    /// Sessions passed through `close`.
    pub closed: u64,
    /// Opens that failed (storage setup or browser launch).
    pub failed: u64,
    /// Close steps (terminate or storage removal) that failed and were only logged.
    pub cleanup_failures: u64,
}
