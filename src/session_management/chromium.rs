//! Chromium-backed rendering process, driven over the DevTools protocol.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page as CdpPage;
use futures::StreamExt;
use log::{debug, info, trace, warn};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::browser::{BrowserLauncher, BrowserOptions, BrowserProcess, Page};
use crate::error_handling::types::{DocumentError, SessionError};
use crate::extraction::{Document, PageElement};

/// Interval between clickability probes while waiting for an element.
const CLICKABLE_POLL: Duration = Duration::from_millis(250);

/// Launch flags. Default automation flags are disabled as a whole so the
/// "controlled by automated software" banner never shows.
const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-notifications",
    "--disable-popup-blocking",
    "--disable-blink-features=AutomationControlled",
    "--autoplay-policy=user-gesture-required",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--disable-translate",
    "--disable-default-apps",
    "--disable-domain-reliability",
    "--disable-features=TranslateUI",
    "--hide-scrollbars",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-first-run",
    "--metrics-recording-only",
    "--safebrowsing-disable-auto-update",
];

const IS_CLICKABLE_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.pointerEvents !== 'none'
        && !this.disabled;
}";

/// Launches one Chromium process per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn build_config(storage_dir: &Path, options: &BrowserOptions) -> Result<BrowserConfig, SessionError> {
        let mut builder = BrowserConfig::builder()
            .disable_default_args()
            .args(LAUNCH_ARGS.iter().copied())
            .user_data_dir(storage_dir)
            .window_size(options.window_width, options.window_height)
            .viewport(Viewport {
                width: options.window_width,
                height: options.window_height,
                ..Viewport::default()
            });

        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &options.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }

        builder.build().map_err(SessionError::LaunchFailed)
    }
}

impl BrowserLauncher for ChromiumLauncher {
    type Process = ChromiumProcess;

    async fn launch(&self, storage_dir: &Path, options: &BrowserOptions) -> Result<ChromiumProcess, SessionError> {
        let config = Self::build_config(storage_dir, options)?;
        debug!("Launching Chromium with profile {}", storage_dir.display());

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Chromium handler event error: {}", e);
                }
            }
            debug!("Chromium handler loop ended");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(term) = shutdown(&mut browser, &handler_task).await {
                    warn!("Could not terminate Chromium after page setup failure: {}", term);
                }
                return Err(SessionError::LaunchFailed(format!("could not open page: {}", e)));
            }
        };

        info!("Chromium started with profile {}", storage_dir.display());
        Ok(ChromiumProcess {
            browser,
            handler_task,
            page: ChromiumPage { page },
        })
    }
}

/// Closes the browser, falling back to killing the child, then stops the event loop.
async fn shutdown(browser: &mut Browser, handler_task: &JoinHandle<()>) -> Result<(), SessionError> {
    let outcome = match browser.close().await {
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Graceful Chromium close failed ({}), killing process", e);
            match browser.kill().await {
                Some(Err(kill_err)) => Err(SessionError::TerminateFailed(kill_err.to_string())),
                _ => Ok(()),
            }
        }
    };

    if let Err(e) = browser.wait().await {
        debug!("Waiting for Chromium exit failed: {}", e);
    }
    handler_task.abort();
    outcome
}

pub struct ChromiumProcess {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: ChromiumPage,
}

impl BrowserProcess for ChromiumProcess {
    type Page = ChromiumPage;

    fn page(&self) -> &ChromiumPage {
        &self.page
    }

    async fn terminate(&mut self) -> Result<(), SessionError> {
        shutdown(&mut self.browser, &self.handler_task).await
    }
}

impl Drop for ChromiumProcess {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

pub struct ChromiumPage {
    page: CdpPage,
}

pub struct ChromiumElement {
    element: Element,
}

impl ChromiumElement {
    async fn is_clickable(&self) -> bool {
        match self.element.call_js_fn(IS_CLICKABLE_JS, false).await {
            Ok(returns) => returns.result.value.and_then(|v| v.as_bool()).unwrap_or(false),
            Err(e) => {
                trace!("Clickability probe failed: {}", e);
                false
            }
        }
    }
}

impl PageElement for ChromiumElement {
    async fn text(&self) -> Result<String, DocumentError> {
        self.element
            .inner_text()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| DocumentError::Query(e.to_string()))
    }

    async fn click(&self) -> Result<(), DocumentError> {
        self.element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| DocumentError::Interaction(e.to_string()))
    }

    async fn scroll_into_view(&self) -> Result<(), DocumentError> {
        self.element
            .scroll_into_view()
            .await
            .map(|_| ())
            .map_err(|e| DocumentError::Interaction(e.to_string()))
    }
}

impl Document for ChromiumPage {
    type Element = ChromiumElement;

    async fn find_element(&self, selector: &str) -> Result<Option<ChromiumElement>, DocumentError> {
        Ok(self.find_elements(selector).await?.into_iter().next())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<ChromiumElement>, DocumentError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| DocumentError::Query(format!("{}: {}", selector, e)))?;
        Ok(elements.into_iter().map(|element| ChromiumElement { element }).collect())
    }

    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<ChromiumElement>, DocumentError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find_element(selector).await? {
                if element.is_clickable().await {
                    return Ok(Some(element));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(CLICKABLE_POLL).await;
        }
    }
}

impl Page for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(SessionError::NavigationFailed(e.to_string())),
            Err(_) => Err(SessionError::NavigationFailed(format!(
                "page load exceeded {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn execute_script(&self, script: &str) -> Result<(), SessionError> {
        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| SessionError::ScriptFailed(e.to_string()))
    }

    async fn add_init_script(&self, script: &str) -> Result<(), SessionError> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
            .await
            .map(|_| ())
            .map_err(|e| SessionError::ScriptFailed(e.to_string()))
    }

    async fn capture_screenshot(&self, path: &Path, full_page: bool) -> Result<(), SessionError> {
        let params = ScreenshotParams::builder().full_page(full_page).build();
        self.page
            .save_screenshot(params, path)
            .await
            .map(|_| ())
            .map_err(|e| SessionError::CaptureFailed(e.to_string()))
    }
}
