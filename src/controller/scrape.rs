use chrono::Local;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

use crate::configuration::Config;
use crate::error_handling::types::SessionError;
use crate::extraction::{dismiss_popups, first_present, Document, FieldExtractor, HotelFields, PageElement};
use crate::identity_rotation::Identity;
use crate::session_management::Page;

const BODY_POLL: Duration = Duration::from_millis(500);
const PRICING_SCROLL_SETTLE: Duration = Duration::from_secs(3);
const FALLBACK_SCROLL_SETTLE: Duration = Duration::from_secs(2);
const SCROLL_TO_MIDDLE: &str = "window.scrollTo(0, document.body.scrollHeight / 2);";

/// Loads the target page in a session and turns it into hotel fields and a screenshot.
pub struct PageScraper {
    url: String,
    extractor: FieldExtractor,
    popup_selectors: Vec<String>,
    pricing_section_selectors: Vec<String>,
    page_load_timeout: Duration,
    popup_timeout: Duration,
    body_timeout: Duration,
    settle: Duration,
    post_load_settle: Duration,
    screenshots_dir: PathBuf,
    full_page: bool,
}

impl PageScraper {
    pub fn new(config: &Config) -> Self {
        let extraction = &config.extraction;
        Self {
            url: config.target_url().to_string(),
            extractor: FieldExtractor::new(extraction),
            popup_selectors: extraction.popup_selectors.clone(),
            pricing_section_selectors: extraction.pricing_section_selectors.clone(),
            page_load_timeout: Duration::from_secs(config.session.page_load_timeout_secs),
            popup_timeout: Duration::from_secs(extraction.popup_timeout_secs),
            body_timeout: Duration::from_secs(extraction.body_timeout_secs),
            settle: Duration::from_secs(extraction.settle_secs),
            post_load_settle: Duration::from_secs(extraction.post_load_settle_secs),
            screenshots_dir: PathBuf::from(&config.output.screenshots_dir),
            full_page: config.output.full_page_screenshot,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Navigates, settles, clears overlays and reads the hotel fields.
    ///
    /// Only a failed navigation is an error; everything after it degrades to sentinels.
    pub async fn extract<P: Page>(&self, page: &P) -> Result<HotelFields, SessionError> {
        info!("Loading {}", self.url);
        page.navigate(&self.url, self.page_load_timeout).await?;
        tokio::time::sleep(self.settle).await;

        dismiss_popups(page, &self.popup_selectors, self.popup_timeout).await;

        if !self.wait_for_body(page).await {
            warn!("Timeout waiting for page body after {}s", self.body_timeout.as_secs());
        }
        tokio::time::sleep(self.post_load_settle).await;

        Ok(self.extractor.extract(page).await)
    }

    /// Scrolls the pricing area into view and saves a screenshot.
    ///
    /// Returns the screenshot path, or `None` when capture failed.
    pub async fn capture<P: Page>(&self, page: &P, identity: &Identity) -> Option<String> {
        self.scroll_to_pricing(page).await;

        if let Err(e) = tokio::fs::create_dir_all(&self.screenshots_dir).await {
            warn!("Could not create screenshots dir {}: {}", self.screenshots_dir.display(), e);
            return None;
        }

        let path = self.screenshot_path(identity);
        match page.capture_screenshot(&path, self.full_page).await {
            Ok(()) => {
                info!("Screenshot saved: {}", path.display());
                Some(path.to_string_lossy().into_owned())
            }
            Err(e) => {
                warn!("Screenshot for {} failed: {}", identity, e);
                None
            }
        }
    }

    fn screenshot_path(&self, identity: &Identity) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        self.screenshots_dir.join(format!("hotel_{}_{}.png", identity, stamp))
    }

    async fn wait_for_body<D: Document>(&self, doc: &D) -> bool {
        let deadline = Instant::now() + self.body_timeout;
        loop {
            if let Ok(Some(_)) = doc.find_element("body").await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(BODY_POLL).await;
        }
    }

    async fn scroll_to_pricing<P: Page>(&self, page: &P) {
        match first_present(page, &self.pricing_section_selectors).await {
            Some((selector, element)) => match element.scroll_into_view().await {
                Ok(()) => {
                    debug!("Scrolled to pricing section {}", selector);
                    tokio::time::sleep(PRICING_SCROLL_SETTLE).await;
                    return;
                }
                Err(e) => warn!("Could not scroll to pricing section {}: {}", selector, e),
            },
            None => debug!("No pricing section found, scrolling to mid-page"),
        }

        match page.execute_script(SCROLL_TO_MIDDLE).await {
            Ok(()) => tokio::time::sleep(FALLBACK_SCROLL_SETTLE).await,
            Err(e) => warn!("Fallback scroll failed: {}", e),
        }
    }
}
