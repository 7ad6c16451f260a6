use log::{debug, info};
use std::time::Duration;

use super::document::{Document, PageElement};

/// Pause after a dismissal click so the overlay animation can finish.
const DISMISS_SETTLE: Duration = Duration::from_secs(1);

/// Closes the first overlay that becomes clickable, trying `selectors` in order.
///
/// Each selector gets up to `timeout_each` to become clickable. Returns the selector
/// that was clicked, or `None` when no overlay was found. Never fails: extraction
/// proceeds the same either way.
pub async fn dismiss_popups<D: Document>(
    doc: &D,
    selectors: &[String],
    timeout_each: Duration,
) -> Option<String> {
    for selector in selectors {
        let element = match doc.wait_until_clickable(selector, timeout_each).await {
            Ok(Some(element)) => element,
            Ok(None) => continue,
            Err(e) => {
                debug!("Popup selector {} unusable: {}", selector, e);
                continue;
            }
        };

        match element.click().await {
            Ok(()) => {
                tokio::time::sleep(DISMISS_SETTLE).await;
                info!("Closed popup using selector: {}", selector);
                return Some(selector.clone());
            }
            Err(e) => debug!("Click on popup {} failed: {}", selector, e),
        }
    }

    debug!("No popup to dismiss");
    None
}
