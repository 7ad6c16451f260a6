//! Capability set of a rendered document, as seen by the extraction code.
//!
//! The production implementation drives a live browser tab; tests use in-memory stubs.

use crate::error_handling::types::DocumentError;
use std::time::Duration;

/// One element located in a rendered document.
#[allow(async_fn_in_trait)]
pub trait PageElement {
    /// Visible text of the element, untrimmed. `Ok(String::new())` when it has none.
    async fn text(&self) -> Result<String, DocumentError>;

    async fn click(&self) -> Result<(), DocumentError>;

    async fn scroll_into_view(&self) -> Result<(), DocumentError>;
}

/// Element lookup over a rendered document.
#[allow(async_fn_in_trait)]
pub trait Document {
    type Element: PageElement;

    /// First element matching `selector`, if any.
    async fn find_element(&self, selector: &str) -> Result<Option<Self::Element>, DocumentError>;

    /// All elements matching `selector`, in document order.
    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, DocumentError>;

    /// Waits up to `timeout` for an element matching `selector` to become clickable.
    ///
    /// Returns `Ok(None)` when the timeout elapses without a clickable match.
    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, DocumentError>;
}
