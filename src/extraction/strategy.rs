//! Ordered fallback over selector strategies.
//!
//! Each field owns a list of selectors. They are tried left to right and the first one
//! that yields an acceptable result wins; later selectors are never queried.

use log::{debug, trace};

use super::document::{Document, PageElement};

/// Outcome of one strategy, or of a whole strategy list.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(String),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Found text, or `sentinel` when nothing matched.
    pub fn or_sentinel(self, sentinel: &str) -> String {
        match self {
            Lookup::Found(text) => text,
            Lookup::NotFound => sentinel.to_string(),
        }
    }
}

/// How a single selector decides whether it produced a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// First matching element, accepted when its text is non-empty.
    FirstNonEmpty,
    /// Every matching element in order; the first whose text holds a digit is accepted.
    /// Skips decorative or empty price placeholders.
    FirstWithDigit,
}

/// Runs one selector against the document.
///
/// Query errors are treated like a miss: a broken selector must not stop the fallback.
pub async fn try_strategy<D: Document>(doc: &D, selector: &str, acceptance: Acceptance) -> Lookup {
    match acceptance {
        Acceptance::FirstNonEmpty => match doc.find_element(selector).await {
            Ok(Some(element)) => accept_text(&element, |text| !text.is_empty()).await,
            Ok(None) => Lookup::NotFound,
            Err(e) => {
                trace!("Selector {} failed: {}", selector, e);
                Lookup::NotFound
            }
        },
        Acceptance::FirstWithDigit => match doc.find_elements(selector).await {
            Ok(elements) => {
                for element in &elements {
                    let lookup = accept_text(element, |text| text.chars().any(|c| c.is_ascii_digit())).await;
                    if lookup.is_found() {
                        return lookup;
                    }
                }
                Lookup::NotFound
            }
            Err(e) => {
                trace!("Selector {} failed: {}", selector, e);
                Lookup::NotFound
            }
        },
    }
}

async fn accept_text<E: PageElement>(element: &E, accept: impl Fn(&str) -> bool) -> Lookup {
    match element.text().await {
        Ok(text) => {
            let text = text.trim();
            if accept(text) {
                Lookup::Found(text.to_string())
            } else {
                Lookup::NotFound
            }
        }
        Err(e) => {
            trace!("Could not read element text: {}", e);
            Lookup::NotFound
        }
    }
}

/// Folds the selector list left to right, stopping at the first [`Lookup::Found`].
pub async fn first_match<D: Document>(doc: &D, selectors: &[String], acceptance: Acceptance) -> Lookup {
    for selector in selectors {
        let lookup = try_strategy(doc, selector, acceptance).await;
        if lookup.is_found() {
            debug!("Selector {} matched", selector);
            return lookup;
        }
    }
    Lookup::NotFound
}

/// First element present for any selector in order, with the selector that found it.
pub async fn first_present<D: Document>(doc: &D, selectors: &[String]) -> Option<(String, D::Element)> {
    for selector in selectors {
        match doc.find_element(selector).await {
            Ok(Some(element)) => return Some((selector.clone(), element)),
            Ok(None) => {}
            Err(e) => trace!("Selector {} failed: {}", selector, e),
        }
    }
    None
}
