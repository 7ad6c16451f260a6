//! Field extraction from rendered hotel pages.
//!
//! Extraction is a best-effort pattern search, not a parse. Every field owns an ordered
//! list of selector strategies (see [`strategy`]); the first acceptable match wins and
//! misses resolve to explicit sentinels, so an [`ExtractionRecord`] is always complete.
//!
//! Submodules:
//! - `document`: element lookup capabilities a rendered page must provide
//! - `strategy`: the ordered-fallback interpreter
//! - `field_extractor`: the hotel schema and its strategy lists
//! - `popups`: opportunistic overlay dismissal
//! - `types`: [`HotelFields`], [`ExtractionRecord`] and sentinel values

pub mod document;
pub mod field_extractor;
pub mod popups;
pub mod strategy;
pub mod types;

pub use document::{Document, PageElement};
pub use field_extractor::FieldExtractor;
pub use popups::dismiss_popups;
pub use strategy::{first_match, first_present, Acceptance, Lookup};
pub use types::{ExtractionRecord, HotelFields, ERROR, NO_PRICE, UNKNOWN};
