use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for a text field no strategy could read.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for the raw price when no price element was found.
pub const NO_PRICE: &str = "No price found";
/// Placeholder for text fields of a scrape that failed as a whole.
pub const ERROR: &str = "Error";

/// Text fields read from one hotel page.
///
/// Every field is always populated; misses carry [`UNKNOWN`] or [`NO_PRICE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelFields {
    pub hotel_name: String,
    pub address: String,
    pub rating: String,
    pub raw_price: String,
    pub normalized_price: Option<f64>,
    pub checkin_date: String,
    pub checkout_date: String,
    pub nights: String,
}

impl HotelFields {
    pub fn unknown() -> Self {
        Self {
            hotel_name: UNKNOWN.to_string(),
            address: UNKNOWN.to_string(),
            rating: UNKNOWN.to_string(),
            raw_price: NO_PRICE.to_string(),
            normalized_price: None,
            checkin_date: UNKNOWN.to_string(),
            checkout_date: UNKNOWN.to_string(),
            nights: UNKNOWN.to_string(),
        }
    }

    /// Fields for a page that could not be scraped at all.
    pub fn errored(reason: &str) -> Self {
        Self {
            hotel_name: ERROR.to_string(),
            address: ERROR.to_string(),
            rating: ERROR.to_string(),
            raw_price: format!("{}: {}", ERROR, reason),
            normalized_price: None,
            checkin_date: ERROR.to_string(),
            checkout_date: ERROR.to_string(),
            nights: ERROR.to_string(),
        }
    }
}

/// Result of scraping one page under one identity.
///
/// Flat on purpose: the same shape serializes to a CSV row and to a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub identity: String,
    pub hotel_name: String,
    pub address: String,
    pub rating: String,
    pub raw_price: String,
    pub normalized_price: Option<f64>,
    pub checkin_date: String,
    pub checkout_date: String,
    pub nights: String,
    pub screenshot: String,
    pub scraped_at: DateTime<Utc>,
    pub url: String,
    pub ip_address: String,
}

impl ExtractionRecord {
    pub fn new(
        identity: &str,
        url: &str,
        ip_address: &str,
        screenshot: Option<String>,
        fields: HotelFields,
    ) -> Self {
        Self {
            identity: identity.to_string(),
            hotel_name: fields.hotel_name,
            address: fields.address,
            rating: fields.rating,
            raw_price: fields.raw_price,
            normalized_price: fields.normalized_price,
            checkin_date: fields.checkin_date,
            checkout_date: fields.checkout_date,
            nights: fields.nights,
            screenshot: screenshot.unwrap_or_else(|| UNKNOWN.to_string()),
            scraped_at: Utc::now(),
            url: url.to_string(),
            ip_address: ip_address.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.raw_price.starts_with(ERROR)
    }

    /// A record is usable when a price element was found and the scrape did not fail.
    pub fn is_usable(&self) -> bool {
        self.raw_price != NO_PRICE && !self.is_error()
    }
}
