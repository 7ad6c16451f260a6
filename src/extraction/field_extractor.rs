use log::{debug, info};

use super::document::Document;
use super::strategy::{first_match, Acceptance, Lookup};
use super::types::{HotelFields, NO_PRICE, UNKNOWN};
use crate::configuration::ExtractionConfig;
use crate::price_normalizer::normalize_price;

/// Reads the fixed hotel schema from a rendered document.
///
/// Each field is resolved independently through its own ordered selector list. A field
/// that no selector can read gets its sentinel; extraction itself never fails.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    hotel_name: Vec<String>,
    address: Vec<String>,
    rating: Vec<String>,
    price: Vec<String>,
    checkin: Vec<String>,
    checkout: Vec<String>,
    nights: Vec<String>,
}

impl FieldExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            hotel_name: config.hotel_name.clone(),
            address: config.address.clone(),
            rating: config.rating.clone(),
            price: config.price.clone(),
            checkin: config.checkin.clone(),
            checkout: config.checkout.clone(),
            nights: config.nights.clone(),
        }
    }

    pub async fn extract<D: Document>(&self, doc: &D) -> HotelFields {
        let hotel_name = self.text_field(doc, "hotel_name", &self.hotel_name).await;
        let address = self.text_field(doc, "address", &self.address).await;
        let rating = self.text_field(doc, "rating", &self.rating).await;

        let (raw_price, normalized_price) = match first_match(doc, &self.price, Acceptance::FirstWithDigit).await {
            Lookup::Found(text) => {
                let normalized = normalize_price(&text);
                if normalized.is_none() {
                    debug!("Price text {:?} could not be normalized", text);
                }
                (text, normalized)
            }
            Lookup::NotFound => {
                debug!("No price element matched any of {} selectors", self.price.len());
                (NO_PRICE.to_string(), None)
            }
        };

        let checkin_date = self.text_field(doc, "checkin_date", &self.checkin).await;
        let checkout_date = self.text_field(doc, "checkout_date", &self.checkout).await;
        let nights = self.text_field(doc, "nights", &self.nights).await;

        info!("Extracted {} - {}", hotel_name, raw_price);

        HotelFields {
            hotel_name,
            address,
            rating,
            raw_price,
            normalized_price,
            checkin_date,
            checkout_date,
            nights,
        }
    }

    async fn text_field<D: Document>(&self, doc: &D, name: &str, selectors: &[String]) -> String {
        let lookup = first_match(doc, selectors, Acceptance::FirstNonEmpty).await;
        if !lookup.is_found() {
            debug!("Field {} not found, using sentinel", name);
        }
        lookup.or_sentinel(UNKNOWN)
    }
}
