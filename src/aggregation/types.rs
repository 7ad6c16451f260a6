use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionRecord;
use crate::identity_rotation::Identity;

/// Summary over every record that carried a normalized price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// `max - min`
    pub spread: f64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Every collected record in processing order, usable or not.
    pub records: Vec<ExtractionRecord>,
    /// Identities whose record carried a price.
    pub succeeded: Vec<Identity>,
    /// Identities abandoned before producing a record, or whose record had no usable price.
    pub failed: Vec<Identity>,
    /// Absent when no record had a normalized price.
    pub statistics: Option<PriceStatistics>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    pub fn usable_records(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records.iter().filter(|r| r.is_usable())
    }
}
