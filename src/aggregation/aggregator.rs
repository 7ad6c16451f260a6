use chrono::{DateTime, Utc};
use log::{debug, info};

use super::types::{PriceStatistics, RunResult};
use crate::extraction::ExtractionRecord;
use crate::identity_rotation::Identity;

/// Collects records and failures as a run progresses and summarizes them at the end.
#[derive(Debug)]
pub struct ResultAggregator {
    records: Vec<ExtractionRecord>,
    succeeded: Vec<Identity>,
    failed: Vec<Identity>,
    started_at: DateTime<Utc>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Retains `record` and files its identity as succeeded or failed by price usability.
    ///
    /// Returns whether the record was usable.
    pub fn add(&mut self, identity: &Identity, record: ExtractionRecord) -> bool {
        let usable = record.is_usable();
        if usable {
            self.succeeded.push(identity.clone());
        } else {
            self.failed.push(identity.clone());
        }
        debug!(
            "Collected record for {} (raw price {:?}, usable: {})",
            identity, record.raw_price, usable
        );
        self.records.push(record);
        usable
    }

    /// Marks `identity` failed without a record (activation or session setup failure).
    pub fn add_failure(&mut self, identity: &Identity) {
        self.failed.push(identity.clone());
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn finalize(self) -> RunResult {
        let statistics = price_statistics(&self.records);
        match &statistics {
            Some(stats) => info!(
                "Price statistics over {} records: min {:.2}, max {:.2}, mean {:.2}, spread {:.2}",
                stats.count, stats.min, stats.max, stats.mean, stats.spread
            ),
            None => info!("No valid prices collected, statistics omitted"),
        }

        RunResult {
            records: self.records,
            succeeded: self.succeeded,
            failed: self.failed,
            statistics,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Min, max, mean and spread over the records with a normalized price.
pub fn price_statistics(records: &[ExtractionRecord]) -> Option<PriceStatistics> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.normalized_price).collect();
    if prices.is_empty() {
        return None;
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;

    Some(PriceStatistics {
        count: prices.len(),
        min,
        max,
        mean,
        spread: max - min,
    })
}
