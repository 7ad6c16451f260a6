//! Result aggregation: collects per-identity records and computes price statistics.

pub mod aggregator;
pub mod types;

pub use aggregator::{price_statistics, ResultAggregator};
pub use types::{PriceStatistics, RunResult};
