//! Run controller: the per-identity state machine tying rotation, sessions,
//! extraction and aggregation together.

pub mod controller_handler;
pub mod run_state;
pub mod scrape;

#[cfg(test)]
mod tests;

pub use controller_handler::Controller;
pub use run_state::RunState;
pub use scrape::PageScraper;
