//! Storage Trait
//!
//! Defines [`ResultStorage`], the persistence seam for finished runs. The run itself
//! never depends on persistence succeeding; `main` saves the result after the run.

use std::path::PathBuf;

use crate::aggregation::RunResult;
use crate::error_handling::types::StorageError;

/// Where a run's artifacts ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

pub trait ResultStorage: Send + Sync {
    /// Persists every record (tabular) and the full result (structured).
    fn save_run(&self, result: &RunResult) -> Result<StoredRun, StorageError>;
}
