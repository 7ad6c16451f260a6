use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{error, info};

use crate::aggregation::RunResult;
use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::{ResultStorage, StoredRun};

/// Column order of the CSV export; matches the field order of `ExtractionRecord`.
pub const CSV_HEADERS: [&str; 13] = [
    "identity",
    "hotel_name",
    "address",
    "rating",
    "raw_price",
    "normalized_price",
    "checkin_date",
    "checkout_date",
    "nights",
    "screenshot",
    "scraped_at",
    "url",
    "ip_address",
];

/// Writes `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.csv` and the matching `.json`.
pub struct FileStorage {
    base_path: PathBuf,
    file_prefix: String,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P, file_prefix: &str) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| {
            error!("Failed to create output dir {}: {}", base_path.display(), e);
            StorageError::WriteFailed(format!("{}: {}", base_path.display(), e))
        })?;
        info!("FileStorage initialized at {}", base_path.display());

        Ok(Self {
            base_path,
            file_prefix: file_prefix.to_string(),
        })
    }

    fn run_paths(&self) -> (PathBuf, PathBuf) {
        let stem = format!("{}_{}", self.file_prefix, Local::now().format("%Y%m%d_%H%M%S"));
        (
            self.base_path.join(format!("{}.csv", stem)),
            self.base_path.join(format!("{}.json", stem)),
        )
    }

    fn write_csv(&self, path: &Path, result: &RunResult) -> Result<(), StorageError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(CSV_HEADERS)?;
        for record in &result.records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| {
            error!("Failed to flush {}: {}", path.display(), e);
            StorageError::WriteFailed(format!("{}: {}", path.display(), e))
        })
    }

    fn write_json(&self, path: &Path, result: &RunResult) -> Result<(), StorageError> {
        let file = File::create(path).map_err(|e| {
            error!("Failed to create {}: {}", path.display(), e);
            StorageError::WriteFailed(format!("{}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, result)?;
        writer.flush().map_err(|e| {
            error!("Failed to flush {}: {}", path.display(), e);
            StorageError::WriteFailed(format!("{}: {}", path.display(), e))
        })
    }
}

impl ResultStorage for FileStorage {
    fn save_run(&self, result: &RunResult) -> Result<StoredRun, StorageError> {
        let (csv_path, json_path) = self.run_paths();
        self.write_csv(&csv_path, result)?;
        self.write_json(&json_path, result)?;
        info!("Results saved to {} and {}", csv_path.display(), json_path.display());
        Ok(StoredRun { csv_path, json_path })
    }
}
