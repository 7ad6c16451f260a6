//! Storage subsystem
//!
//! Persists finished runs for later inspection.
//!
//! Components:
//! - `storage_trait`: the [`ResultStorage`] trait and [`StoredRun`].
//! - `file_storage`: CSV + JSON files in an output directory.

pub mod file_storage;
pub mod storage_trait;

pub use file_storage::FileStorage;
pub use storage_trait::{ResultStorage, StoredRun};
