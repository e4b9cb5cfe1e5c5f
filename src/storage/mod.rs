//! Dataset storage - the one place that knows which table is "current".
//!
//! The resolver never touches storage; callers fetch a snapshot with
//! [`DatasetStore::current`] and pass it in. For [`DirectoryStore`] the
//! snapshot is whatever file is newest when `current` runs, so an upload
//! racing a query may or may not be seen by it.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Identifies one stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetHandle {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub trait DatasetStore: Send + Sync {
    /// Store an upload; it becomes the current dataset.
    ///
    /// `bytes` is the file exactly as uploaded and `table` what ingestion
    /// parsed from it. Stores that persist keep the bytes, so reloading goes
    /// through the same reader and yields the same column kinds.
    fn put(&self, name: &str, bytes: &[u8], table: Table) -> Result<DatasetHandle>;

    /// Snapshot of the current dataset, `None` when nothing was stored yet.
    fn current(&self) -> Result<Option<Arc<Table>>>;

    /// All stored datasets, oldest first.
    fn list(&self) -> Result<Vec<DatasetHandle>>;
}
