//! Key-value backends for persisted store snapshots.

mod file;
mod memory;
mod sqlite;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::ports::storage::{StorageError, StoragePort};

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub const SQLITE_FILE_NAME: &str = "syncinsight.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "json" | "file" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Opens the configured backend rooted at `data_dir`.
pub fn open_storage(
    backend: StorageBackend,
    data_dir: &Path,
) -> Result<Arc<dyn StoragePort>, StorageError> {
    let storage: Arc<dyn StoragePort> = match backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::default()),
        StorageBackend::Json => Arc::new(JsonFileStorage::open(data_dir)?),
        StorageBackend::Sqlite => {
            std::fs::create_dir_all(data_dir)?;
            Arc::new(SqliteStorage::open(&data_dir.join(SQLITE_FILE_NAME))?)
        }
    };
    log::info!(
        "storage backend '{}' at {}",
        backend.as_str(),
        data_dir.display()
    );
    Ok(storage)
}
