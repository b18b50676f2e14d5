pub mod file;
pub mod sqlite;
pub mod traits;

use std::fs;

use tracing::info;

use crate::config::{Backend, Config};
use crate::error::StorageError;

// Re-export
pub use file::FileActivityRepository;
pub use sqlite::SqliteActivityRepository;
pub use traits::ActivityRepository;

const DATABASE_FILE_NAME: &str = "activities.db";

/// Opens the backend selected in `config`.
pub fn open_repository(config: &Config) -> Result<Box<dyn ActivityRepository>, StorageError> {
    info!(backend = %config.backend, dir = %config.data_dir.display(), "opening activity storage");
    match config.backend {
        Backend::Local => Ok(Box::new(FileActivityRepository::open(&config.data_dir)?)),
        Backend::Sqlite => {
            fs::create_dir_all(&config.data_dir)?;
            let path = config.data_dir.join(DATABASE_FILE_NAME);
            Ok(Box::new(SqliteActivityRepository::open(&path)?))
        }
    }
}
