use thiserror::Error;
use uuid::Uuid;

/// Failures of a storage backend. The store logs these and turns them into a
/// notice; they never reach the UI as values.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Activity {0} not found")]
    NotFound(Uuid),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Duration must be greater than zero")]
    ZeroDuration,
}
