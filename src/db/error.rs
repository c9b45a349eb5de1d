use thiserror::Error;

/// Errors that can occur when interacting with the metadata index
#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),

    #[error("Query execution failed: {0}")]
    QueryError(String),

    #[error("Failed to deserialize database row: {0}")]
    DeserializationError(String),

    /// Only raised when the index enforces uniqueness on blob references
    #[error("A lap with blob reference {0} is already recorded")]
    DuplicateBlobReference(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Other database error: {0}")]
    Other(#[from] anyhow::Error),
}
