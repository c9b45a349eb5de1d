use crate::db::error::DatabaseError;
use crate::db::models::LapMetadata;
#[cfg(test)]
use crate::db::models::StoredLap;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Database trait defining the interface for the lap metadata index
#[async_trait]
pub trait Database: Send + Sync + 'static {
    /// Count records pointing at `blob_reference`
    ///
    /// Answered by an equality lookup, never a scan.
    async fn count_by_blob_reference(&self, blob_reference: &str) -> Result<u64, DatabaseError>;

    /// Append a record and return its assigned identifier
    ///
    /// The index itself only rejects a second record for the same blob
    /// reference when it was set up with a unique constraint; then it
    /// returns `DuplicateBlobReference`.
    async fn insert_lap(&self, metadata: LapMetadata) -> Result<Uuid, DatabaseError>;

    /// All records with the given blob reference (test-only)
    #[cfg(test)]
    async fn get_laps(&self, blob_reference: &str) -> Result<Vec<StoredLap>, DatabaseError>;
}

/// Implementation of Database trait for Arc<T> where T implements Database
///
/// This allows sharing database instances across threads and components efficiently.
#[async_trait]
impl<T: Database + ?Sized> Database for Arc<T> {
    async fn count_by_blob_reference(&self, blob_reference: &str) -> Result<u64, DatabaseError> {
        (**self).count_by_blob_reference(blob_reference).await
    }

    async fn insert_lap(&self, metadata: LapMetadata) -> Result<Uuid, DatabaseError> {
        (**self).insert_lap(metadata).await
    }

    #[cfg(test)]
    async fn get_laps(&self, blob_reference: &str) -> Result<Vec<StoredLap>, DatabaseError> {
        (**self).get_laps(blob_reference).await
    }
}
