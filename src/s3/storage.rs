use crate::s3::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Stable handle naming a stored object, whether or not this process wrote it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BlobReference(String);

impl BlobReference {
    pub fn new(reference: impl Into<String>) -> Self {
        BlobReference(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage trait defining the interface for writing lap blobs to S3-compatible storage
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Check whether an object exists at `key`
    async fn has_object(&self, key: &str) -> Result<bool, StorageError>;

    /// Unconditionally write `data` at `key` as `application/octet-stream`
    ///
    /// Returns once the store has acknowledged the write.
    async fn write_object(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Reference for the object stored at `key`
    fn object_reference(&self, key: &str) -> BlobReference;

    /// Store `data` at `key` unless something is already there
    ///
    /// * `key` - Deterministic path derived from the lap identity
    /// * `data` - Raw lap bytes
    ///
    /// A present object is left untouched. The returned reference is the
    /// same either way.
    async fn put_object(&self, key: &str, data: Bytes) -> Result<BlobReference, StorageError> {
        if self.has_object(key).await? {
            debug!("Object already stored, skipping upload: {}", key);
        } else {
            self.write_object(key, data).await?;
            debug!("Stored object: {}", key);
        }
        Ok(self.object_reference(key))
    }

    /// Get an object by its key (test-only)
    #[cfg(test)]
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Remove an object from storage (test-only)
    #[cfg(test)]
    async fn remove_object(&self, key: &str) -> Result<(), StorageError>;
}

/// Implementation of Storage trait for Arc<T> where T implements Storage
///
/// This allows sharing storage instances across threads and components efficiently.
#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn has_object(&self, key: &str) -> Result<bool, StorageError> {
        (**self).has_object(key).await
    }

    async fn write_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        (**self).write_object(key, data).await
    }

    fn object_reference(&self, key: &str) -> BlobReference {
        (**self).object_reference(key)
    }

    async fn put_object(&self, key: &str, data: Bytes) -> Result<BlobReference, StorageError> {
        (**self).put_object(key, data).await
    }

    #[cfg(test)]
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        (**self).get_object(key).await
    }

    #[cfg(test)]
    async fn remove_object(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_object(key).await
    }
}
