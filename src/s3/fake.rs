use crate::s3::error::StorageError;
use crate::s3::storage::{BlobReference, Storage};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeStorage` is an in-memory implementation of the `Storage` trait for testing purposes.
/// It allows simulating various storage scenarios, including successful operations and failures.
#[derive(Clone)]
pub struct FakeStorage {
    bucket: String,
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    fail_objects: Arc<Mutex<HashSet<String>>>,
    lookups: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeStorage {
    /// Create a new empty FakeStorage instance
    pub fn new() -> Self {
        FakeStorage {
            bucket: "fake-bucket".to_string(),
            data: Arc::new(Mutex::new(HashMap::new())),
            fail_objects: Arc::new(Mutex::new(HashSet::new())),
            lookups: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate a failure for a specific object
    /// After calling this, has_object and write_object will return errors for this key
    pub async fn fake_fail_object(&self, key: &str) {
        let mut fail_objects = self.fail_objects.lock().await;
        fail_objects.insert(key.to_string());
    }

    /// Stop simulating a failure for a specific object
    pub async fn fake_reset_object(&self, key: &str) {
        let mut fail_objects = self.fail_objects.lock().await;
        fail_objects.remove(key);
    }

    /// Number of existence checks performed so far
    pub fn fake_lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of writes performed so far
    pub fn fake_write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of objects currently stored
    pub async fn fake_object_count(&self) -> usize {
        self.data.lock().await.len()
    }

    async fn check_failure(&self, key: &str) -> Result<(), StorageError> {
        let fail_objects = self.fail_objects.lock().await;
        if fail_objects.contains(key) {
            return Err(StorageError::ConnectionError(format!(
                "Simulated failure for object: {}",
                key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn has_object(&self, key: &str) -> Result<bool, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failure(key).await?;

        let data = self.data.lock().await;
        Ok(data.contains_key(key))
    }

    async fn write_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        self.check_failure(key).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut storage_data = self.data.lock().await;
        storage_data.insert(key.to_string(), data);
        Ok(())
    }

    fn object_reference(&self, key: &str) -> BlobReference {
        BlobReference::new(format!("s3://{}/{}", self.bucket, key))
    }

    #[cfg(test)]
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let data = self.data.lock().await;
        match data.get(key) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(StorageError::ObjectNotFound(key.to_string())),
        }
    }

    #[cfg(test)]
    async fn remove_object(&self, key: &str) -> Result<(), StorageError> {
        let mut storage_data = self.data.lock().await;
        if storage_data.remove(key).is_some() {
            Ok(())
        } else {
            Err(StorageError::ObjectNotFound(key.to_string()))
        }
    }
}

impl Default for FakeStorage {
    fn default() -> Self {
        Self::new()
    }
}
