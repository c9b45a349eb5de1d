use crate::db::database::Database;
use crate::db::error::DatabaseError;
use crate::db::models::{LapMetadata, StoredLap};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Barrier;
use uuid::Uuid;

/// A fake in-memory implementation of the Database trait for testing
#[derive(Clone)]
pub struct FakeDatabase {
    laps: Arc<RwLock<Vec<StoredLap>>>,
    unique_blob_reference: bool,
    fail_queries: Arc<AtomicBool>,
    fail_inserts: Arc<AtomicBool>,
    queries: Arc<AtomicUsize>,
    pause_after_count: Arc<Mutex<Option<Arc<Barrier>>>>,
}

#[allow(dead_code)]
impl FakeDatabase {
    /// Create a new empty FakeDatabase without a uniqueness constraint
    pub fn new() -> Self {
        FakeDatabase {
            laps: Arc::new(RwLock::new(Vec::new())),
            unique_blob_reference: false,
            fail_queries: Arc::new(AtomicBool::new(false)),
            fail_inserts: Arc::new(AtomicBool::new(false)),
            queries: Arc::new(AtomicUsize::new(0)),
            pause_after_count: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a FakeDatabase that rejects a second record per blob reference
    pub fn with_unique_blob_reference() -> Self {
        FakeDatabase {
            unique_blob_reference: true,
            ..Self::new()
        }
    }

    /// Make count queries fail until reset
    pub fn fake_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Make inserts fail until reset
    pub fn fake_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// After counting, wait on `barrier` before returning
    ///
    /// Lets tests line up concurrent requests inside the check-then-insert window.
    pub fn fake_pause_after_count(&self, barrier: Arc<Barrier>) {
        *self.pause_after_count.lock().unwrap() = Some(barrier);
    }

    /// Number of count queries served so far
    pub fn fake_query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Total number of records held
    pub fn fake_lap_count(&self) -> usize {
        self.laps.read().unwrap().len()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn count_by_blob_reference(&self, blob_reference: &str) -> Result<u64, DatabaseError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError(
                "Simulated query failure".to_string(),
            ));
        }

        let count = {
            let laps = self.laps.read().unwrap();
            laps.iter()
                .filter(|lap| lap.metadata.blob_reference == blob_reference)
                .count() as u64
        };

        let barrier = self.pause_after_count.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        Ok(count)
    }

    async fn insert_lap(&self, metadata: LapMetadata) -> Result<Uuid, DatabaseError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError(
                "Simulated insert failure".to_string(),
            ));
        }

        let mut laps = self.laps.write().unwrap();
        if self.unique_blob_reference
            && laps
                .iter()
                .any(|lap| lap.metadata.blob_reference == metadata.blob_reference)
        {
            return Err(DatabaseError::DuplicateBlobReference(
                metadata.blob_reference,
            ));
        }

        let id = Uuid::new_v4();
        laps.push(StoredLap {
            id,
            created_at: Utc::now(),
            metadata,
        });
        Ok(id)
    }

    async fn get_laps(&self, blob_reference: &str) -> Result<Vec<StoredLap>, DatabaseError> {
        let laps = self.laps.read().unwrap();
        Ok(laps
            .iter()
            .filter(|lap| lap.metadata.blob_reference == blob_reference)
            .cloned()
            .collect())
    }
}

impl Default for FakeDatabase {
    fn default() -> Self {
        Self::new()
    }
}
