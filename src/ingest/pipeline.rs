use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::db::{Database, DatabaseError, LapMetadata};
use crate::ingest::outcome::{FailReason, IngestOutcome, RejectReason};
use crate::lap::{decode, fingerprint, unwrap_body};
use crate::s3::Storage;

/// Runs one submission through decode, blob upload and metadata recording.
///
/// Holds no per-request state; concurrent calls only meet in the backing
/// stores. The duplicate check and the insert are two separate calls, so two
/// simultaneous submissions of the same lap can both see no record and both
/// insert, unless the index was set up with a unique blob reference
/// constraint. No in-process lock is taken: it could not cover other
/// instances of this service.
pub struct Ingestor<S: Storage, D: Database> {
    storage: Arc<S>,
    database: Arc<D>,
    config: IngestConfig,
}

impl<S: Storage, D: Database> Ingestor<S, D> {
    pub fn new(storage: S, database: D, config: IngestConfig) -> Self {
        Self::from_shared(Arc::new(storage), Arc::new(database), config)
    }

    /// Build an ingestor over services already shared elsewhere
    pub fn from_shared(storage: Arc<S>, database: Arc<D>, config: IngestConfig) -> Self {
        Ingestor {
            storage,
            database,
            config,
        }
    }

    /// Ingest one request body
    ///
    /// * `body` - Request body as delivered by the transport
    /// * `user_id` - Verified submitter, when authentication is enforced
    pub async fn ingest(&self, body: &[u8], user_id: Option<&str>) -> IngestOutcome {
        let raw = match unwrap_body(body, self.config.body_mode, self.config.max_body_bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Rejecting lap: {}", e);
                return IngestOutcome::Rejected(RejectReason::BadEncoding);
            }
        };

        let lap = match decode(&raw) {
            Ok(lap) => lap,
            Err(e) => {
                warn!("Rejecting lap: {}", e);
                return IngestOutcome::Rejected(RejectReason::BadEncoding);
            }
        };

        let path = fingerprint(&lap);
        debug!("Lap decoded, storage path {}", path);

        let blob_reference = match self
            .storage
            .put_object(&path, Bytes::copy_from_slice(&raw))
            .await
        {
            Ok(reference) => reference,
            Err(e) => {
                error!("Failed to store lap blob {}: {}", path, e);
                return IngestOutcome::Failed(FailReason::StorageError);
            }
        };

        let existing = match self
            .database
            .count_by_blob_reference(blob_reference.as_str())
            .await
        {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to look up lap {}: {}", blob_reference, e);
                return IngestOutcome::Failed(FailReason::IndexError);
            }
        };

        if existing > 0 {
            info!("We already have this lap recorded: {}", blob_reference);
            return IngestOutcome::Duplicate;
        }

        let metadata = LapMetadata::from_lap(&lap, &path, &blob_reference, user_id);
        match self.database.insert_lap(metadata).await {
            Ok(id) => {
                info!("Lap recorded: {} -> {}", blob_reference, id);
                IngestOutcome::Recorded(id)
            }
            Err(DatabaseError::DuplicateBlobReference(reference)) => {
                info!("Lap recorded concurrently by another request: {}", reference);
                IngestOutcome::Duplicate
            }
            Err(e) => {
                error!("Error adding lap metadata for {}: {}", blob_reference, e);
                IngestOutcome::Failed(FailReason::IndexError)
            }
        }
    }
}
