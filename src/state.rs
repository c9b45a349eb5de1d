use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::Config;
use crate::db::PostgresDatabase;
use crate::http::AppState;
use crate::ingest::Ingestor;
use crate::s3::S3Storage;

/// Service handles shared by every request in this process
pub struct AppContext {
    pub storage: Arc<S3Storage>,
    pub database: Arc<PostgresDatabase>,
    pub verifier: Option<Arc<dyn TokenVerifier>>,
}

static CONTEXT: OnceCell<AppContext> = OnceCell::const_new();

/// Get the process-wide context, building it on first use
///
/// Concurrent first callers wait on a single initialisation. A failed
/// initialisation leaves the cell empty so the next call tries again.
pub async fn app_context(config: &Config) -> Result<&'static AppContext> {
    CONTEXT
        .get_or_try_init(|| AppContext::connect(config))
        .await
}

impl AppContext {
    async fn connect(config: &Config) -> Result<Self> {
        let storage = S3Storage::new(&config.s3)
            .await
            .context("Failed to initialize S3 storage")?;

        let database = PostgresDatabase::new(&config.database)
            .await
            .context("Failed to connect to PostgreSQL database")?;

        let verifier = match &config.auth {
            Some(auth) => Some(Arc::new(
                JwtVerifier::new(auth).context("Failed to initialize token verifier")?,
            ) as Arc<dyn TokenVerifier>),
            None => {
                info!("Authentication disabled, laps are recorded without a user id");
                None
            }
        };

        info!("Application context initialized");
        Ok(AppContext {
            storage: Arc::new(storage),
            database: Arc::new(database),
            verifier,
        })
    }

    pub fn ingestor(&self, config: &Config) -> Ingestor<S3Storage, PostgresDatabase> {
        Ingestor::from_shared(
            self.storage.clone(),
            self.database.clone(),
            config.ingest.clone(),
        )
    }

    pub fn http_state(&self, config: &Config) -> AppState<S3Storage, PostgresDatabase> {
        AppState {
            ingestor: Arc::new(self.ingestor(config)),
            verifier: self.verifier.clone(),
            max_body_bytes: usize::try_from(config.ingest.max_body_bytes).unwrap_or(usize::MAX),
        }
    }
}
