use crate::config::DatabaseConfig;
use crate::db::database::Database;
use crate::db::error::DatabaseError;
use crate::db::models::LapMetadata;
#[cfg(test)]
use crate::db::models::StoredLap;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

const COLUMNS: &str = "blob_reference, storage_path, name, track, laptime, car, timestamp, \
     track_grip, weather, air_temp, road_temp, session_type, rain_tyres, lap_number, poll_rate, \
     user_id";

/// A PostgreSQL implementation of the Database trait
pub struct PostgresDatabase {
    pool: PgPool,
    schema: Option<String>,
    table: String,
    unique_blob_reference: bool,
}

/// Index over `blob_reference`; the unique variant gets its own name so that
/// `IF NOT EXISTS` never mistakes a plain index for it
fn blob_reference_index(table: &str, unique: bool) -> String {
    if unique {
        format!("{}_blob_reference_key", table)
    } else {
        format!("{}_blob_reference_idx", table)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PostgresDatabase {
    /// Create a new PostgresDatabase from configuration and check connectivity
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        for name in std::iter::once(&config.table).chain(config.schema.iter()) {
            if !is_identifier(name) {
                return Err(DatabaseError::ConfigurationError(format!(
                    "'{}' is not a valid SQL identifier",
                    name
                )));
            }
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(60))
            .connect_lazy(&config.url)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                DatabaseError::ConnectionError(e.to_string())
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Database connectivity test failed: {}", e);
            return Err(DatabaseError::ConnectionError(format!(
                "Database is not accessible: {}",
                e
            )));
        };

        info!("PostgreSQL database connection established successfully");
        Ok(PostgresDatabase {
            pool,
            schema: config.schema.clone(),
            table: config.table.clone(),
            unique_blob_reference: config.unique_blob_reference,
        })
    }

    /// Create the schema, table and blob reference index if missing
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        if let Some(schema_name) = &self.schema {
            let create_schema_query = format!("CREATE SCHEMA IF NOT EXISTS {}", schema_name);
            debug!("Executing: {}", create_schema_query);
            self.execute(&create_schema_query, "create schema").await?;
        }

        let create_table_query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                blob_reference TEXT NOT NULL,
                storage_path TEXT NOT NULL,
                name TEXT NOT NULL,
                track TEXT NOT NULL,
                laptime INTEGER NOT NULL,
                car TEXT NOT NULL,
                timestamp BIGINT NOT NULL,
                track_grip INTEGER NOT NULL,
                weather INTEGER NOT NULL,
                air_temp REAL NOT NULL,
                road_temp REAL NOT NULL,
                session_type INTEGER NOT NULL,
                rain_tyres BOOLEAN NOT NULL,
                lap_number INTEGER NOT NULL,
                poll_rate INTEGER NOT NULL,
                user_id TEXT,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            self.table_name()
        );
        debug!("Creating {} table", self.table_name());
        self.execute(&create_table_query, "create table").await?;

        let create_index_query = format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} (blob_reference)",
            if self.unique_blob_reference { "UNIQUE " } else { "" },
            blob_reference_index(&self.table, self.unique_blob_reference),
            self.table_name()
        );
        debug!("Executing: {}", create_index_query);
        self.execute(&create_index_query, "create index").await?;

        info!(
            "Metadata table {} is ready (unique blob reference: {})",
            self.table_name(),
            self.unique_blob_reference
        );
        Ok(())
    }

    async fn execute(&self, query: &str, what: &str) -> Result<(), DatabaseError> {
        sqlx::query(query).execute(&self.pool).await.map_err(|e| {
            error!("Failed to {}: {}", what, e);
            DatabaseError::QueryError(format!("Failed to {}: {}", what, e))
        })?;
        Ok(())
    }

    /// Get the table name with schema prefix if applicable
    fn table_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

fn map_query_error(e: sqlx::Error) -> DatabaseError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DatabaseError::ConnectionError(e.to_string())
        }
        e => DatabaseError::QueryError(e.to_string()),
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn count_by_blob_reference(&self, blob_reference: &str) -> Result<u64, DatabaseError> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE blob_reference = $1",
            self.table_name()
        );

        let count: i64 = sqlx::query_scalar::<_, i64>(&query)
            .bind(blob_reference)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to query laps by blob reference: {}", e);
                map_query_error(e)
            })?;

        debug!("{} laps recorded for {}", count, blob_reference);
        Ok(count as u64)
    }

    async fn insert_lap(&self, metadata: LapMetadata) -> Result<Uuid, DatabaseError> {
        let query = format!(
            "INSERT INTO {} (id, {}, created_at) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
            self.table_name(),
            COLUMNS
        );

        let id = Uuid::new_v4();
        let result = sqlx::query(&query)
            .bind(id)
            .bind(&metadata.blob_reference)
            .bind(&metadata.storage_path)
            .bind(&metadata.name)
            .bind(&metadata.track)
            .bind(metadata.laptime)
            .bind(&metadata.car)
            .bind(metadata.timestamp)
            .bind(metadata.track_grip)
            .bind(metadata.weather)
            .bind(metadata.air_temp)
            .bind(metadata.road_temp)
            .bind(metadata.session_type)
            .bind(metadata.rain_tyres)
            .bind(metadata.lap_number)
            .bind(metadata.poll_rate)
            .bind(&metadata.user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                info!("Document added: {}", id);
                Ok(id)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::DuplicateBlobReference(metadata.blob_reference))
            }
            Err(e) => {
                error!("Failed to insert lap metadata: {}", e);
                Err(map_query_error(e))
            }
        }
    }

    #[cfg(test)]
    async fn get_laps(&self, blob_reference: &str) -> Result<Vec<StoredLap>, DatabaseError> {
        use sqlx::Row;

        let query = format!(
            "SELECT id, {}, created_at FROM {} WHERE blob_reference = $1 ORDER BY created_at",
            COLUMNS,
            self.table_name()
        );

        let rows = sqlx::query(&query)
            .bind(blob_reference)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        let decode = |row: sqlx::postgres::PgRow| -> Result<StoredLap, sqlx::Error> {
            Ok(StoredLap {
                id: row.try_get("id")?,
                created_at: row.try_get("created_at")?,
                metadata: LapMetadata {
                    blob_reference: row.try_get("blob_reference")?,
                    storage_path: row.try_get("storage_path")?,
                    name: row.try_get("name")?,
                    track: row.try_get("track")?,
                    laptime: row.try_get("laptime")?,
                    car: row.try_get("car")?,
                    timestamp: row.try_get("timestamp")?,
                    track_grip: row.try_get("track_grip")?,
                    weather: row.try_get("weather")?,
                    air_temp: row.try_get("air_temp")?,
                    road_temp: row.try_get("road_temp")?,
                    session_type: row.try_get("session_type")?,
                    rain_tyres: row.try_get("rain_tyres")?,
                    lap_number: row.try_get("lap_number")?,
                    poll_rate: row.try_get("poll_rate")?,
                    user_id: row.try_get("user_id")?,
                },
            })
        };

        rows.into_iter()
            .map(|row| decode(row).map_err(|e| DatabaseError::DeserializationError(e.to_string())))
            .collect()
    }
}
