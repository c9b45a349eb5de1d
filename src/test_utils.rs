use crate::config::{load_config, Config};
use crate::lap::LapRecord;
use flate2::write::GzEncoder;
use flate2::Compression;
use prost::Message;
use std::io::Write;

/// Check if a test is enabled via environment variable
fn is_test_enabled(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Check if database tests are enabled via environment variable
pub fn is_db_enabled() -> bool {
    is_test_enabled("ENABLE_DB_TESTS")
}

/// Check if S3 tests are enabled via environment variable
pub fn is_s3_enabled() -> bool {
    is_test_enabled("ENABLE_S3_TESTS")
}

/// Load test configuration from config.toml
pub fn load_test_config() -> Result<Config, anyhow::Error> {
    let config_path = "config.toml";

    load_config(config_path).map_err(|e| anyhow::anyhow!("Failed to load config.toml: {}", e))
}

/// Creates a lap with the given identity and lap time
///
/// The remaining scalar fields get fixed, non-default values so that
/// projections into metadata can be checked field by field.
pub fn create_test_lap(
    player_name: &str,
    player_surname: &str,
    track: &str,
    car_model: &str,
    timestamp: i64,
    lap_time_ms: i32,
) -> LapRecord {
    LapRecord {
        player_name: player_name.to_string(),
        player_surname: player_surname.to_string(),
        track: track.to_string(),
        car_model: car_model.to_string(),
        timestamp,
        lap_time_ms,
        lap_number: 3,
        poll_rate: 60,
        track_grip_status: 2,
        rain_intensity: 1,
        air_temp: 21.5,
        road_temp: 30.0,
        session_type: 4,
        rain_tyres: true,
    }
}

/// The lap used throughout the ingestion scenarios
pub fn ada_lap() -> LapRecord {
    create_test_lap("Ada", "L", "spa", "gt3", 1000, 95000)
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Encode `lap` the way the simulator client sends it
pub fn encode_lap_gz(lap: &LapRecord) -> Vec<u8> {
    gzip(&lap.encode_to_vec())
}
