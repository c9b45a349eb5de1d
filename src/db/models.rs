use crate::lap::LapRecord;
use crate::s3::BlobReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata document written once per distinct blob reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapMetadata {
    pub blob_reference: String,
    pub storage_path: String,
    /// Driver display name, "{player_name} {player_surname}"
    pub name: String,
    pub track: String,
    pub laptime: i32,
    pub car: String,
    pub timestamp: i64,
    pub track_grip: i32,
    pub weather: i32,
    pub air_temp: f32,
    pub road_temp: f32,
    pub session_type: i32,
    pub rain_tyres: bool,
    pub lap_number: i32,
    pub poll_rate: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl LapMetadata {
    pub fn from_lap(
        lap: &LapRecord,
        storage_path: &str,
        blob_reference: &BlobReference,
        user_id: Option<&str>,
    ) -> Self {
        LapMetadata {
            blob_reference: blob_reference.to_string(),
            storage_path: storage_path.to_string(),
            name: format!("{} {}", lap.player_name, lap.player_surname),
            track: lap.track.clone(),
            laptime: lap.lap_time_ms,
            car: lap.car_model.clone(),
            timestamp: lap.timestamp,
            track_grip: lap.track_grip_status,
            weather: lap.rain_intensity,
            air_temp: lap.air_temp,
            road_temp: lap.road_temp,
            session_type: lap.session_type,
            rain_tyres: lap.rain_tyres,
            lap_number: lap.lap_number,
            poll_rate: lap.poll_rate,
            user_id: user_id.map(str::to_string),
        }
    }
}

/// A metadata document as held by the index
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLap {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: LapMetadata,
}
