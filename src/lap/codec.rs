use crate::lap::error::{DecodeError, DecompressionError};
use flate2::read::GzDecoder;
use prost::Message;
use serde::Deserialize;
use std::borrow::Cow;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A single lap as encoded by the simulator client.
///
/// Tags are fixed by the deployed encoder. Telemetry samples that follow
/// the scalar header use higher tags and are skipped here; they survive
/// untouched in the stored blob.
#[derive(Clone, PartialEq, Message)]
pub struct LapRecord {
    #[prost(string, tag = "1")]
    pub player_name: String,
    #[prost(string, tag = "2")]
    pub player_surname: String,
    #[prost(string, tag = "3")]
    pub track: String,
    #[prost(string, tag = "4")]
    pub car_model: String,
    #[prost(int64, tag = "5")]
    pub timestamp: i64,
    #[prost(int32, tag = "6")]
    pub lap_time_ms: i32,
    #[prost(int32, tag = "7")]
    pub lap_number: i32,
    #[prost(int32, tag = "8")]
    pub poll_rate: i32,
    #[prost(int32, tag = "9")]
    pub track_grip_status: i32,
    #[prost(int32, tag = "10")]
    pub rain_intensity: i32,
    #[prost(float, tag = "11")]
    pub air_temp: f32,
    #[prost(float, tag = "12")]
    pub road_temp: f32,
    #[prost(int32, tag = "13")]
    pub session_type: i32,
    #[prost(bool, tag = "14")]
    pub rain_tyres: bool,
}

/// How the request body reaches the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Gunzip when the body carries the gzip magic, pass through otherwise
    #[default]
    Auto,
    /// Body is always gzip-compressed
    Gzip,
    /// The hosting transport already decompressed the body
    Identity,
}

/// Gunzip `body`, refusing output larger than `limit` bytes
pub fn decompress(body: &[u8], limit: u64) -> Result<Vec<u8>, DecompressionError> {
    let mut decoder = GzDecoder::new(body).take(limit.saturating_add(1));
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DecompressionError::InvalidGzip(e.to_string()))?;

    if out.len() as u64 > limit {
        return Err(DecompressionError::TooLarge(limit));
    }
    Ok(out)
}

/// Produce the plain lap bytes from a transport body according to `mode`
pub fn unwrap_body(
    body: &[u8],
    mode: BodyMode,
    limit: u64,
) -> Result<Cow<'_, [u8]>, DecompressionError> {
    let gzipped = match mode {
        BodyMode::Gzip => true,
        BodyMode::Identity => false,
        BodyMode::Auto => body.starts_with(&GZIP_MAGIC),
    };

    if gzipped {
        return decompress(body, limit).map(Cow::Owned);
    }
    if body.len() as u64 > limit {
        return Err(DecompressionError::TooLarge(limit));
    }
    Ok(Cow::Borrowed(body))
}

/// Decode plain lap bytes and check the identity fields used for storage paths
pub fn decode(raw: &[u8]) -> Result<LapRecord, DecodeError> {
    let lap = LapRecord::decode(raw)?;
    validate(&lap)?;
    Ok(lap)
}

// Identity fields end up in Postgres TEXT columns, which cannot hold NUL
fn validate(lap: &LapRecord) -> Result<(), DecodeError> {
    for (field, value) in [
        ("player_name", &lap.player_name),
        ("player_surname", &lap.player_surname),
        ("track", &lap.track),
        ("car_model", &lap.car_model),
    ] {
        if value.contains('\0') {
            return Err(DecodeError::InvalidField(field, value.clone()));
        }
    }
    Ok(())
}
