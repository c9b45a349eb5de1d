use crate::lap::BodyMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub s3: S3Config,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Bearer token verification; absent means submissions are anonymous
    pub auth: Option<AuthConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    pub schema: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    /// Back the duplicate check with a unique index on blob_reference
    #[serde(default)]
    pub unique_blob_reference: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub body_mode: BodyMode,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            body_mode: BodyMode::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Shared secret for HS* algorithms
    pub secret: Option<String>,
    /// PEM public key for RS*/ES* algorithms
    pub public_key_pem: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Size in MiB before the log file rolls
    pub size: u64,
    pub max_files: usize,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_table() -> String {
    "laps".to_string()
}

fn default_max_body_bytes() -> u64 {
    16 * 1024 * 1024
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read configuration file {}", path))?;
    parse_config(&config_text)
}

pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("Failed to parse configuration")?;
    Ok(config)
}
