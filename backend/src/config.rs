//! Configuration management for the AgroApp prediction server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Trained artifact locations
    pub artifacts: ArtifactsConfig,

    /// Batch upload limits
    pub batch: BatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactsConfig {
    /// Directory holding the exported artifacts
    pub dir: PathBuf,

    pub model_file: String,
    pub scaler_file: String,
    pub plant_encoder_file: String,
    pub soil_encoder_file: String,
    pub season_encoder_file: String,

    /// Refuse to start when the artifacts cannot be loaded
    pub required: bool,
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn plant_encoder_path(&self) -> PathBuf {
        self.dir.join(&self.plant_encoder_file)
    }

    pub fn soil_encoder_path(&self) -> PathBuf {
        self.dir.join(&self.soil_encoder_file)
    }

    pub fn season_encoder_path(&self) -> PathBuf {
        self.dir.join(&self.season_encoder_file)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            model_file: "gb_model.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            plant_encoder_file: "encoder_plante.json".to_string(),
            soil_encoder_file: "encoder_type_sol.json".to_string(),
            season_encoder_file: "encoder_saison.json".to_string(),
            required: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    /// Maximum number of records per batch
    pub max_records: usize,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let artifacts = ArtifactsConfig::default();
        let batch = BatchConfig::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("artifacts.dir", artifacts.dir.to_string_lossy().into_owned())?
            .set_default("artifacts.model_file", artifacts.model_file)?
            .set_default("artifacts.scaler_file", artifacts.scaler_file)?
            .set_default("artifacts.plant_encoder_file", artifacts.plant_encoder_file)?
            .set_default("artifacts.soil_encoder_file", artifacts.soil_encoder_file)?
            .set_default("artifacts.season_encoder_file", artifacts.season_encoder_file)?
            .set_default("artifacts.required", artifacts.required)?
            .set_default("batch.max_records", batch.max_records as u64)?
            .set_default("batch.max_upload_bytes", batch.max_upload_bytes as u64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
