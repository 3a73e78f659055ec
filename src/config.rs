use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::models::RiderEnvironmentParams;
use crate::segmenter::DEFAULT_SEGMENT_LENGTH_M;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Rider and equipment defaults
    pub rider: RiderSettings,

    /// Weather defaults
    #[serde(default)]
    pub environment: EnvironmentSettings,

    /// Segmentation settings
    #[serde(default)]
    pub route: RouteSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Rider and bike settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderSettings {
    /// Functional Threshold Power (watts)
    pub ftp: f64,

    /// Rider plus bike mass (kg)
    pub total_mass: f64,

    /// Drag area (m²)
    pub cda: f64,

    /// Rolling resistance coefficient
    pub crr: f64,

    /// Anaerobic work capacity (joules)
    pub w_prime: f64,

    /// Default ride target as a percentage of FTP
    pub target_intensity: f64,
}

/// Wind settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    /// Wind speed (m/s)
    pub wind_speed: f64,

    /// Direction the wind blows from (degrees)
    pub wind_direction: f64,
}

/// Route segmentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSettings {
    /// Target coalesced segment length (meters)
    pub segment_length: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            rider: RiderSettings::default(),
            environment: EnvironmentSettings::default(),
            route: RouteSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for RiderSettings {
    fn default() -> Self {
        let defaults = RiderEnvironmentParams::default();
        RiderSettings {
            ftp: defaults.ftp,
            total_mass: defaults.total_mass,
            cda: defaults.cda,
            crr: defaults.crr,
            w_prime: defaults.w_prime,
            target_intensity: defaults.target_intensity,
        }
    }
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        EnvironmentSettings {
            wind_speed: 0.0,
            wind_direction: 0.0,
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        RouteSettings {
            segment_length: DEFAULT_SEGMENT_LENGTH_M,
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".routepace")
            .join("config.toml")
    }

    /// Write a default configuration to `path` unless a file is already there.
    ///
    /// Returns whether a new file was written.
    pub fn init_file<P: AsRef<Path>>(path: P) -> Result<bool> {
        if path.as_ref().exists() {
            return Ok(false);
        }
        Self::default().save_to_file(path)?;
        Ok(true)
    }

    /// Load from `path` if given, else from the default location with fallback to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_or_default()),
        }
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(path = %config_path.display(), error = %err, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Rider parameters for one optimization run
    pub fn rider_params(&self) -> RiderEnvironmentParams {
        RiderEnvironmentParams {
            ftp: self.rider.ftp,
            total_mass: self.rider.total_mass,
            cda: self.rider.cda,
            crr: self.rider.crr,
            w_prime: self.rider.w_prime,
            wind_speed: self.environment.wind_speed,
            wind_direction: self.environment.wind_direction,
            target_intensity: self.rider.target_intensity,
        }
    }
}
