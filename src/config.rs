//! Service configuration loader - parses floodwatch.toml
//!
//! Separates data-source URLs, cache behaviour and report parameters from
//! code, so the reference point, thresholds and cache policy can change
//! without recompiling. Every key is optional; anything missing takes the
//! value from `Config::default()`.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::ingest::ea::{LEVEL_URL, STATION_URL};
use crate::logging::DataSource;
use crate::model::Coord;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "floodwatch.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "FLOODWATCH_CONFIG";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub endpoint: EndpointConfig,
}

/// Where station and level data come from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub station_url: String,
    pub level_url: String,
    pub request_timeout_secs: u64,
    /// Worker threads for parallel reading-history fetches
    pub history_workers: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            station_url: STATION_URL.to_string(),
            level_url: LEVEL_URL.to_string(),
            request_timeout_secs: 30,
            history_workers: 4,
        }
    }
}

/// Local JSON cache for fetched feed data
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// Read the station list from cache when present
    pub use_station_cache: bool,
    /// Read latest levels from cache when present
    pub use_level_cache: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache"),
            use_station_cache: true,
            use_level_cache: false,
        }
    }
}

impl CacheConfig {
    pub fn station_path(&self) -> PathBuf {
        self.dir.join("station_data.json")
    }

    pub fn level_path(&self) -> PathBuf {
        self.dir.join("level_data.json")
    }
}

/// Parameters for the CLI reports and endpoint defaults
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Reference point as `[latitude, longitude]`
    pub origin: (f64, f64),
    pub radius_km: f64,
    pub threshold: f64,
    pub high_risk_count: usize,
    pub river_count: usize,
    pub history_days: i64,
    pub fit_degree: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            // Cambridge city centre
            origin: (52.2053, 0.1218),
            radius_km: 10.0,
            threshold: 0.8,
            high_risk_count: 10,
            river_count: 9,
            history_days: 10,
            fit_degree: 4,
        }
    }
}

impl ReportConfig {
    pub fn origin(&self) -> Coord {
        Coord::from(self.origin)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub port: u16,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Errors from loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Parses a TOML document and validates it.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no report can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.report.radius_km.is_finite() || self.report.radius_km < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "report.radius_km must be a non-negative number, got {}",
                self.report.radius_km
            )));
        }
        if self.report.fit_degree == 0 {
            return Err(ConfigError::Invalid("report.fit_degree must be at least 1".to_string()));
        }
        if self.report.history_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "report.history_days must be positive, got {}",
                self.report.history_days
            )));
        }
        if self.source.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config path from `FLOODWATCH_CONFIG`, else `floodwatch.toml`.
///
/// Loads `.env` first so the variable can live there.
pub fn default_path() -> PathBuf {
    dotenv::dotenv().ok();
    std::env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads configuration from `path`.
///
/// A missing file is not an error: defaults are used and the fallback is
/// logged. A file that exists but cannot be read, parsed or validated is.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!(
                target: DataSource::Config.target(),
                "{} not found, using defaults",
                path.display()
            );
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let config = Config::from_toml(&contents)?;
    log::debug!(target: DataSource::Config.target(), "loaded {}", path.display());
    Ok(config)
}
