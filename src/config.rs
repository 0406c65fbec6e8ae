use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable naming the TOML file to load instead of `config/default.toml`.
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// `"*"` allows any origin
    pub cors_allow_origins: Vec<String>,
    /// Include the raw error message in 500 responses
    pub expose_error_detail: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            cors_allow_origins: vec!["*".to_string()],
            expose_error_detail: true,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub service_name: String,
    pub location: String,
    pub operator: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            service_name: "Utility Consumption Prediction API".to_string(),
            location: "Dhanbad, Jharkhand, India".to_string(),
            operator: "Apex Power & Utilities (APU)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unset means fallback mode from the start
    pub artifact_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub historical_csv_path: PathBuf,
    /// `total_records` reported when serving synthetic history
    pub synthetic_total_records: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            historical_csv_path: PathBuf::from("data/raw/Utility_consumption.csv"),
            synthetic_total_records: 50_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Seed for the synthetic weather noise; entropy when unset
    pub seed: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::figment(&path).extract().map_err(Into::into)
    }

    /// Defaults, then the TOML file at `path` (if present), then `FORECAST__SECTION__KEY` env vars.
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("FORECAST__").split("__"))
    }
}
