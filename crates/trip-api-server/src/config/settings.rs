use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub skyscanner: SkyscannerConfig,
    pub spotify: SpotifyConfig,
    pub itunes: ItunesConfig,
    pub pexels: PexelsConfig,
    pub openai: OpenAiConfig,
    pub predicthq: PredictHqConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
    pub json: bool,
    /// Directory for daily rolling log files. Stdout only when unset.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,trip_api_server=debug".to_string(),
            json: true,
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    pub llm_concurrency: usize,
    pub flight_search_concurrency: usize,
    pub acquire_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            llm_concurrency: 4,
            flight_search_concurrency: 8,
            acquire_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SkyscannerConfig {
    pub base_url: String,
    pub api_key: String,
    pub market: String,
    pub locale: String,
    pub currency: String,
    pub adults: u32,
    pub cabin_class: String,
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
    pub timeout_seconds: u64,
}

impl SkyscannerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpotifyConfig {
    pub accounts_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItunesConfig {
    pub base_url: String,
    pub result_limit: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PexelsConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_per_page: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PredictHqConfig {
    pub base_url: String,
    pub api_key: String,
    pub categories: String,
    /// Below this many events, generated activities are appended
    pub min_results: usize,
    pub max_results: usize,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("skyscanner.poll_max_attempts", 20)?
            .set_default("skyscanner.poll_interval_ms", 1500)?
            .set_default("itunes.result_limit", 3)?
            .set_default("pexels.default_per_page", 10)?
            .set_default("predicthq.min_results", 6)?
            .set_default("predicthq.max_results", 10)?
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
