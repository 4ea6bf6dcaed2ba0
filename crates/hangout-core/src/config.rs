use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
    pub frontend: FrontendConfig,
    pub discord: DiscordConfig,
    pub places: PlacesConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// How a coordinator waits between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitMode {
    /// Sleep until the phase boundary instant.
    Deadline,
    /// Sleep a fixed duration regardless of the boundary (demo deployments).
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub wait: WaitMode,
    pub fixed_wait_secs: u64,
    pub claim_ttl_secs: u64,
    pub rescan_interval_secs: Option<u64>,
    pub max_event_days: u32,
    pub default_timezone: String,
    /// Stable claim holder id. A restarted node with the same id re-takes its own leases.
    pub instance_id: Option<String>,
}

impl SchedulerConfig {
    #[must_use]
    pub const fn fixed_wait(&self) -> Duration {
        Duration::from_secs(self.fixed_wait_secs)
    }

    #[must_use]
    pub const fn claim_ttl(&self) -> Duration {
        Duration::from_secs(self.claim_ttl_secs)
    }

    #[must_use]
    pub fn rescan_interval(&self) -> Option<Duration> {
        self.rescan_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    pub base_url: String,
}

impl FrontendConfig {
    /// ## Summary
    /// Builds a frontend link for `page` and `event_id`, e.g. `https://host/vote/abcde`.
    #[must_use]
    pub fn page_url(&self, page: &str, event_id: &str) -> String {
        format!("{}/{page}/{event_id}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    pub api_base: String,
    pub bot_token: Option<String>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub radius_meters: u32,
    pub place_type: String,
    pub max_results: usize,
}

impl std::fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("radius_meters", &self.radius_meters)
            .field("place_type", &self.place_type)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 4)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8700)?
            .set_default("logging.level", "debug")?
            .set_default("scheduler.wait", "deadline")?
            .set_default("scheduler.fixed_wait_secs", 60)?
            .set_default("scheduler.claim_ttl_secs", 120)?
            .set_default("scheduler.max_event_days", 31)?
            .set_default("scheduler.default_timezone", "UTC")?
            .set_default("frontend.base_url", "http://localhost:3000")?
            .set_default("discord.api_base", "https://discord.com/api/v10")?
            .set_default(
                "places.endpoint",
                "https://maps.googleapis.com/maps/api/place/nearbysearch/json",
            )?
            .set_default("places.radius_meters", 1500)?
            .set_default("places.place_type", "restaurant")?
            .set_default("places.max_results", 10)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
