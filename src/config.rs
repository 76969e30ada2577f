use std::path::Path;
use std::time::Duration;

use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::FetchError;
use crate::fetch::{FetchConfig, DEFAULT_USER_AGENT};
use crate::retry::RetryPolicy;

/// Looked up as `config/settings.{json,toml,yaml}` relative to the working
/// directory; optional.
pub const DEFAULT_SETTINGS: &str = "config/settings";
pub const ENV_PREFIX: &str = "PROFILE_SCRAPER";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkSettings,
    pub throttling: ThrottlingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_seconds: f64,
    pub max_backoff_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrottlingSettings {
    pub delay_seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    /// Defaults, then the settings file (`path` if given, which must exist),
    /// then `PROFILE_SCRAPER__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("network.timeout_secs", 20i64)?
            .set_default("network.user_agent", DEFAULT_USER_AGENT)?
            .set_default("network.max_retries", 3i64)?
            .set_default("network.retry_backoff_seconds", 1.0)?
            .set_default("network.max_backoff_secs", 10.0)?
            .set_default("throttling.delay_seconds", 1.0)?
            .set_default("logging.level", "info")?;

        let builder = match path {
            Some(p) => builder.add_source(File::from(p).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_SETTINGS).required(false)),
        };

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn delay(&self) -> Duration {
        secs(self.throttling.delay_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy<FetchError> {
        let base = secs(self.network.retry_backoff_seconds);
        RetryPolicy {
            max_attempts: self.network.max_retries.max(1),
            base_delay: base,
            min_delay: base.min(Duration::from_secs(1)),
            max_delay: secs(self.network.max_backoff_secs),
            retry_if: FetchError::is_retryable,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.network.timeout_secs),
            user_agent: self.network.user_agent.clone(),
            retry: self.retry_policy(),
        }
    }
}

/// Negative or non-finite values become zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}
