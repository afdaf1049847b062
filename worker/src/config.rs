use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub store: StoreSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreSettings {
    /// Redis connection URL. If not provided here, `REDIS_URL` is consulted.
    pub url: Option<String>,
    /// Entry lifetime in seconds applied to every stored result
    pub ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl Config {
    /// Load configuration from environment variables and config files
    pub fn from_env() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // Start with default configuration
        builder = builder.add_source(File::from_str(
            include_str!("../config/default.toml"),
            FileFormat::Toml,
        ));

        // Add config file if specified
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(
                File::with_name(&config_file)
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // Add environment variable overrides with BATCH_ prefix
        builder = builder.add_source(
            Environment::with_prefix("BATCH")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut result: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // REDIS_URL is the standard deployment variable; honor it when the
        // config file leaves the url unset.
        if result.store.url.is_none() {
            if let Ok(url) = env::var("REDIS_URL") {
                result.store.url = Some(url);
            }
        }

        Ok(result)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.store.ttl_seconds)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store.ttl_seconds == 0 {
            anyhow::bail!("store.ttl_seconds must be greater than zero");
        }
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => anyhow::bail!("invalid logging.level: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_and_validates() {
        let config = Config::from_env().expect("default config must load");
        config.validate().expect("default config must validate");
        assert_eq!(config.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn validation_rejects_zero_ttl() {
        let mut config = Config::from_env().unwrap();
        config.store.ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_unknown_log_level() {
        let mut config = Config::from_env().unwrap();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
