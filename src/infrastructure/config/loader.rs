//! Hierarchical configuration loader: compiled-in defaults, then an
//! optional TOML file, then `SCHED_`-prefixed environment variables.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::SchedulerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    #[error("tick_interval_ms must be positive, got {0}")]
    InvalidTickInterval(u64),

    #[error("service_timeout_ms must be positive, got {0}")]
    InvalidTimeout(u64),

    #[error("metadata_client.host must be non-empty")]
    EmptyMetadataHost,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration, preferring `explicit_path` over the
    /// `SCHEDULER_CONFIG` environment variable for the TOML file location.
    /// Both are optional — defaults plus env vars alone are a valid config.
    pub fn load(explicit_path: Option<&Path>) -> Result<SchedulerConfig, ConfigError> {
        let path: Option<PathBuf> = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SCHEDULER_CONFIG").ok().map(PathBuf::from));

        let mut figment = Figment::new().merge(Serialized::defaults(SchedulerConfig::default()));
        if let Some(path) = &path {
            figment = figment.merge(Toml::file(path));
        }
        let config: SchedulerConfig = figment.merge(Env::prefixed("SCHED_").split("__")).extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &SchedulerConfig) -> Result<(), ConfigError> {
        if config.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval(config.tick_interval_ms));
        }
        if config.service_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(config.service_timeout_ms));
        }
        if config.metadata_client.host.is_empty() {
            return Err(ConfigError::EmptyMetadataHost);
        }
        Ok(())
    }
}
