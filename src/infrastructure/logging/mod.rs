//! Structured logging: one `tracing-subscriber` install at boot, driven by
//! `LogSettings { level, format }`.

use tracing_subscriber::EnvFilter;

use crate::domain::models::{LogFormat, LogSettings};

/// Installs the global `tracing` subscriber. Call once, at boot.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_new(&settings.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match settings.format {
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
        }
    }
}
