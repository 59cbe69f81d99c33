//! Typed configuration surface for the scheduler service.

use serde::{Deserialize, Serialize};

use super::schedule::Addressable;

/// Top-level configuration, loaded by `infrastructure::config::ConfigLoader`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// How often the tick engine wakes to scan the dispatch queue.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Per-request timeout for outbound event dispatch HTTP calls.
    #[serde(default = "default_service_timeout_ms")]
    pub service_timeout_ms: u64,

    /// Statically configured schedules, mirrored into metadata at startup.
    #[serde(default)]
    pub schedules: Vec<StaticSchedule>,

    /// Statically configured schedule events, mirrored into metadata at startup.
    #[serde(default)]
    pub schedule_events: Vec<StaticScheduleEvent>,

    /// Endpoint of the external metadata service (system of record).
    #[serde(default)]
    pub metadata_client: ClientEndpoint,

    /// Endpoints declared for interface completeness; this crate never dials
    /// them (notifications/command/core-data/logging are out of scope).
    #[serde(default)]
    pub notifications_client: ClientEndpoint,
    #[serde(default)]
    pub command_client: ClientEndpoint,
    #[serde(default)]
    pub core_data_client: ClientEndpoint,
    #[serde(default)]
    pub logging_client: ClientEndpoint,

    #[serde(default)]
    pub logging: LogSettings,
}

const fn default_tick_interval_ms() -> u64 {
    500
}

const fn default_service_timeout_ms() -> u64 {
    5000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            service_timeout_ms: default_service_timeout_ms(),
            schedules: Vec::new(),
            schedule_events: Vec::new(),
            metadata_client: ClientEndpoint::default(),
            notifications_client: ClientEndpoint::default(),
            command_client: ClientEndpoint::default(),
            core_data_client: ClientEndpoint::default(),
            logging_client: ClientEndpoint::default(),
            logging: LogSettings::default(),
        }
    }
}

/// Host/port/protocol triple for an external service dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClientEndpoint {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    59861
}

fn default_protocol() -> String {
    "http".to_string()
}

impl Default for ClientEndpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            protocol: default_protocol(),
        }
    }
}

impl ClientEndpoint {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Structured logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// A statically-configured schedule entry, as it appears in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StaticSchedule {
    pub name: String,
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    pub frequency: Option<String>,
    pub cron: Option<String>,
    #[serde(default)]
    pub run_once: bool,
}

/// A statically-configured schedule event entry, as it appears in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StaticScheduleEvent {
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub service: String,
    pub path: String,
    pub port: u16,
    pub protocol: String,
    pub method: String,
    pub host: String,
}

impl StaticScheduleEvent {
    pub fn addressable(&self) -> Addressable {
        Addressable {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            method: self.method.clone(),
        }
    }
}
