//! Schedule, ScheduleEvent, Addressable and ScheduleContext domain models.
//!
//! A `Schedule` is a recurrence spec; a `ScheduleEvent` is a concrete HTTP
//! action bound to one schedule by name. The registry wraps a `Schedule`
//! with live dispatch state in a `ScheduleContext` — one per schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// HTTP methods the executor is willing to issue.
///
/// Anything outside this set is rejected with `InvalidMethod` rather than
/// attempted — matching the historical support-scheduler's allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
}

impl HttpMethod {
    /// Parses a method name case-insensitively, returning `None` for anything
    /// not in the allow-list (callers turn that into `InvalidMethod`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "TRACE" => Some(Self::Trace),
            "CONNECT" => Some(Self::Connect),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

/// The structured destination of an outbound HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addressable {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Stored as a raw string since an unrecognised method is a per-event
    /// `InvalidMethod` at dispatch time, not a schedule-insertion failure.
    pub method: String,
}

impl Addressable {
    /// Builds the full request URL: `protocol://host:port` + `path`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.protocol, self.host, self.port, self.path)
    }
}

/// A recurrence specification, identified by both a stable id and a unique name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// ISO-8601-like duration string, e.g. `PT30S`, `PT1H`. Mutually exclusive
    /// with `cron` in practice (frequency wins if both are set).
    pub frequency: Option<String>,
    /// Alternative recurrence expression (5-field cron, `min hour dom month dow`).
    pub cron: Option<String>,
    #[serde(default)]
    pub run_once: bool,
}

impl Schedule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start: None,
            end: None,
            frequency: None,
            cron: None,
            run_once: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    pub fn with_cron(mut self, cron: impl Into<String>) -> Self {
        self.cron = Some(cron.into());
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub const fn run_once(mut self) -> Self {
        self.run_once = true;
        self
    }
}

/// A concrete action bound to one schedule by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: String,
    pub name: String,
    /// The *name* (not id) of the owning schedule.
    pub schedule: String,
    pub service: String,
    #[serde(default)]
    pub parameters: String,
    pub addressable: Addressable,
}

impl ScheduleEvent {
    pub fn new(name: impl Into<String>, schedule: impl Into<String>, addressable: Addressable) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            schedule: schedule.into(),
            service: String::new(),
            parameters: String::new(),
            addressable,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = parameters.into();
        self
    }
}

/// The live runtime object owned by the registry, one per schedule.
///
/// Mutated only under the registry's lock, except for the brief window
/// during a dispatch where the tick engine has already popped it off the
/// queue (see the concurrency notes in the executor and tick engine).
#[derive(Debug, Clone)]
pub struct ScheduleContext {
    pub schedule: Schedule,
    pub events_by_event_id: HashMap<String, ScheduleEvent>,
    pub next_fire_time: DateTime<Utc>,
    pub iteration_count: u64,
    pub marked_deleted: bool,
    /// Whether this context currently has an entry in the dispatch queue.
    /// False while a dispatch is in flight (the tick engine popped it and
    /// has not yet decided to re-enqueue) and after the recurrence
    /// evaluator retires it. `add_schedule_event` checks this to revive a
    /// retired schedule when a fresh event is attached to it.
    pub queued: bool,
}

impl ScheduleContext {
    pub fn new(schedule: Schedule, next_fire_time: DateTime<Utc>) -> Self {
        Self {
            schedule,
            events_by_event_id: HashMap::new(),
            next_fire_time,
            iteration_count: 0,
            marked_deleted: false,
            queued: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_parse_is_case_insensitive() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("PoSt"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("ZAP"), None);
    }

    #[test]
    fn addressable_url_joins_parts() {
        let a = Addressable {
            protocol: "http".into(),
            host: "x".into(),
            port: 1,
            path: "/p".into(),
            method: "POST".into(),
        };
        assert_eq!(a.url(), "http://x:1/p");
    }

    #[test]
    fn schedule_builder_sets_fields() {
        let s = Schedule::new("s1").with_frequency("PT1S").run_once();
        assert_eq!(s.name, "s1");
        assert_eq!(s.frequency.as_deref(), Some("PT1S"));
        assert!(s.run_once);
    }
}
