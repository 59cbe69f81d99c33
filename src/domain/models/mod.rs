//! Domain models
//!
//! Pure domain entities with business logic and validation rules.
//! These models are framework-agnostic and contain no infrastructure concerns.

pub mod config;
pub mod schedule;

pub use config::{
    ClientEndpoint, LogFormat, LogSettings, SchedulerConfig, StaticSchedule, StaticScheduleEvent,
};
pub use schedule::{Addressable, HttpMethod, Schedule, ScheduleContext, ScheduleEvent};
