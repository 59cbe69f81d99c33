//! schedulerd - persistent in-memory action scheduler
//!
//! Holds a registry of recurring schedules and the HTTP events bound to
//! them, ticking on an interval to fire whatever is due. See
//! `SPEC_FULL.md` for the full behavioral contract.

pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{SchedulerError, SchedulerResult};
pub use domain::models::SchedulerConfig;
pub use services::Scheduler;
