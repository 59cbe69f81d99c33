//! Domain layer for the scheduler service.
//!
//! Pure business logic: models, errors, recurrence arithmetic, and the
//! ports the services layer depends on. No tokio, no reqwest, no I/O.

pub mod errors;
pub mod models;
pub mod ports;
pub mod recurrence;

pub use errors::{SchedulerError, SchedulerResult, StatusHint};
