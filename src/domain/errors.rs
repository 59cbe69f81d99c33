//! Domain errors for the scheduler.

use thiserror::Error;

/// A coarse HTTP status class the surrounding platform maps errors onto.
/// The scheduler never returns an HTTP response itself (see `SPEC_FULL.md`
/// §6); this exists so the mapping documented there is actually testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHint {
    NotFound,
    BadRequest,
    Conflict,
    Internal,
}

/// Errors surfaced by the schedule registry and its collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Requested schedule or event does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Attempted to add a schedule/event whose id already exists under a
    /// different name, or whose name is already taken.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The schedule's `frequency`/`cron` could not be parsed.
    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    /// A schedule event names a schedule that does not exist.
    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),

    /// The external metadata service could not be reached.
    #[error("metadata service unavailable: {0}")]
    MetadataUnavailable(String),

    /// An outbound HTTP dispatch failed (I/O error, malformed URL, non-2xx
    /// is NOT included here — only transport-level failures).
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),

    /// An event's addressable names an HTTP method outside the allow-list.
    #[error("invalid method: {0}")]
    InvalidMethod(String),
}

impl SchedulerError {
    /// The status class the surrounding HTTP layer should map this error to.
    pub const fn status_hint(&self) -> StatusHint {
        match self {
            Self::NotFound(_) => StatusHint::NotFound,
            Self::InvalidRecurrence(_) | Self::UnknownSchedule(_) => StatusHint::BadRequest,
            Self::AlreadyExists(_) => StatusHint::Conflict,
            Self::MetadataUnavailable(_) | Self::DispatchFailed(_) | Self::InvalidMethod(_) => {
                StatusHint::Internal
            }
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_hints_match_documented_mapping() {
        assert_eq!(SchedulerError::NotFound("x".into()).status_hint(), StatusHint::NotFound);
        assert_eq!(
            SchedulerError::InvalidRecurrence("x".into()).status_hint(),
            StatusHint::BadRequest
        );
        assert_eq!(
            SchedulerError::UnknownSchedule("x".into()).status_hint(),
            StatusHint::BadRequest
        );
        assert_eq!(SchedulerError::AlreadyExists("x".into()).status_hint(), StatusHint::Conflict);
        assert_eq!(
            SchedulerError::MetadataUnavailable("x".into()).status_hint(),
            StatusHint::Internal
        );
    }
}
