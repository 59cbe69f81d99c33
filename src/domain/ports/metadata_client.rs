//! Port for the external metadata service — the system of record for
//! schedules and schedule events that this service mirrors into memory.

use async_trait::async_trait;

use crate::domain::errors::SchedulerResult;
use crate::domain::models::{Addressable, Schedule, ScheduleEvent};

/// Outbound RPC surface the scheduler uses to stay in sync with the
/// metadata service. The scheduler never writes schedules on its own
/// initiative — only mirrors what metadata already holds, plus whatever
/// `config.schedules`/`config.schedule_events` seed at startup.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Fetches every schedule currently known to metadata.
    async fn schedules(&self) -> SchedulerResult<Vec<Schedule>>;

    /// Fetches every schedule event currently known to metadata.
    async fn schedule_events(&self) -> SchedulerResult<Vec<ScheduleEvent>>;

    /// Registers a schedule that was seeded from static config but is not
    /// yet known to metadata. Returns the id metadata assigned it.
    async fn add_schedule(&self, schedule: &Schedule) -> SchedulerResult<String>;

    /// Registers a schedule event that was seeded from static config but is
    /// not yet known to metadata. Returns the id metadata assigned it.
    async fn add_schedule_event(&self, event: &ScheduleEvent) -> SchedulerResult<String>;

    /// Registers an addressable with metadata, returning its id.
    async fn add_addressable(&self, addressable: &Addressable) -> SchedulerResult<String>;

    /// Looks up an addressable previously registered under `name`, if any.
    async fn addressable_for_name(&self, name: &str) -> SchedulerResult<Option<Addressable>>;
}
