//! Mirrors statically-configured schedules/events into metadata, then into
//! the registry (§4.7 of `SPEC_FULL.md`) — makes the local registry a true
//! mirror of whatever the metadata service ends up holding.

use crate::domain::errors::SchedulerResult;
use crate::domain::models::{Schedule, SchedulerConfig, ScheduleEvent};
use crate::domain::ports::MetadataClient;

use super::registry::ScheduleRegistry;

pub async fn ingest(
    config: &SchedulerConfig,
    metadata: &dyn MetadataClient,
    registry: &ScheduleRegistry,
) -> SchedulerResult<()> {
    for static_schedule in &config.schedules {
        if registry.query_schedule_by_name(&static_schedule.name).await.is_ok() {
            continue;
        }

        let mut schedule = Schedule::new(static_schedule.name.clone());
        schedule.start = static_schedule.start;
        schedule.end = static_schedule.end;
        schedule.frequency = static_schedule.frequency.clone();
        schedule.cron = static_schedule.cron.clone();
        schedule.run_once = static_schedule.run_once;

        let assigned_id = metadata.add_schedule(&schedule).await?;
        schedule = schedule.with_id(assigned_id);
        registry.add_schedule(schedule).await?;
    }

    for static_event in &config.schedule_events {
        if registry.query_schedule_event_by_name(&static_event.name).await.is_ok() {
            continue;
        }

        let addressable = static_event.addressable();
        if metadata.addressable_for_name(&static_event.name).await?.is_none() {
            metadata.add_addressable(&addressable).await?;
        }

        let event = ScheduleEvent::new(static_event.name.clone(), static_event.schedule.clone(), addressable)
            .with_service(static_event.service.clone())
            .with_parameters(static_event.parameters.clone());

        let assigned_id = metadata.add_schedule_event(&event).await?;
        let event = event.with_id(assigned_id);
        registry.add_schedule_event(event).await?;
    }

    Ok(())
}
