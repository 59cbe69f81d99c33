//! Pulls the registry's initial state from the external metadata service
//! at startup (§4.6 of `SPEC_FULL.md`).

use crate::domain::errors::SchedulerResult;
use crate::domain::ports::MetadataClient;

use super::registry::ScheduleRegistry;

/// Names reserved for device-driven timing — these never enter this
/// scheduler's registry no matter what metadata reports.
fn is_device_reserved(name: &str) -> bool {
    name.starts_with("device.")
}

/// Pulls schedules then events from metadata, skipping device-reserved
/// entries, and adds the rest to the registry. Propagates
/// `MetadataUnavailable` on pull failure — boot is expected to fail too.
pub async fn pull(metadata: &dyn MetadataClient, registry: &ScheduleRegistry) -> SchedulerResult<()> {
    let schedules = metadata.schedules().await?;
    for schedule in schedules {
        if is_device_reserved(&schedule.name) {
            tracing::debug!(name = %schedule.name, "skipping device-reserved schedule");
            continue;
        }
        if let Err(e) = registry.add_schedule(schedule.clone()).await {
            tracing::warn!(name = %schedule.name, error = %e, "failed to mirror schedule from metadata");
        }
    }

    let events = metadata.schedule_events().await?;
    for event in events {
        if is_device_reserved(&event.service) {
            tracing::debug!(name = %event.name, service = %event.service, "skipping device-reserved schedule event");
            continue;
        }
        if let Err(e) = registry.add_schedule_event(event.clone()).await {
            tracing::warn!(name = %event.name, error = %e, "failed to mirror schedule event from metadata");
        }
    }

    Ok(())
}
