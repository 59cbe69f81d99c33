//! The `Scheduler` facade: the single value a caller constructs at boot
//! and tears down at shutdown. Wraps the registry, dispatch client,
//! executor and tick engine, and exposes the CRUD surface the
//! surrounding HTTP layer would otherwise call directly (see
//! `SPEC_FULL.md` §6 and §9's "global singleton" resolution).

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::SchedulerResult;
use crate::domain::models::{Schedule, SchedulerConfig, ScheduleEvent};
use crate::domain::ports::MetadataClient;
use crate::infrastructure::http::DispatchClient;

use super::config_ingest;
use super::executor::EventExecutor;
use super::metadata_bridge;
use super::registry::ScheduleRegistry;
use super::tick_engine::TickEngine;

pub struct Scheduler {
    registry: Arc<ScheduleRegistry>,
    tick_engine: TickEngine,
}

impl Scheduler {
    /// Builds the registry and tick engine, pulls existing state from
    /// metadata, then mirrors locally-configured schedules/events back
    /// into metadata and the registry. Fails the whole boot sequence if
    /// the initial metadata pull fails.
    pub async fn new(config: &SchedulerConfig, metadata_client: Arc<dyn MetadataClient>) -> SchedulerResult<Self> {
        let registry = Arc::new(ScheduleRegistry::new());

        metadata_bridge::pull(metadata_client.as_ref(), &registry).await?;
        config_ingest::ingest(config, metadata_client.as_ref(), &registry).await?;

        let dispatch_client = Arc::new(DispatchClient::new(Duration::from_millis(config.service_timeout_ms))?);
        let executor = Arc::new(EventExecutor::new(dispatch_client));
        let tick_engine = TickEngine::new(
            registry.clone(),
            executor,
            Duration::from_millis(config.tick_interval_ms),
        );

        Ok(Self { registry, tick_engine })
    }

    /// Starts the background tick loop. Returns the task handle.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.tick_engine.start()
    }

    /// Stops the tick loop. In-flight dispatches are allowed to finish.
    pub fn stop(&self) {
        self.tick_engine.stop();
    }

    pub async fn query_schedule(&self, id: &str) -> SchedulerResult<Schedule> {
        self.registry.query_schedule(id).await
    }

    pub async fn query_schedule_by_name(&self, name: &str) -> SchedulerResult<Schedule> {
        self.registry.query_schedule_by_name(name).await
    }

    pub async fn add_schedule(&self, schedule: Schedule) -> SchedulerResult<()> {
        self.registry.add_schedule(schedule).await
    }

    pub async fn update_schedule(&self, schedule: Schedule) -> SchedulerResult<()> {
        self.registry.update_schedule(schedule).await
    }

    pub async fn remove_schedule(&self, id: &str) -> SchedulerResult<()> {
        self.registry.remove_schedule(id).await
    }

    pub async fn add_schedulers(&self, schedules: Vec<Schedule>) -> Vec<SchedulerResult<()>> {
        self.registry.add_schedulers(schedules).await
    }

    pub async fn query_schedule_event(&self, id: &str) -> SchedulerResult<ScheduleEvent> {
        self.registry.query_schedule_event(id).await
    }

    pub async fn query_schedule_event_by_name(&self, name: &str) -> SchedulerResult<ScheduleEvent> {
        self.registry.query_schedule_event_by_name(name).await
    }

    pub async fn add_schedule_event(&self, event: ScheduleEvent) -> SchedulerResult<()> {
        self.registry.add_schedule_event(event).await
    }

    pub async fn update_schedule_event(&self, event: ScheduleEvent) -> SchedulerResult<()> {
        self.registry.update_schedule_event(event).await
    }

    pub async fn remove_schedule_event(&self, id: &str) -> SchedulerResult<()> {
        self.registry.remove_schedule_event(id).await
    }
}
