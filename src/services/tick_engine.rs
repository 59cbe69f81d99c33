//! The tick engine: the periodic driver that scans the dispatch queue and
//! fans dispatches out to the event executor.
//!
//! State machine: `Stopped -> Running -> Stopped` via `start()`/`stop()`.
//! `stop()` only flips a flag checked between ticks, so an in-flight tick's
//! dispatches are always allowed to finish (see `SPEC_FULL.md` §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use super::executor::EventExecutor;
use super::registry::ScheduleRegistry;

pub struct TickEngine {
    registry: Arc<ScheduleRegistry>,
    executor: Arc<EventExecutor>,
    tick_interval: Duration,
    running: Arc<AtomicBool>,
}

impl TickEngine {
    pub fn new(registry: Arc<ScheduleRegistry>, executor: Arc<EventExecutor>, tick_interval: Duration) -> Self {
        Self {
            registry,
            executor,
            tick_interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the background tick loop. Returns the handle so callers can
    /// await shutdown.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let registry = self.registry.clone();
        let executor = self.executor.clone();
        let running = self.running.clone();
        let tick_interval = self.tick_interval;

        tokio::spawn(async move {
            let mut tick_count: u64 = 0;
            while running.load(Ordering::SeqCst) {
                tokio::time::sleep(tick_interval).await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                tick_count += 1;
                run_tick(&registry, &executor, tick_count).await;
            }
        })
    }

    /// Stops the tick loop. Does not abort any dispatch already in flight.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

async fn run_tick(registry: &Arc<ScheduleRegistry>, executor: &Arc<EventExecutor>, tick_count: u64) {
    let span = tracing::info_span!("tick", n = tick_count);
    let _enter = span.enter();

    let now = Utc::now();
    let n = registry.queue_len().await;
    let mut dispatches = Vec::new();

    for _ in 0..n {
        let Some(id) = registry.dequeue_front().await else {
            continue;
        };
        let Some(context) = registry.context_snapshot(&id).await else {
            // Lazily reclaimed: removed by `remove_schedule` while queued.
            continue;
        };
        if context.marked_deleted {
            continue;
        }
        if context.next_fire_time <= now {
            let registry = registry.clone();
            let executor = executor.clone();
            dispatches.push(tokio::spawn(async move {
                executor.dispatch(&registry, context).await;
            }));
        } else {
            registry.enqueue_back(id).await;
        }
    }

    for result in join_all(dispatches).await {
        if let Err(join_error) = result {
            tracing::error!(error = %join_error, "dispatch task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Addressable, Schedule, ScheduleEvent};
    use crate::infrastructure::http::DispatchClient;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn not_due_schedule_stays_queued_without_dispatch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/fire").expect(0).create_async().await;

        let registry = Arc::new(ScheduleRegistry::new());
        // No `with_start`, so the freshly-primed next_fire_time is ~1s out —
        // nowhere near due for the single tick below.
        let schedule = Schedule::new("s1").with_frequency("PT1S");
        registry.add_schedule(schedule).await.unwrap();

        let host = server.host_with_port().split(':').next().unwrap().to_string();
        let port: u16 = server.host_with_port().split(':').nth(1).unwrap().parse().unwrap();
        let event = ScheduleEvent::new(
            "e1",
            "s1",
            Addressable {
                protocol: "http".into(),
                host,
                port,
                path: "/fire".into(),
                method: "GET".into(),
            },
        );
        registry.add_schedule_event(event).await.unwrap();

        let executor = Arc::new(EventExecutor::new(Arc::new(
            DispatchClient::new(StdDuration::from_secs(1)).unwrap(),
        )));

        run_tick(&registry, &executor, 1).await;

        assert_eq!(registry.queue_len().await, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn due_schedule_fires_and_is_reenqueued() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/fire").with_status(200).expect(1).create_async().await;

        let registry = Arc::new(ScheduleRegistry::new());
        // Start in the past so the freshly-primed next_fire_time is already due.
        let schedule = Schedule::new("s1")
            .with_frequency("PT1S")
            .with_start(Utc::now() - chrono::Duration::seconds(5));
        let schedule_id = schedule.id.clone();
        registry.add_schedule(schedule).await.unwrap();

        let host = server.host_with_port().split(':').next().unwrap().to_string();
        let port: u16 = server.host_with_port().split(':').nth(1).unwrap().parse().unwrap();
        let event = ScheduleEvent::new(
            "e1",
            "s1",
            Addressable {
                protocol: "http".into(),
                host,
                port,
                path: "/fire".into(),
                method: "GET".into(),
            },
        );
        registry.add_schedule_event(event).await.unwrap();

        let executor = Arc::new(EventExecutor::new(Arc::new(
            DispatchClient::new(StdDuration::from_secs(1)).unwrap(),
        )));

        run_tick(&registry, &executor, 1).await;

        mock.assert_async().await;
        // `run_tick` awaits `join_all` before returning, so the dispatch's
        // re-enqueue has already happened by the time we check.
        assert_eq!(registry.queue_len().await, 1);
        assert!(registry.query_schedule(&schedule_id).await.is_ok());
    }

    #[tokio::test]
    async fn stop_flips_flag_without_aborting() {
        let registry = Arc::new(ScheduleRegistry::new());
        let executor = Arc::new(EventExecutor::new(Arc::new(
            DispatchClient::new(StdDuration::from_secs(1)).unwrap(),
        )));
        let engine = TickEngine::new(registry, executor, StdDuration::from_millis(10));
        let handle = engine.start();
        engine.stop();
        handle.await.unwrap();
    }
}
