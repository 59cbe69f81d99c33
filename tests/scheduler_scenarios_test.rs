//! Black-box end-to-end scenarios exercising the `Scheduler` facade against
//! a mock HTTP server for addressables and a fake `MetadataClient`.
//!
//! Mirrors the six scenarios SPEC_FULL.md documents for this system: a
//! recurring schedule firing repeatedly, a `run_once` schedule firing
//! exactly once, an already-past-`end` schedule never dispatching, a
//! schedule-event relocation retiring its emptied source, an invalid
//! method being skipped without blocking the rest of a context's events,
//! and the `Content-Length`-without-body quirk on a non-empty payload.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use schedulerd::domain::models::{Addressable, Schedule, SchedulerConfig, ScheduleEvent};
use schedulerd::domain::ports::MetadataClient;
use schedulerd::domain::{SchedulerError, SchedulerResult};
use schedulerd::Scheduler;

#[derive(Default)]
struct EmptyMetadataClient;

#[async_trait]
impl MetadataClient for EmptyMetadataClient {
    async fn schedules(&self) -> SchedulerResult<Vec<Schedule>> {
        Ok(Vec::new())
    }
    async fn schedule_events(&self) -> SchedulerResult<Vec<ScheduleEvent>> {
        Ok(Vec::new())
    }
    async fn add_schedule(&self, _schedule: &Schedule) -> SchedulerResult<String> {
        Ok("id".into())
    }
    async fn add_schedule_event(&self, _event: &ScheduleEvent) -> SchedulerResult<String> {
        Ok("id".into())
    }
    async fn add_addressable(
        &self,
        _addressable: &schedulerd::domain::models::Addressable,
    ) -> SchedulerResult<String> {
        Ok("id".into())
    }
    async fn addressable_for_name(
        &self,
        _name: &str,
    ) -> SchedulerResult<Option<schedulerd::domain::models::Addressable>> {
        Ok(None)
    }
}

fn fast_config() -> SchedulerConfig {
    SchedulerConfig {
        tick_interval_ms: 80,
        service_timeout_ms: 2000,
        ..SchedulerConfig::default()
    }
}

async fn scheduler_with_empty_metadata() -> Scheduler {
    Scheduler::new(&fast_config(), Arc::new(EmptyMetadataClient))
        .await
        .expect("boot with empty metadata never fails")
}

fn addressable(host: &str, port: u16, path: &str, method: &str) -> Addressable {
    Addressable {
        protocol: "http".into(),
        host: host.into(),
        port,
        path: path.into(),
        method: method.into(),
    }
}

fn split_host_port(hostport: &str) -> (String, u16) {
    let mut parts = hostport.split(':');
    let host = parts.next().unwrap().to_string();
    let port = parts.next().unwrap().parse().unwrap();
    (host, port)
}

#[tokio::test]
async fn scenario_1_recurring_schedule_fires_repeatedly() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/e1")
        .match_header("content-type", "application/json")
        .with_status(200)
        .expect_at_least(2)
        .create_async()
        .await;
    let (host, port) = split_host_port(&server.host_with_port());

    let scheduler = scheduler_with_empty_metadata().await;
    let schedule = Schedule::new("s1").with_frequency("PT1S").with_start(Utc::now() - chrono::Duration::seconds(1));
    scheduler.add_schedule(schedule).await.unwrap();
    scheduler
        .add_schedule_event(ScheduleEvent::new("e1", "s1", addressable(&host, port, "/e1", "POST")))
        .await
        .unwrap();

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(2600)).await;
    scheduler.stop();
    handle.await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn scenario_2_run_once_schedule_fires_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/e2")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let (host, port) = split_host_port(&server.host_with_port());

    let scheduler = scheduler_with_empty_metadata().await;
    let schedule = Schedule::new("s2")
        .with_frequency("PT1S")
        .with_start(Utc::now() - chrono::Duration::seconds(1))
        .run_once();
    let id = schedule.id.clone();
    scheduler.add_schedule(schedule).await.unwrap();
    scheduler
        .add_schedule_event(ScheduleEvent::new("e2", "s2", addressable(&host, port, "/e2", "POST")))
        .await
        .unwrap();

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(3200)).await;
    scheduler.stop();
    handle.await.unwrap();

    mock.assert_async().await;
    // Still queryable (retirement doesn't erase the schedule, only the queue slot).
    assert!(scheduler.query_schedule(&id).await.is_ok());
}

#[tokio::test]
async fn scenario_3_schedule_with_past_end_never_dispatches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/e3").expect(0).create_async().await;
    let (host, port) = split_host_port(&server.host_with_port());

    let scheduler = scheduler_with_empty_metadata().await;
    let schedule = Schedule::new("s3")
        .with_frequency("PT1H")
        .with_end(Utc::now() - chrono::Duration::seconds(1));
    let id = schedule.id.clone();
    scheduler.add_schedule(schedule).await.unwrap();
    scheduler
        .add_schedule_event(ScheduleEvent::new("e3", "s3", addressable(&host, port, "/e3", "POST")))
        .await
        .unwrap();

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.stop();
    handle.await.unwrap();

    mock.assert_async().await;
    assert!(scheduler.query_schedule(&id).await.is_ok());
}

#[tokio::test]
async fn scenario_4_event_relocation_retires_emptied_source_schedule() {
    let scheduler = scheduler_with_empty_metadata().await;
    scheduler.add_schedule(Schedule::new("s4").with_frequency("PT1H")).await.unwrap();
    scheduler.add_schedule(Schedule::new("s4b").with_frequency("PT1H")).await.unwrap();
    let s4_id = scheduler.query_schedule_by_name("s4").await.unwrap().id;

    let event = ScheduleEvent::new("e4a", "s4", addressable("localhost", 1, "/x", "GET"));
    let event_id = event.id.clone();
    scheduler.add_schedule_event(event).await.unwrap();

    let relocated = ScheduleEvent::new("e4a", "s4b", addressable("localhost", 1, "/x", "GET")).with_id(event_id.clone());
    scheduler.update_schedule_event(relocated).await.unwrap();

    let moved = scheduler.query_schedule_event(&event_id).await.unwrap();
    assert_eq!(moved.schedule, "s4b");
    assert!(matches!(
        scheduler.query_schedule(&s4_id).await,
        Err(SchedulerError::NotFound(_))
    ));
}

#[tokio::test]
async fn scenario_5_invalid_method_skipped_other_events_still_dispatch() {
    let mut server = mockito::Server::new_async().await;
    let valid_mock = server
        .mock("GET", "/valid")
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;
    let (host, port) = split_host_port(&server.host_with_port());

    let scheduler = scheduler_with_empty_metadata().await;
    let schedule = Schedule::new("s5").with_frequency("PT1S").with_start(Utc::now() - chrono::Duration::seconds(1));
    scheduler.add_schedule(schedule).await.unwrap();
    scheduler
        .add_schedule_event(ScheduleEvent::new("bad", "s5", addressable(&host, port, "/bad", "ZAP")))
        .await
        .unwrap();
    scheduler
        .add_schedule_event(ScheduleEvent::new("good", "s5", addressable(&host, port, "/valid", "GET")))
        .await
        .unwrap();

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.stop();
    handle.await.unwrap();

    valid_mock.assert_async().await;
}

#[tokio::test]
async fn scenario_6_non_empty_parameters_set_content_length_without_body() {
    let params = r#"{"k":1}"#;
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/e6")
        .match_header("content-length", params.len().to_string().as_str())
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;
    let (host, port) = split_host_port(&server.host_with_port());

    let scheduler = scheduler_with_empty_metadata().await;
    let schedule = Schedule::new("s6").with_frequency("PT1S").with_start(Utc::now() - chrono::Duration::seconds(1));
    scheduler.add_schedule(schedule).await.unwrap();
    scheduler
        .add_schedule_event(
            ScheduleEvent::new("e6", "s6", addressable(&host, port, "/e6", "POST")).with_parameters(params),
        )
        .await
        .unwrap();

    let handle = scheduler.start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.stop();
    handle.await.unwrap();

    mock.assert_async().await;
}
