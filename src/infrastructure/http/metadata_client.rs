//! `reqwest`-based implementation of the `MetadataClient` port.
//!
//! Talks to the external metadata service's schedule/schedule-event/
//! addressable collections. Mirrors the JSON shapes of the domain models
//! directly — the metadata service is treated as a dumb store, not a
//! second source of business rules.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::{SchedulerError, SchedulerResult};
use crate::domain::models::{Addressable, Schedule, ScheduleEvent};
use crate::domain::ports::MetadataClient;

#[derive(Debug, Clone)]
pub struct HttpMetadataClient {
    http: Client,
    base_url: String,
}

impl HttpMetadataClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SchedulerResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> SchedulerResult<T> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("GET {path} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(SchedulerError::MetadataUnavailable(format!(
                "GET {path} returned {}",
                resp.status()
            )));
        }
        resp.json::<T>()
            .await
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("GET {path} decode failed: {e}")))
    }

    async fn post_json<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> SchedulerResult<String> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("POST {path} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(SchedulerError::MetadataUnavailable(format!(
                "POST {path} returned {}",
                resp.status()
            )));
        }
        resp.text()
            .await
            .map(|s| s.trim_matches('"').to_string())
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("POST {path} decode failed: {e}")))
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn schedules(&self) -> SchedulerResult<Vec<Schedule>> {
        self.get_json("/api/v1/schedule").await
    }

    async fn schedule_events(&self) -> SchedulerResult<Vec<ScheduleEvent>> {
        self.get_json("/api/v1/scheduleevent").await
    }

    async fn add_schedule(&self, schedule: &Schedule) -> SchedulerResult<String> {
        self.post_json("/api/v1/schedule", schedule).await
    }

    async fn add_schedule_event(&self, event: &ScheduleEvent) -> SchedulerResult<String> {
        self.post_json("/api/v1/scheduleevent", event).await
    }

    async fn add_addressable(&self, addressable: &Addressable) -> SchedulerResult<String> {
        self.post_json("/api/v1/addressable", addressable).await
    }

    async fn addressable_for_name(&self, name: &str) -> SchedulerResult<Option<Addressable>> {
        let path = format!("/api/v1/addressable/name/{name}");
        let resp = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("GET {path} failed: {e}")))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SchedulerError::MetadataUnavailable(format!(
                "GET {path} returned {}",
                resp.status()
            )));
        }
        resp.json::<Addressable>()
            .await
            .map(Some)
            .map_err(|e| SchedulerError::MetadataUnavailable(format!("GET {path} decode failed: {e}")))
    }
}
