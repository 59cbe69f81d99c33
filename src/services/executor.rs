//! Event executor: fires every event on one schedule context, then
//! advances the context via the recurrence evaluator.
//!
//! Runs entirely outside the registry lock (see `SPEC_FULL.md` §5) —
//! it's handed a snapshot of the context and only touches the registry
//! again, briefly, to record completion.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use crate::domain::models::ScheduleContext;
use crate::infrastructure::http::DispatchClient;

use super::registry::ScheduleRegistry;

pub struct EventExecutor {
    dispatch_client: Arc<DispatchClient>,
}

impl EventExecutor {
    pub const fn new(dispatch_client: Arc<DispatchClient>) -> Self {
        Self { dispatch_client }
    }

    /// Dispatches one context: fires every attached event, then advances
    /// the owning schedule and re-enqueues it unless the evaluator says
    /// it's complete. Never returns an error — failures are logged and
    /// swallowed so one bad dispatch can't take down the tick loop.
    pub async fn dispatch(&self, registry: &ScheduleRegistry, context: ScheduleContext) {
        let span = tracing::info_span!("dispatch", schedule = %context.schedule.name);
        async {
            for event in context.events_by_event_id.values() {
                match self
                    .dispatch_client
                    .fire(&event.addressable, &event.parameters)
                    .await
                {
                    Ok(outcome) if outcome.status < 400 => {
                        tracing::debug!(event = %event.name, status = outcome.status, body = %outcome.body, "event fired");
                    }
                    Ok(outcome) => {
                        tracing::warn!(event = %event.name, status = outcome.status, body = %outcome.body, "event fired with error status");
                    }
                    Err(e) => {
                        tracing::warn!(event = %event.name, error = %e, "event dispatch failed");
                    }
                }
            }

            let now = Utc::now();
            match registry.complete_dispatch(&context.schedule.id, now).await {
                Ok(true) => {
                    tracing::info!("schedule complete, not re-enqueuing");
                }
                Ok(false) => {
                    registry.enqueue_back(context.schedule.id.clone()).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to advance schedule after dispatch");
                }
            }
        }
        .instrument(span)
        .await;
    }
}
