//! The schedule registry: cross-referential indices over schedules and
//! their events, guarded by one exclusive lock (see `SPEC_FULL.md` §5 for
//! the concurrency rationale).
//!
//! All mutating operations here are synchronous once the lock is held —
//! none of them touch the network or sleep, which is what lets the tick
//! engine and the executor treat this lock as a leaf lock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::errors::{SchedulerError, SchedulerResult};
use crate::domain::models::{Schedule, ScheduleContext, ScheduleEvent};
use crate::domain::recurrence;

use super::queue::DispatchQueue;

#[derive(Default)]
struct RegistryState {
    contexts: HashMap<String, ScheduleContext>,
    name_index: HashMap<String, String>,
    event_id_index: HashMap<String, String>,
    event_name_to_schedule_id: HashMap<String, String>,
    event_name_to_event_id: HashMap<String, String>,
    queue: DispatchQueue,
}

pub struct ScheduleRegistry {
    state: Mutex<RegistryState>,
}

impl Default for ScheduleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub async fn query_schedule(&self, id: &str) -> SchedulerResult<Schedule> {
        let state = self.state.lock().await;
        state
            .contexts
            .get(id)
            .map(|ctx| ctx.schedule.clone())
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    pub async fn query_schedule_by_name(&self, name: &str) -> SchedulerResult<Schedule> {
        let state = self.state.lock().await;
        let id = state
            .name_index
            .get(name)
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))?;
        state
            .contexts
            .get(id)
            .map(|ctx| ctx.schedule.clone())
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))
    }

    /// Idempotent on id collision: returns `Ok(())` without mutation if the
    /// id is already registered.
    pub async fn add_schedule(&self, schedule: Schedule) -> SchedulerResult<()> {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        if state.contexts.contains_key(&schedule.id) {
            return Ok(());
        }
        if state.name_index.contains_key(&schedule.name) {
            return Err(SchedulerError::AlreadyExists(schedule.name));
        }

        let outcome = recurrence::evaluate(&schedule, now, 0, None)?;
        let id = schedule.id.clone();
        let name = schedule.name.clone();
        let mut context = ScheduleContext::new(schedule, outcome.next_fire_time);

        state.name_index.insert(name, id.clone());
        if outcome.complete {
            // Already past `end` at insertion time: inserted but never queued.
            context.queued = false;
        } else {
            state.queue.enqueue(id.clone());
        }
        state.contexts.insert(id, context);
        Ok(())
    }

    /// Rewrites the embedded schedule and re-primes `nextFireTime` against
    /// the current wall clock. Events and queue position are preserved.
    pub async fn update_schedule(&self, schedule: Schedule) -> SchedulerResult<()> {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let Some(existing) = state.contexts.get(&schedule.id) else {
            return Err(SchedulerError::NotFound(schedule.id));
        };
        let old_name = existing.schedule.name.clone();

        let outcome = recurrence::evaluate(&schedule, now, 0, None)?;

        if schedule.name != old_name {
            if state.name_index.contains_key(&schedule.name) {
                return Err(SchedulerError::AlreadyExists(schedule.name));
            }
            state.name_index.remove(&old_name);
            state.name_index.insert(schedule.name.clone(), schedule.id.clone());
        }

        let ctx = state.contexts.get_mut(&schedule.id).expect("checked above");
        ctx.schedule = schedule;
        ctx.next_fire_time = outcome.next_fire_time;
        ctx.iteration_count = 0;
        Ok(())
    }

    /// Marks the context deleted, drops every event-index it owns, and
    /// drops both the id and name indices for the schedule itself. Any
    /// queue entry for this id is reclaimed lazily — the tick engine finds
    /// nothing under the id and simply drops it.
    pub async fn remove_schedule(&self, id: &str) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        let context = state
            .contexts
            .get(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;

        let event_ids: Vec<String> = context.events_by_event_id.keys().cloned().collect();
        let event_names: Vec<String> = context
            .events_by_event_id
            .values()
            .map(|e| e.name.clone())
            .collect();
        let name = context.schedule.name.clone();

        for event_id in event_ids {
            state.event_id_index.remove(&event_id);
        }
        for event_name in event_names {
            state.event_name_to_schedule_id.remove(&event_name);
            state.event_name_to_event_id.remove(&event_name);
        }
        state.name_index.remove(&name);
        state.contexts.remove(id);
        Ok(())
    }

    pub async fn query_schedule_event(&self, id: &str) -> SchedulerResult<ScheduleEvent> {
        let state = self.state.lock().await;
        let schedule_id = state
            .event_id_index
            .get(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
        state
            .contexts
            .get(schedule_id)
            .and_then(|ctx| ctx.events_by_event_id.get(id))
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    pub async fn query_schedule_event_by_name(&self, name: &str) -> SchedulerResult<ScheduleEvent> {
        let state = self.state.lock().await;
        let event_id = state
            .event_name_to_event_id
            .get(name)
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))?;
        let schedule_id = state
            .event_name_to_schedule_id
            .get(name)
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))?;
        state
            .contexts
            .get(schedule_id)
            .and_then(|ctx| ctx.events_by_event_id.get(event_id))
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(name.to_string()))
    }

    pub async fn add_schedule_event(&self, event: ScheduleEvent) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        let schedule_id = state
            .name_index
            .get(&event.schedule)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownSchedule(event.schedule.clone()))?;

        let needs_revival = {
            let ctx = state
                .contexts
                .get(&schedule_id)
                .ok_or_else(|| SchedulerError::UnknownSchedule(event.schedule.clone()))?;
            !ctx.queued
        };

        state.event_id_index.insert(event.id.clone(), schedule_id.clone());
        state
            .event_name_to_schedule_id
            .insert(event.name.clone(), schedule_id.clone());
        state.event_name_to_event_id.insert(event.name.clone(), event.id.clone());

        let ctx = state.contexts.get_mut(&schedule_id).expect("checked above");
        ctx.events_by_event_id.insert(event.id.clone(), event);

        if needs_revival {
            ctx.queued = true;
            state.queue.enqueue(schedule_id);
        }
        Ok(())
    }

    /// If the owning schedule changed, detaches from the old context
    /// (retiring it if its event map empties) then reattaches to the new
    /// one. Otherwise updates in place.
    pub async fn update_schedule_event(&self, event: ScheduleEvent) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        let old_schedule_id = state
            .event_id_index
            .get(&event.id)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(event.id.clone()))?;

        let new_schedule_id = state
            .name_index
            .get(&event.schedule)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownSchedule(event.schedule.clone()))?;

        if old_schedule_id == new_schedule_id {
            let old_name = state
                .contexts
                .get(&old_schedule_id)
                .and_then(|ctx| ctx.events_by_event_id.get(&event.id))
                .map(|e| e.name.clone());
            if let Some(old_name) = old_name {
                if old_name != event.name {
                    state.event_name_to_schedule_id.remove(&old_name);
                    state.event_name_to_event_id.remove(&old_name);
                    state
                        .event_name_to_schedule_id
                        .insert(event.name.clone(), new_schedule_id.clone());
                    state.event_name_to_event_id.insert(event.name.clone(), event.id.clone());
                }
            }
            if let Some(ctx) = state.contexts.get_mut(&old_schedule_id) {
                ctx.events_by_event_id.insert(event.id.clone(), event);
            }
            return Ok(());
        }

        // Detach from the old context.
        let old_name = {
            let old_ctx = state
                .contexts
                .get_mut(&old_schedule_id)
                .ok_or_else(|| SchedulerError::NotFound(old_schedule_id.clone()))?;
            let removed = old_ctx.events_by_event_id.remove(&event.id);
            let emptied = old_ctx.events_by_event_id.is_empty();
            if emptied {
                old_ctx.marked_deleted = true;
            }
            removed.map(|e| (e.name, emptied))
        };
        if let Some((removed_name, emptied)) = old_name {
            if emptied {
                let schedule_name = state.contexts.get(&old_schedule_id).map(|c| c.schedule.name.clone());
                if let Some(schedule_name) = schedule_name {
                    state.name_index.remove(&schedule_name);
                }
                state.contexts.remove(&old_schedule_id);
            }
            if removed_name != event.name {
                state.event_name_to_schedule_id.remove(&removed_name);
                state.event_name_to_event_id.remove(&removed_name);
            }
        }

        // Reattach to the new context.
        state.event_id_index.insert(event.id.clone(), new_schedule_id.clone());
        state
            .event_name_to_schedule_id
            .insert(event.name.clone(), new_schedule_id.clone());
        state.event_name_to_event_id.insert(event.name.clone(), event.id.clone());
        let new_ctx = state
            .contexts
            .get_mut(&new_schedule_id)
            .ok_or_else(|| SchedulerError::UnknownSchedule(event.schedule.clone()))?;
        let needs_revival = !new_ctx.queued;
        new_ctx.events_by_event_id.insert(event.id.clone(), event);
        if needs_revival {
            new_ctx.queued = true;
            state.queue.enqueue(new_schedule_id);
        }
        Ok(())
    }

    /// Detaches the event and drops its three indices. Does not retire the
    /// owning context even if it becomes event-free — intentionally
    /// asymmetric with `update_schedule_event` (see `SPEC_FULL.md` §4.2).
    pub async fn remove_schedule_event(&self, id: &str) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        let schedule_id = state
            .event_id_index
            .remove(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))?;
        let name = state
            .contexts
            .get_mut(&schedule_id)
            .and_then(|ctx| ctx.events_by_event_id.remove(id))
            .map(|e| e.name);
        if let Some(name) = name {
            state.event_name_to_schedule_id.remove(&name);
            state.event_name_to_event_id.remove(&name);
        }
        Ok(())
    }

    /// Bulk reload entry point: calls `add_schedule` for each entry in
    /// order, collecting per-item results so one bad entry doesn't abort
    /// the batch.
    pub async fn add_schedulers(&self, schedules: Vec<Schedule>) -> Vec<SchedulerResult<()>> {
        let mut results = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            results.push(self.add_schedule(schedule).await);
        }
        results
    }

    // --- Tick-engine-facing operations below; not part of the public CRUD surface. ---

    pub(crate) async fn queue_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub(crate) async fn dequeue_front(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        let id = state.queue.dequeue_front();
        if let Some(id) = &id {
            if let Some(ctx) = state.contexts.get_mut(id) {
                ctx.queued = false;
            }
        }
        id
    }

    pub(crate) async fn enqueue_back(&self, id: String) {
        let mut state = self.state.lock().await;
        if let Some(ctx) = state.contexts.get_mut(&id) {
            ctx.queued = true;
        }
        state.queue.enqueue(id);
    }

    /// Looks up the context for a dispatch decision: `None` if it no longer
    /// exists (the tick engine's lazy-reclaim case), `Some(true)` if
    /// `marked_deleted`, `Some(false)` with the due-ness check otherwise.
    pub(crate) async fn context_snapshot(&self, id: &str) -> Option<ScheduleContext> {
        self.state.lock().await.contexts.get(id).cloned()
    }

    /// Advances a context after a dispatch completes: runs the evaluator,
    /// bumps `iterationCount`, and returns whether the schedule is now
    /// complete (and so should not be re-enqueued).
    pub(crate) async fn complete_dispatch(&self, id: &str, now: DateTime<Utc>) -> SchedulerResult<bool> {
        let mut state = self.state.lock().await;
        let Some(ctx) = state.contexts.get_mut(id) else {
            return Ok(true);
        };
        let outcome = recurrence::evaluate(&ctx.schedule, now, ctx.iteration_count + 1, Some(ctx.next_fire_time))?;
        ctx.iteration_count += 1;
        ctx.next_fire_time = outcome.next_fire_time;
        if outcome.complete {
            ctx.queued = false;
        }
        Ok(outcome.complete)
    }
}
