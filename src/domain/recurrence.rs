//! Pure recurrence arithmetic: duration parsing and the next-fire-time evaluator.
//!
//! Nothing in this module touches the registry or the wall clock directly —
//! `evaluate` takes the reference instant as an argument so it stays a pure
//! function of its inputs, which is what makes it straightforward to
//! property-test (see `tests` below).

use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};

use super::errors::{SchedulerError, SchedulerResult};
use super::models::Schedule;

/// Result of one recurrence evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceOutcome {
    pub next_fire_time: DateTime<Utc>,
    pub complete: bool,
}

/// Parses an ISO-8601-like duration string (`PT30S`, `PT1H`, `PT1H30M`, `P1D`).
///
/// Supports the `P[n]D` date part and the `T[n]H[n]M[n]S` time part, which
/// covers every unit the config schema and the metadata service emit.
/// Years/months are deliberately unsupported — their length is calendar
/// dependent and the source format never uses them for this service.
pub fn parse_duration(raw: &str) -> SchedulerResult<StdDuration> {
    let s = raw.trim();
    let rest = s
        .strip_prefix('P')
        .ok_or_else(|| SchedulerError::InvalidRecurrence(format!("duration must start with 'P': {raw}")))?;

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total_secs: i64 = 0;
    let mut saw_component = false;

    if !date_part.is_empty() {
        let days = parse_unit(date_part, 'D', raw)?;
        if let Some(d) = days {
            total_secs += d * 86_400;
            saw_component = true;
        } else {
            return Err(SchedulerError::InvalidRecurrence(format!(
                "unrecognised date component in duration: {raw}"
            )));
        }
    }

    if let Some(time_part) = time_part {
        let mut remaining = time_part;
        if let Some(hours) = parse_unit(remaining, 'H', raw)? {
            total_secs += hours * 3600;
            saw_component = true;
            remaining = remaining.split_once('H').map_or("", |(_, r)| r);
        }
        if let Some(minutes) = parse_unit(remaining, 'M', raw)? {
            total_secs += minutes * 60;
            saw_component = true;
            remaining = remaining.split_once('M').map_or("", |(_, r)| r);
        }
        if let Some(seconds) = parse_unit(remaining, 'S', raw)? {
            total_secs += seconds;
            saw_component = true;
        }
    }

    if !saw_component || total_secs <= 0 {
        return Err(SchedulerError::InvalidRecurrence(format!(
            "duration has no positive components: {raw}"
        )));
    }

    Ok(StdDuration::from_secs(total_secs as u64))
}

/// Extracts the leading integer before `unit` in `segment`, if present. A
/// malformed numeric prefix (not just an absent unit) is a hard parse error.
fn parse_unit(segment: &str, unit: char, raw: &str) -> SchedulerResult<Option<i64>> {
    let Some((num, _)) = segment.split_once(unit) else {
        return Ok(None);
    };
    // Only take the trailing digits directly before `unit` — a prior
    // successfully-consumed unit may have left characters in front.
    let digits: String = num.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    let digits: String = digits.chars().rev().collect();
    if digits.is_empty() {
        return Err(SchedulerError::InvalidRecurrence(format!(
            "missing numeric value before '{unit}' in duration: {raw}"
        )));
    }
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| SchedulerError::InvalidRecurrence(format!("bad numeric value in duration: {raw}")))
}

/// Computes the next fire time and completion state for a schedule.
///
/// `previous_fire_time` is `None` on the first evaluation (priming a
/// freshly-added schedule) and `Some(context.next_fire_time)` on every
/// subsequent evaluation after a firing.
pub fn evaluate(
    schedule: &Schedule,
    reference: DateTime<Utc>,
    iteration_count: u64,
    previous_fire_time: Option<DateTime<Utc>>,
) -> SchedulerResult<RecurrenceOutcome> {
    if schedule.run_once && iteration_count >= 1 {
        return Ok(RecurrenceOutcome {
            next_fire_time: previous_fire_time.unwrap_or(reference),
            complete: true,
        });
    }

    let next_fire_time = compute_next(schedule, reference, previous_fire_time)?;

    let complete = schedule.end.is_some_and(|end| next_fire_time > end);

    Ok(RecurrenceOutcome { next_fire_time, complete })
}

fn compute_next(
    schedule: &Schedule,
    reference: DateTime<Utc>,
    previous_fire_time: Option<DateTime<Utc>>,
) -> SchedulerResult<DateTime<Utc>> {
    if let Some(frequency) = schedule.frequency.as_deref() {
        let step = parse_duration(frequency)?;
        let step = chrono::Duration::from_std(step)
            .map_err(|e| SchedulerError::InvalidRecurrence(format!("duration out of range: {e}")))?;
        let base = match previous_fire_time {
            Some(prev) => prev,
            None => schedule.start.unwrap_or(reference).max(reference),
        };
        return Ok(base + step);
    }

    if let Some(cron_expr) = schedule.cron.as_deref() {
        let parsed = cron::Schedule::from_str(cron_expr)
            .map_err(|e| SchedulerError::InvalidRecurrence(format!("invalid cron expression '{cron_expr}': {e}")))?;
        let after = previous_fire_time.unwrap_or(reference);
        return parsed
            .after(&after)
            .next()
            .ok_or_else(|| SchedulerError::InvalidRecurrence(format!("cron expression never fires again: {cron_expr}")));
    }

    Err(SchedulerError::InvalidRecurrence(format!(
        "schedule '{}' has neither frequency nor cron",
        schedule.name
    )))
}
