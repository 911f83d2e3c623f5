// --- File: crates/bookify_scheduling/src/limits.rs ---
//! Interval-overlap and daily-quota checks.
//!
//! Used twice with different authority: best-effort inside slot
//! generation (busy snapshot fetched once per call) and authoritatively
//! at commit time against fresh reads.

use bookify_common::models::{BusyInterval, ServiceDefinition, ServiceLimit};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Three-way overlap test between a candidate `[start, end)` and a busy
/// interval: candidate start inside, candidate end inside, or candidate
/// fully containing the interval. Touching boundaries are not overlaps.
pub fn overlaps(start: DateTime<Utc>, end: DateTime<Utc>, busy: &BusyInterval) -> bool {
    if busy.end <= busy.start {
        // Degenerate intervals occupy no time.
        return false;
    }
    let starts_inside = start >= busy.start && start < busy.end;
    let ends_inside = end > busy.start && end <= busy.end;
    let contains = start <= busy.start && end >= busy.end;
    starts_inside || ends_inside || contains
}

/// Per-day booking count for one service, split out by key provenance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayCount {
    pub total: u32,
    pub legacy: u32,
}

/// Counts busy intervals that belong to `service` and start on `day`
/// (local to the business time zone). Structured and legacy keys count
/// identically.
pub fn count_service_bookings(
    busy: &[BusyInterval],
    service: &ServiceDefinition,
    day: NaiveDate,
    tz: Tz,
) -> DayCount {
    let mut count = DayCount::default();
    for interval in busy {
        let Some(key) = &interval.service_key else {
            continue;
        };
        if !key.matches(service) {
            continue;
        }
        if interval.start.with_timezone(&tz).date_naive() != day {
            continue;
        }
        count.total += 1;
        if key.is_legacy() {
            count.legacy += 1;
        }
    }
    count
}

/// Picks the limit governing `service_id` on `date`.
///
/// The data invariant says at most one limit applies per service per day.
/// If that is violated the first matching limit in input order wins and a
/// warning is emitted; we do not silently merge.
pub fn applicable_limit<'a>(
    limits: &'a [ServiceLimit],
    service_id: &str,
    date: NaiveDate,
) -> Option<&'a ServiceLimit> {
    let mut matching = limits
        .iter()
        .filter(|l| l.service_id == service_id && l.applies_on(date));
    let first = matching.next()?;
    if matching.next().is_some() {
        warn!(
            service_id,
            %date,
            "multiple applicable service limits; using the first in input order"
        );
    }
    Some(first)
}
