// --- File: crates/bookify_scheduling/src/slots.rs ---
//! Candidate-slot generation.
//!
//! Walks the lookahead window one local business day at a time, applying
//! the daily-limit pre-check, working-day rules, the lunch break, the
//! minimum-notice threshold and the busy-interval overlap test. Returns
//! candidate start instants in ascending order; pairing each start with
//! `start + duration` gives the implied slot end.

use bookify_common::models::{BusinessSettings, BusyInterval, ServiceDefinition, ServiceLimit};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::limits::{count_service_bookings, overlaps};

/// Default lookahead window, in days.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// Half-hour candidates are only generated for services short enough to
/// fit twice in the same hour band.
const HALF_HOUR_MAX_DURATION: i64 = 90;

/// Inputs for one slot-generation pass. The busy snapshot is fetched once
/// by the caller; generation-time limit checks are best effort and the
/// commit path re-checks authoritatively.
#[derive(Debug, Clone)]
pub struct SlotQuery<'a> {
    pub now: DateTime<Utc>,
    pub lookahead_days: u32,
    pub service: &'a ServiceDefinition,
    pub settings: &'a BusinessSettings,
    pub busy: &'a [BusyInterval],
    pub limit: Option<&'a ServiceLimit>,
    pub tz: Tz,
}

fn local_instant(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    // DST gaps can make a wall-clock time nonexistent; skip such candidates.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Computes the candidate bookable start instants for the query window.
pub fn generate_slots(query: &SlotQuery<'_>) -> Vec<DateTime<Utc>> {
    let settings = query.settings;
    let service = query.service;
    let mut slots = Vec::new();

    let today = query.now.with_timezone(&query.tz).date_naive();
    // The notice threshold is anchored at the start of the current business
    // day: a 24h notice admits all of tomorrow, a 48h notice starts the day
    // after. Sub-day notices still bite within the first admissible day.
    let earliest_start = local_instant(today, 0, 0, query.tz)
        .unwrap_or(query.now)
        + Duration::hours(settings.minimum_notice_hours);

    let half_hour_candidates = settings.half_hour_increments
        && service.duration <= Duration::minutes(HALF_HOUR_MAX_DURATION);

    for offset in 1..=i64::from(query.lookahead_days) {
        let date = today + Duration::days(offset);
        let weekday = date.weekday();
        let is_weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        let day_enabled = settings.days_of_week.contains(&weekday)
            || (is_weekend && settings.allow_weekend_bookings);
        if !day_enabled {
            continue;
        }

        if let Some(limit) = query.limit.filter(|l| l.applies_on(date)) {
            let count = count_service_bookings(query.busy, service, date, query.tz);
            if count.total >= limit.daily_limit {
                debug!(
                    service = %service.name,
                    %date,
                    count = count.total,
                    daily_limit = limit.daily_limit,
                    "daily limit reached; skipping day"
                );
                continue;
            }
            if count.total > 0 && count.legacy == count.total {
                warn!(
                    service = %service.name,
                    %date,
                    "daily count matched via legacy labels only; bookings need metadata backfill"
                );
            }
        }

        let Some(day_end) = local_instant(date, settings.end_hour, settings.end_minute, query.tz)
        else {
            continue;
        };

        for hour in settings.start_hour..settings.end_hour {
            if settings.enable_lunch_break && hour == settings.lunch_hour {
                continue;
            }
            let minutes: &[u32] = if half_hour_candidates { &[0, 30] } else { &[0] };
            for &minute in minutes {
                let Some(start) = local_instant(date, hour, minute, query.tz) else {
                    continue;
                };
                let end = start + service.duration;
                if end > day_end {
                    continue;
                }
                if start < earliest_start {
                    continue;
                }
                if query.busy.iter().any(|b| overlaps(start, end, b)) {
                    continue;
                }
                slots.push(start);
            }
        }
    }

    slots
}
