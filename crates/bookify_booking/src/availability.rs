// --- File: crates/bookify_booking/src/availability.rs ---
//! Typed availability lookups over the slot generator.
//!
//! Both the conversation flow and the HTTP endpoint go through this layer,
//! so the busy snapshot, limit lookup and generation parameters are
//! assembled in exactly one place.

use bookify_common::models::ServiceDefinition;
use bookify_common::services::{
    BoxedError, CalendarService, ServiceCatalog, ServiceLimitProvider, SettingsProvider,
};
use bookify_common::{call_bounded, ExternalCallPolicy};
use bookify_config::BookingConfig;
use bookify_scheduling::{generate_slots, SlotQuery};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;

use crate::error::BookingError;

pub struct AvailabilityService {
    settings: Arc<dyn SettingsProvider<Error = BoxedError>>,
    catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
    limits: Arc<dyn ServiceLimitProvider<Error = BoxedError>>,
    calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    tz: Tz,
    lookahead_days: u32,
    policy: ExternalCallPolicy,
}

impl AvailabilityService {
    pub fn new(
        settings: Arc<dyn SettingsProvider<Error = BoxedError>>,
        catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
        limits: Arc<dyn ServiceLimitProvider<Error = BoxedError>>,
        calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
        tz: Tz,
        booking: &BookingConfig,
    ) -> Self {
        Self {
            settings,
            catalog,
            limits,
            calendar,
            tz,
            lookahead_days: booking.lookahead_days,
            policy: ExternalCallPolicy::new(booking.external_timeout_secs, booking.external_retries),
        }
    }

    /// Resolves a service by name, then lists its bookable start instants.
    pub async fn list_slots_for(&self, service_name: &str) -> Result<Vec<DateTime<Utc>>, BookingError> {
        let service = call_bounded(self.policy, "service_catalog.resolve", || {
            self.catalog.resolve(service_name)
        })
        .await?
        .ok_or_else(|| BookingError::UnknownService(service_name.to_string()))?;
        self.list_slots(&service).await
    }

    /// Lists bookable start instants for an already-resolved service.
    pub async fn list_slots(
        &self,
        service: &ServiceDefinition,
    ) -> Result<Vec<DateTime<Utc>>, BookingError> {
        let calendar = self
            .calendar
            .as_ref()
            .ok_or_else(|| BookingError::CalendarUnavailable("calendar integration disabled".into()))?;

        let now = Utc::now();
        let window_end = busy_window_end(now, self.tz, self.lookahead_days);
        let busy = call_bounded(self.policy, "calendar.list_busy", || {
            calendar.list_busy(now, window_end)
        })
        .await
        .map_err(|e| BookingError::CalendarUnavailable(e.to_string()))?;

        let settings = call_bounded(self.policy, "settings.business_settings", || {
            self.settings.business_settings()
        })
        .await?;

        // Limits rarely vary inside a two-week window; the generator
        // re-checks the effective range per day and the commit path is
        // authoritative regardless.
        let first_day = (now.with_timezone(&self.tz) + Duration::days(1)).date_naive();
        let limit = call_bounded(self.policy, "service_limits.applicable_limit", || {
            self.limits.applicable_limit(&service.id, first_day)
        })
        .await?;

        let slots = generate_slots(&SlotQuery {
            now,
            lookahead_days: self.lookahead_days,
            service,
            settings: &settings,
            busy: &busy,
            limit: limit.as_ref(),
            tz: self.tz,
        });
        info!(
            service = %service.name,
            busy_intervals = busy.len(),
            slots = slots.len(),
            "availability computed"
        );
        Ok(slots)
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }
}

/// End of the last local lookahead day, as a UTC instant. Anchoring the
/// busy read on the local calendar keeps late-afternoon events on the
/// final day inside the window whatever the zone's UTC offset.
fn busy_window_end(now: DateTime<Utc>, tz: Tz, lookahead_days: u32) -> DateTime<Utc> {
    let after_last = now.with_timezone(&tz).date_naive()
        + Duration::days(i64::from(lookahead_days) + 1);
    tz.from_local_datetime(&after_last.and_time(NaiveTime::MIN))
        .earliest()
        .map(|midnight| midnight.with_timezone(&Utc))
        // Midnight can land in a transition gap; a flat extra day covers
        // any offset.
        .unwrap_or_else(|| now + Duration::days(i64::from(lookahead_days) + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_window_covers_the_last_local_day_behind_utc() {
        let tz = chrono_tz::America::Chicago;
        // 01:30 UTC is still the previous evening in Chicago.
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 1, 30, 0).unwrap();
        let end = busy_window_end(now, tz, 14);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 5, 20, 5, 0, 0).unwrap());

        // A 16:00 CDT event on the final lookahead day stays inside.
        let late_event = Utc.with_ymd_and_hms(2025, 5, 19, 21, 0, 0).unwrap();
        assert!(late_event < end);
    }

    #[test]
    fn busy_window_covers_the_last_local_day_ahead_of_utc() {
        let tz = chrono_tz::Asia::Tokyo;
        // Local time in Tokyo has already rolled over to May 7.
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 22, 0, 0).unwrap();
        let end = busy_window_end(now, tz, 14);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 5, 21, 15, 0, 0).unwrap());
    }
}
