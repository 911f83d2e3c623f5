#[cfg(test)]
mod tests {
    use crate::limits::overlaps;
    use crate::slots::{generate_slots, SlotQuery};
    use bookify_common::models::{BusinessSettings, BusyInterval, ServiceDefinition};
    use chrono::{DateTime, Duration, TimeZone, Timelike, Utc, Weekday};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn all_days() -> HashSet<Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .collect()
    }

    fn base_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap()
    }

    // Scattered busy intervals across the lookahead window.
    fn busy_intervals(
        offsets_hours: &[i64],
        duration_minutes: i64,
    ) -> Vec<BusyInterval> {
        offsets_hours
            .iter()
            .map(|&offset| {
                let start = base_now() + Duration::hours(offset);
                BusyInterval {
                    start,
                    end: start + Duration::minutes(duration_minutes.max(1)),
                    service_key: None,
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn generated_slots_never_overlap_busy_intervals(
            busy_offsets in proptest::collection::vec(1..14i64 * 24, 0..8),
            busy_duration_minutes in 15..240i64,
            service_duration_minutes in 30..180i64,
            start_hour in 6..11u32,
            end_hour in 14..20u32,
            minimum_notice_hours in 0..72i64,
            half_hour in any::<bool>(),
        ) {
            let settings = BusinessSettings {
                start_hour,
                start_minute: 0,
                end_hour,
                end_minute: 0,
                enable_lunch_break: true,
                lunch_hour: 12,
                lunch_minute: 0,
                days_of_week: all_days(),
                allow_weekend_bookings: true,
                half_hour_increments: half_hour,
                minimum_notice_hours,
            };
            let service = ServiceDefinition {
                id: "svc-test".into(),
                name: "Test Service".into(),
                duration: Duration::minutes(service_duration_minutes),
            };
            let busy = busy_intervals(&busy_offsets, busy_duration_minutes);
            let now = base_now();

            let slots = generate_slots(&SlotQuery {
                now,
                lookahead_days: 14,
                service: &service,
                settings: &settings,
                busy: &busy,
                limit: None,
                tz: chrono_tz::UTC,
            });

            for slot in &slots {
                let end = *slot + service.duration;

                // No overlap under the three-way test.
                for b in &busy {
                    prop_assert!(!overlaps(*slot, end, b));
                }

                // Slots respect the hour band and end before close.
                prop_assert!(slot.hour() >= start_hour);
                prop_assert!(slot.hour() < end_hour);
                let close = slot
                    .date_naive()
                    .and_hms_opt(end_hour, 0, 0)
                    .unwrap()
                    .and_utc();
                prop_assert!(end <= close);

                // Lunch hour never hosts a slot.
                prop_assert!(slot.hour() != 12);

                // Half-hour candidates only appear when enabled.
                if !half_hour {
                    prop_assert!(slot.minute() == 0);
                }
            }

            // Ascending, strictly.
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
