// --- File: crates/bookify_booking/src/repo.rs ---
//! In-memory appointment persistence.
//!
//! `reserve` is the serialization point for the daily limit: the count and
//! the insert happen under one lock, so two racing commits for the last
//! slot of a capped day cannot both succeed.

use bookify_common::models::Appointment;
use bookify_common::services::{AppointmentRepository, BoxFuture, BoxedError, ReserveOutcome};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub struct InMemoryAppointmentRepository {
    tz: Tz,
    inner: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            inner: Mutex::new(Vec::new()),
        }
    }

    fn day_count(&self, appointments: &[Appointment], service_id: &str, day: NaiveDate) -> u32 {
        appointments
            .iter()
            .filter(|a| {
                a.service_id == service_id
                    && a.scheduled_time.with_timezone(&self.tz).date_naive() == day
            })
            .count() as u32
    }
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    type Error = BoxedError;

    fn reserve(
        &self,
        appointment: Appointment,
        service_day: NaiveDate,
        daily_limit: Option<u32>,
        external_count: u32,
    ) -> BoxFuture<'_, ReserveOutcome, Self::Error> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(limit) = daily_limit {
                let own = self.day_count(&inner, &appointment.service_id, service_day);
                // Our own appointments also appear on the calendar, so the
                // two counts overlap; max avoids double counting while still
                // seeing bookings made outside this process.
                let effective = own.max(external_count);
                if effective >= limit {
                    debug!(
                        service_id = %appointment.service_id,
                        %service_day,
                        own,
                        external_count,
                        limit,
                        "reservation rejected by daily limit"
                    );
                    return Ok(ReserveOutcome::LimitReached);
                }
            }
            inner.push(appointment.clone());
            Ok(ReserveOutcome::Reserved(appointment))
        })
    }

    fn confirm(&self, id: Uuid, event_ref: &str) -> BoxFuture<'_, Appointment, Self::Error> {
        let event_ref = event_ref.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            let appointment = inner
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| BoxedError::msg(format!("no reserved appointment {id}")))?;
            appointment.calendar_event_ref = Some(event_ref);
            Ok(appointment.clone())
        })
    }

    fn release(&self, id: Uuid) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            inner.retain(|a| a.id != id);
            Ok(())
        })
    }

    fn count_for_day(
        &self,
        service_id: &str,
        service_day: NaiveDate,
    ) -> BoxFuture<'_, u32, Self::Error> {
        let service_id = service_id.to_string();
        Box::pin(async move {
            let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            Ok(self.day_count(&inner, &service_id, service_day))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn appointment(service_id: &str, hour: u32) -> Appointment {
        let start = Utc.with_ymd_and_hms(2025, 5, 6, hour, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            customer_id: "+15551234567".into(),
            service_id: service_id.into(),
            service_name: "Full Detail".into(),
            scheduled_time: start,
            end_time: start + chrono::Duration::hours(2),
            address: None,
            add_ons: vec![],
            vehicles: vec![],
            calendar_event_ref: None,
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[tokio::test]
    async fn reserve_enforces_the_daily_limit() {
        let repo = InMemoryAppointmentRepository::new(chrono_tz::UTC);
        let first = repo
            .reserve(appointment("svc-full", 9), day(), Some(1), 0)
            .await
            .unwrap();
        assert!(matches!(first, ReserveOutcome::Reserved(_)));

        let second = repo
            .reserve(appointment("svc-full", 13), day(), Some(1), 0)
            .await
            .unwrap();
        assert!(matches!(second, ReserveOutcome::LimitReached));
    }

    #[tokio::test]
    async fn external_count_and_own_count_are_not_added() {
        let repo = InMemoryAppointmentRepository::new(chrono_tz::UTC);
        // One own booking that also shows on the calendar: effective count
        // is max(1, 1) = 1, so a limit of 2 still admits a second booking.
        repo.reserve(appointment("svc-full", 9), day(), Some(2), 0)
            .await
            .unwrap();
        let outcome = repo
            .reserve(appointment("svc-full", 13), day(), Some(2), 1)
            .await
            .unwrap();
        assert!(matches!(outcome, ReserveOutcome::Reserved(_)));
    }

    #[tokio::test]
    async fn concurrent_reservations_admit_exactly_one() {
        let repo = std::sync::Arc::new(InMemoryAppointmentRepository::new(chrono_tz::UTC));
        let a = repo.reserve(appointment("svc-full", 9), day(), Some(1), 0);
        let b = repo.reserve(appointment("svc-full", 13), day(), Some(1), 0);
        let (a, b) = tokio::join!(a, b);
        let reserved = [a.unwrap(), b.unwrap()]
            .iter()
            .filter(|o| matches!(o, ReserveOutcome::Reserved(_)))
            .count();
        assert_eq!(reserved, 1);
    }

    #[tokio::test]
    async fn release_drops_the_reservation() {
        let repo = InMemoryAppointmentRepository::new(chrono_tz::UTC);
        let appt = appointment("svc-full", 9);
        let id = appt.id;
        repo.reserve(appt, day(), Some(1), 0).await.unwrap();
        repo.release(id).await.unwrap();
        assert_eq!(repo.count_for_day("svc-full", day()).await.unwrap(), 0);

        // The freed capacity is usable again.
        let outcome = repo
            .reserve(appointment("svc-full", 13), day(), Some(1), 0)
            .await
            .unwrap();
        assert!(matches!(outcome, ReserveOutcome::Reserved(_)));
    }

    #[tokio::test]
    async fn confirm_attaches_the_event_ref() {
        let repo = InMemoryAppointmentRepository::new(chrono_tz::UTC);
        let appt = appointment("svc-full", 9);
        let id = appt.id;
        repo.reserve(appt, day(), None, 0).await.unwrap();
        let confirmed = repo.confirm(id, "evt-123").await.unwrap();
        assert_eq!(confirmed.calendar_event_ref.as_deref(), Some("evt-123"));
    }
}
