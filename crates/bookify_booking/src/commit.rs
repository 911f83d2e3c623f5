// --- File: crates/bookify_booking/src/commit.rs ---
//! Booking finalization.
//!
//! The commit pipeline re-validates everything against fresh data, holds
//! the daily-limit gate inside the repository's critical section, and only
//! reports success once both the appointment record and the calendar
//! artifact exist. A failed calendar write releases the reservation.

use bookify_common::models::{
    Appointment, CalendarEventRequest, NotificationDetails, ServiceDefinition,
};
use bookify_common::services::{
    AppointmentRepository, BoxedError, CalendarService, NotificationService, ReserveOutcome,
    ServiceLimitProvider,
};
use bookify_common::{call_bounded, ExternalCallPolicy};
use bookify_scheduling::{count_service_bookings, overlaps};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::BookingError;

/// Everything needed to finalize one booking.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub service: ServiceDefinition,
    pub scheduled_time: DateTime<Utc>,
    pub add_ons: Vec<String>,
    pub vehicles: Vec<String>,
}

pub struct BookingCommitService {
    calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
    limits: Arc<dyn ServiceLimitProvider<Error = BoxedError>>,
    notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    tz: Tz,
    policy: ExternalCallPolicy,
}

impl BookingCommitService {
    pub fn new(
        calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
        repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
        limits: Arc<dyn ServiceLimitProvider<Error = BoxedError>>,
        notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
        tz: Tz,
        policy: ExternalCallPolicy,
    ) -> Self {
        Self {
            calendar,
            repository,
            limits,
            notifier,
            tz,
            policy,
        }
    }

    /// Finalizes a booking. On success both the appointment record and the
    /// calendar event exist; on any error nothing is kept.
    pub async fn commit(&self, request: CommitRequest) -> Result<Appointment, BookingError> {
        let calendar = self.calendar.as_ref().ok_or_else(|| {
            BookingError::CalendarUnavailable("calendar integration disabled".into())
        })?;

        let service = &request.service;
        let start = request.scheduled_time;
        let end = start + service.duration;
        let local_day = start.with_timezone(&self.tz).date_naive();

        // Fresh busy snapshot around the requested day; the generation-time
        // snapshot may be minutes stale by now.
        let busy = call_bounded(self.policy, "calendar.list_busy", || {
            calendar.list_busy(start - Duration::hours(24), end + Duration::hours(24))
        })
        .await
        .map_err(|e| BookingError::CalendarUnavailable(e.to_string()))?;

        if busy.iter().any(|b| overlaps(start, end, b)) {
            info!(service = %service.name, %start, "commit rejected: slot taken");
            return Err(BookingError::SlotUnavailable);
        }

        let limit = call_bounded(self.policy, "service_limits.applicable_limit", || {
            self.limits.applicable_limit(&service.id, local_day)
        })
        .await?;
        let external_count = count_service_bookings(&busy, service, local_day, self.tz).total;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: request.customer_id.clone(),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            scheduled_time: start,
            end_time: end,
            address: request.address.clone(),
            add_ons: request.add_ons.clone(),
            vehicles: request.vehicles.clone(),
            calendar_event_ref: None,
            created_at: Utc::now(),
        };

        // The reservation is the last gate: count + insert in one critical
        // section, so racing commits for a capped day admit one winner.
        let outcome = self
            .repository
            .reserve(
                appointment,
                local_day,
                limit.as_ref().map(|l| l.daily_limit),
                external_count,
            )
            .await
            .map_err(BookingError::internal)?;

        let reserved = match outcome {
            ReserveOutcome::Reserved(appointment) => appointment,
            ReserveOutcome::LimitReached => {
                return Err(BookingError::ServiceLimitReached {
                    service_name: service.name.clone(),
                    suggestion: next_day_suggestion(local_day),
                });
            }
        };

        let event = CalendarEventRequest {
            start,
            end,
            summary: format!(
                "{} - {}",
                service.name,
                request.customer_name.as_deref().unwrap_or(&request.customer_id)
            ),
            description: event_description(&request),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
        };
        let event_ref = match call_bounded(self.policy, "calendar.create_event", || {
            calendar.create_event(event.clone())
        })
        .await
        {
            Ok(event_ref) => event_ref,
            Err(e) => {
                error!(appointment_id = %reserved.id, error = %e, "calendar write failed; releasing reservation");
                if let Err(release_err) = self.repository.release(reserved.id).await {
                    error!(appointment_id = %reserved.id, error = %release_err, "release failed after calendar error");
                }
                return Err(BookingError::CalendarUnavailable(e.to_string()));
            }
        };

        let confirmed = match self.repository.confirm(reserved.id, &event_ref.event_id).await {
            Ok(appointment) => appointment,
            Err(e) => {
                if let Err(release_err) = self.repository.release(reserved.id).await {
                    error!(appointment_id = %reserved.id, error = %release_err, "release failed after confirm error");
                }
                return Err(BookingError::CommitFailed(e.to_string()));
            }
        };

        info!(
            appointment_id = %confirmed.id,
            service = %confirmed.service_name,
            scheduled_time = %confirmed.scheduled_time,
            event_ref = %event_ref.event_id,
            "booking committed"
        );
        self.spawn_notifications(&confirmed);
        Ok(confirmed)
    }

    /// Confirmation and reminder delivery happen off the request path;
    /// failures are logged and never affect the committed booking.
    fn spawn_notifications(&self, appointment: &Appointment) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let details = NotificationDetails {
            recipient: appointment.customer_id.clone(),
            customer_name: None,
            service_name: appointment.service_name.clone(),
            scheduled_time: appointment.scheduled_time,
            address: appointment.address.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = notifier.send_confirmation(details.clone()).await {
                warn!(error = %e, "confirmation send failed");
            }
            if let Err(e) = notifier.schedule_reminder(details).await {
                warn!(error = %e, "reminder scheduling failed");
            }
        });
    }
}

fn next_day_suggestion(day: chrono::NaiveDate) -> String {
    let next = day + Duration::days(1);
    format!("Would {} work instead?", next.format("%A, %B %-d"))
}

fn event_description(request: &CommitRequest) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(name) = &request.customer_name {
        lines.push(format!("Customer: {name}"));
    }
    lines.push(format!("Phone: {}", request.customer_id));
    if let Some(address) = &request.address {
        lines.push(format!("Address: {address}"));
    }
    if !request.vehicles.is_empty() {
        lines.push(format!("Vehicles: {}", request.vehicles.join(", ")));
    }
    if !request.add_ons.is_empty() {
        lines.push(format!("Add-ons: {}", request.add_ons.join(", ")));
    }
    Some(lines.join("\n"))
}
