// --- File: crates/bookify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! These traits decouple the booking core from concrete implementations of
//! the calendar, customer directory, address validation and notification
//! integrations, which makes the step handlers testable with hand-rolled
//! fakes.

use chrono::{DateTime, NaiveDate, Utc};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    AddressCheck, Appointment, BusinessSettings, BusyInterval, CalendarEventRef,
    CalendarEventRequest, CustomerRecord, NotificationDetails, ServiceDefinition, ServiceLimit,
};

/// Type alias for a boxed future that returns a Result.
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for
/// Box<dyn std::error::Error + Send + Sync>.
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

impl BoxedError {
    pub fn msg(message: impl fmt::Display) -> Self {
        BoxedError(message.to_string().into())
    }
}

/// Supplies the business-hours configuration for the tenant.
pub trait SettingsProvider: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn business_settings(&self) -> BoxFuture<'_, BusinessSettings, Self::Error>;
}

/// Resolves service names to definitions and enumerates the catalog.
pub trait ServiceCatalog: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn resolve(&self, name: &str) -> BoxFuture<'_, Option<ServiceDefinition>, Self::Error>;

    fn all(&self) -> BoxFuture<'_, Vec<ServiceDefinition>, Self::Error>;
}

/// Supplies the daily booking limit applicable to a service on a given day.
pub trait ServiceLimitProvider: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn applicable_limit(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Option<ServiceLimit>, Self::Error>;
}

/// Calendar integration: busy-interval reads and event creation.
///
/// Implementations normalize raw events into [`BusyInterval`]s at this
/// boundary, so callers never see provenance.
pub trait CalendarService: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, Self::Error>;

    fn create_event(
        &self,
        event: CalendarEventRequest,
    ) -> BoxFuture<'_, CalendarEventRef, Self::Error>;
}

/// Looks up a returning customer by channel identifier (phone number).
pub trait CustomerLookup: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn find(&self, identifier: &str) -> BoxFuture<'_, Option<CustomerRecord>, Self::Error>;
}

/// Validates and normalizes a customer address.
pub trait AddressValidator: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn check(&self, address: &str) -> BoxFuture<'_, AddressCheck, Self::Error>;
}

/// Fire-and-forget confirmation and reminder delivery.
pub trait NotificationService: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    fn send_confirmation(&self, details: NotificationDetails) -> BoxFuture<'_, (), Self::Error>;

    fn schedule_reminder(&self, details: NotificationDetails) -> BoxFuture<'_, (), Self::Error>;
}

/// Result of an atomic reservation attempt.
#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    Reserved(Appointment),
    LimitReached,
}

/// Persistence for confirmed appointments.
///
/// `reserve` is the authoritative daily-limit gate: the count and the
/// insert happen inside one critical section, so concurrent commits for
/// the same service/day cannot both pass a `daily_limit` of N.
pub trait AppointmentRepository: Send + Sync {
    type Error: StdError + Send + Sync + 'static;

    /// Atomically counts bookings for the appointment's service/day and
    /// inserts the appointment when under `daily_limit`. `external_count`
    /// is the fresh calendar-derived count for the same service/day; the
    /// effective count is the max of the two, since our own appointments
    /// also appear on the calendar.
    fn reserve(
        &self,
        appointment: Appointment,
        service_day: NaiveDate,
        daily_limit: Option<u32>,
        external_count: u32,
    ) -> BoxFuture<'_, ReserveOutcome, Self::Error>;

    /// Attaches the calendar artifact reference to a reserved appointment.
    fn confirm(&self, id: Uuid, event_ref: &str) -> BoxFuture<'_, Appointment, Self::Error>;

    /// Drops a reservation whose calendar write failed.
    fn release(&self, id: Uuid) -> BoxFuture<'_, (), Self::Error>;

    fn count_for_day(
        &self,
        service_id: &str,
        service_day: NaiveDate,
    ) -> BoxFuture<'_, u32, Self::Error>;
}

/// A factory for creating service instances.
///
/// Mandatory collaborators return `Arc`s directly; integrations that may be
/// disabled by runtime config (calendar, notifications) return `Option`.
pub trait ServiceFactory: Send + Sync {
    fn settings_provider(&self) -> Arc<dyn SettingsProvider<Error = BoxedError>>;

    fn service_catalog(&self) -> Arc<dyn ServiceCatalog<Error = BoxedError>>;

    fn service_limits(&self) -> Arc<dyn ServiceLimitProvider<Error = BoxedError>>;

    fn customer_lookup(&self) -> Arc<dyn CustomerLookup<Error = BoxedError>>;

    fn address_validator(&self) -> Arc<dyn AddressValidator<Error = BoxedError>>;

    fn appointment_repository(&self) -> Arc<dyn AppointmentRepository<Error = BoxedError>>;

    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>>;

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;
}
