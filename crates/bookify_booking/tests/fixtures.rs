//! Test fixtures for booking flow tests
//!
//! Hand-rolled fakes for the external collaborators plus a harness that
//! wires them into the orchestrator the same way the backend does.

use bookify_booking::{
    AvailabilityService, BookingCommitService, BookingOrchestrator, ConversationStore,
    InMemoryAppointmentRepository, KeywordIntentExtractor,
};
use bookify_common::models::{
    AddressCheck, BusinessSettings, BusyInterval, CalendarEventRef, CalendarEventRequest,
    CustomerRecord, ServiceDefinition, ServiceKey, ServiceLimit,
};
use bookify_common::services::{
    AddressValidator, BoxFuture, BoxedError, CalendarService, CustomerLookup, ServiceCatalog,
    ServiceLimitProvider, SettingsProvider,
};
use bookify_config::BookingConfig;
use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Business hours 9:00-17:00 with a noon lunch break, every day of the
/// week enabled so tests are independent of the date they run on.
pub fn test_settings() -> BusinessSettings {
    BusinessSettings {
        start_hour: 9,
        start_minute: 0,
        end_hour: 17,
        end_minute: 0,
        enable_lunch_break: true,
        lunch_hour: 12,
        lunch_minute: 0,
        days_of_week: [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .collect(),
        allow_weekend_bookings: true,
        half_hour_increments: false,
        minimum_notice_hours: 24,
    }
}

pub fn test_services() -> Vec<ServiceDefinition> {
    vec![
        ServiceDefinition::new("svc-full", "Full Detail", 2.0),
        ServiceDefinition::new("svc-int", "Interior Detail", 1.5),
        ServiceDefinition::new("svc-wash", "Express Wash", 0.5),
    ]
}

/// A start instant on the first fully-bookable day of the window.
pub fn tomorrow_at(hour: u32) -> DateTime<Utc> {
    (Utc::now() + Duration::days(2))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_utc()
}

pub struct FakeSettings(pub BusinessSettings);

impl SettingsProvider for FakeSettings {
    type Error = BoxedError;

    fn business_settings(&self) -> BoxFuture<'_, BusinessSettings, Self::Error> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

pub struct FakeCatalog(pub Vec<ServiceDefinition>);

impl ServiceCatalog for FakeCatalog {
    type Error = BoxedError;

    fn resolve(&self, name: &str) -> BoxFuture<'_, Option<ServiceDefinition>, Self::Error> {
        let name = name.to_lowercase();
        Box::pin(async move {
            Ok(self
                .0
                .iter()
                .find(|s| s.name.to_lowercase() == name)
                .cloned())
        })
    }

    fn all(&self) -> BoxFuture<'_, Vec<ServiceDefinition>, Self::Error> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

pub struct FakeLimits(pub Vec<ServiceLimit>);

impl ServiceLimitProvider for FakeLimits {
    type Error = BoxedError;

    fn applicable_limit(
        &self,
        service_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Option<ServiceLimit>, Self::Error> {
        let service_id = service_id.to_string();
        Box::pin(async move {
            Ok(bookify_scheduling::applicable_limit(&self.0, &service_id, date).cloned())
        })
    }
}

/// Fake calendar: a seedable busy list plus every event created through it.
/// Created events show up in subsequent busy reads, like a real calendar.
#[derive(Default)]
pub struct FakeCalendar {
    pub busy: Mutex<Vec<BusyInterval>>,
    pub created: Mutex<Vec<CalendarEventRequest>>,
    pub fail_list_busy: AtomicBool,
    pub fail_create: AtomicBool,
}

impl FakeCalendar {
    pub fn add_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>, key: Option<ServiceKey>) {
        self.busy.lock().unwrap().push(BusyInterval {
            start,
            end,
            service_key: key,
        });
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl CalendarService for FakeCalendar {
    type Error = BoxedError;

    fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, Self::Error> {
        Box::pin(async move {
            if self.fail_list_busy.load(Ordering::SeqCst) {
                return Err(BoxedError::msg("calendar bridge unreachable"));
            }
            let mut intervals = self.busy.lock().unwrap().clone();
            intervals.extend(self.created.lock().unwrap().iter().map(|e| BusyInterval {
                start: e.start,
                end: e.end,
                service_key: Some(ServiceKey::structured(&e.service_id)),
            }));
            Ok(intervals
                .into_iter()
                .filter(|b| b.start < end && b.end > start)
                .collect())
        })
    }

    fn create_event(
        &self,
        event: CalendarEventRequest,
    ) -> BoxFuture<'_, CalendarEventRef, Self::Error> {
        Box::pin(async move {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(BoxedError::msg("calendar write rejected"));
            }
            let mut created = self.created.lock().unwrap();
            created.push(event);
            Ok(CalendarEventRef {
                event_id: format!("evt-{}", created.len()),
                link: None,
            })
        })
    }
}

#[derive(Default)]
pub struct FakeCustomers(pub HashMap<String, CustomerRecord>);

impl CustomerLookup for FakeCustomers {
    type Error = BoxedError;

    fn find(&self, identifier: &str) -> BoxFuture<'_, Option<CustomerRecord>, Self::Error> {
        let identifier = identifier.to_string();
        Box::pin(async move { Ok(self.0.get(&identifier).cloned()) })
    }
}

/// Always-valid address validator; `in_area` controls the service-area flag.
pub struct FakeAddresses {
    pub in_area: bool,
}

impl AddressValidator for FakeAddresses {
    type Error = BoxedError;

    fn check(&self, address: &str) -> BoxFuture<'_, AddressCheck, Self::Error> {
        let address = address.trim().to_string();
        Box::pin(async move {
            Ok(AddressCheck {
                valid: true,
                in_service_area: self.in_area,
                normalized_address: address,
                drive_time_minutes: Some(15),
            })
        })
    }
}

pub struct TestHarness {
    pub store: Arc<ConversationStore>,
    pub calendar: Arc<FakeCalendar>,
    pub repository: Arc<InMemoryAppointmentRepository>,
    pub availability: Arc<AvailabilityService>,
    pub commit: Arc<BookingCommitService>,
    pub orchestrator: Arc<BookingOrchestrator>,
}

/// Wires fakes into the full booking stack, mirroring the backend factory.
pub fn harness(limits: Vec<ServiceLimit>, customers: HashMap<String, CustomerRecord>) -> TestHarness {
    let booking = BookingConfig {
        external_timeout_secs: 2,
        external_retries: 0,
        ..BookingConfig::default()
    };
    let tz = chrono_tz::UTC;

    let settings = Arc::new(FakeSettings(test_settings()));
    let catalog = Arc::new(FakeCatalog(test_services()));
    let limit_provider = Arc::new(FakeLimits(limits));
    let calendar = Arc::new(FakeCalendar::default());
    let repository = Arc::new(InMemoryAppointmentRepository::new(tz));
    let store = Arc::new(ConversationStore::new(booking.conversation_ttl_minutes));

    let availability = Arc::new(AvailabilityService::new(
        settings,
        catalog.clone(),
        limit_provider.clone(),
        Some(calendar.clone()),
        tz,
        &booking,
    ));
    let commit = Arc::new(BookingCommitService::new(
        Some(calendar.clone()),
        repository.clone(),
        limit_provider,
        None,
        tz,
        bookify_common::ExternalCallPolicy::new(booking.external_timeout_secs, 0),
    ));
    let orchestrator = Arc::new(BookingOrchestrator::new(
        store.clone(),
        Arc::new(KeywordIntentExtractor),
        Arc::new(FakeCustomers(customers)),
        Arc::new(FakeAddresses { in_area: true }),
        catalog,
        availability.clone(),
        commit.clone(),
        &booking,
        tz,
    ));

    TestHarness {
        store,
        calendar,
        repository,
        availability,
        commit,
        orchestrator,
    }
}

pub fn active_limit(service_id: &str, daily_limit: u32) -> ServiceLimit {
    ServiceLimit {
        service_id: service_id.to_string(),
        daily_limit,
        effective_from: None,
        effective_to: None,
        is_active: true,
    }
}
