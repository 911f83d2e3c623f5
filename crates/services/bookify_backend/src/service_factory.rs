// --- File: crates/services/bookify_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds every collaborator the booking flow needs from the loaded
//! configuration. Integrations behind `use_*` flags are only constructed
//! when enabled and configured; the rest of the system treats them as
//! absent.

use bookify_booking::InMemoryAppointmentRepository;
use bookify_common::error::{config_error, BookifyError};
use bookify_common::models::{BusinessSettings, ServiceDefinition, ServiceLimit};
use bookify_common::services::{
    AddressValidator, AppointmentRepository, BoxedError, CalendarService, CustomerLookup,
    NotificationService, ServiceCatalog, ServiceFactory, ServiceLimitProvider, SettingsProvider,
};
use bookify_config::AppConfig;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::{
    HttpAddressValidator, HttpCalendarService, InMemoryCustomerDirectory, LogNotificationService,
    PermissiveAddressValidator, StaticServiceCatalog, StaticServiceLimitProvider,
    StaticSettingsProvider,
};

pub struct BookifyServiceFactory {
    tz: Tz,
    settings_provider: Arc<dyn SettingsProvider<Error = BoxedError>>,
    service_catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
    service_limits: Arc<dyn ServiceLimitProvider<Error = BoxedError>>,
    customer_lookup: Arc<dyn CustomerLookup<Error = BoxedError>>,
    address_validator: Arc<dyn AddressValidator<Error = BoxedError>>,
    appointment_repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
    calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

impl BookifyServiceFactory {
    pub fn new(config: &AppConfig) -> Result<Self, BookifyError> {
        let tz: Tz = config
            .booking
            .time_zone
            .parse()
            .map_err(|_| config_error(format!("invalid time zone {:?}", config.booking.time_zone)))?;

        let services: Vec<ServiceDefinition> = config
            .services
            .iter()
            .map(|s| ServiceDefinition::new(&s.id, &s.name, s.duration_hours))
            .collect();
        if services.is_empty() {
            warn!("no services configured; the catalog is empty");
        }

        let limits = parse_limits(config)?;
        let settings = BusinessSettings::from(&config.business_hours);

        let calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>> =
            match (&config.use_calendar, &config.calendar) {
                (true, Some(calendar)) => {
                    info!(base_url = %calendar.base_url, "calendar bridge enabled");
                    let client = bookify_common::create_client(
                        config.booking.external_timeout_secs,
                    )
                    .map_err(|e| config_error(format!("failed to build HTTP client: {e}")))?;
                    Some(Arc::new(HttpCalendarService::new(
                        client,
                        calendar.base_url.clone(),
                        calendar.calendar_id.clone(),
                        services.clone(),
                    )))
                }
                (true, None) => {
                    warn!("use_calendar is set but [calendar] is missing; calendar disabled");
                    None
                }
                _ => None,
            };

        let address_validator: Arc<dyn AddressValidator<Error = BoxedError>> =
            match (&config.use_address_validation, &config.address_validator) {
                (true, Some(validator)) => {
                    info!(base_url = %validator.base_url, "address validation bridge enabled");
                    let client = bookify_common::create_client(
                        config.booking.external_timeout_secs,
                    )
                    .map_err(|e| config_error(format!("failed to build HTTP client: {e}")))?;
                    Arc::new(HttpAddressValidator::new(
                        client,
                        validator.base_url.clone(),
                        validator.max_drive_minutes,
                    ))
                }
                (true, None) => {
                    warn!("use_address_validation is set but [address_validator] is missing");
                    Arc::new(PermissiveAddressValidator)
                }
                _ => Arc::new(PermissiveAddressValidator),
            };

        let notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>> =
            config
                .use_notifications
                .then(|| Arc::new(LogNotificationService) as _);

        Ok(Self {
            tz,
            settings_provider: Arc::new(StaticSettingsProvider(settings)),
            service_catalog: Arc::new(StaticServiceCatalog(services)),
            service_limits: Arc::new(StaticServiceLimitProvider(limits)),
            customer_lookup: Arc::new(InMemoryCustomerDirectory::default()),
            address_validator,
            appointment_repository: Arc::new(InMemoryAppointmentRepository::new(tz)),
            calendar_service,
            notification_service,
        })
    }

    pub fn time_zone(&self) -> Tz {
        self.tz
    }
}

fn parse_limits(config: &AppConfig) -> Result<Vec<ServiceLimit>, BookifyError> {
    config
        .service_limits
        .iter()
        .map(|entry| {
            let parse_date = |value: &Option<String>| -> Result<_, BookifyError> {
                value
                    .as_deref()
                    .map(|d| {
                        d.parse().map_err(|_| {
                            config_error(format!("invalid service limit date {d:?}"))
                        })
                    })
                    .transpose()
            };
            Ok(ServiceLimit {
                service_id: entry.service_id.clone(),
                daily_limit: entry.daily_limit,
                effective_from: parse_date(&entry.effective_from)?,
                effective_to: parse_date(&entry.effective_to)?,
                is_active: entry.is_active,
            })
        })
        .collect()
}

impl ServiceFactory for BookifyServiceFactory {
    fn settings_provider(&self) -> Arc<dyn SettingsProvider<Error = BoxedError>> {
        self.settings_provider.clone()
    }

    fn service_catalog(&self) -> Arc<dyn ServiceCatalog<Error = BoxedError>> {
        self.service_catalog.clone()
    }

    fn service_limits(&self) -> Arc<dyn ServiceLimitProvider<Error = BoxedError>> {
        self.service_limits.clone()
    }

    fn customer_lookup(&self) -> Arc<dyn CustomerLookup<Error = BoxedError>> {
        self.customer_lookup.clone()
    }

    fn address_validator(&self) -> Arc<dyn AddressValidator<Error = BoxedError>> {
        self.address_validator.clone()
    }

    fn appointment_repository(&self) -> Arc<dyn AppointmentRepository<Error = BoxedError>> {
        self.appointment_repository.clone()
    }

    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
        self.calendar_service.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        self.notification_service.clone()
    }
}
