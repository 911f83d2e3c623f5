// --- File: crates/services/bookify_backend/src/app_state.rs ---
//! Shared application state assembled at startup.

use bookify_booking::{
    AvailabilityService, BookingCommitService, BookingOrchestrator, BookingState,
    ConversationStore, KeywordIntentExtractor,
};
use bookify_common::error::BookifyError;
use bookify_common::services::ServiceFactory;
use bookify_common::ExternalCallPolicy;
use bookify_config::AppConfig;
use std::sync::Arc;

use crate::service_factory::BookifyServiceFactory;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<BookifyServiceFactory>,
    pub booking_state: Arc<BookingState>,
}

impl AppState {
    /// Wires the factory's collaborators into the booking stack.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, BookifyError> {
        let factory = Arc::new(BookifyServiceFactory::new(&config)?);
        let tz = factory.time_zone();
        let booking = &config.booking;

        let store = Arc::new(ConversationStore::new(booking.conversation_ttl_minutes));
        let availability = Arc::new(AvailabilityService::new(
            factory.settings_provider(),
            factory.service_catalog(),
            factory.service_limits(),
            factory.calendar_service(),
            tz,
            booking,
        ));
        let commit = Arc::new(BookingCommitService::new(
            factory.calendar_service(),
            factory.appointment_repository(),
            factory.service_limits(),
            factory.notification_service(),
            tz,
            ExternalCallPolicy::new(booking.external_timeout_secs, booking.external_retries),
        ));
        let orchestrator = Arc::new(BookingOrchestrator::new(
            store,
            Arc::new(KeywordIntentExtractor),
            factory.customer_lookup(),
            factory.address_validator(),
            factory.service_catalog(),
            availability.clone(),
            commit.clone(),
            booking,
            tz,
        ));

        let booking_state = Arc::new(BookingState {
            orchestrator,
            availability,
            commit,
            catalog: factory.service_catalog(),
        });

        Ok(Self {
            config,
            service_factory: factory,
            booking_state,
        })
    }
}
