// --- File: crates/services/bookify_backend/src/adapters.rs ---
//! Concrete implementations of the service traits.
//!
//! HTTP adapters talk to the calendar bridge and the address validation
//! bridge; the static providers are seeded from configuration at startup.

use bookify_common::models::{
    AddressCheck, BusinessSettings, BusyInterval, CalendarEventRef, CalendarEventRequest,
    CustomerRecord, NotificationDetails, ServiceDefinition, ServiceLimit,
};
use bookify_common::services::{
    AddressValidator, BoxFuture, BoxedError, CalendarService, CustomerLookup, NotificationService,
    ServiceCatalog, ServiceLimitProvider, SettingsProvider,
};
use bookify_scheduling::resolve_service_key;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

fn boxed(err: impl std::error::Error + Send + Sync + 'static) -> BoxedError {
    BoxedError(Box::new(err))
}

// --- Calendar bridge ---

/// Calendar access over the external calendar bridge's REST API.
///
/// Busy intervals are normalized here: events carrying structured service
/// metadata resolve directly, older events resolve through their
/// "<Service> - <Customer>" summary labels.
pub struct HttpCalendarService {
    client: reqwest::Client,
    base_url: String,
    calendar_id: Option<String>,
    bearer_token: Option<String>,
    services: Vec<ServiceDefinition>,
}

impl HttpCalendarService {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        calendar_id: Option<String>,
        services: Vec<ServiceDefinition>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id,
            bearer_token: std::env::var("CALENDAR_BRIDGE_TOKEN").ok(),
            services,
        }
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeEvent {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    service_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeEventRef {
    event_id: String,
    #[serde(default)]
    link: Option<String>,
}

impl CalendarService for HttpCalendarService {
    type Error = BoxedError;

    fn list_busy(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, Self::Error> {
        Box::pin(async move {
            let mut req = self
                .client
                .get(format!("{}/busy", self.base_url))
                .query(&[("start", start.to_rfc3339()), ("end", end.to_rfc3339())]);
            if let Some(id) = &self.calendar_id {
                req = req.query(&[("calendar_id", id)]);
            }
            let events: Vec<BridgeEvent> = self
                .request(req)
                .send()
                .await
                .map_err(boxed)?
                .error_for_status()
                .map_err(boxed)?
                .json()
                .await
                .map_err(boxed)?;

            Ok(events
                .into_iter()
                .map(|e| BusyInterval {
                    start: e.start,
                    end: e.end,
                    service_key: resolve_service_key(
                        e.service_id.as_deref(),
                        e.summary.as_deref(),
                        &self.services,
                    ),
                })
                .collect())
        })
    }

    fn create_event(
        &self,
        event: CalendarEventRequest,
    ) -> BoxFuture<'_, CalendarEventRef, Self::Error> {
        Box::pin(async move {
            let mut req = self
                .client
                .post(format!("{}/events", self.base_url))
                .json(&event);
            if let Some(id) = &self.calendar_id {
                req = req.query(&[("calendar_id", id)]);
            }
            let created: BridgeEventRef = self
                .request(req)
                .send()
                .await
                .map_err(boxed)?
                .error_for_status()
                .map_err(boxed)?
                .json()
                .await
                .map_err(boxed)?;
            Ok(CalendarEventRef {
                event_id: created.event_id,
                link: created.link,
            })
        })
    }
}

// --- Address validation bridge ---

pub struct HttpAddressValidator {
    client: reqwest::Client,
    base_url: String,
    max_drive_minutes: i64,
}

impl HttpAddressValidator {
    pub fn new(client: reqwest::Client, base_url: String, max_drive_minutes: i64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_drive_minutes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeAddressCheck {
    valid: bool,
    #[serde(default)]
    normalized_address: Option<String>,
    #[serde(default)]
    drive_time_minutes: Option<i64>,
}

impl AddressValidator for HttpAddressValidator {
    type Error = BoxedError;

    fn check(&self, address: &str) -> BoxFuture<'_, AddressCheck, Self::Error> {
        let address = address.to_string();
        Box::pin(async move {
            let check: BridgeAddressCheck = self
                .client
                .get(format!("{}/validate", self.base_url))
                .query(&[("address", &address)])
                .send()
                .await
                .map_err(boxed)?
                .error_for_status()
                .map_err(boxed)?
                .json()
                .await
                .map_err(boxed)?;

            let in_service_area = check.valid
                && check
                    .drive_time_minutes
                    .map(|m| m <= self.max_drive_minutes)
                    .unwrap_or(true);
            Ok(AddressCheck {
                valid: check.valid,
                in_service_area,
                normalized_address: check.normalized_address.unwrap_or(address),
                drive_time_minutes: check.drive_time_minutes,
            })
        })
    }
}

/// Used when address validation is disabled: accepts everything as-is.
pub struct PermissiveAddressValidator;

impl AddressValidator for PermissiveAddressValidator {
    type Error = BoxedError;

    fn check(&self, address: &str) -> BoxFuture<'_, AddressCheck, Self::Error> {
        let address = address.trim().to_string();
        Box::pin(async move {
            Ok(AddressCheck {
                valid: true,
                in_service_area: true,
                normalized_address: address,
                drive_time_minutes: None,
            })
        })
    }
}

// --- Config-seeded providers ---

pub struct StaticSettingsProvider(pub BusinessSettings);

impl SettingsProvider for StaticSettingsProvider {
    type Error = BoxedError;

    fn business_settings(&self) -> BoxFuture<'_, BusinessSettings, Self::Error> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

pub struct StaticServiceCatalog(pub Vec<ServiceDefinition>);

impl ServiceCatalog for StaticServiceCatalog {
    type Error = BoxedError;

    fn resolve(&self, name: &str) -> BoxFuture<'_, Option<ServiceDefinition>, Self::Error> {
        let needle = name.trim().to_lowercase();
        Box::pin(async move {
            Ok(self
                .0
                .iter()
                .find(|s| s.name.to_lowercase() == needle || s.id == needle)
                .cloned())
        })
    }

    fn all(&self) -> BoxFuture<'_, Vec<ServiceDefinition>, Self::Error> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

pub struct StaticServiceLimitProvider(pub Vec<ServiceLimit>);

impl ServiceLimitProvider for StaticServiceLimitProvider {
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

/// Customer directory backed by an in-process map. Stands in for the CRM
/// until its lookup endpoint is wired up; unknown numbers are simply new
/// customers.
#[derive(Default)]
pub struct InMemoryCustomerDirectory(pub HashMap<String, CustomerRecord>);

impl CustomerLookup for InMemoryCustomerDirectory {
    type Error = BoxedError;

    fn find(&self, identifier: &str) -> BoxFuture<'_, Option<CustomerRecord>, Self::Error> {
        let identifier = identifier.to_string();
        Box::pin(async move { Ok(self.0.get(&identifier).cloned()) })
    }
}

/// Logs notifications instead of delivering them. Swapped for a real SMS
/// sender by pointing the factory at a different implementation.
pub struct LogNotificationService;

impl NotificationService for LogNotificationService {
    type Error = BoxedError;

    fn send_confirmation(&self, details: NotificationDetails) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            info!(
                recipient = %details.recipient,
                service = %details.service_name,
                scheduled_time = %details.scheduled_time,
                "confirmation notification"
            );
            Ok(())
        })
    }

    fn schedule_reminder(&self, details: NotificationDetails) -> BoxFuture<'_, (), Self::Error> {
        Box::pin(async move {
            info!(
                recipient = %details.recipient,
                service = %details.service_name,
                scheduled_time = %details.scheduled_time,
                "reminder scheduled"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_catalog_resolves_case_insensitively() {
        let catalog = StaticServiceCatalog(vec![ServiceDefinition::new(
            "svc-full",
            "Full Detail",
            2.0,
        )]);
        assert!(catalog.resolve("full detail").await.unwrap().is_some());
        assert!(catalog.resolve("svc-full").await.unwrap().is_some());
        assert!(catalog.resolve("mystery").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn permissive_validator_accepts_everything() {
        let check = PermissiveAddressValidator
            .check("  412 Elm Street  ")
            .await
            .unwrap();
        assert!(check.valid && check.in_service_area);
        assert_eq!(check.normalized_address, "412 Elm Street");
    }
}
