// --- File: crates/bookify_common/src/models.rs ---
//! Domain models shared across the Bookify crates.

use bookify_config::BusinessHoursConfig;
use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Business-hour window and scheduling rules, immutable per lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    pub enable_lunch_break: bool,
    pub lunch_hour: u32,
    pub lunch_minute: u32,
    pub days_of_week: HashSet<Weekday>,
    pub allow_weekend_bookings: bool,
    pub half_hour_increments: bool,
    pub minimum_notice_hours: i64,
}

fn parse_weekday(day: &str) -> Option<Weekday> {
    match day {
        "Mon" => Some(Weekday::Mon),
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        "Sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl From<&BusinessHoursConfig> for BusinessSettings {
    fn from(cfg: &BusinessHoursConfig) -> Self {
        Self {
            start_hour: cfg.start_hour,
            start_minute: cfg.start_minute,
            end_hour: cfg.end_hour,
            end_minute: cfg.end_minute,
            enable_lunch_break: cfg.enable_lunch_break,
            lunch_hour: cfg.lunch_hour,
            lunch_minute: cfg.lunch_minute,
            days_of_week: cfg
                .days_of_week
                .iter()
                .filter_map(|d| parse_weekday(d))
                .collect(),
            allow_weekend_bookings: cfg.allow_weekend_bookings,
            half_hour_increments: cfg.half_hour_increments,
            minimum_notice_hours: cfg.minimum_notice_hours,
        }
    }
}

/// A bookable service with its appointment duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
    #[serde(with = "duration_minutes")]
    pub duration: Duration,
}

impl ServiceDefinition {
    /// Builds a definition from a decimal-hour duration (e.g. 1.5 → 90 min).
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_hours: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration: Duration::minutes((duration_hours * 60.0).round() as i64),
        }
    }
}

mod duration_minutes {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_minutes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let minutes = i64::deserialize(d)?;
        Ok(Duration::minutes(minutes))
    }
}

/// A per-service daily booking cap, optionally bounded by effective dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLimit {
    pub service_id: String,
    pub daily_limit: u32,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
}

impl ServiceLimit {
    /// Whether this limit governs the given day.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if date > to {
                return false;
            }
        }
        true
    }
}

/// Normalized identity of the service occupying a busy interval.
///
/// Both resolution paths (structured metadata and legacy free-text labels)
/// collapse into this one comparable key, so counting logic never branches
/// on provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceKey(String);

impl ServiceKey {
    pub fn structured(service_id: &str) -> Self {
        Self(format!("svc:{}", service_id.trim()))
    }

    pub fn legacy(service_name: &str) -> Self {
        Self(format!("legacy:{}", service_name.trim().to_lowercase()))
    }

    pub fn is_legacy(&self) -> bool {
        self.0.starts_with("legacy:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key counts toward the given service, regardless of how
    /// the interval was tagged.
    pub fn matches(&self, service: &ServiceDefinition) -> bool {
        *self == Self::structured(&service.id) || *self == Self::legacy(&service.name)
    }
}

/// A time range already occupied on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub service_key: Option<ServiceKey>,
}

/// A confirmed booking, created only by the commit service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: String,
    pub service_id: String,
    pub service_name: String,
    pub scheduled_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub address: Option<String>,
    pub add_ons: Vec<String>,
    pub vehicles: Vec<String>,
    pub calendar_event_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A known customer returned by the external lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub previous_services: Vec<String>,
}

/// Outcome of an address validation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressCheck {
    pub valid: bool,
    pub in_service_area: bool,
    pub normalized_address: String,
    pub drive_time_minutes: Option<i64>,
}

/// Request to create the external calendar artifact for a booking.
///
/// New bookings always carry structured service metadata; the summary is
/// display text only and is never parsed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: Option<String>,
    pub service_id: String,
    pub service_name: String,
}

/// Reference to a created calendar artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRef {
    pub event_id: String,
    pub link: Option<String>,
}

/// Details for confirmation and reminder notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDetails {
    pub recipient: String,
    pub customer_name: Option<String>,
    pub service_name: String,
    pub scheduled_time: DateTime<Utc>,
    pub address: Option<String>,
}
