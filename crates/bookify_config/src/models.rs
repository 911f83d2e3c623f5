// --- File: crates/bookify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Business Hours ---
// The scheduling window the slot generator works inside. Times are local
// to `BookingConfig::time_zone`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessHoursConfig {
    pub start_hour: u32,
    #[serde(default)]
    pub start_minute: u32,
    pub end_hour: u32,
    #[serde(default)]
    pub end_minute: u32,
    #[serde(default)]
    pub enable_lunch_break: bool,
    #[serde(default = "default_lunch_hour")]
    pub lunch_hour: u32,
    #[serde(default)]
    pub lunch_minute: u32,
    /// Weekday names, "Mon" through "Sun".
    #[serde(default = "default_days_of_week")]
    pub days_of_week: Vec<String>,
    #[serde(default)]
    pub allow_weekend_bookings: bool,
    #[serde(default)]
    pub half_hour_increments: bool,
    #[serde(default = "default_minimum_notice_hours")]
    pub minimum_notice_hours: i64,
}

fn default_lunch_hour() -> u32 {
    12
}

fn default_days_of_week() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_minimum_notice_hours() -> i64 {
    24
}

// --- Booking behavior ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    /// How many candidate slots the conversation presents as a menu.
    #[serde(default = "default_max_offered_slots")]
    pub max_offered_slots: usize,
    /// Abandoned conversations are evicted after this many minutes.
    #[serde(default = "default_conversation_ttl_minutes")]
    pub conversation_ttl_minutes: i64,
    /// IANA time zone the business operates in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Bounded timeout for every external collaborator call, in seconds.
    #[serde(default = "default_external_timeout_secs")]
    pub external_timeout_secs: u64,
    /// Bounded retries on top of the timeout (0 = single attempt).
    #[serde(default = "default_external_retries")]
    pub external_retries: u32,
}

fn default_lookahead_days() -> u32 {
    14
}

fn default_max_offered_slots() -> usize {
    5
}

fn default_conversation_ttl_minutes() -> i64 {
    120
}

fn default_time_zone() -> String {
    "America/Chicago".to_string()
}

fn default_external_timeout_secs() -> u64 {
    10
}

fn default_external_retries() -> u32 {
    1
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            max_offered_slots: default_max_offered_slots(),
            conversation_ttl_minutes: default_conversation_ttl_minutes(),
            time_zone: default_time_zone(),
            external_timeout_secs: default_external_timeout_secs(),
            external_retries: default_external_retries(),
        }
    }
}

// --- Calendar bridge ---
// Holds non-secret calendar config. API token loaded directly from env var:
// CALENDAR_BRIDGE_TOKEN
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarConfig {
    pub base_url: String,
    pub calendar_id: Option<String>,
}

// --- Address validation bridge ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AddressValidatorConfig {
    pub base_url: String,
    /// Drive time beyond which an address counts as extended service area.
    #[serde(default = "default_max_drive_minutes")]
    pub max_drive_minutes: i64,
}

fn default_max_drive_minutes() -> i64 {
    45
}

// --- Service catalog seed ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    pub duration_hours: f64,
}

// --- Per-service daily limits ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceLimitEntry {
    pub service_id: String,
    pub daily_limit: u32,
    #[serde(default)]
    pub effective_from: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub effective_to: Option<String>, // YYYY-MM-DD
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_calendar: bool,
    #[serde(default)]
    pub use_address_validation: bool,
    #[serde(default)]
    pub use_notifications: bool,

    // --- Core scheduling configuration ---
    pub business_hours: BusinessHoursConfig,
    #[serde(default)]
    pub booking: BookingConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub calendar: Option<CalendarConfig>,
    #[serde(default)]
    pub address_validator: Option<AddressValidatorConfig>,

    // --- Seed data for the catalog and limit providers ---
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
    #[serde(default)]
    pub service_limits: Vec<ServiceLimitEntry>,
}
