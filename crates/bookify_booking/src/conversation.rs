// --- File: crates/bookify_booking/src/conversation.rs ---
//! Per-customer conversation state and its store.
//!
//! One conversation exists per channel identifier (phone number). The store
//! hands out an `Arc<tokio::sync::Mutex<_>>` per customer, so two messages
//! from the same number are processed one at a time while different
//! customers proceed in parallel. Abandoned conversations are evicted
//! lazily on access once their TTL has passed.

use bookify_common::models::ServiceDefinition;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use tracing::debug;

/// Ordered progression of the booking conversation. Transitions only move
/// forward; corrections reset to an earlier step explicitly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BookingStep {
    #[default]
    Idle,
    CustomerIdentified,
    AddressValidated,
    ServiceSelected,
    TimeSlotSelected,
    UpsellsOffered,
    FinalConfirmation,
    Complete,
    Cancelled,
}

/// The time the customer settled on.
///
/// `Instant` comes from picking an offered slot; `Unstructured` is the
/// verbatim phrase captured in manual-confirmation mode and is never
/// parsed into a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectedTime {
    Instant(DateTime<Utc>),
    Unstructured(String),
}

/// Everything gathered so far in one customer's booking conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub step: BookingStep,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub address: Option<String>,
    pub address_validated: bool,
    pub in_service_area: bool,
    pub service: Option<ServiceDefinition>,
    /// Slots offered as a numbered menu, in the order presented.
    pub offered_slots: Vec<DateTime<Utc>>,
    /// Set when live slot generation was unavailable and the conversation
    /// fell back to capturing a free-text time for manual confirmation.
    pub manual_mode: bool,
    pub selected_time: Option<SelectedTime>,
    pub offered_add_ons: Vec<String>,
    pub chosen_add_ons: Vec<String>,
    pub vehicles: Vec<String>,
    pub last_activity: DateTime<Utc>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            step: BookingStep::Idle,
            customer_name: None,
            customer_email: None,
            address: None,
            address_validated: false,
            in_service_area: false,
            service: None,
            offered_slots: Vec::new(),
            manual_mode: false,
            selected_time: None,
            offered_add_ons: Vec::new(),
            chosen_add_ons: Vec::new(),
            vehicles: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    /// Moves to a later step. Going backwards is a logic error; corrections
    /// use [`restart_service_selection`](Self::restart_service_selection)
    /// or [`reset`](Self::reset).
    pub fn advance(&mut self, step: BookingStep) {
        debug_assert!(step >= self.step, "conversation steps only move forward");
        self.step = step;
    }

    /// Clears everything back to a fresh conversation.
    pub fn reset(&mut self) {
        *self = ConversationState::new();
    }

    /// Keeps the customer's identity and validated address but discards the
    /// selected service, slots and add-ons. Used for "change" requests.
    pub fn restart_service_selection(&mut self) {
        self.step = BookingStep::AddressValidated;
        self.service = None;
        self.offered_slots.clear();
        self.manual_mode = false;
        self.selected_time = None;
        self.offered_add_ons.clear();
        self.chosen_add_ons.clear();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry {
    state: Arc<Mutex<ConversationState>>,
    last_seen: DateTime<Utc>,
}

/// In-memory conversation store keyed by channel identifier.
pub struct ConversationStore {
    ttl: Duration,
    inner: StdMutex<HashMap<String, Entry>>,
}

impl ConversationStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self::with_ttl(Duration::minutes(ttl_minutes.max(1)))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: StdMutex::new(HashMap::new()),
        }
    }

    /// Returns the live conversation for the customer, creating one if none
    /// exists or the previous one has expired.
    pub fn session(&self, customer_id: &str) -> Arc<Mutex<ConversationState>> {
        let now = Utc::now();
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());

        let before = inner.len();
        inner.retain(|_, entry| now - entry.last_seen < self.ttl);
        let evicted = before - inner.len();
        if evicted > 0 {
            debug!(evicted, "expired conversations evicted");
        }

        let entry = inner
            .entry(customer_id.to_string())
            .or_insert_with(|| Entry {
                state: Arc::new(Mutex::new(ConversationState::new())),
                last_seen: now,
            });
        entry.last_seen = now;
        Arc::clone(&entry.state)
    }

    /// Drops a conversation outright (completion or cancellation).
    pub fn remove(&self, customer_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.remove(customer_id);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
