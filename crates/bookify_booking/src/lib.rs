// --- File: crates/bookify_booking/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
pub mod commit;
pub mod conversation;
#[cfg(test)]
mod conversation_test;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod orchestrator;
pub mod repo;
pub mod routes;
pub mod upsell;

pub use availability::AvailabilityService;
pub use commit::{BookingCommitService, CommitRequest};
pub use conversation::{BookingStep, ConversationState, ConversationStore, SelectedTime};
pub use error::BookingError;
pub use handlers::BookingState;
pub use intent::{Intent, IntentExtractor, KeywordIntentExtractor};
pub use orchestrator::BookingOrchestrator;
pub use repo::InMemoryAppointmentRepository;
