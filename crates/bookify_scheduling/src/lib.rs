// --- File: crates/bookify_scheduling/src/lib.rs ---
// Declare modules within this crate
pub mod keys;
pub mod limits;
pub mod slots;
#[cfg(test)]
mod slots_proptest;

pub use keys::{resolve_legacy_label, resolve_service_key};
pub use limits::{applicable_limit, count_service_bookings, overlaps, DayCount};
pub use slots::{generate_slots, SlotQuery, DEFAULT_LOOKAHEAD_DAYS};
