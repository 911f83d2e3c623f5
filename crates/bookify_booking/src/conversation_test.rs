use crate::conversation::{BookingStep, ConversationState, ConversationStore, SelectedTime};
use bookify_common::models::ServiceDefinition;
use chrono::{Duration, Utc};
use std::sync::Arc;

#[test]
fn steps_order_forward() {
    assert!(BookingStep::Idle < BookingStep::CustomerIdentified);
    assert!(BookingStep::CustomerIdentified < BookingStep::AddressValidated);
    assert!(BookingStep::AddressValidated < BookingStep::ServiceSelected);
    assert!(BookingStep::ServiceSelected < BookingStep::TimeSlotSelected);
    assert!(BookingStep::TimeSlotSelected < BookingStep::UpsellsOffered);
    assert!(BookingStep::UpsellsOffered < BookingStep::FinalConfirmation);
    assert!(BookingStep::FinalConfirmation < BookingStep::Complete);
}

#[test]
fn restart_keeps_identity_but_drops_selection() {
    let mut state = ConversationState::new();
    state.customer_name = Some("Jane Doe".into());
    state.address = Some("412 Elm Street".into());
    state.address_validated = true;
    state.service = Some(ServiceDefinition::new("svc-full", "Full Detail", 2.0));
    state.offered_slots = vec![Utc::now()];
    state.selected_time = Some(SelectedTime::Instant(Utc::now()));
    state.chosen_add_ons = vec!["Tire Shine".into()];
    state.manual_mode = true;
    state.advance(BookingStep::FinalConfirmation);

    state.restart_service_selection();

    assert_eq!(state.step, BookingStep::AddressValidated);
    assert_eq!(state.customer_name.as_deref(), Some("Jane Doe"));
    assert_eq!(state.address.as_deref(), Some("412 Elm Street"));
    assert!(state.address_validated);
    assert!(state.service.is_none());
    assert!(state.offered_slots.is_empty());
    assert!(state.selected_time.is_none());
    assert!(state.chosen_add_ons.is_empty());
    assert!(!state.manual_mode);
}

#[test]
fn reset_clears_everything() {
    let mut state = ConversationState::new();
    state.customer_name = Some("Jane".into());
    state.advance(BookingStep::ServiceSelected);
    state.reset();
    assert_eq!(state.step, BookingStep::Idle);
    assert!(state.customer_name.is_none());
}

#[tokio::test]
async fn store_hands_out_the_same_session_per_customer() {
    let store = ConversationStore::new(60);
    let a = store.session("+15551234567");
    let b = store.session("+15551234567");
    assert!(Arc::ptr_eq(&a, &b));

    let other = store.session("+15559999999");
    assert!(!Arc::ptr_eq(&a, &other));
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn expired_sessions_are_evicted_on_access() {
    let store = ConversationStore::with_ttl(Duration::milliseconds(20));
    let first = store.session("+15551234567");
    {
        let mut state = first.lock().await;
        state.customer_name = Some("Jane".into());
    }

    tokio::time::sleep(std::time::Duration::from_millis(40)).await;
    let fresh = store.session("+15551234567");
    assert!(!Arc::ptr_eq(&first, &fresh));
    assert!(fresh.lock().await.customer_name.is_none());

    // A live session under the TTL is kept.
    let long = ConversationStore::new(60);
    let a = long.session("+15550000000");
    let b = long.session("+15550000000");
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn removed_sessions_start_fresh() {
    let store = ConversationStore::new(60);
    let session = store.session("+15551234567");
    {
        let mut state = session.lock().await;
        state.advance(BookingStep::FinalConfirmation);
    }
    store.remove("+15551234567");
    let fresh = store.session("+15551234567");
    assert!(!Arc::ptr_eq(&session, &fresh));
    assert_eq!(fresh.lock().await.step, BookingStep::Idle);
}
