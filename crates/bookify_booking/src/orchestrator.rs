// --- File: crates/bookify_booking/src/orchestrator.rs ---
//! Conversation-driven booking flow.
//!
//! Each inbound message is routed to a handler for the conversation's
//! current step. Handlers gather one piece of state, advance the step and
//! produce the outbound reply. External collaborators are bounded and
//! degrade to the unknown-customer / manual-confirmation paths rather
//! than failing the conversation.

use bookify_common::services::{AddressValidator, BoxedError, CustomerLookup, ServiceCatalog};
use bookify_common::{call_bounded, ExternalCallPolicy};
use bookify_config::BookingConfig;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use crate::availability::AvailabilityService;
use crate::commit::{BookingCommitService, CommitRequest};
use crate::conversation::{BookingStep, ConversationState, ConversationStore, SelectedTime};
use crate::error::BookingError;
use crate::intent::{address_candidate, has_word, name_candidate, Intent, IntentExtractor};
use crate::upsell;

pub struct BookingOrchestrator {
    store: Arc<ConversationStore>,
    intents: Arc<dyn IntentExtractor>,
    customers: Arc<dyn CustomerLookup<Error = BoxedError>>,
    addresses: Arc<dyn AddressValidator<Error = BoxedError>>,
    catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
    availability: Arc<AvailabilityService>,
    commit: Arc<BookingCommitService>,
    tz: Tz,
    max_offered_slots: usize,
    policy: ExternalCallPolicy,
}

impl BookingOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<ConversationStore>,
        intents: Arc<dyn IntentExtractor>,
        customers: Arc<dyn CustomerLookup<Error = BoxedError>>,
        addresses: Arc<dyn AddressValidator<Error = BoxedError>>,
        catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
        availability: Arc<AvailabilityService>,
        commit: Arc<BookingCommitService>,
        booking: &BookingConfig,
        tz: Tz,
    ) -> Self {
        Self {
            store,
            intents,
            customers,
            addresses,
            catalog,
            availability,
            commit,
            tz,
            max_offered_slots: booking.max_offered_slots,
            policy: ExternalCallPolicy::new(booking.external_timeout_secs, booking.external_retries),
        }
    }

    /// Processes one inbound message and returns the outbound reply.
    ///
    /// Messages from the same customer are serialized on the conversation
    /// lock; different customers proceed independently.
    pub async fn handle_message(&self, customer_id: &str, text: &str) -> String {
        let session = self.store.session(customer_id);
        let mut state = session.lock().await;
        state.touch();

        let service_names = self.known_service_names().await;
        let intent = self.intents.extract(text, &service_names);
        info!(customer_id, step = ?state.step, intent = ?intent, "inbound message");

        // Cancellation applies at any step.
        if intent == Intent::Cancellation && state.step != BookingStep::Idle {
            self.store.remove(customer_id);
            state.reset();
            return "No problem, I've cancelled that request. Message me any time you'd like to book.".to_string();
        }

        match state.step {
            BookingStep::Idle | BookingStep::Complete | BookingStep::Cancelled => {
                self.handle_idle(customer_id, &mut state, &intent, &service_names)
                    .await
            }
            BookingStep::CustomerIdentified => {
                self.handle_address(&mut state, text, &service_names).await
            }
            BookingStep::AddressValidated => {
                self.handle_service_selection(&mut state, &intent, &service_names)
                    .await
            }
            BookingStep::ServiceSelected => self.handle_time_selection(&mut state, &intent),
            BookingStep::TimeSlotSelected | BookingStep::UpsellsOffered => {
                self.handle_upsell_answer(&mut state, text, &intent)
            }
            BookingStep::FinalConfirmation => {
                self.handle_confirmation(customer_id, &mut state, &intent)
                    .await
            }
        }
    }

    async fn known_service_names(&self) -> Vec<String> {
        match call_bounded(self.policy, "service_catalog.all", || self.catalog.all()).await {
            Ok(services) => services.into_iter().map(|s| s.name).collect(),
            Err(e) => {
                warn!(error = %e, "service catalog unavailable; intent extraction degraded");
                Vec::new()
            }
        }
    }

    async fn handle_idle(
        &self,
        customer_id: &str,
        state: &mut ConversationState,
        intent: &Intent,
        service_names: &[String],
    ) -> String {
        // Finished conversations restart from scratch.
        if state.step > BookingStep::Idle {
            state.reset();
        }
        let wants_booking = matches!(
            intent,
            Intent::SchedulingIntent | Intent::ServiceMention(_) | Intent::TimeMention(_)
        );
        if !wants_booking {
            return "Hi! I can help you book a detailing appointment. Just tell me what you'd like to schedule.".to_string();
        }

        let known = match call_bounded(self.policy, "customer_lookup.find", || {
            self.customers.find(customer_id)
        })
        .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(customer_id, error = %e, "customer lookup failed; treating as new customer");
                None
            }
        };

        state.advance(BookingStep::CustomerIdentified);
        match known {
            Some(record) => {
                state.customer_name = record.name.clone();
                state.customer_email = record.email.clone();
                let greeting = record
                    .name
                    .as_deref()
                    .map(|n| format!("Welcome back, {n}!"))
                    .unwrap_or_else(|| "Welcome back!".to_string());
                match record.address {
                    Some(address) => {
                        state.address = Some(address.clone());
                        format!(
                            "{greeting} Should we come to {address} again, or is there a new address?"
                        )
                    }
                    None => format!("{greeting} What's the service address?"),
                }
            }
            None => {
                let menu = service_menu(service_names);
                format!(
                    "I'd be happy to get you booked! Could you tell me your name and the service address?{menu}"
                )
            }
        }
    }

    async fn handle_address(
        &self,
        state: &mut ConversationState,
        text: &str,
        service_names: &[String],
    ) -> String {
        if let Some(name) = name_candidate(text) {
            state.customer_name.get_or_insert(name);
        }

        let candidate = address_candidate(text).or_else(|| {
            // A returning customer confirming their address on file.
            let lower = text.to_lowercase();
            let confirming = ["yes", "yep", "yeah", "same", "sure"]
                .iter()
                .any(|w| has_word(&lower, w));
            state.address.clone().filter(|_| confirming)
        });
        let Some(raw_address) = candidate else {
            return "I still need a street address for the appointment, like \"412 Elm Street, Springfield\".".to_string();
        };

        let check = call_bounded(self.policy, "address_validator.check", || {
            self.addresses.check(&raw_address)
        })
        .await;

        state.advance(BookingStep::AddressValidated);
        let menu = service_menu(service_names);
        match check {
            Ok(check) if check.valid && check.in_service_area => {
                state.address = Some(check.normalized_address.clone());
                state.address_validated = true;
                state.in_service_area = true;
                format!(
                    "Great, {} is in our service area. Which service would you like?{menu}",
                    check.normalized_address
                )
            }
            Ok(check) if check.valid => {
                state.address = Some(check.normalized_address.clone());
                state.address_validated = true;
                state.in_service_area = false;
                format!(
                    "You're a little outside our usual area, so travel time may apply. Which service would you like?{menu}"
                )
            }
            Ok(_) => {
                state.address = Some(raw_address.trim().to_string());
                state.address_validated = false;
                "Hmm, I couldn't verify that address. We'll double-check it with you before the appointment. Which service would you like?"
                    .to_string()
                    + &menu
            }
            Err(e) => {
                warn!(error = %e, "address validation unavailable; continuing unverified");
                state.address = Some(raw_address.trim().to_string());
                state.address_validated = false;
                format!(
                    "Got it. Which service would you like?{menu}"
                )
            }
        }
    }

    async fn handle_service_selection(
        &self,
        state: &mut ConversationState,
        intent: &Intent,
        service_names: &[String],
    ) -> String {
        let Intent::ServiceMention(name) = intent else {
            return format!(
                "Which service would you like?{}",
                service_menu(service_names)
            );
        };

        let service = match call_bounded(self.policy, "service_catalog.resolve", || {
            self.catalog.resolve(name)
        })
        .await
        {
            Ok(Some(service)) => service,
            Ok(None) => {
                return format!(
                    "I don't recognize that service.{}",
                    service_menu(service_names)
                )
            }
            Err(e) => {
                warn!(error = %e, "service resolution failed");
                return "Sorry, I'm having trouble looking that up. Could you try again in a moment?".to_string();
            }
        };

        let slots = self.availability.list_slots(&service).await;
        state.service = Some(service.clone());
        state.advance(BookingStep::ServiceSelected);

        match slots {
            Ok(slots) if !slots.is_empty() => {
                let offered: Vec<DateTime<Utc>> =
                    slots.into_iter().take(self.max_offered_slots).collect();
                let menu = slot_menu(&offered, self.tz);
                state.offered_slots = offered;
                state.manual_mode = false;
                format!(
                    "Here's what we have open for a {}:{menu}\nReply with a number to pick one.",
                    service.name
                )
            }
            Ok(_) => {
                state.manual_mode = true;
                format!(
                    "We're fully booked for a {} in the next couple of weeks, but tell me the day and time you'd like and our team will see what we can do.",
                    service.name
                )
            }
            Err(e) => {
                // Live availability is down. Capture a free-text time and
                // hand the booking to a human instead of losing the lead.
                warn!(error = %e, "availability unavailable; switching to manual confirmation");
                state.manual_mode = true;
                "Our live calendar is acting up, but I can still take your request. What day and time would you like? Our team will confirm it shortly.".to_string()
            }
        }
    }

    fn handle_time_selection(&self, state: &mut ConversationState, intent: &Intent) -> String {
        if state.manual_mode {
            let Intent::TimeMention(phrase) = intent else {
                return "What day and time would work for you? For example, \"Tuesday morning\" or \"Friday at 2pm\".".to_string();
            };
            state.selected_time = Some(SelectedTime::Unstructured(phrase.clone()));
            return self.proceed_to_upsells(state);
        }

        let picked = match intent {
            Intent::OrdinalChoice(n) if (1..=state.offered_slots.len()).contains(n) => {
                state.offered_slots[n - 1]
            }
            _ => {
                let menu = slot_menu(&state.offered_slots, self.tz);
                return format!(
                    "Please pick one of the offered times by number:{menu}"
                );
            }
        };
        state.selected_time = Some(SelectedTime::Instant(picked));
        self.proceed_to_upsells(state)
    }

    fn proceed_to_upsells(&self, state: &mut ConversationState) -> String {
        state.advance(BookingStep::TimeSlotSelected);
        let add_ons = state
            .service
            .as_ref()
            .map(upsell::relevant_add_ons)
            .unwrap_or_default();
        if add_ons.is_empty() {
            state.advance(BookingStep::FinalConfirmation);
            return self.summary(state);
        }
        let menu = add_ons
            .iter()
            .map(|a| format!("\n  - {a}"))
            .collect::<String>();
        state.offered_add_ons = add_ons;
        state.advance(BookingStep::UpsellsOffered);
        format!("Before I lock that in, would you like to add any of these?{menu}\nSay which ones, or \"none\".")
    }

    fn handle_upsell_answer(
        &self,
        state: &mut ConversationState,
        text: &str,
        intent: &Intent,
    ) -> String {
        state.chosen_add_ons = if matches!(intent, Intent::Decline) {
            Vec::new()
        } else {
            upsell::chosen_add_ons(text, &state.offered_add_ons)
        };
        state.advance(BookingStep::FinalConfirmation);
        self.summary(state)
    }

    async fn handle_confirmation(
        &self,
        customer_id: &str,
        state: &mut ConversationState,
        intent: &Intent,
    ) -> String {
        match intent {
            Intent::Confirmation => {}
            Intent::ChangeRequest => {
                state.restart_service_selection();
                return "No problem, let's adjust. Which service would you like?".to_string();
            }
            Intent::Decline => {
                self.store.remove(customer_id);
                state.reset();
                return "Okay, I've dropped that request. Message me any time!".to_string();
            }
            _ => {
                return "Just reply \"yes\" to confirm the booking, or \"change\" if you'd like something different.".to_string();
            }
        }

        let (service, selected) = match (state.service.clone(), state.selected_time.clone()) {
            (Some(service), Some(selected)) => (service, selected),
            _ => {
                state.restart_service_selection();
                return "Something got lost on my end. Which service would you like?".to_string();
            }
        };

        match selected {
            SelectedTime::Unstructured(phrase) => {
                // Manual path: no live calendar, a human finalizes it.
                info!(customer_id, requested = %phrase, service = %service.name, "manual booking request captured");
                self.store.remove(customer_id);
                state.reset();
                format!(
                    "Thanks! I've sent your request for a {} around \"{phrase}\" to our team. You'll get a confirmation within a few hours.",
                    service.name
                )
            }
            SelectedTime::Instant(start) => {
                let request = CommitRequest {
                    customer_id: customer_id.to_string(),
                    customer_name: state.customer_name.clone(),
                    address: state.address.clone(),
                    service: service.clone(),
                    scheduled_time: start,
                    add_ons: state.chosen_add_ons.clone(),
                    vehicles: state.vehicles.clone(),
                };
                match self.commit.commit(request).await {
                    Ok(appointment) => {
                        self.store.remove(customer_id);
                        state.reset();
                        format!(
                            "You're all set! {} on {}. See you then!",
                            appointment.service_name,
                            format_local(appointment.scheduled_time, self.tz)
                        )
                    }
                    Err(BookingError::SlotUnavailable) => {
                        // Someone else grabbed it between offer and commit.
                        state.restart_service_selection();
                        "Ah, that time was just taken. Let's find you another one. Which service would you like?".to_string()
                    }
                    Err(e @ BookingError::ServiceLimitReached { .. }) => {
                        state.restart_service_selection();
                        format!("{e} Say the service name again and I'll pull up fresh times.")
                    }
                    Err(e) => {
                        warn!(customer_id, error = %e, "commit failed; conversation kept for retry");
                        "I couldn't finalize the booking just now. Reply \"yes\" to try again, or \"cancel\" to stop.".to_string()
                    }
                }
            }
        }
    }

    fn summary(&self, state: &ConversationState) -> String {
        let service = state
            .service
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "appointment".to_string());
        let when = match &state.selected_time {
            Some(SelectedTime::Instant(t)) => format_local(*t, self.tz),
            Some(SelectedTime::Unstructured(phrase)) => {
                format!("\"{phrase}\" (to be confirmed by our team)")
            }
            None => "time to be confirmed".to_string(),
        };
        let mut lines = vec![format!("Here's your booking:\n  Service: {service}\n  When: {when}")];
        if let Some(address) = &state.address {
            let note = if state.address_validated { "" } else { " (unverified)" };
            lines.push(format!("  Address: {address}{note}"));
        }
        if !state.chosen_add_ons.is_empty() {
            lines.push(format!("  Add-ons: {}", state.chosen_add_ons.join(", ")));
        }
        lines.push("Reply \"yes\" to confirm or \"change\" to adjust.".to_string());
        lines.join("\n")
    }
}

fn format_local(t: DateTime<Utc>, tz: Tz) -> String {
    t.with_timezone(&tz).format("%A, %B %-d at %-I:%M %p").to_string()
}

fn slot_menu(slots: &[DateTime<Utc>], tz: Tz) -> String {
    slots
        .iter()
        .enumerate()
        .map(|(i, s)| format!("\n  {}. {}", i + 1, format_local(*s, tz)))
        .collect()
}

fn service_menu(service_names: &[String]) -> String {
    if service_names.is_empty() {
        return String::new();
    }
    let list = service_names
        .iter()
        .map(|n| format!("\n  - {n}"))
        .collect::<String>();
    format!("\nWe offer:{list}")
}
