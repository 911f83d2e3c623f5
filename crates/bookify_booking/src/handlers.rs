// --- File: crates/bookify_booking/src/handlers.rs ---
//! Axum handlers for the booking endpoints.

use axum::extract::{Query, State};
use axum::Json;
use bookify_common::services::{BoxedError, ServiceCatalog};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::availability::AvailabilityService;
use crate::commit::{BookingCommitService, CommitRequest};
use crate::error::BookingError;
use crate::orchestrator::BookingOrchestrator;

/// Shared state for the booking routes.
pub struct BookingState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub availability: Arc<AvailabilityService>,
    pub commit: Arc<BookingCommitService>,
    pub catalog: Arc<dyn ServiceCatalog<Error = BoxedError>>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Service name, matched against the catalog.
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub service: String,
    /// Bookable start instants, RFC 3339, UTC, ascending.
    pub slots: Vec<String>,
}

pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BookingError> {
    let slots = state.availability.list_slots_for(&query.service).await?;
    Ok(Json(AvailabilityResponse {
        success: true,
        service: query.service,
        slots: slots.iter().map(|s| s.to_rfc3339()).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Service name, matched against the catalog.
    pub service: String,
    /// RFC 3339 start instant.
    pub time: String,
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub success: bool,
    pub appointment_id: String,
    pub event_ref: Option<String>,
    pub scheduled_time: String,
    pub message: String,
}

/// Direct (non-conversational) booking. Runs the same commit pipeline as
/// the conversation flow, so all limit and overlap guarantees hold.
pub async fn book_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>, BookingError> {
    let scheduled_time = DateTime::parse_from_rfc3339(&request.time)
        .map_err(|e| BookingError::InvalidRequest(format!("time must be RFC 3339: {e}")))?
        .to_utc();

    let service = state
        .catalog
        .resolve(&request.service)
        .await
        .map_err(BookingError::internal)?
        .ok_or_else(|| BookingError::UnknownService(request.service.clone()))?;

    let appointment = state
        .commit
        .commit(CommitRequest {
            customer_id: request.phone,
            customer_name: Some(request.name),
            address: request.address,
            service,
            scheduled_time,
            add_ons: request.add_ons,
            vehicles: request.vehicles,
        })
        .await?;

    info!(appointment_id = %appointment.id, "booking created via direct endpoint");
    Ok(Json(BookResponse {
        success: true,
        appointment_id: appointment.id.to_string(),
        event_ref: appointment.calendar_event_ref.clone(),
        scheduled_time: appointment.scheduled_time.to_rfc3339(),
        message: format!("{} booked", appointment.service_name),
    }))
}

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    /// Channel identifier of the sender (phone number).
    pub from: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
}

/// Conversational entry point: one inbound message, one reply.
pub async fn message_handler(
    State(state): State<Arc<BookingState>>,
    Json(message): Json<InboundMessage>,
) -> Json<MessageResponse> {
    let reply = state
        .orchestrator
        .handle_message(&message.from, &message.body)
        .await;
    Json(MessageResponse { reply })
}
