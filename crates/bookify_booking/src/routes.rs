// --- File: crates/bookify_booking/src/routes.rs ---
//! Route definitions for the booking feature.

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers::{book_handler, get_availability_handler, message_handler, BookingState};

/// Creates a router for the booking endpoints. Nested under `/api` by the
/// backend service.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/booking/availability", get(get_availability_handler))
        .route("/booking/book", post(book_handler))
        .route("/booking/message", post(message_handler))
        .with_state(state)
}
