// --- File: crates/bookify_booking/src/error.rs ---
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookify_common::{BoxedError, ExternalCallError, HttpStatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the booking flow and its HTTP endpoints.
#[derive(Error, Debug)]
pub enum BookingError {
    /// The daily cap for the service is already met on the requested day.
    #[error("{service_name} is fully booked that day. {suggestion}")]
    ServiceLimitReached {
        service_name: String,
        suggestion: String,
    },

    /// Calendar integration is disabled or unreachable.
    #[error("Calendar unavailable: {0}")]
    CalendarUnavailable(String),

    /// The requested time conflicts with an existing booking.
    #[error("The requested time slot is no longer available")]
    SlotUnavailable,

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The booking could not be finalized; nothing was persisted.
    #[error("Booking could not be completed: {0}")]
    CommitFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Stable machine-readable code carried in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::ServiceLimitReached { .. } => "SERVICE_LIMIT_REACHED",
            BookingError::CalendarUnavailable(_) => "CALENDAR_UNAVAILABLE",
            BookingError::SlotUnavailable => "SLOT_UNAVAILABLE",
            BookingError::UnknownService(_) => "UNKNOWN_SERVICE",
            BookingError::InvalidRequest(_) => "INVALID_REQUEST",
            BookingError::CommitFailed(_) => "COMMIT_FAILED",
            BookingError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn internal(err: impl std::fmt::Display) -> Self {
        BookingError::Internal(err.to_string())
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::ServiceLimitReached { .. } => 400,
            BookingError::CalendarUnavailable(_) => 503,
            BookingError::SlotUnavailable => 409,
            BookingError::UnknownService(_) => 404,
            BookingError::InvalidRequest(_) => 400,
            BookingError::CommitFailed(_) => 500,
            BookingError::Internal(_) => 500,
        }
    }
}

impl From<ExternalCallError<BoxedError>> for BookingError {
    fn from(err: ExternalCallError<BoxedError>) -> Self {
        BookingError::Internal(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    message: String,
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            success: false,
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_and_statuses() {
        let limit = BookingError::ServiceLimitReached {
            service_name: "Full Detail".into(),
            suggestion: "Try the next day.".into(),
        };
        assert_eq!(limit.code(), "SERVICE_LIMIT_REACHED");
        assert_eq!(limit.status_code(), 400);

        let cal = BookingError::CalendarUnavailable("bridge down".into());
        assert_eq!(cal.code(), "CALENDAR_UNAVAILABLE");
        assert_eq!(cal.status_code(), 503);

        assert_eq!(BookingError::SlotUnavailable.status_code(), 409);
    }
}
