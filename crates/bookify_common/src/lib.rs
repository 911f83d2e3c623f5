// --- File: crates/bookify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod external; // Bounded external calls
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared domain models
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, internal_error, not_found, validation_error,
    BookifyError, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{create_client, HTTP_CLIENT};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// Re-export bounded-call helpers for easier access
pub use external::{call_bounded, ExternalCallError, ExternalCallPolicy};

// Re-export service abstraction primitives for easier access
pub use services::{BoxFuture, BoxedError, ReserveOutcome};
