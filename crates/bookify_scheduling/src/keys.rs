// --- File: crates/bookify_scheduling/src/keys.rs ---
//! Service-key resolution for calendar events.
//!
//! Calendar adapters call [`resolve_service_key`] at the boundary so that
//! everything downstream sees one normalized [`ServiceKey`], whether the
//! event carried structured metadata or only a legacy free-text label.

use bookify_common::models::{ServiceDefinition, ServiceKey};

/// Parses a legacy `"<ServiceName> - <CustomerName>"` label and matches the
/// service part against the known catalog, case-insensitively.
pub fn resolve_legacy_label(
    label: &str,
    known_services: &[ServiceDefinition],
) -> Option<ServiceKey> {
    let service_part = label.split(" - ").next()?.trim();
    if service_part.is_empty() {
        return None;
    }
    known_services
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(service_part))
        .map(|s| ServiceKey::legacy(&s.name))
}

/// Resolves the service key for a calendar event, preferring structured
/// metadata and falling back to legacy label matching.
pub fn resolve_service_key(
    service_id: Option<&str>,
    label: Option<&str>,
    known_services: &[ServiceDefinition],
) -> Option<ServiceKey> {
    if let Some(id) = service_id {
        let id = id.trim();
        if !id.is_empty() {
            return Some(ServiceKey::structured(id));
        }
    }
    label.and_then(|l| resolve_legacy_label(l, known_services))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ServiceDefinition> {
        vec![
            ServiceDefinition::new("svc-full", "Full Detail", 2.0),
            ServiceDefinition::new("svc-int", "Interior Detail", 1.5),
        ]
    }

    #[test]
    fn structured_metadata_wins() {
        let key = resolve_service_key(Some("svc-full"), Some("Interior Detail - Bob"), &catalog());
        assert_eq!(key, Some(ServiceKey::structured("svc-full")));
    }

    #[test]
    fn legacy_label_parses_service_part() {
        let key = resolve_service_key(None, Some("Full Detail - Jane Doe"), &catalog());
        assert_eq!(key, Some(ServiceKey::legacy("Full Detail")));
    }

    #[test]
    fn legacy_label_is_case_insensitive() {
        let key = resolve_legacy_label("full detail - Jane Doe", &catalog());
        assert_eq!(key, Some(ServiceKey::legacy("Full Detail")));
    }

    #[test]
    fn unknown_label_resolves_to_none() {
        assert_eq!(resolve_legacy_label("Window Tint - Jane", &catalog()), None);
        assert_eq!(resolve_service_key(Some("  "), None, &catalog()), None);
    }
}
