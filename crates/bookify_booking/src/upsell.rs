// --- File: crates/bookify_booking/src/upsell.rs ---
//! Add-on suggestions offered after a time slot is chosen.
//!
//! A static rule table keyed on the service name. Add-ons change the
//! ticket, not the schedule: they never alter the slot duration.

use bookify_common::models::ServiceDefinition;

const DETAIL_ADD_ONS: &[&str] = &[
    "Engine Bay Cleaning",
    "Headlight Restoration",
    "Pet Hair Removal",
];
const WASH_ADD_ONS: &[&str] = &["Tire Shine", "Interior Vacuum"];
const COATING_ADD_ONS: &[&str] = &["Paint Correction", "Wheel Coating"];

/// Add-ons worth offering alongside the given service. Empty means the
/// upsell step is skipped entirely.
pub fn relevant_add_ons(service: &ServiceDefinition) -> Vec<String> {
    let name = service.name.to_lowercase();
    let table: &[&str] = if name.contains("detail") {
        DETAIL_ADD_ONS
    } else if name.contains("wash") {
        WASH_ADD_ONS
    } else if name.contains("ceramic") || name.contains("coating") {
        COATING_ADD_ONS
    } else {
        &[]
    };
    table.iter().map(|s| s.to_string()).collect()
}

/// Which of the offered add-ons the customer's reply accepts. "all" takes
/// everything; a decline or unrelated reply takes nothing.
pub fn chosen_add_ons(reply: &str, offered: &[String]) -> Vec<String> {
    let lower = reply.to_lowercase();
    if lower.contains("all") || lower.contains("everything") {
        return offered.to_vec();
    }
    offered
        .iter()
        .filter(|name| lower.contains(&name.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_services_get_detail_add_ons() {
        let service = ServiceDefinition::new("svc-full", "Full Detail", 2.0);
        let add_ons = relevant_add_ons(&service);
        assert!(add_ons.contains(&"Engine Bay Cleaning".to_string()));
    }

    #[test]
    fn unknown_services_get_none() {
        let service = ServiceDefinition::new("svc-x", "Consultation", 0.5);
        assert!(relevant_add_ons(&service).is_empty());
    }

    #[test]
    fn reply_parsing() {
        let offered = vec![
            "Engine Bay Cleaning".to_string(),
            "Pet Hair Removal".to_string(),
        ];
        assert_eq!(
            chosen_add_ons("add the pet hair removal please", &offered),
            vec!["Pet Hair Removal".to_string()]
        );
        assert_eq!(chosen_add_ons("all of them", &offered), offered);
        assert!(chosen_add_ons("no thanks", &offered).is_empty());
    }
}
