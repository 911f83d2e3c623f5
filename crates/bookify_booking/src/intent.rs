// --- File: crates/bookify_booking/src/intent.rs ---
//! Keyword-based intent extraction for inbound messages.
//!
//! Deliberately unsophisticated: lowercased keyword and word-boundary
//! matching, with a fixed priority order so one message maps to exactly
//! one intent. Anything smarter (an NLU model, a date parser) plugs in
//! behind [`IntentExtractor`] without touching the step handlers.

/// What the customer's message is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// "yes", "confirm", "sounds good", "book it"
    Confirmation,
    /// "no", "nope", "nothing else"
    Decline,
    /// "change", "start over", "something different"
    ChangeRequest,
    /// "cancel", "never mind", "stop"
    Cancellation,
    /// Generic interest in booking without naming a service.
    SchedulingIntent,
    /// A known service name appeared; carries the matched name.
    ServiceMention(String),
    /// A 1-based pick from a numbered menu ("first", "option 2", "3").
    OrdinalChoice(usize),
    /// A day/time phrase appeared; carries the verbatim message text.
    TimeMention(String),
    Unrecognized,
}

/// Maps a raw inbound message to an [`Intent`], given the service names
/// currently in the catalog.
pub trait IntentExtractor: Send + Sync {
    fn extract(&self, text: &str, known_services: &[String]) -> Intent;
}

/// The default keyword extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordIntentExtractor;

const CANCELLATION: &[&str] = &["cancel", "never mind", "nevermind", "forget it", "stop"];
const CHANGE: &[&str] = &["change", "start over", "different", "instead", "actually"];
const CONFIRMATION: &[&str] = &[
    "yes",
    "yep",
    "yeah",
    "yup",
    "confirm",
    "correct",
    "sounds good",
    "that works",
    "book it",
    "perfect",
    "sure",
    "ok",
    "okay",
];
const DECLINE: &[&str] = &["no", "nope", "no thanks", "nothing else", "none", "skip"];
const SCHEDULING: &[&str] = &[
    "book",
    "booking",
    "appointment",
    "schedule",
    "availability",
    "available",
    "reserve",
    "opening",
];
const TIME_WORDS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "today",
    "tomorrow",
    "morning",
    "afternoon",
    "evening",
    "noon",
    "am",
    "pm",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "next week",
    "weekend",
];
const ORDINAL_WORDS: &[(&str, usize)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

pub(crate) fn has_word(text: &str, word: &str) -> bool {
    words(text).any(|w| w == word)
}

/// Matches a keyword on word boundaries; multi-word keywords match as
/// substrings since boundaries already separate them.
fn has_keyword(text: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        text.contains(keyword)
    } else {
        has_word(text, keyword)
    }
}

fn any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| has_keyword(text, k))
}

fn ordinal_choice(text: &str) -> Option<usize> {
    for (word, n) in ORDINAL_WORDS {
        if has_word(text, word) {
            return Some(*n);
        }
    }
    // A standalone small number reads as a menu pick: "2", "option 3", "#1".
    let mut numeric = None;
    let mut word_count = 0;
    for w in words(text) {
        word_count += 1;
        if let Ok(n) = w.parse::<usize>() {
            if (1..=9).contains(&n) {
                numeric = Some(n);
            }
        }
    }
    match numeric {
        Some(n) if word_count <= 3 => Some(n),
        Some(n) if text.contains("option") || text.contains('#') => Some(n),
        _ => None,
    }
}

fn service_mention(text: &str, known_services: &[String]) -> Option<String> {
    // Longest name wins so "interior detail" never resolves to "detail".
    known_services
        .iter()
        .filter(|name| text.contains(&name.to_lowercase()))
        .max_by_key(|name| name.len())
        .cloned()
}

fn mentions_time(text: &str) -> bool {
    if any_keyword(text, TIME_WORDS) {
        return true;
    }
    // "9:30", "at 4" style fragments.
    if text.contains(':') && words(text).any(|w| w.chars().all(|c| c.is_ascii_digit())) {
        return true;
    }
    false
}

impl IntentExtractor for KeywordIntentExtractor {
    fn extract(&self, text: &str, known_services: &[String]) -> Intent {
        let lower = text.to_lowercase();
        let lower = lower.trim();
        if lower.is_empty() {
            return Intent::Unrecognized;
        }

        if any_keyword(lower, CANCELLATION) {
            return Intent::Cancellation;
        }
        if any_keyword(lower, CHANGE) {
            return Intent::ChangeRequest;
        }
        if any_keyword(lower, CONFIRMATION) {
            return Intent::Confirmation;
        }
        if any_keyword(lower, DECLINE) {
            return Intent::Decline;
        }
        if let Some(n) = ordinal_choice(lower) {
            return Intent::OrdinalChoice(n);
        }
        if let Some(name) = service_mention(lower, known_services) {
            return Intent::ServiceMention(name);
        }
        if mentions_time(lower) {
            return Intent::TimeMention(text.trim().to_string());
        }
        if any_keyword(lower, SCHEDULING) {
            return Intent::SchedulingIntent;
        }
        Intent::Unrecognized
    }
}

/// Pulls a street-address-looking fragment out of free text: a house
/// number followed by at least two more words, taken to the end of the
/// sentence it appears in.
pub fn address_candidate(text: &str) -> Option<String> {
    for sentence in text.split(['.', '\n', ';']) {
        let sentence = sentence.trim().trim_end_matches(',');
        let tokens: Vec<&str> = sentence.split_whitespace().collect();
        let numbered = tokens.iter().position(|t| {
            !t.is_empty() && t.len() <= 6 && t.chars().all(|c| c.is_ascii_digit())
        });
        if let Some(idx) = numbered {
            if tokens.len() - idx >= 3 {
                return Some(tokens[idx..].join(" "));
            }
        }
    }
    None
}

/// Pulls a self-introduced name out of phrases like "my name is Jane Doe"
/// or "I'm Jane". Takes at most three following words.
pub fn name_candidate(text: &str) -> Option<String> {
    const LEADERS: &[&str] = &["my name is ", "i'm ", "i am ", "this is "];
    let lower = text.to_lowercase();
    for leader in LEADERS {
        if let Some(pos) = lower.find(leader) {
            let rest = &text[pos + leader.len()..];
            let rest = rest.split(['.', ',', '\n', '!']).next().unwrap_or("");
            let name: Vec<&str> = rest
                .split_whitespace()
                .take(3)
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
                .filter(|w| !w.is_empty())
                .collect();
            if !name.is_empty() {
                return Some(name.join(" "));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> Vec<String> {
        vec![
            "Full Detail".to_string(),
            "Interior Detail".to_string(),
            "Express Wash".to_string(),
        ]
    }

    fn extract(text: &str) -> Intent {
        KeywordIntentExtractor.extract(text, &services())
    }

    #[test]
    fn cancellation_outranks_everything() {
        assert_eq!(extract("actually, cancel my booking"), Intent::Cancellation);
        assert_eq!(extract("never mind"), Intent::Cancellation);
    }

    #[test]
    fn confirmation_phrases() {
        assert_eq!(extract("Yes!"), Intent::Confirmation);
        assert_eq!(extract("sounds good"), Intent::Confirmation);
        assert_eq!(extract("book it"), Intent::Confirmation);
    }

    #[test]
    fn yes_inside_yesterday_does_not_confirm() {
        assert_ne!(extract("yesterday"), Intent::Confirmation);
    }

    #[test]
    fn ordinal_choices() {
        assert_eq!(extract("the second one"), Intent::OrdinalChoice(2));
        assert_eq!(extract("3"), Intent::OrdinalChoice(3));
        assert_eq!(extract("option 4 please"), Intent::OrdinalChoice(4));
    }

    #[test]
    fn longest_service_name_wins() {
        assert_eq!(
            extract("can I get an interior detail"),
            Intent::ServiceMention("Interior Detail".to_string())
        );
    }

    #[test]
    fn time_phrases_carry_the_raw_text() {
        assert_eq!(
            extract("Next Tuesday around 2pm would be great"),
            Intent::TimeMention("Next Tuesday around 2pm would be great".to_string())
        );
    }

    #[test]
    fn scheduling_intent_without_specifics() {
        assert_eq!(extract("I'd like to schedule something"), Intent::SchedulingIntent);
        assert_eq!(extract("what's your availability"), Intent::SchedulingIntent);
    }

    #[test]
    fn gibberish_is_unrecognized() {
        assert_eq!(extract("qwerty asdf"), Intent::Unrecognized);
        assert_eq!(extract("   "), Intent::Unrecognized);
    }

    #[test]
    fn address_candidates() {
        assert_eq!(
            address_candidate("I'm at 412 Elm Street, Springfield"),
            Some("412 Elm Street, Springfield".to_string())
        );
        assert_eq!(
            address_candidate("412 Elm Street, Springfield"),
            Some("412 Elm Street, Springfield".to_string())
        );
        assert_eq!(address_candidate("sure thing"), None);
        // A bare menu pick is not an address.
        assert_eq!(address_candidate("2"), None);
    }

    #[test]
    fn name_candidates() {
        assert_eq!(
            name_candidate("Hi, my name is Jane Doe"),
            Some("Jane Doe".to_string())
        );
        assert_eq!(name_candidate("I'm Sam."), Some("Sam".to_string()));
        assert_eq!(
            name_candidate("My name is Jane Doe. I'm at 412 Elm Street"),
            Some("Jane Doe".to_string())
        );
        assert_eq!(name_candidate("hello there"), None);
    }
}
