use chrono::Timelike;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{ResponseCatalog, ResponseTemplate};
use crate::models::{ComposedResponse, ResponseStrategy, TimeOfDay};

const FALLBACK_APOLOGY: &str = "Sorry machan, mata podi problem ekak! Try again? 😅";

const INTRO_PATTERNS: &[&str] = &[
    "my name is ",
    "i am ",
    "im ",
    "mage nama ",
    "mama ",
    "mamai ",
    "mamayi ",
];

const RETURNING_PHRASES: &[&str] = &[
    "Welcome back!",
    "Good to see you again!",
    "How have you been?",
];

const MORNING_PHRASES: &[&str] = &["Good morning!", "Early bird today!", "Rise and shine!"];
const AFTERNOON_PHRASES: &[&str] = &["Good afternoon!", "Hope you had lunch!", "Midday chat!"];
const EVENING_PHRASES: &[&str] = &["Good evening!", "End of day chat!", "How was your day?"];
const NIGHT_PHRASES: &[&str] = &["Good night!", "Late night chat ah?", "Cannot sleep ah?"];

const UNCERTAINTY_MARKERS: &[&str] = &["I think", "Maybe", "Not sure but", "Probably"];

#[derive(Debug, Error)]
enum CompositionError {
    #[error("intent `{0}` resolved to no usable templates")]
    NoTemplate(String),
}

/// Template-driven response composer. All randomness flows through one
/// injected PRNG so a seeded composer is fully reproducible.
pub struct ResponseComposer {
    catalog: &'static ResponseCatalog,
    rng: Mutex<StdRng>,
}

impl ResponseComposer {
    pub fn seeded(seed: u64) -> Self {
        Self {
            catalog: ResponseCatalog::builtin(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            catalog: ResponseCatalog::builtin(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn generate(
        &self,
        message: &str,
        intent: &str,
        confidence: f32,
        user_id: Option<&str>,
    ) -> ComposedResponse {
        let hour = chrono::Local::now().hour();
        self.generate_at(message, intent, confidence, user_id, hour)
    }

    /// Same as [`generate`](Self::generate) with the wall-clock hour supplied
    /// by the caller.
    pub fn generate_at(
        &self,
        message: &str,
        intent: &str,
        confidence: f32,
        user_id: Option<&str>,
        hour: u32,
    ) -> ComposedResponse {
        match self.try_generate(message, intent, confidence, user_id, hour) {
            Ok(composed) => composed,
            Err(error) => {
                warn!(%error, intent, "response composition degraded to the fallback apology");
                ComposedResponse {
                    response: FALLBACK_APOLOGY.to_string(),
                    strategy: ResponseStrategy::Fallback,
                    confidence: 0.5,
                    personalized: false,
                }
            }
        }
    }

    fn try_generate(
        &self,
        message: &str,
        intent: &str,
        confidence: f32,
        user_id: Option<&str>,
        hour: u32,
    ) -> Result<ComposedResponse, CompositionError> {
        let templates = self.catalog.templates_for(intent);
        let name = extract_name(message);

        // Slot narrowing: an extracted name selects among `{name}` templates,
        // otherwise only slot-free ones are eligible.
        let pool: Vec<&ResponseTemplate> = match &name {
            Some(_) => {
                let slotted: Vec<&ResponseTemplate> =
                    templates.iter().filter(|t| t.has_name_slot()).collect();
                if slotted.is_empty() {
                    templates.iter().filter(|t| !t.has_name_slot()).collect()
                } else {
                    slotted
                }
            }
            None => templates.iter().filter(|t| !t.has_name_slot()).collect(),
        };

        let mut rng = self.rng.lock();
        let template = pool
            .choose(&mut *rng)
            .ok_or_else(|| CompositionError::NoTemplate(intent.to_string()))?;

        let mut response = match &name {
            Some(name) if template.has_name_slot() => template.text().replace("{name}", name),
            _ => template.text().to_string(),
        };

        if user_id.is_some() && rng.gen_bool(0.3) {
            if let Some(phrase) = RETURNING_PHRASES.choose(&mut *rng) {
                response.push(' ');
                response.push_str(phrase);
            }
        }

        if rng.gen_bool(0.2) {
            let phrases = match TimeOfDay::from_hour(hour) {
                TimeOfDay::Morning => MORNING_PHRASES,
                TimeOfDay::Afternoon => AFTERNOON_PHRASES,
                TimeOfDay::Evening => EVENING_PHRASES,
                TimeOfDay::Night => NIGHT_PHRASES,
            };
            if let Some(phrase) = phrases.choose(&mut *rng) {
                response = format!("{phrase} {response}");
            }
        }

        if confidence < 0.7 {
            if rng.gen_bool(0.3) {
                if let Some(marker) = UNCERTAINTY_MARKERS.choose(&mut *rng) {
                    response = format!("{marker} {}", response.to_lowercase());
                }
            }
        } else if confidence > 0.9 && rng.gen_bool(0.2) {
            response.push_str(" 🎉");
        }

        Ok(ComposedResponse {
            response,
            strategy: ResponseStrategy::TemplateBased,
            confidence,
            personalized: user_id.is_some(),
        })
    }
}

/// Pulls the first word after a known introduction pattern, trimming edge
/// punctuation and capitalizing the first letter. Pattern order wins over
/// match position.
fn extract_name(message: &str) -> Option<String> {
    let lower = message.to_lowercase();

    for pattern in INTRO_PATTERNS {
        if let Some(idx) = lower.find(pattern) {
            let remaining = lower[idx + pattern.len()..].trim();
            if let Some(word) = remaining.split_whitespace().next() {
                let cleaned = word.trim_matches(['.', ',', '!', '?']);
                if !cleaned.is_empty() {
                    return Some(capitalize(cleaned));
                }
            }
        }
    }

    None
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_after_intro_pattern() {
        assert_eq!(extract_name("my name is Kasun"), Some("Kasun".to_string()));
        assert_eq!(extract_name("mage nama nimal!"), Some("Nimal".to_string()));
        assert_eq!(extract_name("im dinesh, hello"), Some("Dinesh".to_string()));
        assert_eq!(extract_name("kohomada machan"), None);
        assert_eq!(extract_name("my name is "), None);
    }

    #[test]
    fn pattern_order_beats_match_position() {
        // "my name is" is checked before "i am" even when it appears later
        assert_eq!(
            extract_name("i am told my name is Ruwan"),
            Some("Ruwan".to_string())
        );
    }

    #[test]
    fn same_seed_same_output() {
        let first = ResponseComposer::seeded(7);
        let second = ResponseComposer::seeded(7);

        for _ in 0..10 {
            let a = first.generate_at("kohomada machan", "greeting", 0.95, Some("u1"), 9);
            let b = second.generate_at("kohomada machan", "greeting", 0.95, Some("u1"), 9);
            assert_eq!(a.response, b.response);
        }
    }

    #[test]
    fn extracted_name_lands_in_the_response() {
        let composer = ResponseComposer::seeded(42);
        for _ in 0..20 {
            let composed = composer.generate_at("my name is Kasun", "self_intro", 0.8, None, 9);
            assert!(composed.response.contains("Kasun"), "{}", composed.response);
            assert!(!composed.response.contains("{name}"));
        }
    }

    #[test]
    fn no_name_means_no_leftover_slot() {
        let composer = ResponseComposer::seeded(11);
        for _ in 0..20 {
            let composed = composer.generate_at("hello", "self_intro", 0.8, None, 14);
            assert!(!composed.response.contains("{name}"), "{}", composed.response);
        }
    }

    #[test]
    fn unrecognized_intent_uses_unknown_templates() {
        let composer = ResponseComposer::seeded(3);
        let composed = composer.generate_at("gibberish", "stock_tips", 0.8, None, 9);
        assert_eq!(composed.strategy, ResponseStrategy::TemplateBased);
        assert!(!composed.response.is_empty());
    }

    #[test]
    fn personalized_tracks_user_presence_not_the_draw() {
        let composer = ResponseComposer::seeded(5);
        let with_user = composer.generate_at("hello", "greeting", 0.8, Some("u1"), 9);
        assert!(with_user.personalized);

        let without_user = composer.generate_at("hello", "greeting", 0.8, None, 9);
        assert!(!without_user.personalized);
    }

    #[test]
    fn mid_confidence_keeps_the_template_body_intact() {
        let templates = ["Bye bye machan", "Okay la, see you later", "Sige, giya giya"];
        let composer = ResponseComposer::seeded(21);

        // 0.7 <= confidence <= 0.9 applies neither tone modifier, so the
        // template body survives verbatim (a time prefix may still appear).
        for _ in 0..20 {
            let composed = composer.generate_at("hello", "goodbye", 0.8, None, 9);
            assert!(
                templates.iter().any(|body| composed.response.contains(body)),
                "{}",
                composed.response
            );
            assert_eq!(composed.confidence, 0.8);
        }
    }
}
