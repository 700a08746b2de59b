use std::collections::BTreeSet;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::lexicon::Lexicon;
use crate::models::{FeatureSet, MixedLanguage, NormalizedMessage};

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("failed compiling cleanup pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Canonicalizes code-mixed Singlish input through a fixed six-stage pipeline
/// and extracts surface features from the raw text. Deterministic throughout.
#[derive(Debug)]
pub struct Normalizer {
    lexicon: &'static Lexicon,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::shared(),
        }
    }

    pub fn normalize(&self, text: &str) -> NormalizedMessage {
        let features = self.extract_features(text);
        let canonical = match self.canonicalize(text) {
            Ok(canonical) => canonical,
            Err(error) => {
                warn!(%error, "normalization degraded to minimal cleanup");
                text.to_lowercase().trim().to_string()
            }
        };

        NormalizedMessage {
            canonical,
            features,
        }
    }

    fn canonicalize(&self, text: &str) -> Result<String, NormalizationError> {
        let whitespace_runs = Regex::new(r"\s+")?;
        let punctuation = Regex::new(r"[^\w\s?!]")?;
        let punctuation_runs = Regex::new(r"[?!]{2,}")?;

        let mut text = text.to_lowercase().trim().to_string();
        text = whitespace_runs.replace_all(&text, " ").into_owned();
        text = self.expand_contractions(&text);
        text = self.rewrite_singlish_terms(&text);
        text = self.gloss_sinhala_terms(&text);
        text = punctuation.replace_all(&text, "").into_owned();
        text = punctuation_runs.replace_all(&text, "?").into_owned();

        Ok(text.trim().to_string())
    }

    // Ordered substring replacement over the whole text. The order matters and
    // the pass is intentionally not idempotent.
    fn expand_contractions(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (contraction, expansion) in self.lexicon.contractions() {
            text = text.replace(contraction, expansion);
        }
        text
    }

    fn rewrite_singlish_terms(&self, text: &str) -> String {
        let mut rewritten = Vec::new();
        for token in text.split_whitespace() {
            if self.lexicon.is_particle(token) {
                continue;
            }
            match self.lexicon.singlish_mapping(token) {
                Some(mapped) => {
                    if !mapped.is_empty() {
                        rewritten.push(mapped);
                    }
                }
                None => rewritten.push(token),
            }
        }
        rewritten.join(" ")
    }

    fn gloss_sinhala_terms(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.lexicon.sinhala_gloss(token).unwrap_or(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn extract_features(&self, text: &str) -> FeatureSet {
        let lower = text.to_lowercase();

        let has_singlish_particles = self
            .lexicon
            .feature_particles()
            .iter()
            .any(|particle| lower.contains(particle));
        let has_sinhala_terms = self
            .lexicon
            .sinhala_surface_forms()
            .any(|term| lower.contains(term));
        let has_english_contractions = self
            .lexicon
            .contractions()
            .iter()
            .any(|(contraction, _)| lower.contains(contraction));

        FeatureSet {
            length: text.chars().count(),
            word_count: text.split_whitespace().count(),
            has_question: text.contains('?'),
            has_exclamation: text.contains('!'),
            has_singlish_particles,
            has_sinhala_terms,
            has_english_contractions,
            singlish_intensity: self.singlish_intensity(&lower),
            language_mix: self.language_mix(&lower),
        }
    }

    fn singlish_intensity(&self, lower: &str) -> f32 {
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let mixed = tokens
            .iter()
            .filter(|token| {
                self.lexicon.has_singlish_term(token) || self.lexicon.has_sinhala_term(token)
            })
            .count();

        mixed as f32 / tokens.len() as f32
    }

    fn language_mix(&self, lower: &str) -> BTreeSet<MixedLanguage> {
        let mut languages = BTreeSet::new();
        languages.insert(MixedLanguage::English);

        for token in lower.split_whitespace() {
            if self.lexicon.has_sinhala_term(token) {
                languages.insert(MixedLanguage::Sinhala);
            }
            if self.lexicon.has_singlish_term(token) {
                languages.insert(MixedLanguage::Singlish);
            }
        }

        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_particles_from_canonical() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("can lah").canonical, "can");
        assert_eq!(normalizer.normalize("okay leh hor").canonical, "okay");
    }

    #[test]
    fn expands_contractions_before_term_passes() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("I'm blur").canonical, "i am confused");
        assert_eq!(normalizer.normalize("can't makan").canonical, "cannot eat");
    }

    #[test]
    fn glosses_romanized_sinhala() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("kohomada machan").canonical, "how are you friend");
        assert_eq!(normalizer.normalize("mage nama").canonical, "my name");
    }

    #[test]
    fn collapses_punctuation_runs() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("what???").canonical, "what?");
        // A token with punctuation attached is not an exact lexicon match, so
        // the term survives the rewrite and only the run is collapsed.
        assert_eq!(normalizer.normalize("steady!!!").canonical, "steady?");
    }

    #[test]
    fn canonicalization_is_deterministic() {
        let normalizer = Normalizer::new();
        let first = normalizer.normalize("Wah, kohomada lah!!");
        let second = normalizer.normalize("Wah, kohomada lah!!");
        assert_eq!(first.canonical, second.canonical);
        assert_eq!(first.features, second.features);
    }

    #[test]
    fn features_come_from_the_raw_text() {
        let normalizer = Normalizer::new();
        let features = normalizer.normalize("Kohomada lah! You steady?").features;

        assert!(features.has_question);
        assert!(features.has_exclamation);
        assert!(features.has_singlish_particles);
        assert!(features.has_sinhala_terms);
        assert!(!features.has_english_contractions);
        assert!(features.singlish_intensity > 0.0);
        assert!(features.language_mix.contains(&MixedLanguage::English));
        assert!(features.language_mix.contains(&MixedLanguage::Sinhala));
    }

    #[test]
    fn empty_input_yields_zero_intensity() {
        let normalizer = Normalizer::new();
        let normalized = normalizer.normalize("");
        assert_eq!(normalized.canonical, "");
        assert_eq!(normalized.features.singlish_intensity, 0.0);
        assert_eq!(normalized.features.word_count, 0);
    }
}
