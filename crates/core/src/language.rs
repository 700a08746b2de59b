use crate::lexicon::Lexicon;
use crate::models::{LanguageFeatures, LanguageLabel, LanguageReport};

/// Advisory surface-language classifier. Scores marker categories over the
/// lowercased raw text; the result never gates the intent pipeline.
#[derive(Debug)]
pub struct LanguageClassifier {
    lexicon: &'static Lexicon,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageClassifier {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::shared(),
        }
    }

    pub fn classify(&self, text: &str) -> LanguageReport {
        let lower = text.to_lowercase();
        let singlish_score = self.singlish_score(&lower);

        let (classification, confidence) = if singlish_score > 0.3 {
            (LanguageLabel::Singlish, singlish_score.min(1.0))
        } else if self.contains_sinhala(&lower) {
            (LanguageLabel::SinhalaRomanized, 0.8)
        } else {
            (LanguageLabel::English, 1.0 - singlish_score)
        };

        LanguageReport {
            classification,
            confidence,
            singlish_score,
            features: LanguageFeatures {
                has_particles: self
                    .lexicon
                    .markers()
                    .particles
                    .iter()
                    .any(|particle| lower.contains(particle)),
                has_sinhala: self.contains_sinhala(&lower),
                word_count: lower.split_whitespace().count(),
                char_count: lower.chars().count(),
            },
        }
    }

    // Each marker category contributes its weight at most once, regardless of
    // how many of its markers occur.
    fn singlish_score(&self, lower: &str) -> f32 {
        if lower.split_whitespace().next().is_none() {
            return 0.0;
        }

        let markers = self.lexicon.markers();
        let categories: [(&[&str], f32); 4] = [
            (markers.particles, 0.3),
            (markers.sinhala_words, 0.4),
            (markers.grammar_patterns, 0.2),
            (markers.expressions, 0.3),
        ];

        let mut score = 0.0;
        for (category, weight) in categories {
            if category.iter().any(|marker| lower.contains(marker)) {
                score += weight;
            }
        }

        score.min(1.0)
    }

    fn contains_sinhala(&self, lower: &str) -> bool {
        self.lexicon
            .sinhala_indicators()
            .iter()
            .any(|indicator| lower.contains(indicator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_singlish_with_multiple_categories() {
        let classifier = LanguageClassifier::new();
        let report = classifier.classify("wah this one shiok lah");

        assert_eq!(report.classification, LanguageLabel::Singlish);
        // expressions + particles, counted once per category
        assert!((report.singlish_score - 0.6).abs() < 1e-6);
        assert!((report.confidence - report.singlish_score).abs() < 1e-6);
    }

    #[test]
    fn category_weight_counted_once() {
        let classifier = LanguageClassifier::new();
        // two expression markers, still a single 0.3 contribution
        let report = classifier.classify("aiyo so shiok");
        assert!((report.singlish_score - 0.3).abs() < 1e-6);
        // 0.3 does not clear the strict threshold
        assert_eq!(report.classification, LanguageLabel::English);
    }

    #[test]
    fn falls_through_to_sinhala_romanized() {
        let classifier = LanguageClassifier::new();
        let report = classifier.classify("mage");

        assert_eq!(report.classification, LanguageLabel::SinhalaRomanized);
        assert!((report.confidence - 0.8).abs() < 1e-6);
        assert!(report.features.has_sinhala);
    }

    #[test]
    fn plain_english_gets_complementary_confidence() {
        let classifier = LanguageClassifier::new();
        let report = classifier.classify("good morning everyone");

        assert_eq!(report.classification, LanguageLabel::English);
        assert!((report.confidence - 1.0).abs() < 1e-6);
        assert_eq!(report.singlish_score, 0.0);
    }

    #[test]
    fn marker_checks_are_substring_based() {
        let classifier = LanguageClassifier::new();
        // "nama" carries the sinhala_words marker as a substring
        let report = classifier.classify("mage nama kasun");
        assert_eq!(report.classification, LanguageLabel::Singlish);
    }

    #[test]
    fn empty_input_is_english_with_full_confidence() {
        let classifier = LanguageClassifier::new();
        let report = classifier.classify("");
        assert_eq!(report.classification, LanguageLabel::English);
        assert_eq!(report.singlish_score, 0.0);
    }
}
