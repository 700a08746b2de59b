use std::cmp::Ordering;

use singlish_core::models::{ClassificationResult, IntentAlternative, IntentRecord};

const ACCEPT_THRESHOLD: f64 = 0.6;
const CANDIDATE_THRESHOLD: f64 = 0.5;

/// Fuzzy seed-phrase matcher used when no trained model is available or the
/// statistical model has no signal for the input.
///
/// Alternatives are collected with running-best bookkeeping: a dethroned best
/// is demoted into the alternatives, and any non-best phrase scoring above
/// 0.5 is added as a candidate.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    catalog: Vec<IntentRecord>,
}

impl FuzzyMatcher {
    pub fn new(catalog: Vec<IntentRecord>) -> Self {
        Self { catalog }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.catalog.iter().map(|record| record.label.as_str())
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let input = text.to_lowercase();

        let mut best_label: Option<&str> = None;
        let mut best_score = 0.0_f64;
        let mut alternatives: Vec<IntentAlternative> = Vec::new();

        for record in &self.catalog {
            for phrase in &record.seed_phrases {
                let score = strsim::normalized_levenshtein(&input, &phrase.to_lowercase());

                if score > best_score {
                    if let Some(previous) = best_label {
                        alternatives.push(IntentAlternative {
                            intent: previous.to_string(),
                            confidence: best_score as f32,
                        });
                    }
                    best_label = Some(record.label.as_str());
                    best_score = score;
                } else if score > CANDIDATE_THRESHOLD {
                    alternatives.push(IntentAlternative {
                        intent: record.label.clone(),
                        confidence: score as f32,
                    });
                }
            }
        }

        match best_label {
            Some(label) if best_score > ACCEPT_THRESHOLD => {
                alternatives.retain(|alternative| alternative.intent != label);
                alternatives.sort_by(|a, b| {
                    b.confidence
                        .partial_cmp(&a.confidence)
                        .unwrap_or(Ordering::Equal)
                });
                alternatives.truncate(3);

                ClassificationResult {
                    intent: label.to_string(),
                    confidence: best_score as f32,
                    alternatives,
                }
            }
            _ => ClassificationResult::unknown(),
        }
    }
}
