mod artifact;
mod classifier;
mod fuzzy;
mod vectorizer;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use singlish_core::models::{
    ClassificationResult, ConversationContext, IntentAlternative, TrainingReport, TrainingSample,
};
use singlish_core::seed_intents;

pub use artifact::ModelLoadError;
pub use classifier::CentroidClassifier;
pub use fuzzy::FuzzyMatcher;
pub use vectorizer::TermVectorizer;

pub const MODEL_VERSION: &str = "1.0.0";

/// Serializable snapshot of a trained intent model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: String,
    pub accuracy: f32,
    pub labels: Vec<String>,
    pub vectorizer: TermVectorizer,
    pub classifier: CentroidClassifier,
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("no training samples provided")]
    Empty,
    #[error("label {label} has only {count} sample(s); stratified split needs at least 2")]
    Stratification { label: String, count: usize },
    #[error("failed persisting trained model")]
    Persist(#[source] anyhow::Error),
}

/// What the engine is currently classifying with.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub strategy: &'static str,
    pub version: Option<String>,
    pub accuracy: Option<f32>,
    pub labels: Vec<String>,
}

/// Intent classification engine. Prefers the trained statistical model and
/// falls back to fuzzy seed-phrase matching when no model is loaded or the
/// model has no signal for the input.
///
/// The active model is swapped atomically behind a lock, so in-flight
/// classifications keep the snapshot they started with.
pub struct IntentEngine {
    model: RwLock<Option<Arc<TrainedModel>>>,
    fuzzy: FuzzyMatcher,
    artifact_path: Option<PathBuf>,
}

impl IntentEngine {
    pub fn new(artifact_path: Option<PathBuf>) -> Self {
        Self {
            model: RwLock::new(None),
            fuzzy: FuzzyMatcher::new(seed_intents()),
            artifact_path,
        }
    }

    /// Loads a persisted model from `artifact_path` when one exists, otherwise
    /// bootstraps a model from the built-in seed phrases. Failures leave the
    /// engine on the fuzzy fallback rather than erroring out.
    pub fn load_or_bootstrap(artifact_path: Option<PathBuf>) -> Self {
        let engine = Self::new(artifact_path);

        if let Some(path) = engine.artifact_path.clone() {
            if path.exists() {
                match artifact::load(&path) {
                    Ok(model) => {
                        info!(
                            path = %path.display(),
                            version = %model.version,
                            accuracy = model.accuracy,
                            "loaded intent model artifact"
                        );
                        *engine.model.write() = Some(Arc::new(model));
                        return engine;
                    }
                    Err(error) => {
                        warn!(path = %path.display(), %error, "discarding unreadable model artifact");
                    }
                }
            }
        }

        match engine.train(&seed_training_samples()) {
            Ok(report) => {
                info!(
                    accuracy = report.accuracy,
                    intents = report.intent_count,
                    "bootstrapped intent model from seed phrases"
                );
            }
            Err(error) => {
                warn!(%error, "seed bootstrap failed; staying on fuzzy matching");
            }
        }

        engine
    }

    pub fn classify(
        &self,
        text: &str,
        context: Option<&ConversationContext>,
    ) -> ClassificationResult {
        if !text.chars().any(char::is_alphanumeric) {
            return ClassificationResult::unknown();
        }

        let snapshot = self.model.read().clone();
        let mut result = snapshot
            .and_then(|model| statistical(&model, text))
            .unwrap_or_else(|| self.fuzzy.classify(text));

        if let Some(context) = context {
            apply_context(&mut result, context);
        }

        result
    }

    /// Trains a fresh model on the given samples with a stratified holdout,
    /// swaps it in, and persists it when an artifact path is configured. The
    /// active model is untouched when training fails.
    pub fn train(&self, samples: &[TrainingSample]) -> Result<TrainingReport, TrainingError> {
        if samples.is_empty() {
            return Err(TrainingError::Empty);
        }

        let mut labels: Vec<String> = Vec::new();
        let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
        for sample in samples {
            if !grouped.contains_key(sample.intent.as_str()) {
                labels.push(sample.intent.clone());
            }
            grouped
                .entry(sample.intent.as_str())
                .or_default()
                .push(sample.text.as_str());
        }

        for label in &labels {
            let count = grouped[label.as_str()].len();
            if count < 2 {
                return Err(TrainingError::Stratification {
                    label: label.clone(),
                    count,
                });
            }
        }

        // Stratified split: the last fifth of each label's samples (at least
        // one) is held out for the accuracy estimate.
        let mut train_texts: Vec<String> = Vec::new();
        let mut train_classes: Vec<usize> = Vec::new();
        let mut holdout: Vec<(String, usize)> = Vec::new();
        for (class, label) in labels.iter().enumerate() {
            let texts = &grouped[label.as_str()];
            let holdout_size = (texts.len() / 5).max(1);
            let split = texts.len() - holdout_size;
            for text in &texts[..split] {
                train_texts.push((*text).to_string());
                train_classes.push(class);
            }
            for text in &texts[split..] {
                holdout.push(((*text).to_string(), class));
            }
        }

        let vectorizer = TermVectorizer::fit(&train_texts);
        let vectors: Vec<Vec<f32>> = train_texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect();
        let classifier = CentroidClassifier::fit(&vectors, &train_classes, labels.len());

        let mut correct = 0_usize;
        for (text, class) in &holdout {
            let probabilities = classifier.probabilities(&vectorizer.transform(text));
            if let Some((predicted, top)) = argmax(&probabilities) {
                if top > 0.0 && predicted == *class {
                    correct += 1;
                }
            }
        }
        let accuracy = correct as f32 / holdout.len() as f32;

        let model = TrainedModel {
            version: MODEL_VERSION.to_string(),
            accuracy,
            labels: labels.clone(),
            vectorizer,
            classifier,
        };

        if let Some(path) = &self.artifact_path {
            artifact::save(path, &model).map_err(TrainingError::Persist)?;
        }

        *self.model.write() = Some(Arc::new(model));

        Ok(TrainingReport {
            accuracy,
            intent_count: labels.len(),
            sample_count: samples.len(),
            model_version: MODEL_VERSION.to_string(),
        })
    }

    pub fn status(&self) -> ModelStatus {
        match self.model.read().as_ref() {
            Some(model) => ModelStatus {
                strategy: "statistical",
                version: Some(model.version.clone()),
                accuracy: Some(model.accuracy),
                labels: model.labels.clone(),
            },
            None => ModelStatus {
                strategy: "fuzzy",
                version: None,
                accuracy: None,
                labels: self.fuzzy.labels().map(ToString::to_string).collect(),
            },
        }
    }
}

fn statistical(model: &TrainedModel, text: &str) -> Option<ClassificationResult> {
    let probabilities = model.classifier.probabilities(&model.vectorizer.transform(text));
    let (top_index, top_probability) = argmax(&probabilities)?;
    if top_probability <= 0.0 {
        return None;
    }

    let mut alternatives: Vec<IntentAlternative> = probabilities
        .iter()
        .enumerate()
        .filter(|(index, probability)| *index != top_index && **probability > 0.1)
        .map(|(index, probability)| IntentAlternative {
            intent: model.labels[index].clone(),
            confidence: *probability,
        })
        .collect();
    alternatives.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    alternatives.truncate(3);

    Some(ClassificationResult {
        intent: model.labels[top_index].clone(),
        confidence: top_probability,
        alternatives,
    })
}

fn apply_context(result: &mut ClassificationResult, context: &ConversationContext) {
    if let Some(previous) = context.previous_intent.as_deref() {
        if previous == "greeting" && result.intent == "self_intro" {
            result.confidence = (result.confidence * 1.2).min(1.0);
        }
    }
    if context.user_id.is_some() && result.intent == "ask_name" {
        result.confidence = (result.confidence * 0.8).min(1.0);
    }
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

/// Flattens the built-in seed catalog into labelled samples for bootstrap
/// training.
pub fn seed_training_samples() -> Vec<TrainingSample> {
    seed_intents()
        .into_iter()
        .flat_map(|record| {
            record.seed_phrases.into_iter().map(move |phrase| TrainingSample {
                text: phrase,
                intent: record.label.clone(),
            })
        })
        .collect()
}
