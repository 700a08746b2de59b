use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_INTENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageLabel {
    Singlish,
    SinhalaRomanized,
    English,
    Unknown,
}

impl LanguageLabel {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Singlish => "singlish",
            Self::SinhalaRomanized => "sinhala_romanized",
            Self::English => "english",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedLanguage {
    English,
    Sinhala,
    Singlish,
}

/// Surface features extracted from the raw message, before canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub length: usize,
    pub word_count: usize,
    pub has_question: bool,
    pub has_exclamation: bool,
    pub has_singlish_particles: bool,
    pub has_sinhala_terms: bool,
    pub has_english_contractions: bool,
    pub singlish_intensity: f32,
    pub language_mix: BTreeSet<MixedLanguage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub canonical: String,
    pub features: FeatureSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageFeatures {
    pub has_particles: bool,
    pub has_sinhala: bool,
    pub word_count: usize,
    pub char_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageReport {
    pub classification: LanguageLabel,
    pub confidence: f32,
    pub singlish_score: f32,
    pub features: LanguageFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAlternative {
    pub intent: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: String,
    pub confidence: f32,
    pub alternatives: Vec<IntentAlternative>,
}

impl ClassificationResult {
    pub fn unknown() -> Self {
        Self {
            intent: UNKNOWN_INTENT.to_string(),
            confidence: 0.0,
            alternatives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Per-turn conversational context supplied by the caller. The pipeline never
/// stores it; the host threads `previous_intent` across turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    pub previous_intent: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    pub label: String,
    pub seed_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub text: String,
    pub intent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub accuracy: f32,
    pub intent_count: usize,
    pub sample_count: usize,
    pub model_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    TemplateBased,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedResponse {
    pub response: String,
    pub strategy: ResponseStrategy,
    pub confidence: f32,
    pub personalized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub message: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub context: Option<ConversationContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub strategy: ResponseStrategy,
    pub language: LanguageReport,
    pub alternatives: Vec<IntentAlternative>,
    pub canonical_message: String,
    pub features: FeatureSet,
    pub personalized: bool,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub intent: String,
    pub confidence: f32,
    pub processing_time: f64,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub message: String,
    pub intent: String,
    pub confidence: f32,
    pub response: String,
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
}
