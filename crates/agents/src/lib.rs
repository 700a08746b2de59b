use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use singlish_core::models::{
    ChatInput, ChatMetadata, ChatOutcome, ClassificationResult, InteractionRecord, LanguageReport,
    NormalizedMessage, TrainingReport, TrainingSample, UNKNOWN_INTENT,
};
use singlish_core::{LanguageClassifier, Normalizer, ResponseComposer};
use singlish_ml::{IntentEngine, ModelStatus, TrainingError};
use singlish_observability::AppMetrics;
use singlish_storage::{AnalyticsRepository, AnalyticsSummary, CacheRepository};
use tracing::{info, instrument, warn};

const CACHE_TTL_SECONDS: i64 = 3600;

/// Orchestrates the full chat pipeline: normalization, language detection,
/// intent classification, and response composition, with analytics and
/// caching on the side.
pub struct ChatAgent<S>
where
    S: AnalyticsRepository + CacheRepository,
{
    normalizer: Normalizer,
    language: LanguageClassifier,
    engine: Arc<IntentEngine>,
    composer: ResponseComposer,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> ChatAgent<S>
where
    S: AnalyticsRepository + CacheRepository,
{
    pub fn new(
        engine: Arc<IntentEngine>,
        composer: ResponseComposer,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            normalizer: Normalizer::new(),
            language: LanguageClassifier::new(),
            engine,
            composer,
            store,
            metrics,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn handle_chat(&self, input: ChatInput) -> Result<ChatOutcome> {
        let started = Instant::now();
        self.metrics.inc_request();

        // Only context-free anonymous requests are cacheable: anything tied
        // to a user or conversation can produce a personalized response.
        let cache_key = cache_key_for(&input);
        if let Some(key) = &cache_key {
            match self.store.cache_get(key).await {
                Ok(Some(raw)) => {
                    if let Ok(mut outcome) = serde_json::from_str::<ChatOutcome>(&raw) {
                        self.metrics.inc_cache_hit();
                        outcome.metadata.cached = true;
                        outcome.processing_time = started.elapsed().as_secs_f64();
                        self.metrics.observe_latency(started.elapsed());
                        info!(intent = %outcome.intent, "prediction served from cache");
                        return Ok(outcome);
                    }
                }
                Ok(None) => {}
                Err(error) => warn!(%error, "cache lookup failed"),
            }
        }

        let normalized = self.normalizer.normalize(&input.message);
        let language = self.language.classify(&input.message);
        let classification = self
            .engine
            .classify(&normalized.canonical, input.context.as_ref());

        self.metrics.inc_prediction();
        if classification.intent == UNKNOWN_INTENT {
            self.metrics.inc_fallback();
        }

        let composed = self.composer.generate(
            &input.message,
            &classification.intent,
            classification.confidence,
            input.user_id.as_deref(),
        );

        let processing_time = started.elapsed().as_secs_f64();
        let outcome = build_outcome(
            &classification,
            normalized,
            language,
            composed.response,
            composed.strategy,
            composed.personalized,
            processing_time,
        );

        let record = InteractionRecord {
            user_id: input.user_id.clone(),
            session_id: input.session_id.clone(),
            message: input.message.clone(),
            intent: outcome.intent.clone(),
            confidence: outcome.confidence,
            response: outcome.response.clone(),
            processing_time,
            created_at: Utc::now(),
        };
        if let Err(error) = self.store.record_interaction(&record).await {
            warn!(%error, "failed recording interaction");
        }

        if let Some(key) = &cache_key {
            match serde_json::to_string(&outcome) {
                Ok(raw) => {
                    if let Err(error) = self.store.cache_set(key, &raw, CACHE_TTL_SECONDS).await {
                        warn!(%error, "failed caching prediction");
                    }
                }
                Err(error) => warn!(%error, "failed encoding prediction for cache"),
            }
        }

        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = %outcome.intent,
            confidence = outcome.confidence,
            language = %outcome.metadata.language.classification.as_code(),
            "chat handled"
        );

        Ok(outcome)
    }

    pub fn train(&self, samples: &[TrainingSample]) -> Result<TrainingReport, TrainingError> {
        self.metrics.inc_training();
        self.engine.train(samples)
    }

    pub fn normalize(&self, text: &str) -> NormalizedMessage {
        self.normalizer.normalize(text)
    }

    pub fn classify_language(&self, text: &str) -> LanguageReport {
        self.language.classify(text)
    }

    pub fn model_status(&self) -> ModelStatus {
        self.engine.status()
    }

    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        self.store.performance_summary().await
    }
}

fn cache_key_for(input: &ChatInput) -> Option<String> {
    if input.user_id.is_none() && input.session_id.is_none() && input.context.is_none() {
        Some(format!("predict:{}", input.message.trim().to_lowercase()))
    } else {
        None
    }
}

fn build_outcome(
    classification: &ClassificationResult,
    normalized: NormalizedMessage,
    language: LanguageReport,
    response: String,
    strategy: singlish_core::models::ResponseStrategy,
    personalized: bool,
    processing_time: f64,
) -> ChatOutcome {
    ChatOutcome {
        response,
        intent: classification.intent.clone(),
        confidence: classification.confidence,
        processing_time,
        metadata: ChatMetadata {
            strategy,
            language,
            alternatives: classification.alternatives.clone(),
            canonical_message: normalized.canonical,
            features: normalized.features,
            personalized,
            cached: false,
        },
    }
}
