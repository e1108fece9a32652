//! Symptom validation, relevance classification, and remedy generation.

use crate::error::{normalize_provider_error, RemedyError, Stage};
use crate::models::{RemedyResult, SymptomText};
use crate::services::metrics;
use crate::services::prompts::{build_prompt, RELEVANCE_TEMPLATE, REMEDY_TEMPLATE};
use crate::services::providers::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const MIN_SYMPTOMS_LEN: usize = 10;
pub const MAX_SYMPTOMS_LEN: usize = 1000;

/// Shortest model output accepted as a remedy plan.
pub const MIN_REMEDY_LEN: usize = 100;

/// Whitespace plus the byte order mark, which `str::trim` keeps.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Check that `value` is a string whose trimmed length is within bounds.
pub fn validate_symptoms(value: Option<&Value>) -> Result<SymptomText, RemedyError> {
    let text = match value {
        Some(Value::String(s)) => s.trim_matches(is_trimmable),
        _ => return Err(RemedyError::InvalidInput),
    };

    if text.is_empty() {
        return Err(RemedyError::InvalidInput);
    }

    let len = text.chars().count();
    if len < MIN_SYMPTOMS_LEN {
        return Err(RemedyError::TooShort);
    }
    if len > MAX_SYMPTOMS_LEN {
        return Err(RemedyError::TooLong);
    }

    Ok(SymptomText::new_unchecked(text.to_string()))
}

/// Flatten structural whitespace and clamp length before the text goes into the remedy prompt.
pub fn sanitize_symptoms(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .take(MAX_SYMPTOMS_LEN)
        .collect()
}

/// Low temperature, short answer.
fn classification_params() -> GenerationParams {
    GenerationParams {
        temperature: Some(0.3),
        top_p: Some(0.8),
        top_k: Some(40),
        max_tokens: Some(100),
    }
}

fn generation_params() -> GenerationParams {
    GenerationParams {
        temperature: Some(0.7),
        top_p: Some(0.8),
        top_k: Some(40),
        max_tokens: Some(2000),
    }
}

/// How a raced provider call ended.
#[derive(Debug)]
pub enum RaceFailure {
    TimedOut,
    Provider(ProviderError),
    /// The provider task panicked or was cancelled.
    Aborted(String),
}

/// Run the provider call on its own task and race it against a timer.
///
/// Whichever settles first decides the outcome. If the timer wins the task is
/// detached rather than aborted, so the upstream request runs to completion and
/// its result is dropped.
pub async fn race_with_timeout(
    provider: Arc<dyn TextProvider>,
    prompt: String,
    params: GenerationParams,
    limit: Duration,
) -> Result<ProviderResponse, RaceFailure> {
    let call = tokio::spawn(async move { provider.generate(&prompt, &params).await });

    tokio::select! {
        joined = call => match joined {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(RaceFailure::Provider(e)),
            Err(e) => Err(RaceFailure::Aborted(e.to_string())),
        },
        _ = tokio::time::sleep(limit) => Err(RaceFailure::TimedOut),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RemedyTimeouts {
    pub classify: Duration,
    pub generate: Duration,
}

impl Default for RemedyTimeouts {
    fn default() -> Self {
        Self {
            classify: Duration::from_secs(10),
            generate: Duration::from_secs(30),
        }
    }
}

/// The remedy pipeline. Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct RemedyService {
    provider: Arc<dyn TextProvider>,
    timeouts: RemedyTimeouts,
}

impl RemedyService {
    pub fn new(provider: Arc<dyn TextProvider>, timeouts: RemedyTimeouts) -> Self {
        Self { provider, timeouts }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Validate, classify, then generate. No step is retried.
    #[tracing::instrument(skip_all)]
    pub async fn suggest(&self, symptoms: Option<&Value>) -> Result<RemedyResult, RemedyError> {
        let symptoms = validate_symptoms(symptoms)?;
        tracing::info!(symptoms_len = symptoms.char_len(), "Symptoms accepted");

        if !self.is_health_related(&symptoms).await? {
            tracing::info!("Symptoms classified as not health related");
            return Err(RemedyError::NotHealthRelated);
        }

        self.generate_remedy(&symptoms).await
    }

    /// Ask the model whether the text is health related.
    ///
    /// Only an answer that starts with "yes" (any case, surrounding whitespace
    /// ignored) counts as true.
    #[tracing::instrument(skip_all, fields(model = %self.provider.model()))]
    pub async fn is_health_related(&self, symptoms: &SymptomText) -> Result<bool, RemedyError> {
        let prompt = build_prompt(RELEVANCE_TEMPLATE, &[("symptoms", symptoms.as_str())]);

        let response = self
            .call(
                Stage::Classification,
                prompt,
                classification_params(),
                self.timeouts.classify,
            )
            .await?;

        let answer = response.text_or_empty().trim().to_lowercase();
        Ok(answer.starts_with("yes"))
    }

    /// Ask the model for the markdown remedy plan.
    #[tracing::instrument(skip_all, fields(model = %self.provider.model()))]
    pub async fn generate_remedy(
        &self,
        symptoms: &SymptomText,
    ) -> Result<RemedyResult, RemedyError> {
        let sanitized = sanitize_symptoms(symptoms.as_str());
        let prompt = build_prompt(REMEDY_TEMPLATE, &[("symptoms", sanitized.as_str())]);

        let response = self
            .call(
                Stage::Generation,
                prompt,
                generation_params(),
                self.timeouts.generate,
            )
            .await?;

        let text = response.text.unwrap_or_default();
        if text.chars().count() < MIN_REMEDY_LEN {
            tracing::warn!(
                response_len = text.len(),
                "Remedy response too short to be usable"
            );
            return Err(RemedyError::InsufficientResponse);
        }

        Ok(RemedyResult::new_unchecked(text))
    }

    async fn call(
        &self,
        stage: Stage,
        prompt: String,
        params: GenerationParams,
        limit: Duration,
    ) -> Result<ProviderResponse, RemedyError> {
        let started = Instant::now();
        let outcome = race_with_timeout(self.provider.clone(), prompt, params, limit).await;
        let elapsed = started.elapsed();

        metrics::record_provider_latency(stage.as_str(), self.provider.model(), elapsed.as_secs_f64());

        let err = match outcome {
            Ok(response) => {
                tracing::debug!(
                    stage = stage.as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    output_tokens = response.output_tokens,
                    finish_reason = response.finish_reason.as_str(),
                    "Provider call completed"
                );
                return Ok(response);
            }
            Err(RaceFailure::TimedOut) => {
                tracing::warn!(
                    stage = stage.as_str(),
                    limit_ms = limit.as_millis() as u64,
                    "Provider call timed out"
                );
                RemedyError::UpstreamTimeout
            }
            Err(RaceFailure::Provider(e)) => {
                tracing::error!(stage = stage.as_str(), error = %e, "Provider call failed");
                normalize_provider_error(&e.to_string(), stage)
            }
            Err(RaceFailure::Aborted(reason)) => {
                tracing::error!(stage = stage.as_str(), reason = %reason, "Provider task aborted");
                RemedyError::UpstreamUnknownError(reason)
            }
        };

        metrics::record_provider_error(stage.as_str(), err.kind());
        Err(err)
    }
}
