//! Failure taxonomy for the remedy pipeline and the mapping from provider
//! errors onto it.

use axum::http::StatusCode;
use serde_json::json;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemedyError {
    #[error("Please provide a description of your symptoms")]
    InvalidInput,

    #[error("Please provide more details about your symptoms (at least 10 characters)")]
    TooShort,

    #[error("Symptom description is too long. Please keep it under 1000 characters")]
    TooLong,

    #[error("Please provide health-related symptoms or concerns so we can suggest herbal remedies")]
    NotHealthRelated,

    #[error("Request to AI service timed out. Please try again")]
    UpstreamTimeout,

    #[error("Failed to generate a complete remedy plan. Please try again")]
    InsufficientResponse,

    #[error("Invalid Google AI API key. Please check the service configuration")]
    UpstreamAuthError,

    #[error("API quota exceeded. Please try again later")]
    UpstreamQuotaExceeded,

    #[error("The content was blocked due to safety concerns. Please rephrase your symptoms")]
    UpstreamSafetyBlock,

    /// Carries the raw upstream message for non-production diagnostics.
    #[error("Failed to generate herbal remedy. Please try again later")]
    UpstreamUnknownError(String),
}

impl RemedyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RemedyError::InvalidInput
            | RemedyError::TooShort
            | RemedyError::TooLong
            | RemedyError::NotHealthRelated
            | RemedyError::UpstreamSafetyBlock => StatusCode::BAD_REQUEST,
            RemedyError::UpstreamAuthError => StatusCode::UNAUTHORIZED,
            RemedyError::UpstreamQuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            RemedyError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            RemedyError::InsufficientResponse | RemedyError::UpstreamUnknownError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RemedyError::InvalidInput => "invalid_input",
            RemedyError::TooShort => "too_short",
            RemedyError::TooLong => "too_long",
            RemedyError::NotHealthRelated => "not_health_related",
            RemedyError::UpstreamTimeout => "upstream_timeout",
            RemedyError::InsufficientResponse => "insufficient_response",
            RemedyError::UpstreamAuthError => "upstream_auth",
            RemedyError::UpstreamQuotaExceeded => "upstream_quota",
            RemedyError::UpstreamSafetyBlock => "upstream_safety",
            RemedyError::UpstreamUnknownError(_) => "upstream_unknown",
        }
    }

    /// Convert into the wire error. Raw upstream text is attached as `details`
    /// only when `expose_details` is set.
    pub fn into_app_error(self, expose_details: bool) -> AppError {
        let message = self.to_string();
        match self {
            RemedyError::UpstreamAuthError => AppError::Unauthorized(message),
            RemedyError::UpstreamQuotaExceeded => AppError::TooManyRequests(message, None),
            RemedyError::UpstreamTimeout => AppError::GatewayTimeout(message),
            RemedyError::InsufficientResponse => AppError::Internal {
                message,
                details: None,
            },
            RemedyError::UpstreamUnknownError(raw) => AppError::Internal {
                message,
                details: expose_details.then(|| json!({ "error": raw })),
            },
            RemedyError::InvalidInput
            | RemedyError::TooShort
            | RemedyError::TooLong
            | RemedyError::NotHealthRelated
            | RemedyError::UpstreamSafetyBlock => AppError::BadRequest(message),
        }
    }
}

/// Pipeline stage that made the failing provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classification,
    Generation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classification => "classification",
            Stage::Generation => "generation",
        }
    }
}

struct Rule {
    needle: &'static str,
    generation_only: bool,
    outcome: RemedyError,
}

/// Evaluated top to bottom; the first matching rule wins. Messages can match
/// several needles, so the order is part of the contract.
fn rules() -> [Rule; 4] {
    [
        Rule {
            needle: "API key not valid",
            generation_only: false,
            outcome: RemedyError::UpstreamAuthError,
        },
        Rule {
            needle: "quota",
            generation_only: false,
            outcome: RemedyError::UpstreamQuotaExceeded,
        },
        Rule {
            needle: "timed out",
            generation_only: false,
            outcome: RemedyError::UpstreamTimeout,
        },
        Rule {
            needle: "safety",
            generation_only: true,
            outcome: RemedyError::UpstreamSafetyBlock,
        },
    ]
}

/// Map a provider failure message onto the pipeline taxonomy.
pub fn normalize_provider_error(message: &str, stage: Stage) -> RemedyError {
    rules()
        .into_iter()
        .filter(|rule| !rule.generation_only || stage == Stage::Generation)
        .find(|rule| message.contains(rule.needle))
        .map(|rule| rule.outcome)
        .unwrap_or_else(|| RemedyError::UpstreamUnknownError(message.to_string()))
}
