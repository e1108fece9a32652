//! HTTP handlers for the herbal remedy service.

pub mod health;
pub mod metrics;
pub mod remedy;

use service_core::error::AppError;

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
