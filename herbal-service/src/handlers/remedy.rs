use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

use crate::models::RemedyResponse;
use crate::services::metrics;
use crate::startup::AppState;

/// `POST /api/herbal-remedy`
///
/// The body is taken as untyped JSON so that a wrong `symptoms` type is reported
/// the same way as a missing one.
#[tracing::instrument(skip(state, payload))]
pub async fn suggest_herbal_remedy(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RemedyResponse>, AppError> {
    let body = match payload {
        Ok(Json(body)) => body,
        // No JSON content type means no parsed body
        Err(JsonRejection::MissingJsonContentType(_)) => Value::Null,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected request body");
            metrics::record_remedy_request("rejected_body");
            return Err(AppError::Rejected(rejection.status(), rejection.body_text()));
        }
    };

    match state.remedy.suggest(body.get("symptoms")).await {
        Ok(remedy) => {
            tracing::info!(remedy_len = remedy.as_str().len(), "Remedy generated");
            metrics::record_remedy_request("success");
            Ok(Json(RemedyResponse::from(remedy)))
        }
        Err(e) => {
            tracing::info!(kind = e.kind(), status = e.status_code().as_u16(), "Remedy request failed");
            metrics::record_remedy_request(e.kind());
            Err(e.into_app_error(state.config.expose_error_details()))
        }
    }
}
